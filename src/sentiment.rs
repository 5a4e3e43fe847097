use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Sentiment {
    pub polarity: f64,
    pub subjectivity: f64,
}

impl Sentiment {
    pub fn new(polarity: f64, subjectivity: f64) -> Self {
        Self {
            polarity: polarity.clamp(-1.0, 1.0),
            subjectivity: subjectivity.clamp(0.0, 1.0),
        }
    }

    pub fn rounded(self) -> Self {
        Self {
            polarity: crate::round_to(self.polarity, 3),
            subjectivity: crate::round_to(self.subjectivity, 3),
        }
    }
}

pub trait SentimentProvider: Send + Sync {
    fn sentiment(&self, text: &str) -> Sentiment;
}

impl<F> SentimentProvider for F
where
    F: Fn(&str) -> Sentiment + Send + Sync,
{
    fn sentiment(&self, text: &str) -> Sentiment {
        self(text)
    }
}

// ---------------------------------------------------------------------------
// Built-in lexicon scorer
// ---------------------------------------------------------------------------

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z]+(?:'[a-z]+)?").unwrap());

// word -> (polarity, subjectivity)
static WORDS: Lazy<HashMap<&'static str, (f64, f64)>> = Lazy::new(|| {
    [
        // Strongly positive
        ("amazing", (0.6, 0.9)),
        ("awesome", (1.0, 1.0)),
        ("best", (1.0, 0.3)),
        ("brilliant", (0.9, 1.0)),
        ("excellent", (1.0, 1.0)),
        ("fantastic", (0.4, 0.9)),
        ("incredible", (0.9, 0.9)),
        ("magnificent", (1.0, 1.0)),
        ("outstanding", (0.5, 0.7)),
        ("perfect", (1.0, 1.0)),
        ("stunning", (0.5, 1.0)),
        ("superb", (1.0, 1.0)),
        ("wonderful", (1.0, 1.0)),
        // Positive
        ("authentic", (0.5, 0.5)),
        ("beautiful", (0.85, 1.0)),
        ("delighted", (0.7, 0.8)),
        ("delightful", (0.7, 0.8)),
        ("easy", (0.43, 0.83)),
        ("effective", (0.6, 0.8)),
        ("exciting", (0.3, 0.8)),
        ("exclusive", (0.2, 0.5)),
        ("favorite", (0.5, 1.0)),
        ("free", (0.4, 0.8)),
        ("fun", (0.3, 0.2)),
        ("genuine", (0.4, 0.4)),
        ("glad", (0.5, 1.0)),
        ("good", (0.7, 0.6)),
        ("great", (0.8, 0.75)),
        ("happy", (0.8, 1.0)),
        ("helpful", (0.5, 0.5)),
        ("honest", (0.6, 0.9)),
        ("impressive", (1.0, 1.0)),
        ("interesting", (0.5, 0.5)),
        ("love", (0.5, 0.6)),
        ("lovely", (0.5, 0.75)),
        ("nice", (0.6, 1.0)),
        ("popular", (0.6, 0.9)),
        ("powerful", (0.3, 1.0)),
        ("professional", (0.1, 0.1)),
        ("rare", (0.3, 0.9)),
        ("reliable", (0.45, 0.8)),
        ("remarkable", (0.75, 0.75)),
        ("revolutionary", (0.4, 0.6)),
        ("safe", (0.5, 0.5)),
        ("sincere", (0.5, 0.8)),
        ("special", (0.36, 0.57)),
        ("strong", (0.43, 0.73)),
        ("successful", (0.75, 0.95)),
        ("true", (0.35, 0.65)),
        ("unique", (0.38, 1.0)),
        ("useful", (0.3, 0.0)),
        ("valuable", (0.5, 0.7)),
        // Negative
        ("afraid", (-0.6, 0.9)),
        ("angry", (-0.5, 1.0)),
        ("anxious", (-0.25, 0.75)),
        ("awful", (-1.0, 1.0)),
        ("bad", (-0.7, 0.67)),
        ("boring", (-1.0, 1.0)),
        ("dangerous", (-0.6, 0.9)),
        ("difficult", (-0.5, 1.0)),
        ("disappointing", (-0.6, 0.7)),
        ("disgusting", (-1.0, 1.0)),
        ("dreadful", (-0.9, 1.0)),
        ("evil", (-1.0, 1.0)),
        ("expensive", (-0.5, 0.7)),
        ("furious", (-0.8, 1.0)),
        ("hard", (-0.29, 0.54)),
        ("horrible", (-1.0, 1.0)),
        ("late", (-0.3, 0.6)),
        ("nasty", (-1.0, 1.0)),
        ("poor", (-0.4, 0.6)),
        ("sad", (-0.5, 1.0)),
        ("scary", (-0.5, 1.0)),
        ("shocking", (-1.0, 1.0)),
        ("stupid", (-0.8, 1.0)),
        ("terrible", (-1.0, 1.0)),
        ("ugly", (-0.7, 1.0)),
        ("unhappy", (-0.6, 0.9)),
        ("worried", (-0.5, 0.9)),
        ("worse", (-0.4, 0.6)),
        ("worst", (-1.0, 1.0)),
        ("wrong", (-0.5, 0.9)),
        // Objective-leaning
        ("certified", (0.0, 0.1)),
        ("limited", (-0.07, 0.14)),
        ("official", (0.0, 0.0)),
        ("only", (0.0, 1.0)),
        ("quick", (0.33, 0.5)),
        ("urgent", (0.0, 0.5)),
    ]
    .into_iter()
    .collect()
});

static INTENSIFIERS: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    [
        ("very", 1.3),
        ("really", 1.2),
        ("extremely", 1.5),
        ("so", 1.2),
        ("incredibly", 1.4),
        ("truly", 1.2),
        ("totally", 1.3),
        ("absolutely", 1.4),
        ("super", 1.3),
    ]
    .into_iter()
    .collect()
});

const NEGATION_FACTOR: f64 = -0.5;
const NEGATION_WINDOW: usize = 2;

fn is_negator(token: &str) -> bool {
    matches!(token, "not" | "never" | "no" | "nothing" | "neither") || token.ends_with("n't")
}

// Averages the polarity and subjectivity of the lexicon words present.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconSentiment;

impl SentimentProvider for LexiconSentiment {
    fn sentiment(&self, text: &str) -> Sentiment {
        let lower = text.to_lowercase();
        let tokens: Vec<&str> = TOKEN_RE.find_iter(&lower).map(|m| m.as_str()).collect();

        let mut polarity_sum = 0.0;
        let mut subjectivity_sum = 0.0;
        let mut scored = 0usize;

        for (i, token) in tokens.iter().enumerate() {
            let Some(&(mut polarity, mut subjectivity)) = WORDS.get(*token) else {
                continue;
            };

            if let Some(factor) = i.checked_sub(1).and_then(|p| INTENSIFIERS.get(tokens[p])) {
                polarity = (polarity * factor).clamp(-1.0, 1.0);
                subjectivity = (subjectivity * factor).clamp(0.0, 1.0);
            }

            let window = &tokens[i.saturating_sub(NEGATION_WINDOW)..i];
            if window.iter().any(|t| is_negator(t)) {
                polarity *= NEGATION_FACTOR;
            }

            polarity_sum += polarity;
            subjectivity_sum += subjectivity;
            scored += 1;
        }

        if scored == 0 {
            return Sentiment::default();
        }
        Sentiment::new(polarity_sum / scored as f64, subjectivity_sum / scored as f64)
    }
}
