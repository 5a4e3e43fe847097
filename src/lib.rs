use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub mod error;
pub mod sentiment;
pub mod server;

pub use error::{AnalysisError, LexiconError, ServerError};
pub use sentiment::{LexiconSentiment, Sentiment, SentimentProvider};

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DetectionResult {
    pub total_count: usize,
    pub by_category: BTreeMap<String, usize>,
    pub words_found: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Joy,
    Fear,
    Anger,
    Trust,
}

impl Emotion {
    pub const ALL: [Emotion; 4] = [Emotion::Joy, Emotion::Fear, Emotion::Anger, Emotion::Trust];

    pub fn as_str(self) -> &'static str {
        match self {
            Emotion::Joy => "joy",
            Emotion::Fear => "fear",
            Emotion::Anger => "anger",
            Emotion::Trust => "trust",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.as_str() == name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EmotionScores {
    pub joy: f64,
    pub fear: f64,
    pub anger: f64,
    pub trust: f64,
}

impl EmotionScores {
    pub fn get(&self, emotion: Emotion) -> f64 {
        match emotion {
            Emotion::Joy => self.joy,
            Emotion::Fear => self.fear,
            Emotion::Anger => self.anger,
            Emotion::Trust => self.trust,
        }
    }

    fn get_mut(&mut self, emotion: Emotion) -> &mut f64 {
        match emotion {
            Emotion::Joy => &mut self.joy,
            Emotion::Fear => &mut self.fear,
            Emotion::Anger => &mut self.anger,
            Emotion::Trust => &mut self.trust,
        }
    }

    pub fn total(&self) -> f64 {
        self.joy + self.fear + self.anger + self.trust
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordSummary {
    pub count: usize,
    pub by_category: BTreeMap<String, usize>,
    pub words_found: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub persuasion_score: u32,
    pub persuasion_label: String,
    pub ethical_score: u32,
    pub ethical_reflection: String,
    pub sentiment: Sentiment,
    pub emotions: EmotionScores,
    pub persuasive_keywords: KeywordSummary,
    pub highlighted_text: String,
    pub original_text: String,
}

// ---------------------------------------------------------------------------
// Hyperparameters
// ---------------------------------------------------------------------------

struct Hyperparameters {
    min_input_chars: usize,
    words_found_limit: usize,
    keyword_weight: usize,
    keyword_cap: usize,
    polarity_weight: f64,
    subjectivity_weight: f64,
    score_max: f64,
    polarity_boost_threshold: f64,
    positive_joy_boost: f64,
    positive_trust_boost: f64,
    negative_anger_boost: f64,
    negative_fear_boost: f64,
    ethical_base: f64,
    fear_anger_penalty: f64,
    keyword_penalty: f64,
    peak_persuasion_threshold: u32,
    peak_persuasion_penalty: f64,
    label_barely_max: u32,
    label_gentle_max: u32,
    label_moderate_max: u32,
    label_strong_max: u32,
    reflection_deceit_below: u32,
    reflection_tightrope_below: u32,
    reflection_balanced_below: u32,
}

static HP: Hyperparameters = Hyperparameters {
    min_input_chars: 10,
    words_found_limit: 10,
    keyword_weight: 8,
    keyword_cap: 50,
    polarity_weight: 25.0,
    subjectivity_weight: 25.0,
    score_max: 100.0,
    polarity_boost_threshold: 0.3,
    positive_joy_boost: 3.0,
    positive_trust_boost: 2.0,
    negative_anger_boost: 3.0,
    negative_fear_boost: 2.0,
    ethical_base: 100.0,
    fear_anger_penalty: 0.3,
    keyword_penalty: 2.0,
    peak_persuasion_threshold: 80,
    peak_persuasion_penalty: 15.0,
    label_barely_max: 20,
    label_gentle_max: 40,
    label_moderate_max: 60,
    label_strong_max: 80,
    reflection_deceit_below: 40,
    reflection_tightrope_below: 60,
    reflection_balanced_below: 80,
};

// ---------------------------------------------------------------------------
// Lexicon
// ---------------------------------------------------------------------------

const PERSUASION_TABLE: &[(&str, &[&str])] = &[
    (
        "urgency",
        &[
            "now", "today", "limited", "hurry", "fast", "quick", "immediate", "urgent",
            "deadline", "expires",
        ],
    ),
    (
        "scarcity",
        &[
            "exclusive", "limited", "rare", "unique", "only", "last chance", "running out",
            "few left", "scarce",
        ],
    ),
    (
        "authority",
        &[
            "proven", "certified", "expert", "professional", "guaranteed", "official",
            "approved", "trusted", "verified",
        ],
    ),
    (
        "emotional",
        &[
            "amazing", "incredible", "revolutionary", "breakthrough", "stunning", "shocking",
            "unbelievable", "must-have",
        ],
    ),
    (
        "fear",
        &[
            "risk", "danger", "warning", "threat", "lose", "missing out", "regret", "avoid",
            "prevent", "protect",
        ],
    ),
    (
        "social_proof",
        &[
            "popular", "trending", "everyone", "millions", "bestselling", "top-rated",
            "recommended", "favorite",
        ],
    ),
];

const EMOTION_TABLE: &[(&str, &[&str])] = &[
    (
        "joy",
        &[
            "happy", "love", "great", "wonderful", "excellent", "amazing", "fantastic", "joy",
            "delight", "pleasure",
        ],
    ),
    (
        "fear",
        &[
            "afraid", "scary", "danger", "risk", "threat", "warning", "worried", "anxious",
            "panic", "terror",
        ],
    ),
    (
        "anger",
        &[
            "angry", "hate", "furious", "outrage", "disgust", "terrible", "awful", "worst",
            "horrible", "enraged",
        ],
    ),
    (
        "trust",
        &[
            "trust", "honest", "reliable", "genuine", "authentic", "sincere", "true",
            "verified", "proven", "guaranteed",
        ],
    ),
];

fn term_pattern(term: &str, any_case: bool) -> Result<Regex, regex::Error> {
    let flags = if any_case { "(?i)" } else { "" };
    Regex::new(&format!(r"{flags}\b{}\b", regex::escape(term)))
}

// `pattern` runs on lower-cased text, `any_case` on the original text.
#[derive(Debug, Clone)]
struct Term {
    text: String,
    pattern: Regex,
    any_case: Regex,
}

impl Term {
    fn compile(category: &str, raw: &str) -> Result<Self, LexiconError> {
        let text = raw.trim().to_lowercase();
        if text.is_empty() {
            return Err(LexiconError::EmptyTerm(category.to_string()));
        }
        let compile = |any_case| {
            term_pattern(&text, any_case).map_err(|source| LexiconError::Pattern {
                term: text.clone(),
                source,
            })
        };
        let pattern = compile(false)?;
        let any_case = compile(true)?;
        Ok(Self {
            text,
            pattern,
            any_case,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Category {
    name: String,
    terms: Vec<Term>,
}

impl Category {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(|t| t.text.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct CategorySource {
    category: String,
    terms: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct LexiconSource {
    persuasion: Vec<CategorySource>,
    emotion: Vec<CategorySource>,
}

#[derive(Debug, Clone)]
pub struct Lexicon {
    persuasion: Vec<Category>,
    emotion: Vec<(Emotion, Vec<Term>)>,
}

static BUILTIN_LEXICON: Lazy<Lexicon> = Lazy::new(|| {
    let to_source = |table: &[(&str, &[&str])]| {
        table
            .iter()
            .map(|(name, terms)| CategorySource {
                category: name.to_string(),
                terms: terms.iter().map(|t| t.to_string()).collect(),
            })
            .collect::<Vec<_>>()
    };
    Lexicon::from_source(LexiconSource {
        persuasion: to_source(PERSUASION_TABLE),
        emotion: to_source(EMOTION_TABLE),
    })
    .unwrap()
});

impl Lexicon {
    pub fn builtin() -> Self {
        BUILTIN_LEXICON.clone()
    }

    pub fn from_json_str(json: &str) -> Result<Self, LexiconError> {
        Self::from_source(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LexiconError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| LexiconError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    fn from_source(source: LexiconSource) -> Result<Self, LexiconError> {
        if source.persuasion.is_empty() {
            return Err(LexiconError::NoPersuasionCategories);
        }

        let mut persuasion: Vec<Category> = Vec::new();
        for cat in source.persuasion {
            let terms = cat
                .terms
                .iter()
                .map(|t| Term::compile(&cat.category, t))
                .collect::<Result<Vec<_>, _>>()?;
            match persuasion.iter().position(|c| c.name == cat.category) {
                Some(i) => persuasion[i].terms.extend(terms),
                None => persuasion.push(Category {
                    name: cat.category,
                    terms,
                }),
            }
        }

        let mut emotion: Vec<(Emotion, Vec<Term>)> =
            Emotion::ALL.into_iter().map(|e| (e, Vec::new())).collect();
        let mut seen = HashSet::new();
        for cat in source.emotion {
            let Some(e) = Emotion::from_name(&cat.category) else {
                return Err(LexiconError::UnknownEmotion(cat.category));
            };
            seen.insert(e);
            for t in &cat.terms {
                let term = Term::compile(&cat.category, t)?;
                if let Some((_, terms)) = emotion.iter_mut().find(|(k, _)| *k == e) {
                    terms.push(term);
                }
            }
        }
        if let Some(missing) = Emotion::ALL.into_iter().find(|e| !seen.contains(e)) {
            return Err(LexiconError::MissingEmotion(missing.as_str()));
        }

        Ok(Self {
            persuasion,
            emotion,
        })
    }

    pub fn persuasion(&self) -> &[Category] {
        &self.persuasion
    }

    pub fn emotion_terms(&self, emotion: Emotion) -> impl Iterator<Item = &str> {
        self.emotion
            .iter()
            .filter(move |(e, _)| *e == emotion)
            .flat_map(|(_, terms)| terms.iter().map(|t| t.text.as_str()))
    }

    fn persuasive_pattern(&self, word: &str) -> Option<&Regex> {
        self.persuasion
            .iter()
            .flat_map(|c| c.terms.iter())
            .find(|t| t.text == word)
            .map(|t| &t.any_case)
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::builtin()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

// Rounds the stored binary value, ties to even: 0.0025 -> 0.003, 0.0055 -> 0.005.
pub(crate) fn round_to(value: f64, places: usize) -> f64 {
    format!("{value:.places$}").parse().unwrap_or(value)
}

fn unique_words(words: &[String], limit: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    words
        .iter()
        .filter(|w| seen.insert(w.as_str()))
        .take(limit)
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Keyword detection
// ---------------------------------------------------------------------------

pub fn detect_persuasive_keywords(lexicon: &Lexicon, text: &str) -> DetectionResult {
    let lower = text.to_lowercase();
    let mut detected = DetectionResult::default();

    for category in &lexicon.persuasion {
        let mut category_count = 0;
        for term in &category.terms {
            for m in term.pattern.find_iter(&lower) {
                category_count += 1;
                detected.words_found.push(m.as_str().to_string());
            }
        }
        *detected.by_category.entry(category.name.clone()).or_insert(0) += category_count;
        detected.total_count += category_count;
    }
    detected
}

// ---------------------------------------------------------------------------
// Emotions
// ---------------------------------------------------------------------------

pub fn analyze_emotions(lexicon: &Lexicon, text: &str, polarity: f64) -> EmotionScores {
    let lower = text.to_lowercase();
    let mut emotions = EmotionScores::default();

    for (emotion, terms) in &lexicon.emotion {
        let hits: usize = terms.iter().map(|t| t.pattern.find_iter(&lower).count()).sum();
        *emotions.get_mut(*emotion) += hits as f64;
    }

    if polarity > HP.polarity_boost_threshold {
        emotions.joy += HP.positive_joy_boost;
        emotions.trust += HP.positive_trust_boost;
    } else if polarity < -HP.polarity_boost_threshold {
        emotions.anger += HP.negative_anger_boost;
        emotions.fear += HP.negative_fear_boost;
    }

    let total = emotions.total();
    if total > 0.0 {
        for emotion in Emotion::ALL {
            let v = emotions.get_mut(emotion);
            *v = round_to(*v / total * 100.0, 1);
        }
    }
    emotions
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

pub fn persuasion_score(detection: &DetectionResult, sentiment: &Sentiment) -> u32 {
    let keyword_score = detection
        .total_count
        .saturating_mul(HP.keyword_weight)
        .min(HP.keyword_cap);
    let emotion_score = sentiment.polarity.abs() * HP.polarity_weight;
    let subjectivity_score = sentiment.subjectivity * HP.subjectivity_weight;

    let total = keyword_score as f64 + emotion_score + subjectivity_score;
    total.round_ties_even().clamp(0.0, HP.score_max) as u32
}

pub fn ethical_score(detection: &DetectionResult, emotions: &EmotionScores, persuasion: u32) -> u32 {
    let mut score = HP.ethical_base;
    score -= (emotions.fear + emotions.anger) * HP.fear_anger_penalty;
    score -= detection.total_count as f64 * HP.keyword_penalty;
    if persuasion > HP.peak_persuasion_threshold {
        score -= HP.peak_persuasion_penalty;
    }
    score.round_ties_even().clamp(0.0, HP.score_max) as u32
}

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

pub fn persuasion_label(score: u32) -> &'static str {
    if score <= HP.label_barely_max {
        "Barely convincing — like a cat selling cucumbers."
    } else if score <= HP.label_gentle_max {
        "Gentle nudge — informative, not insistent."
    } else if score <= HP.label_moderate_max {
        "Moderate persuasion — getting your attention."
    } else if score <= HP.label_strong_max {
        "Strong pitch — the influencer's secret sauce."
    } else {
        "Peak persuasion — your neurons just signed up."
    }
}

// Only `ethical` selects the branch.
pub fn ethical_reflection(ethical: u32, _persuasion: u32, _emotions: &EmotionScores) -> &'static str {
    if ethical < HP.reflection_deceit_below {
        "Persuasion is an art — but when art forgets honesty, it becomes architecture of deceit. This content sways hearts more than minds, weaponizing emotion rather than inviting reason."
    } else if ethical < HP.reflection_tightrope_below {
        "This message walks the tightrope between influence and manipulation. The intent may be pure, but the methods lean on psychological pressure. Consider: what remains when urgency fades?"
    } else if ethical < HP.reflection_balanced_below {
        "A balanced approach to persuasion — using emotion and logic in harmony. The message has clear intent, but respects the reader's autonomy to choose freely."
    } else {
        "This content exemplifies ethical communication: informative, respectful, and transparent. It invites consideration without coercion — persuasion at its most honorable."
    }
}

// ---------------------------------------------------------------------------
// Highlighting
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Span<'a> {
    start: usize,
    end: usize,
    kind: &'a str,
}

fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

fn open_tag(out: &mut String, kind: &str) {
    out.push_str("<span class=\"highlight-");
    out.push_str(kind);
    out.push_str("\">");
}

/// Wrap every persuasive word and emotion term occurrence in
/// `<span class="highlight-<type>">`, HTML-escaping the text between tags.
/// A match that runs past its enclosing one is cut at the enclosing end.
pub fn highlight_text(lexicon: &Lexicon, text: &str, persuasive_words: &[String]) -> String {
    let mut spans: Vec<Span> = Vec::new();

    for word in unique_words(persuasive_words, usize::MAX) {
        let compiled;
        let pattern = match lexicon.persuasive_pattern(&word) {
            Some(p) => p,
            None => match term_pattern(&word, true) {
                Ok(p) => {
                    compiled = p;
                    &compiled
                }
                Err(e) => {
                    tracing::warn!(word = %word, error = %e, "skipping unhighlightable word");
                    continue;
                }
            },
        };
        spans.extend(pattern.find_iter(text).map(|m| Span {
            start: m.start(),
            end: m.end(),
            kind: "persuasive",
        }));
    }

    for (emotion, terms) in &lexicon.emotion {
        for term in terms {
            spans.extend(term.any_case.find_iter(text).map(|m| Span {
                start: m.start(),
                end: m.end(),
                kind: emotion.as_str(),
            }));
        }
    }

    // Outer spans first; stable, so identical spans keep collection order.
    spans.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut out = String::with_capacity(text.len() + spans.len() * 40);
    let mut cursor = 0;
    let mut open: Vec<usize> = Vec::new();

    for span in spans {
        while let Some(&end) = open.last() {
            if end > span.start {
                break;
            }
            push_escaped(&mut out, &text[cursor..end]);
            out.push_str("</span>");
            cursor = end;
            open.pop();
        }
        push_escaped(&mut out, &text[cursor..span.start]);
        cursor = span.start;

        let end = open.last().map_or(span.end, |&outer| span.end.min(outer));
        open_tag(&mut out, span.kind);
        open.push(end);
    }
    while let Some(end) = open.pop() {
        push_escaped(&mut out, &text[cursor..end]);
        out.push_str("</span>");
        cursor = end;
    }
    push_escaped(&mut out, &text[cursor..]);
    out
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct Analyzer {
    lexicon: Arc<Lexicon>,
    sentiment: Arc<dyn SentimentProvider>,
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("persuasion_categories", &self.lexicon.persuasion.len())
            .finish_non_exhaustive()
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(Lexicon::builtin(), LexiconSentiment)
    }
}

impl Analyzer {
    pub fn new(lexicon: Lexicon, sentiment: impl SentimentProvider + 'static) -> Self {
        Self {
            lexicon: Arc::new(lexicon),
            sentiment: Arc::new(sentiment),
        }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn detect(&self, text: &str) -> DetectionResult {
        detect_persuasive_keywords(&self.lexicon, text)
    }

    pub fn emotions(&self, text: &str) -> EmotionScores {
        analyze_emotions(&self.lexicon, text, self.sentiment.sentiment(text).polarity)
    }

    pub fn analyze(&self, text: &str) -> Result<AnalysisResponse, AnalysisError> {
        if text.trim().chars().count() < HP.min_input_chars {
            return Err(AnalysisError::InvalidInput {
                min_chars: HP.min_input_chars,
            });
        }

        let raw = self.sentiment.sentiment(text);
        let sentiment = raw.rounded();

        let detection = self.detect(text);
        let emotions = analyze_emotions(&self.lexicon, text, raw.polarity);

        let persuasion = persuasion_score(&detection, &sentiment);
        let ethical = ethical_score(&detection, &emotions, persuasion);

        tracing::debug!(
            keywords = detection.total_count,
            polarity = sentiment.polarity,
            subjectivity = sentiment.subjectivity,
            persuasion,
            ethical,
            "analysis complete"
        );

        let highlighted_text = highlight_text(&self.lexicon, text, &detection.words_found);

        Ok(AnalysisResponse {
            persuasion_score: persuasion,
            persuasion_label: persuasion_label(persuasion).to_string(),
            ethical_score: ethical,
            ethical_reflection: ethical_reflection(ethical, persuasion, &emotions).to_string(),
            sentiment,
            emotions,
            persuasive_keywords: KeywordSummary {
                count: detection.total_count,
                words_found: unique_words(&detection.words_found, HP.words_found_limit),
                by_category: detection.by_category,
            },
            highlighted_text,
            original_text: text.to_string(),
        })
    }
}

static DEFAULT_ANALYZER: Lazy<Analyzer> = Lazy::new(Analyzer::default);

/// Analyze with the built-in lexicon and sentiment scorer.
pub fn analyze(text: &str) -> Result<AnalysisResponse, AnalysisError> {
    DEFAULT_ANALYZER.analyze(text)
}
