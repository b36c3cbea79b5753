use crate::predictor::QuestionPredictor;

/// Longest text the predictor looks at, in characters
pub const MAX_TEXT_CHARS: usize = 500;

/// Score a text must reach to count as a question
pub const DEFAULT_THRESHOLD: f64 = 0.5;

const QUESTION_MARK_WEIGHT: f64 = 0.6;
const LEADING_INTERROGATIVE_WEIGHT: f64 = 0.3;
const REQUEST_PHRASE_WEIGHT: f64 = 0.5;

const INTERROGATIVES: &[&str] = &[
    // Russian
    "как", "что", "где", "когда", "почему", "зачем", "кто", "какой", "какая", "какое", "какие",
    "сколько", "куда", "откуда", "можно", "чем", "ли",
    // English
    "how", "what", "where", "when", "why", "who", "which", "can", "could", "is", "are", "does",
    "do", "should", "would", "will",
];

const REQUEST_PHRASES: &[&str] = &[
    "подскажите",
    "посоветуйте",
    "помогите",
    "кто знает",
    "кто-нибудь",
    "не подскажете",
    "any advice",
    "does anyone",
    "anyone know",
    "please help",
    "recommend",
];

/// Keyword and punctuation based question detector
#[derive(Debug, Clone, PartialEq)]
pub struct HeuristicPredictor {
    threshold: f64,
}

impl Default for HeuristicPredictor {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl HeuristicPredictor {
    /// Creates a predictor with the given threshold
    ///
    /// Returns `None` if the threshold is outside `[0, 1]`.
    pub fn new(threshold: f64) -> Option<Self> {
        (0.0..=1.0).contains(&threshold).then_some(Self { threshold })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Question likelihood of a text in `[0, 1]`
    pub fn score(&self, text: &str) -> f64 {
        let text = truncate_text(text, MAX_TEXT_CHARS).to_lowercase();
        if text.is_empty() {
            return 0.0;
        }

        let mut score = 0.0;

        if text.contains('?') {
            score += QUESTION_MARK_WEIGHT;
        }

        let first_word = text
            .split(|c: char| !c.is_alphanumeric() && c != '-')
            .find(|w| !w.is_empty());
        if first_word.is_some_and(|w| INTERROGATIVES.contains(&w)) {
            score += LEADING_INTERROGATIVE_WEIGHT;
        }

        if REQUEST_PHRASES.iter().any(|phrase| text.contains(phrase)) {
            score += REQUEST_PHRASE_WEIGHT;
        }

        f64::min(score, 1.0)
    }
}

impl QuestionPredictor for HeuristicPredictor {
    fn is_question(&self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }

        let score = self.score(text);
        tracing::trace!(score, "Scored post text");
        score >= self.threshold
    }
}

/// Cuts text to at most `max_chars` characters, preferring a word boundary
///
/// When the cut lands inside a word that ends shortly after, the partial word
/// is dropped.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    let Some((cut, _)) = text.char_indices().nth(max_chars) else {
        return text.trim().to_string();
    };

    let (head, tail) = text.split_at(cut);
    let lookahead: String = tail.chars().take(10).collect();
    let mut truncated = head;

    if lookahead.contains(' ') {
        if let Some(space) = head.rfind(' ') {
            if space > 0 {
                truncated = &head[..space];
            }
        }
    }

    truncated.trim().to_string()
}
