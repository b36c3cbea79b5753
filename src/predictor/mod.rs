//! Question detection for post texts
//!
//! The harvest only collects comments under posts that ask something. The
//! decision is made through [`QuestionPredictor`] so that the run does not
//! care how it is made.

mod heuristic;

pub use heuristic::{truncate_text, HeuristicPredictor, DEFAULT_THRESHOLD, MAX_TEXT_CHARS};

/// Decides whether a post text is a question
pub trait QuestionPredictor {
    fn is_question(&self, text: &str) -> bool;
}

/// Keeps every post, blank ones included
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl QuestionPredictor for AcceptAll {
    fn is_question(&self, _text: &str) -> bool {
        true
    }
}

impl<F> QuestionPredictor for F
where
    F: Fn(&str) -> bool,
{
    fn is_question(&self, text: &str) -> bool {
        self(text)
    }
}
