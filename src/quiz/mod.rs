pub mod catalog;
pub mod engine;

use std::collections::HashSet;

/// The question category a session is currently playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum QuizMode {
    Synonyms,
    OddOneOut,
    Analogies,
}

impl std::fmt::Display for QuizMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            QuizMode::Synonyms => "synonyms",
            QuizMode::OddOneOut => "odd one out",
            QuizMode::Analogies => "analogies",
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Score {
    pub correct: u32,
    pub total: u32,
}

impl Score {
    pub fn accuracy_percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.correct as f64 / self.total as f64) * 100.0).round() as u32
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Question {
    pub mode: QuizMode,
    pub focus_word: String,
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Feedback {
    pub is_correct: bool,
    pub explanation: String,
    pub selected_answer: String,
    pub correct_answer: String,
}

/// Everything one quiz run owns. Serializable so the bot can park it in
/// dialogue storage between Telegram updates.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct SessionState {
    /// `None` means no game is running (the menu).
    pub mode: Option<QuizMode>,
    /// Words already asked in the current run; cleared once every catalog
    /// word has been used.
    pub used_words: HashSet<String>,
    pub score: Score,
    pub current_question: Option<Question>,
    /// Present only between an answer and the next question.
    pub feedback: Option<Feedback>,
}
