//! The quiz session engine: picks an unused word, builds a multiple-choice
//! question from its catalog configuration, records answers and keeps the
//! score and coverage for one run.

use std::sync::Arc;

use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;

use crate::quiz::catalog::WordCatalog;
use crate::quiz::{Feedback, Question, QuizMode, Score, SessionState};

/// Extra attempts on top of the catalog size before generation gives up on
/// finding a word with a usable configuration.
const GENERATION_RETRY_SLACK: usize = 16;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum QuizError {
    #[error("the word catalog has no entries")]
    CatalogEmpty,
    #[error("no word in the catalog supports the {0} game")]
    ConfigurationMissing(QuizMode),
    #[error("invalid operation: {0}")]
    InvalidTransition(&'static str),
}

pub struct QuizSession<R> {
    catalog: Arc<WordCatalog>,
    rng: R,
    state: SessionState,
}

impl QuizSession<StdRng> {
    pub fn new(catalog: Arc<WordCatalog>) -> Self {
        Self::with_rng(catalog, StdRng::from_entropy())
    }

    /// Rebuilds a session around state carried over from a previous update.
    pub fn resume(catalog: Arc<WordCatalog>, state: SessionState) -> Self {
        Self {
            catalog,
            rng: StdRng::from_entropy(),
            state,
        }
    }
}

impl<R: Rng> QuizSession<R> {
    pub fn with_rng(catalog: Arc<WordCatalog>, rng: R) -> Self {
        Self {
            catalog,
            rng,
            state: SessionState::default(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Hands the state back for the caller to store.
    pub fn into_state(self) -> SessionState {
        self.state
    }

    pub fn score(&self) -> Score {
        self.state.score
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.state.current_question.as_ref()
    }

    pub fn feedback(&self) -> Option<&Feedback> {
        self.state.feedback.as_ref()
    }

    /// Words asked so far in this run vs. the catalog size.
    pub fn coverage(&self) -> (usize, usize) {
        (self.state.used_words.len(), self.catalog.len())
    }

    /// Starts a fresh run of `mode`: zeroes the score, clears coverage and
    /// produces the first question. The session stays in the menu if no
    /// question can be generated.
    pub fn start_game(&mut self, mode: QuizMode) -> Result<&Question, QuizError> {
        self.state = SessionState::default();
        let question = self.generate_question(mode)?;
        self.state.mode = Some(mode);
        Ok(self.state.current_question.insert(question))
    }

    /// Scores `answer` against the pending question and records feedback.
    /// The focus word counts as used from here on, whether or not the
    /// answer was right.
    pub fn submit_answer(&mut self, answer: &str) -> Result<&Feedback, QuizError> {
        if self.state.feedback.is_some() {
            return Err(QuizError::InvalidTransition(
                "the current question was already answered",
            ));
        }
        let (focus_word, correct_answer, explanation) = match &self.state.current_question {
            Some(question) => (
                question.focus_word.clone(),
                question.correct_answer.clone(),
                question.explanation.clone(),
            ),
            None => return Err(QuizError::InvalidTransition("no question is pending")),
        };

        let is_correct = answer == correct_answer;
        self.state.used_words.insert(focus_word);
        self.state.score.total += 1;
        if is_correct {
            self.state.score.correct += 1;
        }

        let feedback = Feedback {
            is_correct,
            explanation,
            selected_answer: answer.to_string(),
            correct_answer,
        };
        Ok(self.state.feedback.insert(feedback))
    }

    /// Clears the feedback and generates the next question in the same mode.
    pub fn next_question(&mut self) -> Result<&Question, QuizError> {
        if self.state.feedback.is_none() {
            return Err(QuizError::InvalidTransition(
                "answer the current question first",
            ));
        }
        let mode = match self.state.mode {
            Some(mode) => mode,
            None => return Err(QuizError::InvalidTransition("no game is running")),
        };

        let question = self.generate_question(mode)?;
        self.state.feedback = None;
        Ok(self.state.current_question.insert(question))
    }

    pub fn back_to_menu(&mut self) {
        self.state = SessionState::default();
    }

    /// Draws a random unused word and builds a question of the requested
    /// type from its configuration. A word without the needed configuration
    /// is skipped without being marked used, so it stays a candidate; the
    /// number of draws is capped so a catalog with no usable word reports
    /// an error instead of looping.
    fn generate_question(&mut self, mode: QuizMode) -> Result<Question, QuizError> {
        let catalog = Arc::clone(&self.catalog);
        let words = catalog.words();
        if words.is_empty() {
            return Err(QuizError::CatalogEmpty);
        }

        let max_attempts = words.len() + GENERATION_RETRY_SLACK;
        for _ in 0..max_attempts {
            let mut available: Vec<&String> = words
                .iter()
                .filter(|word| !self.state.used_words.contains(word.as_str()))
                .collect();
            if available.is_empty() {
                debug!("All {} words used, starting coverage over", words.len());
                self.state.used_words.clear();
                available = words.iter().collect();
            }

            let word = available[self.rng.gen_range(0..available.len())];
            let Some(entry) = catalog.lookup(word) else {
                continue;
            };

            let question = match mode {
                QuizMode::Synonyms => {
                    // Half the questions in this mode ask for the antonym instead.
                    let ask_antonym = self.rng.gen_bool(0.5);
                    let config = if ask_antonym {
                        entry.antonyms.as_ref()
                    } else {
                        entry.synonyms.as_ref()
                    };
                    let Some(config) = config else { continue };
                    let relation = if ask_antonym { "antonym" } else { "synonym" };
                    Question {
                        mode,
                        focus_word: word.clone(),
                        text: format!("What is a {} for \"{}\"?", relation, word),
                        options: shuffle_options(&mut self.rng, &config.choices),
                        correct_answer: config.correct.clone(),
                        explanation: format!(
                            "\"{}\" is a {} of \"{}\".",
                            config.correct, relation, word
                        ),
                    }
                }
                QuizMode::OddOneOut => {
                    let Some(config) = entry.odd_one_out.as_ref() else {
                        continue;
                    };
                    Question {
                        mode,
                        focus_word: word.clone(),
                        text: "Which word does NOT belong with the others?".to_string(),
                        options: shuffle_options(&mut self.rng, &config.choices),
                        correct_answer: config.correct.clone(),
                        explanation: format!(
                            "\"{}\" has the opposite meaning to the other words.",
                            config.correct
                        ),
                    }
                }
                QuizMode::Analogies => {
                    let Some(config) = entry.analogies.as_ref() else {
                        continue;
                    };
                    Question {
                        mode,
                        focus_word: word.clone(),
                        text: format!(
                            "{} is to {} as {} is to ___",
                            config.first, config.second, word
                        ),
                        options: shuffle_options(&mut self.rng, &config.choices),
                        correct_answer: config.correct.clone(),
                        explanation: format!(
                            "{} and {} are {}s, just as {} and {} are {}s.",
                            config.first,
                            config.second,
                            config.relation,
                            word,
                            config.correct,
                            config.relation
                        ),
                    }
                }
            };
            return Ok(question);
        }

        Err(QuizError::ConfigurationMissing(mode))
    }
}

/// Uniform permutation of the configured choices; the catalog's copy is
/// never touched.
fn shuffle_options<R: Rng>(rng: &mut R, choices: &[String]) -> Vec<String> {
    let mut options = choices.to_vec();
    options.shuffle(rng);
    options
}
