use crate::libpctech::question::{CatalogError, Question, OPTION_COUNT};
use crate::libpctech::shuffle::shuffle_with;
use log::{debug, info};
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizConfig {
    pub question_count: usize,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self { question_count: 10 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizState {
    NotStarted,
    InProgress { index: usize, score: usize },
    Finished { score: usize },
}

/// A question as shown to the player: options in display order and the
/// display index of the right one.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayedQuestion {
    pub prompt: String,
    pub options: Vec<String>,
    pub correct: usize,
    pub counter_label: String,
    /// Fraction of the session already behind the player, in `[0, 1)`.
    pub progress: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionMark {
    Plain,
    Correct,
    Wrong,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    pub correct: bool,
    pub chosen: usize,
    pub correct_index: usize,
    pub message: String,
}

impl Feedback {
    pub fn mark(&self, option: usize) -> OptionMark {
        if option == self.correct_index {
            OptionMark::Correct
        } else if option == self.chosen {
            OptionMark::Wrong
        } else {
            OptionMark::Plain
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Expert,
    WellDone,
    NotBad,
    KeepLearning,
}

impl Tier {
    pub fn from_ratio(ratio: f64) -> Tier {
        if ratio >= 0.9 {
            Tier::Expert
        } else if ratio >= 0.7 {
            Tier::WellDone
        } else if ratio >= 0.5 {
            Tier::NotBad
        } else {
            Tier::KeepLearning
        }
    }

    pub fn headline(&self) -> &'static str {
        match self {
            Tier::Expert => "🏆 PC Expert!",
            Tier::WellDone => "💪 Well Done!",
            Tier::NotBad => "📚 Not Bad!",
            Tier::KeepLearning => "🔧 Keep Learning!",
        }
    }

    pub fn sub_message(&self) -> &'static str {
        match self {
            Tier::Expert => "Great job! You really know your PC hardware 😎",
            Tier::WellDone => "Nice! A little more study and you'll be an expert 👌",
            Tier::NotBad => "Not bad at all! Have another look at the knowledge base 😊",
            Tier::KeepLearning => "Don't give up! Everything is covered on this site 💪",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuizResult {
    pub score: usize,
    pub size: usize,
    pub tier: Tier,
}

impl QuizResult {
    pub fn score_label(&self) -> String {
        format!("{}/{}", self.score, self.size)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Question(DisplayedQuestion),
    Finished(QuizResult),
}

#[derive(Debug)]
pub struct Quiz {
    catalog: Vec<Question>,
    config: QuizConfig,
    pool: Vec<Question>,
    state: QuizState,
    answered: bool,
    scored: Option<usize>,
    displayed: Option<DisplayedQuestion>,
}

impl Quiz {
    pub fn new(catalog: Vec<Question>, config: QuizConfig) -> Result<Self, CatalogError> {
        for (index, question) in catalog.iter().enumerate() {
            question.validate(index)?;
        }
        Ok(Self {
            catalog,
            config,
            pool: Vec::new(),
            state: QuizState::NotStarted,
            answered: false,
            scored: None,
            displayed: None,
        })
    }

    pub fn state(&self) -> QuizState {
        self.state
    }

    pub fn pool(&self) -> &[Question] {
        &self.pool
    }

    /// Number of questions in the current session.
    pub fn size(&self) -> usize {
        self.config.question_count.min(self.catalog.len())
    }

    pub fn is_answered(&self) -> bool {
        self.answered
    }

    pub fn next_enabled(&self) -> bool {
        self.answered && matches!(self.state, QuizState::InProgress { .. })
    }

    pub fn current(&self) -> Option<&DisplayedQuestion> {
        self.displayed.as_ref()
    }

    pub fn start<R: Rng>(&mut self, rng: &mut R) -> Step {
        let size = self.size();
        let mut pool = shuffle_with(&self.catalog, rng);
        pool.truncate(size);
        self.pool = pool;
        self.scored = None;
        info!("[Quiz] Started a session of {} questions.", size);

        if size == 0 {
            self.displayed = None;
            self.state = QuizState::Finished { score: 0 };
            return Step::Finished(self.result(0));
        }
        self.state = QuizState::InProgress { index: 0, score: 0 };
        Step::Question(self.show(0, rng))
    }

    pub fn restart<R: Rng>(&mut self, rng: &mut R) -> Step {
        debug!("[Quiz] Restarting.");
        self.start(rng)
    }

    /// Shuffles the current question's options and clears its feedback. The
    /// permutation is recomputed on every call. A question that was already
    /// answered can be answered again but only its first answer is scored.
    pub fn present_question<R: Rng>(&mut self, rng: &mut R) -> Option<DisplayedQuestion> {
        match self.state {
            QuizState::InProgress { index, .. } => Some(self.show(index, rng)),
            _ => None,
        }
    }

    fn show<R: Rng>(&mut self, index: usize, rng: &mut R) -> DisplayedQuestion {
        let question = &self.pool[index];
        let order = shuffle_with(&(0..OPTION_COUNT).collect::<Vec<_>>(), rng);
        let correct = order
            .iter()
            .position(|&orig| orig == question.answer)
            .unwrap_or_default();
        let size = self.size();

        let displayed = DisplayedQuestion {
            prompt: question.prompt.clone(),
            options: order.iter().map(|&i| question.options[i].clone()).collect(),
            correct,
            counter_label: format!("Question {} / {}", index + 1, size),
            progress: index as f64 / size as f64,
        };
        self.answered = false;
        self.displayed = Some(displayed.clone());
        displayed
    }

    /// Returns `None` when there is nothing to answer: no question on screen,
    /// the question was already answered, or `selected` is not an option.
    pub fn submit_answer(&mut self, selected: usize) -> Option<Feedback> {
        let (index, score) = match self.state {
            QuizState::InProgress { index, score } => (index, score),
            _ => return None,
        };
        if self.answered {
            debug!("[Quiz] Ignoring repeated answer for question {}.", index + 1);
            return None;
        }
        let displayed = self.displayed.as_ref()?;
        if selected >= displayed.options.len() {
            return None;
        }

        self.answered = true;
        let correct = selected == displayed.correct;
        let first_answer = self.scored != Some(index);
        self.scored = Some(index);
        let explanation = &self.pool[index].explanation;
        let message = if correct {
            if first_answer {
                self.state = QuizState::InProgress {
                    index,
                    score: score + 1,
                };
            }
            format!("🎉 Correct! {}", explanation)
        } else {
            format!("❌ Not quite! {}", explanation)
        };
        debug!(
            "[Quiz] Question {} answered {}.",
            index + 1,
            if correct { "correctly" } else { "incorrectly" }
        );

        Some(Feedback {
            correct,
            chosen: selected,
            correct_index: displayed.correct,
            message,
        })
    }

    /// Moves past an answered question. Returns `None` while the "next"
    /// affordance is disabled.
    pub fn advance<R: Rng>(&mut self, rng: &mut R) -> Option<Step> {
        if !self.next_enabled() {
            return None;
        }
        let (index, score) = match self.state {
            QuizState::InProgress { index, score } => (index + 1, score),
            _ => return None,
        };

        if index >= self.size() {
            self.state = QuizState::Finished { score };
            self.displayed = None;
            let result = self.result(score);
            info!(
                "[Quiz] Finished with {} ({:?}).",
                result.score_label(),
                result.tier
            );
            return Some(Step::Finished(result));
        }
        self.state = QuizState::InProgress { index, score };
        Some(Step::Question(self.show(index, rng)))
    }

    fn result(&self, score: usize) -> QuizResult {
        let size = self.size();
        let ratio = if size == 0 {
            0.0
        } else {
            score as f64 / size as f64
        };
        QuizResult {
            score,
            size,
            tier: Tier::from_ratio(ratio),
        }
    }
}
