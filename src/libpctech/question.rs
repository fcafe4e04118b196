use log::debug;
use serde::Deserialize;
use thiserror::Error;

pub const OPTION_COUNT: usize = 4;

const QUESTION_BANK: &str = include_str!("../../data/questions.json");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("malformed question bank: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("question {index} has {found} options, expected {}", OPTION_COUNT)]
    WrongOptionCount { index: usize, found: usize },
    #[error("question {index} points at answer {answer}, which does not exist")]
    AnswerOutOfRange { index: usize, answer: usize },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Question {
    #[serde(rename = "q")]
    pub prompt: String,
    #[serde(rename = "opts")]
    pub options: Vec<String>,
    #[serde(rename = "ans")]
    pub answer: usize,
    #[serde(rename = "exp")]
    pub explanation: String,
}

impl Question {
    pub fn correct_option(&self) -> &str {
        &self.options[self.answer]
    }

    /// Checks the shape every consumer relies on. `index` is only used in
    /// the error.
    pub fn validate(&self, index: usize) -> Result<(), CatalogError> {
        if self.options.len() != OPTION_COUNT {
            return Err(CatalogError::WrongOptionCount {
                index,
                found: self.options.len(),
            });
        }
        if self.answer >= OPTION_COUNT {
            return Err(CatalogError::AnswerOutOfRange {
                index,
                answer: self.answer,
            });
        }
        Ok(())
    }
}

/// The built-in question bank.
pub fn catalog() -> Result<Vec<Question>, CatalogError> {
    parse_catalog(QUESTION_BANK)
}

pub fn parse_catalog(json: &str) -> Result<Vec<Question>, CatalogError> {
    let questions: Vec<Question> = serde_json::from_str(json)?;
    for (index, question) in questions.iter().enumerate() {
        question.validate(index)?;
    }
    debug!("[Setup] Loaded {} questions.", questions.len());
    Ok(questions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_is_valid() {
        let questions = catalog().unwrap();
        assert_eq!(questions.len(), 20);
        for q in &questions {
            assert_eq!(q.options.len(), OPTION_COUNT);
            assert!(!q.explanation.is_empty());
        }
    }

    #[test]
    fn prompts_are_unique() {
        let questions = catalog().unwrap();
        let mut prompts: Vec<&str> = questions.iter().map(|q| q.prompt.as_str()).collect();
        prompts.sort();
        prompts.dedup();
        assert_eq!(prompts.len(), questions.len());
    }

    #[test]
    fn rejects_bad_option_count() {
        let json = r#"[{"q": "?", "opts": ["a", "b"], "ans": 0, "exp": "."}]"#;
        assert!(matches!(
            parse_catalog(json),
            Err(CatalogError::WrongOptionCount { index: 0, found: 2 })
        ));
    }

    #[test]
    fn rejects_answer_out_of_range() {
        let json = r#"[{"q": "?", "opts": ["a", "b", "c", "d"], "ans": 4, "exp": "."}]"#;
        assert!(matches!(
            parse_catalog(json),
            Err(CatalogError::AnswerOutOfRange { index: 0, answer: 4 })
        ));
    }
}
