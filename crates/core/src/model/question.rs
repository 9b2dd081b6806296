use serde::Deserialize;
use thiserror::Error;
use url::Url;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("question needs at least two choices, got {0}")]
    TooFewChoices(usize),

    #[error("correct choice {index} is out of range for {choices} choices")]
    CorrectChoiceOutOfRange { index: usize, choices: usize },

    #[error("reference url is invalid: {0}")]
    InvalidReferenceUrl(#[source] url::ParseError),
}

//
// ─── REFERENCE ─────────────────────────────────────────────────────────────────
//

/// External link shown alongside an answered question.
///
/// A reference always carries both a URL and a display text; a record with
/// only one of the two is treated as no reference at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    url: Url,
    text: String,
}

impl Reference {
    /// Build a reference, validating the URL.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::InvalidReferenceUrl` if the URL does not parse.
    pub fn new(url: &str, text: impl Into<String>) -> Result<Self, QuestionError> {
        let url = Url::parse(url).map_err(QuestionError::InvalidReferenceUrl)?;
        Ok(Self {
            url,
            text: text.into(),
        })
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

//
// ─── DRAFTS ────────────────────────────────────────────────────────────────────
//

/// Raw reference record as it appears in the question bank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReferenceDraft {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

impl ReferenceDraft {
    /// Validate into an optional `Reference`.
    ///
    /// A draft missing either field yields `None` rather than an error, so a
    /// half-filled record in the bank degrades to "no reference".
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::InvalidReferenceUrl` if both fields are present
    /// but the URL does not parse.
    pub fn validate(self) -> Result<Option<Reference>, QuestionError> {
        match (self.url, self.text) {
            (Some(url), Some(text)) => Reference::new(&url, text).map(Some),
            _ => Ok(None),
        }
    }
}

/// Raw question record as it appears in the question bank JSON.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDraft {
    pub question: String,
    pub choices: Vec<String>,
    pub correct_answer: usize,
    pub explanation: String,
    #[serde(default)]
    pub reference: Option<ReferenceDraft>,
}

impl QuestionDraft {
    /// Validate the draft into a domain `Question`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the prompt is empty, there are fewer than
    /// two choices, the correct index is out of range, or the reference URL
    /// does not parse.
    pub fn validate(self) -> Result<Question, QuestionError> {
        if self.question.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        if self.choices.len() < 2 {
            return Err(QuestionError::TooFewChoices(self.choices.len()));
        }
        if self.correct_answer >= self.choices.len() {
            return Err(QuestionError::CorrectChoiceOutOfRange {
                index: self.correct_answer,
                choices: self.choices.len(),
            });
        }
        let reference = match self.reference {
            Some(draft) => draft.validate()?,
            None => None,
        };

        Ok(Question {
            prompt: self.question,
            choices: self.choices,
            correct_choice: self.correct_answer,
            explanation: self.explanation,
            reference,
        })
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// One immutable multiple-choice question from the bank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    prompt: String,
    choices: Vec<String>,
    correct_choice: usize,
    explanation: String,
    reference: Option<Reference>,
}

impl Question {
    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    #[must_use]
    pub fn choice_count(&self) -> usize {
        self.choices.len()
    }

    /// 0-based index of the correct choice, always within bounds.
    #[must_use]
    pub fn correct_choice(&self) -> usize {
        self.correct_choice
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn reference(&self) -> Option<&Reference> {
        self.reference.as_ref()
    }

    #[must_use]
    pub fn is_correct(&self, choice: usize) -> bool {
        choice == self.correct_choice
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
