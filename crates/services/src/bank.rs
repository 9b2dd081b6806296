//! Question bank loading.
//!
//! The bank is an ordered JSON array of question records, loaded once at
//! startup. A load failure halts startup; there is no retry and no partial
//! bank.

use std::fs;
use std::path::Path;

use quiz_core::model::{Question, QuestionDraft};

use crate::error::BankError;

/// Parse a question bank from its JSON text.
///
/// # Errors
///
/// Returns `BankError::Parse` if the document is not a JSON array of question
/// records, or `BankError::Question` naming the first record that fails
/// validation.
pub fn parse_bank(json: &str) -> Result<Vec<Question>, BankError> {
    let drafts: Vec<QuestionDraft> = serde_json::from_str(json)?;
    drafts
        .into_iter()
        .enumerate()
        .map(|(index, draft)| {
            draft
                .validate()
                .map_err(|source| BankError::Question { index, source })
        })
        .collect()
}

/// Read and parse a question bank file.
///
/// # Errors
///
/// Returns `BankError::Io` if the file cannot be read, otherwise propagates
/// `parse_bank` errors.
pub fn load_bank(path: impl AsRef<Path>) -> Result<Vec<Question>, BankError> {
    let raw = fs::read_to_string(path)?;
    parse_bank(&raw)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
