//! Textual codec for store values.
//!
//! Every store value is a single JSON string: the four session arrays under
//! their logical keys and the high score under `quizHighScore`. JSON keeps
//! the `null` vs index distinction in the selected-answers array intact.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::repository::StorageError;

pub const KEY_ANSWERED: &str = "answeredQuestions";
pub const KEY_EXPLANATIONS: &str = "explanationsShown";
pub const KEY_SELECTED: &str = "selectedAnswers";
pub const KEY_MARKED: &str = "markedForReview";
pub const KEY_HIGH_SCORE: &str = "quizHighScore";

/// Encode a store value to its JSON text form.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if the value cannot be encoded.
pub fn encode<T: Serialize>(value: &T) -> Result<String, StorageError> {
    serde_json::to_string(value).map_err(|err| StorageError::Serialization(err.to_string()))
}

/// Decode a store value, treating any parse failure as "absent".
///
/// Stored state is untrusted: a corrupt value must fall back to defaults,
/// never fail initialization.
#[must_use]
pub fn decode<T: DeserializeOwned>(raw: &str) -> Option<T> {
    serde_json::from_str(raw).ok()
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selected_answers_round_trip_preserves_null() {
        let selected = vec![None, Some(2_usize), None, Some(0)];
        let raw = encode(&selected).unwrap();
        assert_eq!(raw, "[null,2,null,0]");

        let back: Vec<Option<usize>> = decode(&raw).unwrap();
        assert_eq!(back, selected);
    }

    #[test]
    fn bool_arrays_round_trip() {
        let marks = vec![true, false, true];
        let raw = encode(&marks).unwrap();
        let back: Vec<bool> = decode(&raw).unwrap();
        assert_eq!(back, marks);
    }

    #[test]
    fn garbage_decodes_to_absent() {
        assert_eq!(decode::<Vec<bool>>("not json"), None);
        assert_eq!(decode::<Vec<bool>>("{\"wrong\": \"shape\"}"), None);
        assert_eq!(decode::<Vec<Option<usize>>>("[true, false]"), None);
    }

    #[test]
    fn high_score_round_trips_as_integer() {
        let raw = encode(&7_u32).unwrap();
        assert_eq!(raw, "7");
        assert_eq!(decode::<u32>(&raw), Some(7));
        assert_eq!(decode::<u32>("-3"), None);
    }
}
