mod question;
mod score;
mod state;

pub use question::{Question, QuestionDraft, QuestionError, Reference, ReferenceDraft};
pub use score::ScoreSummary;
pub use state::{QuestionState, QuestionStateError};
