#![forbid(unsafe_code)]

pub mod bank;
pub mod error;
pub mod sessions;

pub use error::{BankError, SessionError};

pub use sessions::{
    Advance, CurrentQuestionView, FinalResults, QuestionListItem, QuizService, QuizSession,
    ReferenceView, SessionPhase, SessionProgress,
};
