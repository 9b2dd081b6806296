mod progress;
mod service;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use progress::SessionProgress;
pub use service::{Advance, QuizSession, SessionPhase};
pub use view::{CurrentQuestionView, FinalResults, QuestionListItem, ReferenceView};
pub use workflow::QuizService;
