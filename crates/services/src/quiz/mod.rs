mod session;
mod workflow;

// Public API of the quiz subsystem.
pub use crate::error::QuizError;
pub use session::{QuestionReview, QuizGrade, QuizProgress, QuizSession};
pub use workflow::{QuizOutcome, QuizService};
