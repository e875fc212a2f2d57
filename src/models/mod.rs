pub mod session;
pub mod survey;

pub use session::{Session, SurveyAnswers, SurveyState};
