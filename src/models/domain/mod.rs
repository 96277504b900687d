pub mod category;
pub mod question;
pub mod quiz;
pub mod team;
pub mod user;
pub mod user_answer;

pub use category::{Category, CategoryGroup};
pub use question::Question;
pub use quiz::{Quiz, QuizPart, Topic};
pub use team::Team;
pub use user::User;
pub use user_answer::UserAnswer;
