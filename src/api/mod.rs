//! StackIt API services.
//!
//! Thin wrappers that pick the route, encode filters and bodies, and hand the
//! call to [`ApiClient`](crate::http::ApiClient). All resilience lives in the
//! client; services only name endpoints.

pub mod answers;
pub mod auth;
pub mod questions;
pub mod routes;
pub mod types;

pub use answers::AnswersApi;
pub use auth::AuthApi;
pub use questions::QuestionsApi;
pub use types::{
    AnswerFilters, AnswerUpdate, AuthResponse, LoginCredentials, NewAnswer, NewQuestion, Page,
    PasswordChange, PasswordReset, QuestionFilters, QuestionUpdate, RegisterData,
};
