//! Request-side shapes and response wrappers shared by the API services.
//!
//! Domain payloads (users, questions, answers) stay generic at call sites.

use serde::{Deserialize, Serialize};

use crate::session::AuthTokens;

#[derive(Debug, Clone, Serialize)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterData {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Login/registration result: the user document plus issued tokens.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse<U> {
    pub user: U,
    pub tokens: AuthTokens,
}

#[derive(Debug, Clone, Serialize)]
pub struct PasswordChange {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PasswordReset {
    pub email: String,
}

/// Paginated list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewQuestion {
    pub title: String,
    pub content: String,
    pub tag_names: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct QuestionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_names: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewAnswer {
    pub content: String,
    pub question: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnswerUpdate {
    pub content: String,
}

/// Query filters for question listings. Unset fields are omitted.
#[derive(Debug, Clone, Default)]
pub struct QuestionFilters {
    pub answered: Option<bool>,
    pub popular: Option<bool>,
    pub has_bounty: Option<bool>,
    pub author: Option<u64>,
    /// Each tag id becomes its own `tags=` pair.
    pub tags: Vec<u64>,
    pub is_closed: Option<bool>,
    pub is_featured: Option<bool>,
    pub search: Option<String>,
    pub ordering: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl QuestionFilters {
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = QueryPairs::default();
        query.push("answered", self.answered);
        query.push("popular", self.popular);
        query.push("has_bounty", self.has_bounty);
        query.push("author", self.author);
        for tag in &self.tags {
            query.push("tags", Some(tag));
        }
        query.push("is_closed", self.is_closed);
        query.push("is_featured", self.is_featured);
        query.push("search", self.search.as_deref());
        query.push("ordering", self.ordering.as_deref());
        query.push("page", self.page);
        query.push("page_size", self.page_size);
        query.0
    }
}

/// Query filters for answer listings.
#[derive(Debug, Clone, Default)]
pub struct AnswerFilters {
    pub question: Option<u64>,
    pub author: Option<u64>,
    pub is_accepted: Option<bool>,
    pub ordering: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl AnswerFilters {
    pub fn for_question(question: u64) -> Self {
        Self {
            question: Some(question),
            ..Default::default()
        }
    }

    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = QueryPairs::default();
        query.push("question", self.question);
        query.push("author", self.author);
        query.push("is_accepted", self.is_accepted);
        query.push("ordering", self.ordering.as_deref());
        query.push("page", self.page);
        query.push("page_size", self.page_size);
        query.0
    }
}

#[derive(Default)]
struct QueryPairs(Vec<(String, String)>);

impl QueryPairs {
    fn push<V: ToString>(&mut self, key: &str, value: Option<V>) {
        if let Some(value) = value {
            self.0.push((key.to_string(), value.to_string()));
        }
    }
}
