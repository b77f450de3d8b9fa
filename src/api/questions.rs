//! Questions service.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::api::routes::questions as routes;
use crate::api::types::{NewQuestion, Page, QuestionFilters, QuestionUpdate};
use crate::http::{ApiClient, ApiError, RequestDescriptor};

#[derive(Debug, Clone, Copy)]
pub struct QuestionsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> QuestionsApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    async fn listing<Q: DeserializeOwned>(
        &self,
        path: &str,
        filters: &QuestionFilters,
    ) -> Result<Page<Q>, ApiError> {
        self.client
            .request(RequestDescriptor::get(path).query(filters.to_query()))
            .await
    }

    async fn action(&self, id: u64, action: &str) -> Result<Value, ApiError> {
        self.client.post_empty(&routes::action(id, action)).await
    }

    pub async fn list<Q: DeserializeOwned>(&self, filters: &QuestionFilters) -> Result<Page<Q>, ApiError> {
        self.listing(routes::LIST, filters).await
    }

    pub async fn popular<Q: DeserializeOwned>(&self, filters: &QuestionFilters) -> Result<Page<Q>, ApiError> {
        self.listing(routes::POPULAR, filters).await
    }

    pub async fn unanswered<Q: DeserializeOwned>(&self, filters: &QuestionFilters) -> Result<Page<Q>, ApiError> {
        self.listing(routes::UNANSWERED, filters).await
    }

    pub async fn featured<Q: DeserializeOwned>(&self, filters: &QuestionFilters) -> Result<Page<Q>, ApiError> {
        self.listing(routes::FEATURED, filters).await
    }

    pub async fn bounty<Q: DeserializeOwned>(&self, filters: &QuestionFilters) -> Result<Page<Q>, ApiError> {
        self.listing(routes::BOUNTY, filters).await
    }

    pub async fn get<Q: DeserializeOwned>(&self, id: u64) -> Result<Q, ApiError> {
        self.client.get(&routes::detail(id)).await
    }

    pub async fn create<Q: DeserializeOwned>(&self, question: &NewQuestion) -> Result<Q, ApiError> {
        self.client.post(routes::LIST, question).await
    }

    pub async fn update<Q: DeserializeOwned>(&self, id: u64, update: &QuestionUpdate) -> Result<Q, ApiError> {
        self.client.put(&routes::detail(id), update).await
    }

    pub async fn delete(&self, id: u64) -> Result<(), ApiError> {
        self.client.delete::<Value>(&routes::detail(id)).await?;
        Ok(())
    }

    pub async fn vote_up(&self, id: u64) -> Result<Value, ApiError> {
        self.action(id, "vote_up").await
    }

    pub async fn vote_down(&self, id: u64) -> Result<Value, ApiError> {
        self.action(id, "vote_down").await
    }

    pub async fn close(&self, id: u64) -> Result<Value, ApiError> {
        self.action(id, "close").await
    }

    pub async fn reopen(&self, id: u64) -> Result<Value, ApiError> {
        self.action(id, "reopen").await
    }

    /// Staff only.
    pub async fn feature(&self, id: u64) -> Result<Value, ApiError> {
        self.action(id, "feature").await
    }

    /// Staff only.
    pub async fn unfeature(&self, id: u64) -> Result<Value, ApiError> {
        self.action(id, "unfeature").await
    }

    pub async fn increment_views(&self, id: u64) -> Result<Value, ApiError> {
        self.action(id, "increment_views").await
    }
}

impl ApiClient {
    pub fn questions(&self) -> QuestionsApi<'_> {
        QuestionsApi::new(self)
    }
}
