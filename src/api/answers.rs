//! Answers service.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::api::routes::answers as routes;
use crate::api::types::{AnswerFilters, AnswerUpdate, NewAnswer};
use crate::http::{ApiClient, ApiError, RequestDescriptor};

#[derive(Debug, Clone, Copy)]
pub struct AnswersApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AnswersApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    async fn listing<A: DeserializeOwned>(&self, path: &str, filters: &AnswerFilters) -> Result<Vec<A>, ApiError> {
        self.client
            .request(RequestDescriptor::get(path).query(filters.to_query()))
            .await
    }

    async fn action(&self, id: u64, action: &str) -> Result<Value, ApiError> {
        self.client.post_empty(&routes::action(id, action)).await
    }

    /// `GET /answers/?question=<id>&...`
    pub async fn list<A: DeserializeOwned>(&self, filters: &AnswerFilters) -> Result<Vec<A>, ApiError> {
        self.listing(routes::LIST, filters).await
    }

    pub async fn accepted<A: DeserializeOwned>(&self, filters: &AnswerFilters) -> Result<Vec<A>, ApiError> {
        self.listing(routes::ACCEPTED, filters).await
    }

    pub async fn highly_voted<A: DeserializeOwned>(&self, filters: &AnswerFilters) -> Result<Vec<A>, ApiError> {
        self.listing(routes::HIGHLY_VOTED, filters).await
    }

    pub async fn get<A: DeserializeOwned>(&self, id: u64) -> Result<A, ApiError> {
        self.client.get(&routes::detail(id)).await
    }

    pub async fn create<A: DeserializeOwned>(&self, answer: &NewAnswer) -> Result<A, ApiError> {
        self.client.post(routes::LIST, answer).await
    }

    pub async fn update<A: DeserializeOwned>(&self, id: u64, update: &AnswerUpdate) -> Result<A, ApiError> {
        self.client.put(&routes::detail(id), update).await
    }

    pub async fn delete(&self, id: u64) -> Result<(), ApiError> {
        self.client.delete::<Value>(&routes::detail(id)).await?;
        Ok(())
    }

    pub async fn accept(&self, id: u64) -> Result<Value, ApiError> {
        self.action(id, "accept").await
    }

    pub async fn unaccept(&self, id: u64) -> Result<Value, ApiError> {
        self.action(id, "unaccept").await
    }

    pub async fn vote_up(&self, id: u64) -> Result<Value, ApiError> {
        self.action(id, "vote_up").await
    }

    pub async fn vote_down(&self, id: u64) -> Result<Value, ApiError> {
        self.action(id, "vote_down").await
    }
}

impl ApiClient {
    pub fn answers(&self) -> AnswersApi<'_> {
        AnswersApi::new(self)
    }
}
