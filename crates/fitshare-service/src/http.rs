use std::sync::Arc;

use async_trait::async_trait;
use fitshare_core::plan::{MealPlan, MealPlanInput};
use fitshare_core::story::{WorkoutStory, WorkoutStoryInput};
use fitshare_core::{Entity, StaticToken, TokenSource};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::{Client, RequestBuilder, StatusCode};

use crate::{FeedService, ServiceError};

/// Async HTTP client implementation of FeedService.
///
/// `base_url` is the API root, e.g. `http://localhost:8080/api`.
pub struct HttpService {
    base_url: String,
    client: Client,
    token: Arc<dyn TokenSource>,
}

impl HttpService {
    pub fn new(base_url: &str) -> Self {
        Self::with_token_source(base_url, Arc::new(StaticToken::none()))
    }

    pub fn with_token(base_url: &str, token: String) -> Self {
        Self::with_token_source(base_url, Arc::new(StaticToken::new(token)))
    }

    pub fn with_token_source(base_url: &str, token: Arc<dyn TokenSource>) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            base_url,
            client: Client::new(),
            token,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token_source(&self) -> Arc<dyn TokenSource> {
        self.token.clone()
    }

    /// The token is looked up per request, never cached on the client.
    fn with_auth(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.token.token() {
            Some(token) => builder.header("Authorization", format!("Bearer {token}")),
            None => builder,
        }
    }

    /// Check if the backend is reachable.
    /// Health endpoint is NOT authenticated.
    pub async fn health_check(&self) -> Result<(), ServiceError> {
        let resp = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .map_err(|e| ServiceError::Network(format!("connection failed: {e}")))?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(parse_error(resp).await)
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ServiceError> {
        tracing::debug!(path, "GET");
        let builder = self.client.get(format!("{}{path}", self.base_url));
        let resp = self
            .with_auth(builder)
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;
        handle_response(resp).await
    }

    async fn post_json<B: serde::Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ServiceError> {
        tracing::debug!(path, "POST");
        let builder = self
            .client
            .post(format!("{}{path}", self.base_url))
            .json(body);
        let resp = self
            .with_auth(builder)
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;
        handle_response(resp).await
    }

    async fn put_json<B: serde::Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ServiceError> {
        tracing::debug!(path, "PUT");
        let builder = self
            .client
            .put(format!("{}{path}", self.base_url))
            .json(body);
        let resp = self
            .with_auth(builder)
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;
        handle_response(resp).await
    }

    async fn delete_req(&self, path: &str) -> Result<(), ServiceError> {
        tracing::debug!(path, "DELETE");
        let builder = self.client.delete(format!("{}{path}", self.base_url));
        let resp = self
            .with_auth(builder)
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(parse_error(resp).await)
        }
    }
}

fn collection_path<E: Entity>() -> String {
    format!("/{}", E::COLLECTION)
}

/// Bytes escaped in a record id. '.' is escaped so "." and ".." stay ids.
const ID_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'~');

fn record_path<E: Entity>(id: &str) -> String {
    format!("/{}/{}", E::COLLECTION, utf8_percent_encode(id, ID_SEGMENT))
}

async fn handle_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ServiceError> {
    let status = resp.status();
    if status.is_success() {
        resp.json::<T>()
            .await
            .map_err(|e| ServiceError::Decode(format!("json decode: {e}")))
    } else {
        Err(parse_error_with_status(status, resp).await)
    }
}

async fn parse_error(resp: reqwest::Response) -> ServiceError {
    let status = resp.status();
    parse_error_with_status(status, resp).await
}

async fn parse_error_with_status(status: StatusCode, resp: reqwest::Response) -> ServiceError {
    let body = resp.text().await.unwrap_or_default();
    let msg = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| {
            v["error"]
                .as_str()
                .or_else(|| v["message"].as_str())
                .map(String::from)
        })
        .unwrap_or(body);

    tracing::warn!(status = status.as_u16(), message = %msg, "request failed");

    match status {
        StatusCode::NOT_FOUND => ServiceError::NotFound(msg),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ServiceError::Unauthorized(msg),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            ServiceError::InvalidInput(msg)
        }
        other => ServiceError::Server {
            status: other.as_u16(),
            message: msg,
        },
    }
}

#[async_trait]
impl FeedService for HttpService {
    async fn list_meal_plans(&self) -> Result<Vec<MealPlan>, ServiceError> {
        self.get_json(&collection_path::<MealPlan>()).await
    }

    async fn get_meal_plan(&self, id: &str) -> Result<MealPlan, ServiceError> {
        self.get_json(&record_path::<MealPlan>(id)).await
    }

    async fn create_meal_plan(&self, input: &MealPlanInput) -> Result<MealPlan, ServiceError> {
        self.post_json(&collection_path::<MealPlan>(), input).await
    }

    async fn update_meal_plan(
        &self,
        id: &str,
        input: &MealPlanInput,
    ) -> Result<MealPlan, ServiceError> {
        self.put_json(&record_path::<MealPlan>(id), input).await
    }

    async fn delete_meal_plan(&self, id: &str) -> Result<(), ServiceError> {
        self.delete_req(&record_path::<MealPlan>(id)).await
    }

    async fn list_workout_stories(&self) -> Result<Vec<WorkoutStory>, ServiceError> {
        self.get_json(&collection_path::<WorkoutStory>()).await
    }

    async fn get_workout_story(&self, id: &str) -> Result<WorkoutStory, ServiceError> {
        self.get_json(&record_path::<WorkoutStory>(id)).await
    }

    async fn create_workout_story(
        &self,
        input: &WorkoutStoryInput,
    ) -> Result<WorkoutStory, ServiceError> {
        self.post_json(&collection_path::<WorkoutStory>(), input)
            .await
    }

    async fn update_workout_story(
        &self,
        id: &str,
        input: &WorkoutStoryInput,
    ) -> Result<WorkoutStory, ServiceError> {
        self.put_json(&record_path::<WorkoutStory>(id), input)
            .await
    }

    async fn delete_workout_story(&self, id: &str) -> Result<(), ServiceError> {
        self.delete_req(&record_path::<WorkoutStory>(id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_use_collection_names() {
        assert_eq!(collection_path::<MealPlan>(), "/MealPlans");
        assert_eq!(record_path::<WorkoutStory>("s1"), "/WorkoutStories/s1");
    }

    #[test]
    fn record_id_is_one_path_segment() {
        assert_eq!(
            record_path::<MealPlan>("a/b?c#d"),
            "/MealPlans/a%2Fb%3Fc%23d"
        );
        assert_eq!(record_path::<MealPlan>(".."), "/MealPlans/%2E%2E");
        let id = "3f2c9a1e-77b0-4d5e-9c1a-0b6d2e4f8a10";
        assert_eq!(record_path::<MealPlan>(id), format!("/MealPlans/{id}"));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let svc = HttpService::new("http://localhost:8080/api/");
        assert_eq!(svc.base_url(), "http://localhost:8080/api");
    }
}
