pub mod health;
pub mod meal_plans;
pub mod media;
pub mod workout_stories;

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use axum::{middleware, Json, Router};
use bytes::Bytes;
use fitshare_core::plan::MealPlan;
use fitshare_core::story::WorkoutStory;
use serde_json::{json, Value};

use crate::auth::auth_middleware;

/// A REST operation, tracked for request counting and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    ListPlans,
    GetPlan,
    CreatePlan,
    UpdatePlan,
    DeletePlan,
    ListStories,
    GetStory,
    CreateStory,
    UpdateStory,
    DeleteStory,
    Upload,
}

#[derive(Debug, Clone)]
pub struct StoredMedia {
    pub content_type: String,
    pub data: Bytes,
}

pub struct InnerServerState {
    /// Expected bearer token. `None` disables authentication.
    pub token: Option<String>,
    /// Origin used to build public media URLs, e.g. "http://127.0.0.1:8080".
    pub public_origin: Mutex<String>,
    pub plans: Mutex<Vec<MealPlan>>,
    pub stories: Mutex<Vec<WorkoutStory>>,
    pub media: Mutex<HashMap<String, StoredMedia>>,
    hits: Mutex<HashMap<Op, usize>>,
    failures: Mutex<HashSet<Op>>,
}

pub type ServerState = Arc<InnerServerState>;

impl InnerServerState {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token,
            public_origin: Mutex::new("http://127.0.0.1:8080".into()),
            plans: Mutex::new(Vec::new()),
            stories: Mutex::new(Vec::new()),
            media: Mutex::new(HashMap::new()),
            hits: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashSet::new()),
        }
    }

    pub fn shared(token: Option<String>) -> ServerState {
        Arc::new(Self::new(token))
    }

    pub fn set_public_origin(&self, origin: impl Into<String>) {
        *self.public_origin.lock().unwrap() = origin.into();
    }

    /// How many requests for `op` reached a handler.
    pub fn hits(&self, op: Op) -> usize {
        self.hits.lock().unwrap().get(&op).copied().unwrap_or(0)
    }

    /// Make the next request for `op` fail with a 500.
    pub fn fail_next(&self, op: Op) {
        self.failures.lock().unwrap().insert(op);
    }

    pub fn seed_plan(&self, plan: MealPlan) {
        self.plans.lock().unwrap().push(plan);
    }

    pub fn seed_story(&self, story: WorkoutStory) {
        self.stories.lock().unwrap().push(story);
    }

    pub fn plans(&self) -> Vec<MealPlan> {
        self.plans.lock().unwrap().clone()
    }

    pub fn stories(&self) -> Vec<WorkoutStory> {
        self.stories.lock().unwrap().clone()
    }

    /// Record a hit and consume any injected failure for `op`.
    pub(crate) fn enter(&self, op: Op) -> Result<(), ApiError> {
        *self.hits.lock().unwrap().entry(op).or_insert(0) += 1;
        tracing::debug!(?op, "request");
        if self.failures.lock().unwrap().remove(&op) {
            return Err(ApiError::Injected);
        }
        Ok(())
    }
}

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Injected,
}

impl ApiError {
    fn into_parts(self) -> (StatusCode, Json<Value>) {
        let (status, msg) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Injected => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "injected failure".to_string(),
            ),
        };
        (status, Json(json!({ "error": msg })))
    }
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        self.into_parts().into_response()
    }
}

pub fn build_router(state: ServerState) -> Router {
    let public = Router::new()
        .merge(health::routes())
        .merge(media::public_routes());

    let protected = Router::new()
        .merge(meal_plans::routes())
        .merge(workout_stories::routes())
        .merge(media::routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    public.merge(protected).with_state(state)
}
