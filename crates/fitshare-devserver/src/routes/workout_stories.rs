use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use fitshare_core::story::{WorkoutStory, WorkoutStoryInput};

use super::{ApiError, Op, ServerState};

pub fn routes() -> Router<ServerState> {
    Router::new()
        .route("/api/WorkoutStories", get(list_stories).post(create_story))
        .route(
            "/api/WorkoutStories/{id}",
            get(get_story).put(update_story).delete(delete_story),
        )
}

async fn list_stories(
    State(state): State<ServerState>,
) -> Result<Json<Vec<WorkoutStory>>, ApiError> {
    state.enter(Op::ListStories)?;
    Ok(Json(state.stories()))
}

async fn get_story(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<WorkoutStory>, ApiError> {
    state.enter(Op::GetStory)?;
    let stories = state.stories.lock().unwrap();
    stories
        .iter()
        .find(|s| s.id == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| missing(&id))
}

async fn create_story(
    State(state): State<ServerState>,
    Json(input): Json<WorkoutStoryInput>,
) -> Result<(StatusCode, Json<WorkoutStory>), ApiError> {
    state.enter(Op::CreateStory)?;
    if input.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title is required".into()));
    }
    let story = WorkoutStory::from_input(uuid::Uuid::new_v4().to_string(), input);
    state.stories.lock().unwrap().push(story.clone());
    tracing::info!(id = %story.id, "created workout story");
    Ok((StatusCode::CREATED, Json(story)))
}

async fn update_story(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(input): Json<WorkoutStoryInput>,
) -> Result<Json<WorkoutStory>, ApiError> {
    state.enter(Op::UpdateStory)?;
    let mut stories = state.stories.lock().unwrap();
    let slot = stories
        .iter_mut()
        .find(|s| s.id == id)
        .ok_or_else(|| missing(&id))?;
    *slot = WorkoutStory::from_input(id, input);
    Ok(Json(slot.clone()))
}

async fn delete_story(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.enter(Op::DeleteStory)?;
    let mut stories = state.stories.lock().unwrap();
    let before = stories.len();
    stories.retain(|s| s.id != id);
    if stories.len() == before {
        return Err(missing(&id));
    }
    Ok(StatusCode::NO_CONTENT)
}

fn missing(id: &str) -> ApiError {
    ApiError::NotFound(format!("workout story {id} not found"))
}
