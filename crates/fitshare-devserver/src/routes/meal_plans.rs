use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use fitshare_core::plan::{MealPlan, MealPlanInput};

use super::{ApiError, Op, ServerState};

pub fn routes() -> Router<ServerState> {
    Router::new()
        .route("/api/MealPlans", get(list_plans).post(create_plan))
        .route(
            "/api/MealPlans/{id}",
            get(get_plan).put(update_plan).delete(delete_plan),
        )
}

async fn list_plans(State(state): State<ServerState>) -> Result<Json<Vec<MealPlan>>, ApiError> {
    state.enter(Op::ListPlans)?;
    Ok(Json(state.plans()))
}

async fn get_plan(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<MealPlan>, ApiError> {
    state.enter(Op::GetPlan)?;
    let plans = state.plans.lock().unwrap();
    plans
        .iter()
        .find(|p| p.id == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| missing(&id))
}

async fn create_plan(
    State(state): State<ServerState>,
    Json(input): Json<MealPlanInput>,
) -> Result<(StatusCode, Json<MealPlan>), ApiError> {
    state.enter(Op::CreatePlan)?;
    if input.plan_name.trim().is_empty() {
        return Err(ApiError::BadRequest("planName is required".into()));
    }
    let plan = MealPlan::from_input(uuid::Uuid::new_v4().to_string(), input);
    state.plans.lock().unwrap().push(plan.clone());
    tracing::info!(id = %plan.id, "created meal plan");
    Ok((StatusCode::CREATED, Json(plan)))
}

async fn update_plan(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(input): Json<MealPlanInput>,
) -> Result<Json<MealPlan>, ApiError> {
    state.enter(Op::UpdatePlan)?;
    let mut plans = state.plans.lock().unwrap();
    let slot = plans
        .iter_mut()
        .find(|p| p.id == id)
        .ok_or_else(|| missing(&id))?;
    *slot = MealPlan::from_input(id, input);
    Ok(Json(slot.clone()))
}

async fn delete_plan(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.enter(Op::DeletePlan)?;
    let mut plans = state.plans.lock().unwrap();
    let before = plans.len();
    plans.retain(|p| p.id != id);
    if plans.len() == before {
        return Err(missing(&id));
    }
    Ok(StatusCode::NO_CONTENT)
}

fn missing(id: &str) -> ApiError {
    ApiError::NotFound(format!("meal plan {id} not found"))
}
