use async_trait::async_trait;
use fitshare_core::plan::{MealPlan, MealPlanInput};
use fitshare_core::story::{WorkoutStory, WorkoutStoryInput};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("malformed response: {0}")]
    Decode(String),
}

impl ServiceError {
    /// HTTP status behind the failure, when the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ServiceError::NotFound(_) => Some(404),
            ServiceError::Unauthorized(_) => Some(401),
            ServiceError::InvalidInput(_) => Some(400),
            ServiceError::Server { status, .. } => Some(*status),
            ServiceError::Network(_) | ServiceError::Decode(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound(_))
    }

    /// Fixed user-facing text for a failed `op`. The variant is only logged.
    pub fn notice(&self, op: Operation) -> &'static str {
        tracing::warn!(?op, error = %self, "gateway call failed");
        op.failure_notice()
    }
}

/// A gateway operation, used to pick the fixed user-facing failure text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
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

impl Operation {
    pub fn failure_notice(&self) -> &'static str {
        match self {
            Operation::ListPlans | Operation::GetPlan => "Failed to fetch meal plans",
            Operation::CreatePlan => "Failed to create meal plan. Please try again.",
            Operation::UpdatePlan => "Failed to update meal plan. Please try again.",
            Operation::DeletePlan => "Failed to delete meal plan",
            Operation::ListStories | Operation::GetStory => "Failed to fetch workout stories",
            Operation::CreateStory => "Error creating workout story",
            Operation::UpdateStory => "Error updating workout story",
            Operation::DeleteStory => "Failed to delete workout story",
            Operation::Upload => "Image upload failed",
        }
    }

    pub fn success_notice(&self) -> Option<&'static str> {
        match self {
            Operation::CreatePlan => Some("Meal plan created successfully!"),
            Operation::UpdatePlan => Some("Meal plan updated successfully!"),
            Operation::DeletePlan => Some("Meal plan deleted"),
            Operation::CreateStory => Some("Workout story created successfully"),
            Operation::UpdateStory => Some("Workout story updated successfully"),
            Operation::DeleteStory => Some("Workout story deleted successfully"),
            _ => None,
        }
    }
}

/// Abstraction over the backend's meal plan and workout story collections.
///
/// `HttpService` implements it over REST; the terminal client goes through
/// `BlockingHttpService`, which wraps the async client.
#[async_trait]
pub trait FeedService: Send + Sync {
    // -- Meal plans --
    async fn list_meal_plans(&self) -> Result<Vec<MealPlan>, ServiceError>;
    async fn get_meal_plan(&self, id: &str) -> Result<MealPlan, ServiceError>;
    async fn create_meal_plan(&self, input: &MealPlanInput) -> Result<MealPlan, ServiceError>;
    async fn update_meal_plan(
        &self,
        id: &str,
        input: &MealPlanInput,
    ) -> Result<MealPlan, ServiceError>;
    async fn delete_meal_plan(&self, id: &str) -> Result<(), ServiceError>;

    // -- Workout stories --
    async fn list_workout_stories(&self) -> Result<Vec<WorkoutStory>, ServiceError>;
    async fn get_workout_story(&self, id: &str) -> Result<WorkoutStory, ServiceError>;
    async fn create_workout_story(
        &self,
        input: &WorkoutStoryInput,
    ) -> Result<WorkoutStory, ServiceError>;
    async fn update_workout_story(
        &self,
        id: &str,
        input: &WorkoutStoryInput,
    ) -> Result<WorkoutStory, ServiceError>;
    async fn delete_workout_story(&self, id: &str) -> Result<(), ServiceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_reflects_variant() {
        assert_eq!(ServiceError::NotFound("x".into()).status(), Some(404));
        assert_eq!(
            ServiceError::Server {
                status: 503,
                message: "down".into()
            }
            .status(),
            Some(503)
        );
        assert_eq!(ServiceError::Network("refused".into()).status(), None);
    }

    #[test]
    fn every_mutation_has_a_success_notice() {
        for op in [
            Operation::CreatePlan,
            Operation::UpdatePlan,
            Operation::DeletePlan,
            Operation::CreateStory,
            Operation::UpdateStory,
            Operation::DeleteStory,
        ] {
            assert!(op.success_notice().is_some(), "{op:?}");
            assert!(!op.failure_notice().is_empty());
        }
        assert!(Operation::ListPlans.success_notice().is_none());
    }

    #[test]
    fn notice_ignores_variant() {
        let a = ServiceError::Network("refused".into()).notice(Operation::CreatePlan);
        let b = ServiceError::Server {
            status: 500,
            message: "boom".into(),
        }
        .notice(Operation::CreatePlan);
        assert_eq!(a, b);
        assert_eq!(a, "Failed to create meal plan. Please try again.");
    }
}
