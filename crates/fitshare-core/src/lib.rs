pub mod auth;
pub mod error;
pub mod plan;
pub mod progress;
pub mod story;
pub mod user;

pub use auth::{FileTokenSource, StaticToken, TokenSource};
pub use error::{CoreError, FieldError};
pub use plan::{MealPlan, MealPlanInput};
pub use progress::Progress;
pub use story::{Category, Intensity, WorkoutStory, WorkoutStoryInput};
pub use user::User;

/// A record owned by one user and stored in a backend collection.
pub trait Entity {
    /// Path segment of the backend collection, e.g. `MealPlans`.
    const COLLECTION: &'static str;

    fn id(&self) -> &str;
    fn owner_id(&self) -> &str;

    /// Ownership is a UI gate only; the backend does not enforce it.
    fn is_owned_by(&self, user: Option<&User>) -> bool {
        user.is_some_and(|u| !u.uid.is_empty() && u.uid == self.owner_id())
    }
}
