use std::sync::Arc;

use fitshare_core::plan::{MealPlan, MealPlanInput};
use fitshare_core::story::{WorkoutStory, WorkoutStoryInput};
use fitshare_service::{BlockingHttpService, Operation, ServiceError};

use crate::state::{Action, Notice, Store};

/// How the cached feed catches up after a mutation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum SyncPolicy {
    /// Patch the returned record in, then refetch the whole collection.
    #[default]
    Refetch,
    /// Patch the returned record in; refetch only to reconcile after a
    /// failed update or delete.
    ApplyDiff,
}

/// Runs gateway mutations and keeps the Store's feed in step with them.
///
/// Every outcome also posts the operation's fixed notice.
#[derive(Clone)]
pub struct FeedSync {
    service: Arc<BlockingHttpService>,
    store: Store,
    policy: SyncPolicy,
}

impl FeedSync {
    pub fn new(service: Arc<BlockingHttpService>, store: Store, policy: SyncPolicy) -> Self {
        Self {
            service,
            store,
            policy,
        }
    }

    pub fn service(&self) -> &BlockingHttpService {
        &self.service
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn policy(&self) -> SyncPolicy {
        self.policy
    }

    //  Refetch

    pub fn refresh_plans(&self) -> Result<(), ServiceError> {
        match self.service.list_meal_plans() {
            Ok(plans) => {
                tracing::debug!(count = plans.len(), "loaded meal plans");
                self.store.dispatch(Action::PlansLoaded(plans));
                Ok(())
            }
            Err(e) => {
                self.fail(Operation::ListPlans, &e);
                Err(e)
            }
        }
    }

    pub fn refresh_stories(&self) -> Result<(), ServiceError> {
        match self.service.list_workout_stories() {
            Ok(stories) => {
                tracing::debug!(count = stories.len(), "loaded workout stories");
                self.store.dispatch(Action::StoriesLoaded(stories));
                Ok(())
            }
            Err(e) => {
                self.fail(Operation::ListStories, &e);
                Err(e)
            }
        }
    }

    /// Both collections; the first failure is returned after both are tried.
    pub fn refresh_all(&self) -> Result<(), ServiceError> {
        let plans = self.refresh_plans();
        let stories = self.refresh_stories();
        plans.and(stories)
    }

    //  Meal plans

    pub fn create_plan(&self, input: &MealPlanInput) -> Result<MealPlan, ServiceError> {
        let result = self.service.create_meal_plan(input);
        self.after_write(Operation::CreatePlan, result, Action::PlanUpserted, || {
            self.quiet_refresh_plans()
        })
    }

    pub fn update_plan(&self, id: &str, input: &MealPlanInput) -> Result<MealPlan, ServiceError> {
        let result = self.service.update_meal_plan(id, input);
        self.after_write(Operation::UpdatePlan, result, Action::PlanUpserted, || {
            self.quiet_refresh_plans()
        })
    }

    pub fn delete_plan(&self, id: &str) -> Result<(), ServiceError> {
        let result = self.service.delete_meal_plan(id);
        self.after_delete(
            Operation::DeletePlan,
            result,
            Action::PlanRemoved(id.to_string()),
            || self.quiet_refresh_plans(),
        )
    }

    //  Workout stories

    pub fn create_story(&self, input: &WorkoutStoryInput) -> Result<WorkoutStory, ServiceError> {
        let result = self.service.create_workout_story(input);
        self.after_write(Operation::CreateStory, result, Action::StoryUpserted, || {
            self.quiet_refresh_stories()
        })
    }

    pub fn update_story(
        &self,
        id: &str,
        input: &WorkoutStoryInput,
    ) -> Result<WorkoutStory, ServiceError> {
        let result = self.service.update_workout_story(id, input);
        self.after_write(Operation::UpdateStory, result, Action::StoryUpserted, || {
            self.quiet_refresh_stories()
        })
    }

    pub fn delete_story(&self, id: &str) -> Result<(), ServiceError> {
        let result = self.service.delete_workout_story(id);
        self.after_delete(
            Operation::DeleteStory,
            result,
            Action::StoryRemoved(id.to_string()),
            || self.quiet_refresh_stories(),
        )
    }

    //  Internals

    fn after_write<T: Clone>(
        &self,
        op: Operation,
        result: Result<T, ServiceError>,
        upsert: impl FnOnce(T) -> Action,
        refetch: impl FnOnce(),
    ) -> Result<T, ServiceError> {
        match result {
            Ok(record) => {
                self.store.dispatch(upsert(record.clone()));
                if self.policy == SyncPolicy::Refetch {
                    refetch();
                }
                self.succeed(op);
                Ok(record)
            }
            Err(e) => {
                // A failed create leaves nothing to reconcile.
                let is_update = matches!(op, Operation::UpdatePlan | Operation::UpdateStory);
                if self.policy == SyncPolicy::ApplyDiff && is_update {
                    refetch();
                }
                self.fail(op, &e);
                Err(e)
            }
        }
    }

    fn after_delete(
        &self,
        op: Operation,
        result: Result<(), ServiceError>,
        removal: Action,
        refetch: impl FnOnce(),
    ) -> Result<(), ServiceError> {
        match (&result, self.policy) {
            (Ok(()), SyncPolicy::ApplyDiff) => self.store.dispatch(removal),
            // Refetch runs once whatever the outcome.
            (_, SyncPolicy::Refetch) | (Err(_), SyncPolicy::ApplyDiff) => refetch(),
        }
        match result {
            Ok(()) => {
                self.succeed(op);
                Ok(())
            }
            Err(e) => {
                self.fail(op, &e);
                Err(e)
            }
        }
    }

    /// Refetch after a mutation. Failure is logged, never surfaced.
    fn quiet_refresh_plans(&self) {
        match self.service.list_meal_plans() {
            Ok(plans) => self.store.dispatch(Action::PlansLoaded(plans)),
            Err(e) => tracing::warn!(error = %e, "meal plan refetch failed"),
        }
    }

    fn quiet_refresh_stories(&self) {
        match self.service.list_workout_stories() {
            Ok(stories) => self.store.dispatch(Action::StoriesLoaded(stories)),
            Err(e) => tracing::warn!(error = %e, "workout story refetch failed"),
        }
    }

    fn succeed(&self, op: Operation) {
        if let Some(text) = op.success_notice() {
            self.store.dispatch(Action::Notify(Notice::success(text)));
        }
    }

    fn fail(&self, op: Operation, err: &ServiceError) {
        let text = err.notice(op);
        self.store.dispatch(Action::Notify(Notice::error(text)));
    }
}
