use std::cell::Cell;

use fitshare_core::plan::MealPlan;
use fitshare_core::story::WorkoutStory;
use fitshare_core::{Entity, Progress, User};
use fitshare_service::ServiceError;

use crate::state::Action;
use crate::sync::FeedSync;

/// Card-local "deleting" flag, cleared when the guard drops.
struct Loading<'a>(&'a Cell<bool>);

impl<'a> Loading<'a> {
    fn start(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for Loading<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Read-only view of one meal plan with owner-gated actions.
#[derive(Debug, Clone)]
pub struct PlanCard {
    plan: MealPlan,
    deleting: Cell<bool>,
}

impl PlanCard {
    pub fn new(plan: MealPlan) -> Self {
        Self {
            plan,
            deleting: Cell::new(false),
        }
    }

    pub fn plan(&self) -> &MealPlan {
        &self.plan
    }

    pub fn title(&self) -> &str {
        &self.plan.plan_name
    }

    pub fn progress(&self) -> Progress {
        self.plan.progress()
    }

    pub fn routine_tags(&self) -> Vec<String> {
        self.plan.routine_tags()
    }

    pub fn last_updated_label(&self) -> String {
        match self.plan.last_updated.as_deref().map(str::trim) {
            Some(date) if !date.is_empty() => date.to_string(),
            _ => "not updated yet".into(),
        }
    }

    pub fn can_manage(&self, user: Option<&User>) -> bool {
        self.plan.is_owned_by(user)
    }

    pub fn is_deleting(&self) -> bool {
        self.deleting.get()
    }

    pub fn edit(&self) -> Action {
        Action::EditPlan(self.plan.clone())
    }

    /// One gateway delete, then the sync policy's follow-up. Failure is
    /// already posted as a notice by `sync`.
    pub fn delete(&self, sync: &FeedSync) -> Result<(), ServiceError> {
        let _loading = Loading::start(&self.deleting);
        sync.delete_plan(self.plan.id())
    }
}

/// Read-only view of one workout story with owner-gated actions.
#[derive(Debug, Clone)]
pub struct StoryCard {
    story: WorkoutStory,
    deleting: Cell<bool>,
}

impl StoryCard {
    pub fn new(story: WorkoutStory) -> Self {
        Self {
            story,
            deleting: Cell::new(false),
        }
    }

    pub fn story(&self) -> &WorkoutStory {
        &self.story
    }

    pub fn title(&self) -> &str {
        &self.story.title
    }

    pub fn duration_label(&self) -> String {
        format!("{} min", self.story.time_duration)
    }

    pub fn intensity_label(&self) -> &'static str {
        self.story
            .intensity
            .map(|i| i.display_name())
            .unwrap_or("Not set")
    }

    pub fn category_label(&self) -> &'static str {
        self.story.category.as_str()
    }

    pub fn date_label(&self) -> String {
        self.story
            .timestamp
            .map(|ts| ts.format("%b %-d, %Y").to_string())
            .unwrap_or_else(|| "No date".into())
    }

    pub fn can_manage(&self, user: Option<&User>) -> bool {
        self.story.is_owned_by(user)
    }

    pub fn is_deleting(&self) -> bool {
        self.deleting.get()
    }

    pub fn edit(&self) -> Action {
        Action::EditStory(self.story.clone())
    }

    pub fn delete(&self, sync: &FeedSync) -> Result<(), ServiceError> {
        let _loading = Loading::start(&self.deleting);
        sync.delete_story(self.story.id())
    }
}
