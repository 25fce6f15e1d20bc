use std::sync::Arc;

use fitshare_core::plan::MealPlan;
use fitshare_core::story::WorkoutStory;
use fitshare_core::{Entity, User};
use tokio::sync::watch;

/// Who is signed in. Supplied by the identity collaborator, never edited here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub user: Option<User>,
}

/// Which wizard is open. At most one flag is set at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modals {
    pub create_plan: bool,
    pub edit_plan: bool,
    pub create_story: bool,
    pub edit_story: bool,
}

impl Modals {
    pub fn any_open(&self) -> bool {
        self.create_plan || self.edit_plan || self.create_story || self.edit_story
    }
}

/// The record an edit wizard was opened on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub plan: Option<MealPlan>,
    pub story: Option<WorkoutStory>,
}

/// Cached collections as last fetched (or patched) from the backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Feed {
    pub plans: Vec<MealPlan>,
    pub stories: Vec<WorkoutStory>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

/// Transient user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub session: Session,
    pub modals: Modals,
    pub selection: Selection,
    pub feed: Feed,
    pub notice: Option<Notice>,
}

impl AppState {
    pub fn current_user(&self) -> Option<&User> {
        self.session.user.as_ref()
    }
}

/// Every state change goes through one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SignedIn(User),
    SignedOut,

    OpenCreatePlan,
    OpenCreateStory,
    /// Select a plan and open the edit wizard on it.
    EditPlan(MealPlan),
    /// Select a story and open the edit wizard on it.
    EditStory(WorkoutStory),
    /// Close whichever wizard is open and drop the selection.
    CloseModals,

    PlansLoaded(Vec<MealPlan>),
    PlanUpserted(MealPlan),
    PlanRemoved(String),
    StoriesLoaded(Vec<WorkoutStory>),
    StoryUpserted(WorkoutStory),
    StoryRemoved(String),

    Notify(Notice),
    ClearNotice,
}

pub fn reduce(state: &mut AppState, action: Action) {
    match action {
        Action::SignedIn(user) => state.session.user = Some(user),
        Action::SignedOut => {
            state.session.user = None;
            state.modals = Modals::default();
            state.selection = Selection::default();
        }

        Action::OpenCreatePlan => {
            state.modals = Modals {
                create_plan: true,
                ..Modals::default()
            };
            state.selection = Selection::default();
        }
        Action::OpenCreateStory => {
            state.modals = Modals {
                create_story: true,
                ..Modals::default()
            };
            state.selection = Selection::default();
        }
        Action::EditPlan(plan) => {
            state.selection = Selection {
                plan: Some(plan),
                story: None,
            };
            state.modals = Modals {
                edit_plan: true,
                ..Modals::default()
            };
        }
        Action::EditStory(story) => {
            state.selection = Selection {
                plan: None,
                story: Some(story),
            };
            state.modals = Modals {
                edit_story: true,
                ..Modals::default()
            };
        }
        Action::CloseModals => {
            state.modals = Modals::default();
            state.selection = Selection::default();
        }

        Action::PlansLoaded(plans) => state.feed.plans = plans,
        Action::PlanUpserted(plan) => upsert(&mut state.feed.plans, plan),
        Action::PlanRemoved(id) => state.feed.plans.retain(|p| p.id() != id),
        Action::StoriesLoaded(stories) => state.feed.stories = stories,
        Action::StoryUpserted(story) => upsert(&mut state.feed.stories, story),
        Action::StoryRemoved(id) => state.feed.stories.retain(|s| s.id() != id),

        Action::Notify(notice) => state.notice = Some(notice),
        Action::ClearNotice => state.notice = None,
    }
}

/// Replace in place, keeping feed order; new records go last.
fn upsert<E: Entity>(items: &mut Vec<E>, item: E) {
    match items.iter_mut().find(|existing| existing.id() == item.id()) {
        Some(slot) => *slot = item,
        None => items.push(item),
    }
}

/// Process-wide state container.
///
/// Cloning a `Store` yields another handle to the same state. Each dispatched
/// action is applied under the channel's lock, then subscribers are woken.
#[derive(Clone)]
pub struct Store {
    tx: Arc<watch::Sender<AppState>>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(AppState::default());
        Self { tx: Arc::new(tx) }
    }

    pub fn dispatch(&self, action: Action) {
        tracing::trace!(?action, "dispatch");
        self.tx.send_modify(|state| reduce(state, action));
    }

    pub fn snapshot(&self) -> AppState {
        self.tx.borrow().clone()
    }

    /// Read without cloning the whole state.
    pub fn with<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&self.tx.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use fitshare_core::plan::MealPlanInput;

    use super::*;

    fn plan(id: &str, name: &str) -> MealPlan {
        MealPlan::from_input(
            id,
            MealPlanInput {
                user_id: "u1".into(),
                plan_name: name.into(),
                ..Default::default()
            },
        )
    }

    #[test]
    fn edit_plan_selects_and_opens_together() {
        let store = Store::new();
        store.dispatch(Action::OpenCreateStory);
        store.dispatch(Action::EditPlan(plan("p1", "Cut")));

        let state = store.snapshot();
        assert!(state.modals.edit_plan);
        assert!(!state.modals.create_story);
        assert_eq!(state.selection.plan.as_ref().unwrap().id, "p1");
    }

    #[test]
    fn close_modals_clears_selection() {
        let store = Store::new();
        store.dispatch(Action::EditPlan(plan("p1", "Cut")));
        store.dispatch(Action::CloseModals);
        let state = store.snapshot();
        assert!(!state.modals.any_open());
        assert_eq!(state.selection, Selection::default());
    }

    #[test]
    fn upsert_replaces_in_place() {
        let store = Store::new();
        store.dispatch(Action::PlansLoaded(vec![plan("a", "A"), plan("b", "B")]));
        store.dispatch(Action::PlanUpserted(plan("a", "A2")));
        store.dispatch(Action::PlanUpserted(plan("c", "C")));

        let names: Vec<String> = store.with(|s| {
            s.feed.plans.iter().map(|p| p.plan_name.clone()).collect()
        });
        assert_eq!(names, vec!["A2", "B", "C"]);
    }

    #[test]
    fn removal_by_id() {
        let store = Store::new();
        store.dispatch(Action::PlansLoaded(vec![plan("a", "A"), plan("b", "B")]));
        store.dispatch(Action::PlanRemoved("a".into()));
        assert_eq!(store.with(|s| s.feed.plans.len()), 1);
    }

    #[test]
    fn subscribers_see_dispatches() {
        let store = Store::new();
        let mut rx = store.subscribe();
        assert!(!rx.has_changed().unwrap());

        store.dispatch(Action::Notify(Notice::info("hello")));
        assert!(rx.has_changed().unwrap());
        let notice = rx.borrow_and_update().notice.clone();
        assert_eq!(notice, Some(Notice::info("hello")));
    }

    #[test]
    fn clones_share_state() {
        let store = Store::new();
        let other = store.clone();
        other.dispatch(Action::SignedIn(User {
            uid: "u1".into(),
            username: "sam".into(),
            image: None,
        }));
        assert_eq!(store.snapshot().current_user().unwrap().uid, "u1");
    }

    #[test]
    fn sign_out_closes_wizards() {
        let mut state = AppState::default();
        reduce(&mut state, Action::OpenCreatePlan);
        reduce(&mut state, Action::SignedOut);
        assert!(!state.modals.any_open());
    }
}
