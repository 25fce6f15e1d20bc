//! Multi-step creation/edit wizard.
//!
//! Fields are staged locally in a [`Draft`] and only leave the wizard as one
//! merged payload from [`Wizard::begin_submit`]. The caller performs the
//! gateway call and reports back through [`Wizard::finish_submit`].

use chrono::{DateTime, NaiveDate, NaiveTime, ParseError, SecondsFormat, Utc};
use fitshare_core::plan::{join_routines, routine_tags, MealPlan, MealPlanInput};
use fitshare_core::story::{
    Category, Intensity, WorkoutStory, WorkoutStoryInput, DEFAULT_DURATION_MINUTES,
    DURATION_STEP_MINUTES, MAX_DURATION_MINUTES,
};
use fitshare_core::{Entity, FieldError, User};
use fitshare_media::{MediaError, STORY_FOLDER};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Basics,
    Parameters,
    Preview,
}

impl WizardStep {
    pub const ALL: &[WizardStep] = &[
        WizardStep::Basics,
        WizardStep::Parameters,
        WizardStep::Preview,
    ];

    pub fn index(&self) -> usize {
        match self {
            WizardStep::Basics => 0,
            WizardStep::Parameters => 1,
            WizardStep::Preview => 2,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::Basics => "Basics",
            WizardStep::Parameters => "Details",
            WizardStep::Preview => "Preview",
        }
    }

    fn next(&self) -> Option<Self> {
        match self {
            WizardStep::Basics => Some(WizardStep::Parameters),
            WizardStep::Parameters => Some(WizardStep::Preview),
            WizardStep::Preview => None,
        }
    }

    fn prev(&self) -> Option<Self> {
        match self {
            WizardStep::Basics => None,
            WizardStep::Parameters => Some(WizardStep::Basics),
            WizardStep::Preview => Some(WizardStep::Parameters),
        }
    }
}

/// One keystroke-level change to a staged field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldEdit {
    Insert(char),
    Backspace,
    /// Cycle a picker forward (enums, duration).
    Next,
    Prev,
    /// Confirm the pending entry of a list field.
    Commit,
}

/// Locally staged form data for one entity type.
pub trait Draft: Default + Clone {
    type Entity: Entity + Clone;
    type Input;

    /// Upload folder for the attached image; `None` when the entity has none.
    const MEDIA_FOLDER: Option<&'static str>;

    fn from_entity(entity: &Self::Entity) -> Self;

    /// Field keys shown on `step`, in display order.
    fn fields(step: WizardStep) -> &'static [&'static str];

    fn label(field: &str) -> &'static str;

    fn value(&self, field: &str) -> String;

    fn apply(&mut self, field: &str, edit: FieldEdit);

    fn validate(&self) -> Vec<FieldError>;

    /// Checks for an edit of an existing record.
    fn validate_edit(&self) -> Vec<FieldError> {
        self.validate()
    }

    fn image_of(_entity: &Self::Entity) -> Option<String> {
        None
    }

    /// Merge staged fields with the owner, the resolved image and whatever
    /// the original record carries that the wizard does not edit.
    fn to_input(
        &self,
        owner: &str,
        image: Option<String>,
        original: Option<&Self::Entity>,
        today: NaiveDate,
    ) -> Self::Input;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("submit is only available from the preview step")]
    NotAtPreview,

    #[error("a submit is already in flight")]
    InFlight,

    #[error("sign in to post")]
    SignedOut,

    #[error("{} field(s) need attention", .0.len())]
    Invalid(Vec<FieldError>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Editing,
    Submitting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Succeeded; the wizard has been reset and should close.
    Closed,
    /// Failed; staged data is intact.
    KeptOpen,
}

pub struct Wizard<D: Draft> {
    step: WizardStep,
    focus: usize,
    draft: D,
    original: Option<D::Entity>,
    uploaded_image: Option<String>,
    errors: Vec<FieldError>,
    phase: Phase,
    notice: Option<String>,
}

impl<D: Draft> Default for Wizard<D> {
    fn default() -> Self {
        Self::create()
    }
}

impl<D: Draft> Wizard<D> {
    pub fn create() -> Self {
        Self {
            step: WizardStep::Basics,
            focus: 0,
            draft: D::default(),
            original: None,
            uploaded_image: None,
            errors: Vec::new(),
            phase: Phase::Editing,
            notice: None,
        }
    }

    /// Edit variant: every staged field starts from `entity`.
    pub fn edit(entity: &D::Entity) -> Self {
        Self {
            draft: D::from_entity(entity),
            original: Some(entity.clone()),
            ..Self::create()
        }
    }

    pub fn is_edit(&self) -> bool {
        self.original.is_some()
    }

    pub fn original(&self) -> Option<&D::Entity> {
        self.original.as_ref()
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn draft(&self) -> &D {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut D {
        &mut self.draft
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    //  Navigation

    pub fn next(&mut self) -> bool {
        match self.step.next() {
            Some(step) => {
                self.goto(step);
                true
            }
            None => false,
        }
    }

    pub fn back(&mut self) -> bool {
        match self.step.prev() {
            Some(step) => {
                self.goto(step);
                true
            }
            None => false,
        }
    }

    /// Discard staged data and any uploaded image, back to the first step.
    pub fn cancel(&mut self) {
        self.reset();
    }

    fn goto(&mut self, step: WizardStep) {
        self.step = step;
        self.focus = 0;
    }

    fn reset(&mut self) {
        self.step = WizardStep::Basics;
        self.focus = 0;
        self.draft = D::default();
        self.uploaded_image = None;
        self.errors.clear();
        self.phase = Phase::Editing;
        self.notice = None;
    }

    //  Field focus and editing

    pub fn focused_field(&self) -> Option<&'static str> {
        D::fields(self.step).get(self.focus).copied()
    }

    pub fn focus_next(&mut self) {
        let count = D::fields(self.step).len();
        if count > 0 {
            self.focus = (self.focus + 1) % count;
        }
    }

    pub fn focus_prev(&mut self) {
        let count = D::fields(self.step).len();
        if count > 0 {
            self.focus = (self.focus + count - 1) % count;
        }
    }

    /// Edit the focused field. Clears that field's error.
    pub fn edit_focused(&mut self, edit: FieldEdit) {
        if self.phase == Phase::Submitting {
            return;
        }
        if let Some(field) = self.focused_field() {
            self.draft.apply(field, edit);
            self.errors.retain(|e| e.field != field);
        }
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn error_for(&self, field: &str) -> Option<&'static str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message)
    }

    //  Media

    pub fn accepts_image(&self) -> bool {
        D::MEDIA_FOLDER.is_some()
    }

    /// Record the URL returned by the uploader. Independent of the step.
    pub fn attach_image(&mut self, url: impl Into<String>) {
        self.uploaded_image = Some(url.into());
    }

    /// The prior image state is left as it was.
    pub fn upload_failed(&mut self, err: &MediaError) {
        tracing::warn!(error = %err, "image upload failed");
    }

    /// What the submitted record will point at: the new upload, else the
    /// original's image.
    pub fn image(&self) -> Option<String> {
        self.uploaded_image
            .clone()
            .or_else(|| self.original.as_ref().and_then(D::image_of))
    }

    //  Submit

    /// Validate and build the payload, entering the `Submitting` phase.
    ///
    /// On validation failure no payload is produced; the wizard jumps to the
    /// earliest step holding an error.
    pub fn begin_submit(
        &mut self,
        user: Option<&User>,
        today: NaiveDate,
    ) -> Result<D::Input, SubmitError> {
        if self.phase == Phase::Submitting {
            return Err(SubmitError::InFlight);
        }
        if self.step != WizardStep::Preview {
            return Err(SubmitError::NotAtPreview);
        }
        let user = user.ok_or(SubmitError::SignedOut)?;

        let errors = match self.original {
            Some(_) => self.draft.validate_edit(),
            None => self.draft.validate(),
        };
        if !errors.is_empty() {
            self.errors = errors.clone();
            self.jump_to_first_error();
            return Err(SubmitError::Invalid(errors));
        }

        self.errors.clear();
        self.notice = None;
        self.phase = Phase::Submitting;
        Ok(self
            .draft
            .to_input(&user.uid, self.image(), self.original.as_ref(), today))
    }

    /// Report the gateway outcome of the payload from `begin_submit`.
    pub fn finish_submit(&mut self, result: Result<(), &str>) -> SubmitOutcome {
        match result {
            Ok(()) => {
                self.reset();
                SubmitOutcome::Closed
            }
            Err(notice) => {
                self.phase = Phase::Editing;
                self.notice = Some(notice.to_string());
                SubmitOutcome::KeptOpen
            }
        }
    }

    fn jump_to_first_error(&mut self) {
        for &step in WizardStep::ALL {
            let fields = D::fields(step);
            let first = fields
                .iter()
                .position(|f| self.errors.iter().any(|e| e.field == *f));
            if let Some(idx) = first {
                self.step = step;
                self.focus = idx;
                return;
            }
        }
    }
}

/// Rows for the preview step: every editable field with its staged value.
pub fn preview_rows<D: Draft>(draft: &D) -> Vec<(&'static str, String)> {
    [WizardStep::Basics, WizardStep::Parameters]
        .iter()
        .flat_map(|&step| D::fields(step).iter())
        .map(|&field| (D::label(field), draft.value(field)))
        .collect()
}

fn edit_text(text: &mut String, edit: FieldEdit) {
    match edit {
        FieldEdit::Insert(c) => text.push(c),
        FieldEdit::Backspace => {
            text.pop();
        }
        _ => {}
    }
}

fn required(errors: &mut Vec<FieldError>, value: &str, field: &'static str, msg: &'static str) {
    if value.trim().is_empty() {
        errors.push(FieldError::new(field, msg));
    }
}

//  Meal plans

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanDraft {
    pub plan_name: String,
    pub description: String,
    /// Free-text meal details.
    pub goal: String,
    pub routines: Vec<String>,
    /// Routine label being typed, not yet a tag.
    pub pending_routine: String,
}

impl PlanDraft {
    pub fn add_routine(&mut self, label: &str) {
        let label = label.trim();
        if !label.is_empty() && !self.routines.iter().any(|r| r == label) {
            self.routines.push(label.to_string());
        }
    }

    fn all_routines(&self) -> Vec<String> {
        let mut tags = self.routines.clone();
        let pending = self.pending_routine.trim();
        if !pending.is_empty() && !tags.iter().any(|t| t == pending) {
            tags.push(pending.to_string());
        }
        tags
    }
}

impl Draft for PlanDraft {
    type Entity = MealPlan;
    type Input = MealPlanInput;

    const MEDIA_FOLDER: Option<&'static str> = None;

    fn from_entity(plan: &MealPlan) -> Self {
        Self {
            plan_name: plan.plan_name.clone(),
            description: plan.description.clone(),
            goal: plan.goal.clone(),
            routines: routine_tags(&plan.routines),
            pending_routine: String::new(),
        }
    }

    fn fields(step: WizardStep) -> &'static [&'static str] {
        match step {
            WizardStep::Basics => &["planName", "description"],
            WizardStep::Parameters => &["goal", "routines"],
            WizardStep::Preview => &[],
        }
    }

    fn label(field: &str) -> &'static str {
        match field {
            "planName" => "Plan name",
            "description" => "Description",
            "goal" => "Meal details",
            "routines" => "Workout routines",
            _ => "",
        }
    }

    fn value(&self, field: &str) -> String {
        match field {
            "planName" => self.plan_name.clone(),
            "description" => self.description.clone(),
            "goal" => self.goal.clone(),
            "routines" => {
                let mut shown = join_routines(&self.routines);
                if !self.pending_routine.is_empty() {
                    if !shown.is_empty() {
                        shown.push_str(", ");
                    }
                    shown.push_str(&self.pending_routine);
                }
                shown
            }
            _ => String::new(),
        }
    }

    fn apply(&mut self, field: &str, edit: FieldEdit) {
        match field {
            "planName" => edit_text(&mut self.plan_name, edit),
            "description" => edit_text(&mut self.description, edit),
            "goal" => edit_text(&mut self.goal, edit),
            "routines" => match edit {
                FieldEdit::Insert(',') | FieldEdit::Commit => {
                    let pending = std::mem::take(&mut self.pending_routine);
                    self.add_routine(&pending);
                }
                FieldEdit::Insert(c) => self.pending_routine.push(c),
                FieldEdit::Backspace => {
                    if self.pending_routine.pop().is_none() {
                        self.routines.pop();
                    }
                }
                FieldEdit::Next | FieldEdit::Prev => {}
            },
            _ => {}
        }
    }

    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        required(&mut errors, &self.plan_name, "planName", "Please add a plan name");
        required(&mut errors, &self.description, "description", "Please enter description");
        required(&mut errors, &self.goal, "goal", "Please enter meal details");
        if self.all_routines().is_empty() {
            errors.push(FieldError::new("routines", "Please enter workout schedule"));
        }
        errors
    }

    /// Older plans may predate the other required fields.
    fn validate_edit(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        required(&mut errors, &self.plan_name, "planName", "Please add a plan name");
        errors
    }

    fn to_input(
        &self,
        owner: &str,
        _image: Option<String>,
        original: Option<&MealPlan>,
        today: NaiveDate,
    ) -> MealPlanInput {
        let mut input = MealPlanInput {
            user_id: owner.to_string(),
            plan_name: self.plan_name.trim().to_string(),
            description: self.description.trim().to_string(),
            goal: self.goal.trim().to_string(),
            routines: join_routines(&self.all_routines()),
            ..Default::default()
        };
        // Edits stamp the date and carry fields the wizard never shows.
        if let Some(plan) = original {
            input.last_updated = Some(today.format("%Y-%m-%d").to_string());
            input.completed_items = plan.completed_items;
            input.total_items = plan.total_items;
            input.category = plan.category.clone();
        }
        input
    }
}

//  Workout stories

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryDraft {
    pub title: String,
    /// `YYYY-MM-DD` or RFC 3339; empty for none.
    pub timestamp: String,
    pub exercise_type: String,
    pub category: Category,
    pub description: String,
    pub time_duration: u32,
    pub intensity: Option<Intensity>,
}

impl Default for StoryDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            timestamp: String::new(),
            exercise_type: String::new(),
            category: Category::default(),
            description: String::new(),
            time_duration: DEFAULT_DURATION_MINUTES,
            intensity: None,
        }
    }
}

impl StoryDraft {
    /// A bare date means midnight UTC.
    pub fn parsed_timestamp(&self) -> Result<Option<DateTime<Utc>>, ParseError> {
        let raw = self.timestamp.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Ok(Some(ts.with_timezone(&Utc)));
        }
        let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")?;
        Ok(Some(date.and_time(NaiveTime::MIN).and_utc()))
    }
}

impl Draft for StoryDraft {
    type Entity = WorkoutStory;
    type Input = WorkoutStoryInput;

    const MEDIA_FOLDER: Option<&'static str> = Some(STORY_FOLDER);

    fn from_entity(story: &WorkoutStory) -> Self {
        Self {
            title: story.title.clone(),
            timestamp: story
                .timestamp
                .map(|ts| ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
                .unwrap_or_default(),
            exercise_type: story.exercise_type.clone(),
            category: story.category,
            description: story.description.clone(),
            time_duration: story.time_duration,
            intensity: story.intensity,
        }
    }

    fn fields(step: WizardStep) -> &'static [&'static str] {
        match step {
            WizardStep::Basics => &["title", "timestamp", "exerciseType", "category"],
            WizardStep::Parameters => &["description", "timeDuration", "intensity", "image"],
            WizardStep::Preview => &[],
        }
    }

    fn label(field: &str) -> &'static str {
        match field {
            "title" => "Title",
            "timestamp" => "Date",
            "exerciseType" => "Exercise type",
            "category" => "Level",
            "description" => "Description",
            "timeDuration" => "Duration",
            "intensity" => "Intensity",
            "image" => "Image",
            _ => "",
        }
    }

    fn value(&self, field: &str) -> String {
        match field {
            "title" => self.title.clone(),
            "timestamp" => self.timestamp.clone(),
            "exerciseType" => self.exercise_type.clone(),
            "category" => self.category.as_str().to_string(),
            "description" => self.description.clone(),
            "timeDuration" => format!("{} min", self.time_duration),
            "intensity" => self
                .intensity
                .map(|i| i.as_str().to_string())
                .unwrap_or_default(),
            // The wizard owns the image; views read `Wizard::image`.
            _ => String::new(),
        }
    }

    fn apply(&mut self, field: &str, edit: FieldEdit) {
        match field {
            "title" => edit_text(&mut self.title, edit),
            "timestamp" => edit_text(&mut self.timestamp, edit),
            "exerciseType" => edit_text(&mut self.exercise_type, edit),
            "description" => edit_text(&mut self.description, edit),
            "category" => match edit {
                FieldEdit::Next | FieldEdit::Insert(' ') => self.category = self.category.next(),
                FieldEdit::Prev => self.category = self.category.prev(),
                _ => {}
            },
            "intensity" => match edit {
                FieldEdit::Next | FieldEdit::Insert(' ') => {
                    self.intensity = Some(match self.intensity {
                        Some(i) => i.next(),
                        None => Intensity::ALL[0],
                    })
                }
                FieldEdit::Prev => {
                    self.intensity = Some(match self.intensity {
                        Some(i) => i.prev(),
                        None => Intensity::ALL[Intensity::ALL.len() - 1],
                    })
                }
                FieldEdit::Backspace => self.intensity = None,
                _ => {}
            },
            "timeDuration" => match edit {
                // A preloaded value past the maximum is left alone.
                FieldEdit::Next if self.time_duration < MAX_DURATION_MINUTES => {
                    self.time_duration = self
                        .time_duration
                        .saturating_add(DURATION_STEP_MINUTES)
                        .min(MAX_DURATION_MINUTES)
                }
                FieldEdit::Prev => {
                    self.time_duration = self.time_duration.saturating_sub(DURATION_STEP_MINUTES)
                }
                _ => {}
            },
            _ => {}
        }
    }

    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        required(&mut errors, &self.title, "title", "Please input a title");
        if self.parsed_timestamp().is_err() {
            errors.push(FieldError::new(
                "timestamp",
                "Use YYYY-MM-DD or a full RFC 3339 timestamp",
            ));
        }
        errors
    }

    fn image_of(story: &WorkoutStory) -> Option<String> {
        story.image.clone()
    }

    fn to_input(
        &self,
        owner: &str,
        image: Option<String>,
        _original: Option<&WorkoutStory>,
        _today: NaiveDate,
    ) -> WorkoutStoryInput {
        WorkoutStoryInput {
            user_id: owner.to_string(),
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            timestamp: self.parsed_timestamp().ok().flatten(),
            exercise_type: self.exercise_type.trim().to_string(),
            time_duration: self.time_duration,
            intensity: self.intensity,
            category: self.category,
            image,
        }
    }
}

pub type PlanWizard = Wizard<PlanDraft>;
pub type StoryWizard = Wizard<StoryDraft>;

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            uid: "u1".into(),
            username: "sam".into(),
            image: None,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn type_into<D: Draft>(wizard: &mut Wizard<D>, text: &str) {
        for c in text.chars() {
            wizard.edit_focused(FieldEdit::Insert(c));
        }
    }

    fn saved_plan() -> MealPlan {
        MealPlan::from_input(
            "p1",
            MealPlanInput {
                user_id: "u1".into(),
                plan_name: "Cut".into(),
                description: "Lean".into(),
                goal: "Low carb".into(),
                routines: "Run, Lift,Swim".into(),
                completed_items: Some(2),
                total_items: Some(5),
                last_updated: Some("2024-01-01".into()),
                category: Some("Weight loss".into()),
            },
        )
    }

    #[test]
    fn step_transitions_are_bounded() {
        let mut wizard = StoryWizard::create();
        assert!(!wizard.back());
        assert_eq!(wizard.step(), WizardStep::Basics);
        assert!(wizard.next());
        assert!(wizard.next());
        assert_eq!(wizard.step(), WizardStep::Preview);
        assert!(!wizard.next());
        assert!(wizard.back());
        assert_eq!(wizard.step(), WizardStep::Parameters);
    }

    #[test]
    fn cancel_discards_staged_data_and_upload() {
        let mut wizard = StoryWizard::create();
        type_into(&mut wizard, "Leg day");
        wizard.attach_image("https://cdn/x.png");
        wizard.next();

        wizard.cancel();
        assert_eq!(wizard.step(), WizardStep::Basics);
        assert_eq!(wizard.draft(), &StoryDraft::default());
        assert_eq!(wizard.image(), None);
    }

    #[test]
    fn submit_requires_preview() {
        let mut wizard = StoryWizard::create();
        type_into(&mut wizard, "Leg day");
        assert_eq!(
            wizard.begin_submit(Some(&user()), today()).unwrap_err(),
            SubmitError::NotAtPreview
        );
    }

    #[test]
    fn missing_title_jumps_back_with_field_error() {
        let mut wizard = StoryWizard::create();
        wizard.next();
        wizard.next();

        let err = wizard.begin_submit(Some(&user()), today()).unwrap_err();
        assert!(matches!(err, SubmitError::Invalid(ref e) if e[0].field == "title"));
        assert_eq!(wizard.step(), WizardStep::Basics);
        assert_eq!(wizard.focused_field(), Some("title"));
        assert_eq!(wizard.error_for("title"), Some("Please input a title"));
        assert_eq!(wizard.phase(), Phase::Editing);
    }

    #[test]
    fn plan_errors_land_on_earliest_step() {
        let mut wizard = PlanWizard::create();
        type_into(&mut wizard, "Cut");
        wizard.focus_next();
        type_into(&mut wizard, "Lean");
        wizard.next();
        wizard.next();

        let err = wizard.begin_submit(Some(&user()), today()).unwrap_err();
        let SubmitError::Invalid(errors) = err else {
            panic!("expected validation errors");
        };
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["goal", "routines"]);
        assert_eq!(wizard.step(), WizardStep::Parameters);
        assert_eq!(wizard.focused_field(), Some("goal"));
    }

    #[test]
    fn editing_a_field_clears_its_error() {
        let mut wizard = StoryWizard::create();
        wizard.next();
        wizard.next();
        let _ = wizard.begin_submit(Some(&user()), today());
        type_into(&mut wizard, "R");
        assert_eq!(wizard.error_for("title"), None);
    }

    #[test]
    fn second_submit_while_in_flight_is_rejected() {
        let mut wizard = StoryWizard::create();
        type_into(&mut wizard, "Leg day");
        wizard.next();
        wizard.next();

        let input = wizard.begin_submit(Some(&user()), today()).unwrap();
        assert_eq!(input.title, "Leg day");
        assert_eq!(input.user_id, "u1");
        assert_eq!(
            wizard.begin_submit(Some(&user()), today()).unwrap_err(),
            SubmitError::InFlight
        );
    }

    #[test]
    fn signed_out_cannot_submit() {
        let mut wizard = StoryWizard::create();
        type_into(&mut wizard, "Leg day");
        wizard.next();
        wizard.next();
        assert_eq!(
            wizard.begin_submit(None, today()).unwrap_err(),
            SubmitError::SignedOut
        );
    }

    #[test]
    fn failed_submit_keeps_staged_data() {
        let mut wizard = StoryWizard::create();
        type_into(&mut wizard, "Leg day");
        wizard.next();
        wizard.next();
        wizard.begin_submit(Some(&user()), today()).unwrap();

        let outcome = wizard.finish_submit(Err("Error creating workout story"));
        assert_eq!(outcome, SubmitOutcome::KeptOpen);
        assert_eq!(wizard.phase(), Phase::Editing);
        assert_eq!(wizard.step(), WizardStep::Preview);
        assert_eq!(wizard.draft().title, "Leg day");
        assert_eq!(wizard.notice(), Some("Error creating workout story"));

        // Retrying is allowed again.
        assert!(wizard.begin_submit(Some(&user()), today()).is_ok());
    }

    #[test]
    fn successful_submit_resets() {
        let mut wizard = StoryWizard::create();
        type_into(&mut wizard, "Leg day");
        wizard.attach_image("https://cdn/x.png");
        wizard.next();
        wizard.next();
        wizard.begin_submit(Some(&user()), today()).unwrap();

        assert_eq!(wizard.finish_submit(Ok(())), SubmitOutcome::Closed);
        assert_eq!(wizard.step(), WizardStep::Basics);
        assert_eq!(wizard.draft(), &StoryDraft::default());
        assert_eq!(wizard.image(), None);
    }

    #[test]
    fn upload_is_independent_of_step() {
        let mut wizard = StoryWizard::create();
        wizard.attach_image("https://cdn/first.png");
        type_into(&mut wizard, "Row");
        wizard.next();
        wizard.next();
        let input = wizard.begin_submit(Some(&user()), today()).unwrap();
        assert_eq!(input.image.as_deref(), Some("https://cdn/first.png"));
    }

    #[test]
    fn upload_failure_leaves_prior_image() {
        let story = WorkoutStory {
            image: Some("https://cdn/old.png".into()),
            ..WorkoutStory::from_input(
                "s1",
                WorkoutStoryInput {
                    user_id: "u1".into(),
                    title: "Swim".into(),
                    description: String::new(),
                    timestamp: None,
                    exercise_type: String::new(),
                    time_duration: 30,
                    intensity: None,
                    category: Category::Beginner,
                    image: None,
                },
            )
        };
        let mut wizard = StoryWizard::edit(&story);
        wizard.upload_failed(&MediaError::Transport("refused".into()));
        assert_eq!(wizard.image().as_deref(), Some("https://cdn/old.png"));

        wizard.attach_image("https://cdn/new.png");
        assert_eq!(wizard.image().as_deref(), Some("https://cdn/new.png"));
    }

    #[test]
    fn edit_preloads_every_field() {
        let wizard = PlanWizard::edit(&saved_plan());
        let draft = wizard.draft();
        assert!(wizard.is_edit());
        assert_eq!(draft.plan_name, "Cut");
        assert_eq!(draft.description, "Lean");
        assert_eq!(draft.goal, "Low carb");
        assert_eq!(draft.routines, vec!["Run", "Lift", "Swim"]);
    }

    #[test]
    fn plan_edit_stamps_date_and_preserves_counters() {
        let mut wizard = PlanWizard::edit(&saved_plan());
        wizard.next();
        wizard.next();
        let input = wizard.begin_submit(Some(&user()), today()).unwrap();

        assert_eq!(input.last_updated.as_deref(), Some("2024-06-01"));
        assert_eq!(input.completed_items, Some(2));
        assert_eq!(input.total_items, Some(5));
        assert_eq!(input.category.as_deref(), Some("Weight loss"));
        assert_eq!(input.routines, "Run, Lift, Swim");
    }

    #[test]
    fn plan_edit_only_needs_a_name() {
        let sparse = MealPlan::from_input(
            "p2",
            MealPlanInput {
                user_id: "u1".into(),
                plan_name: "Old plan".into(),
                ..Default::default()
            },
        );
        let mut wizard = PlanWizard::edit(&sparse);
        wizard.next();
        wizard.next();
        let input = wizard.begin_submit(Some(&user()), today()).unwrap();
        assert_eq!(input.plan_name, "Old plan");
        assert_eq!(input.description, "");

        let unnamed = PlanDraft {
            plan_name: "  ".into(),
            ..Default::default()
        };
        let errors = unnamed.validate_edit();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "planName");

        let mut create = PlanWizard::create();
        type_into(&mut create, "Bulk");
        create.next();
        create.next();
        match create.begin_submit(Some(&user()), today()) {
            Err(SubmitError::Invalid(errors)) => assert_eq!(errors.len(), 3),
            other => panic!("expected invalid, got {other:?}"),
        }
    }

    #[test]
    fn plan_create_leaves_counters_unset() {
        let mut draft = PlanDraft {
            plan_name: "Bulk".into(),
            description: "Eat".into(),
            goal: "5 meals".into(),
            ..Default::default()
        };
        draft.add_routine("Lift");
        draft.pending_routine = "Walk".into();
        let input = draft.to_input("u1", None, None, today());
        assert_eq!(input.routines, "Lift, Walk");
        assert_eq!(input.last_updated, None);
        assert_eq!(input.completed_items, None);
    }

    #[test]
    fn routine_tags_commit_on_comma() {
        let mut draft = PlanDraft::default();
        for c in "Run,Lift, Run,".chars() {
            draft.apply("routines", FieldEdit::Insert(c));
        }
        assert_eq!(draft.routines, vec!["Run", "Lift"]);
        draft.apply("routines", FieldEdit::Backspace);
        assert_eq!(draft.routines, vec!["Run"]);
    }

    #[test]
    fn duration_picker_stays_in_range() {
        let mut draft = StoryDraft::default();
        assert_eq!(draft.time_duration, 30);
        for _ in 0..40 {
            draft.apply("timeDuration", FieldEdit::Next);
        }
        assert_eq!(draft.time_duration, MAX_DURATION_MINUTES);
        for _ in 0..40 {
            draft.apply("timeDuration", FieldEdit::Prev);
        }
        assert_eq!(draft.time_duration, 0);
    }

    #[test]
    fn intensity_picker_cycles_from_unset() {
        let mut draft = StoryDraft::default();
        draft.apply("intensity", FieldEdit::Next);
        assert_eq!(draft.intensity, Some(Intensity::No));
        draft.apply("intensity", FieldEdit::Prev);
        assert_eq!(draft.intensity, Some(Intensity::Maximal));
        draft.apply("intensity", FieldEdit::Backspace);
        assert_eq!(draft.intensity, None);
    }

    #[test]
    fn timestamp_accepts_date_or_rfc3339() {
        let mut draft = StoryDraft {
            timestamp: "2024-05-01".into(),
            ..Default::default()
        };
        let ts = draft.parsed_timestamp().unwrap().unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-05-01T00:00:00+00:00");

        draft.timestamp = "2024-05-01T10:30:00Z".into();
        assert!(draft.parsed_timestamp().unwrap().is_some());

        draft.timestamp = "May first".into();
        assert!(draft.parsed_timestamp().is_err());
        assert!(draft.validate().iter().any(|e| e.field == "timestamp"));
    }

    #[test]
    fn story_edit_round_trips_timestamp() {
        let ts = DateTime::parse_from_rfc3339("2024-05-01T10:30:00.123Z")
            .unwrap()
            .with_timezone(&Utc);
        let story = WorkoutStory {
            timestamp: Some(ts),
            ..WorkoutStory::from_input(
                "s1",
                WorkoutStoryInput {
                    user_id: "u1".into(),
                    title: "Swim".into(),
                    description: String::new(),
                    timestamp: None,
                    exercise_type: String::new(),
                    time_duration: 30,
                    intensity: Some(Intensity::Mid),
                    category: Category::Advanced,
                    image: None,
                },
            )
        };
        let draft = StoryDraft::from_entity(&story);
        assert_eq!(draft.parsed_timestamp().unwrap(), Some(ts));
        assert_eq!(draft.category, Category::Advanced);
        assert_eq!(draft.intensity, Some(Intensity::Mid));

        // An untouched edit submits the stored timestamp unchanged.
        let mut wizard = StoryWizard::edit(&story);
        wizard.next();
        wizard.next();
        let input = wizard.begin_submit(Some(&user()), today()).unwrap();
        assert_eq!(input.timestamp, Some(ts));
    }

    #[test]
    fn over_range_duration_is_not_pushed_further() {
        let story = WorkoutStory::from_input(
            "s1",
            WorkoutStoryInput {
                user_id: "u1".into(),
                title: "Ultra".into(),
                description: String::new(),
                timestamp: None,
                exercise_type: String::new(),
                time_duration: u32::MAX,
                intensity: None,
                category: Category::Beginner,
                image: None,
            },
        );
        let mut wizard = StoryWizard::edit(&story);
        wizard.next();
        wizard.focus_next();
        assert_eq!(wizard.focused_field(), Some("timeDuration"));
        wizard.edit_focused(FieldEdit::Next);
        assert_eq!(wizard.draft().time_duration, u32::MAX);

        let mut draft = StoryDraft {
            time_duration: 150,
            ..StoryDraft::default()
        };
        draft.apply("timeDuration", FieldEdit::Next);
        assert_eq!(draft.time_duration, 150);
        draft.apply("timeDuration", FieldEdit::Prev);
        assert_eq!(draft.time_duration, 145);
    }

    #[test]
    fn preview_lists_staged_values() {
        let draft = PlanDraft {
            plan_name: "Cut".into(),
            routines: vec!["Run".into()],
            ..Default::default()
        };
        let rows = preview_rows(&draft);
        assert_eq!(rows[0], ("Plan name", "Cut".to_string()));
        assert_eq!(rows[3], ("Workout routines", "Run".to_string()));
    }
}
