use std::path::Path;

use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fitshare_core::plan::MealPlan;
use fitshare_core::story::WorkoutStory;
use fitshare_media::STORY_FOLDER;
use fitshare_service::Operation;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::card::{PlanCard, StoryCard};
use crate::components::centered_rect;
use crate::components::feed::{Column, FeedView};
use crate::components::wizard_view::render_wizard;
use crate::quick_post::QuickPost;
use crate::state::{Action, AppState, Notice, NoticeKind, Store};
use crate::sync::FeedSync;
use crate::wizard::{
    Draft, FieldEdit, PlanWizard, StoryWizard, SubmitError, SubmitOutcome, Wizard, WizardStep,
};

/// The record a delete confirmation is about.
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteTarget {
    Plan(MealPlan),
    Story(WorkoutStory),
}

impl DeleteTarget {
    fn title(&self) -> &str {
        match self {
            DeleteTarget::Plan(plan) => &plan.plan_name,
            DeleteTarget::Story(story) => &story.title,
        }
    }
}

/// What the app is currently doing
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    /// Browsing the two feed columns
    Feed,
    /// Meal plan wizard open (create or edit)
    PlanWizard,
    /// Workout story wizard open (create or edit)
    StoryWizard,
    /// Waiting for y/n on a delete
    ConfirmDelete { target: DeleteTarget },
    /// Typing the path of an image to attach to the open story wizard
    ImagePath { input: String },
}

/// What a keystroke inside a wizard asks the app to do.
enum WizardIntent {
    Stay,
    Cancel,
    Submit,
    PickImage,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Overlay {
    Plan,
    Story,
}

pub struct App {
    sync: FeedSync,
    store: Store,
    feed: FeedView,
    quick_post: QuickPost,
    plan_wizard: PlanWizard,
    story_wizard: StoryWizard,
    mode: Mode,
}

impl App {
    /// Load both collections and start on the feed. A failed load leaves
    /// an empty feed and an error notice.
    pub fn new(sync: FeedSync) -> Self {
        if let Err(e) = sync.refresh_all() {
            tracing::warn!(error = %e, "initial feed load failed");
        }
        let store = sync.store().clone();
        let mut app = Self {
            sync,
            store,
            feed: FeedView::new(),
            quick_post: QuickPost,
            plan_wizard: PlanWizard::create(),
            story_wizard: StoryWizard::create(),
            mode: Mode::Feed,
        };
        app.sync_from_store();
        app
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn feed(&self) -> &FeedView {
        &self.feed
    }

    pub fn plan_wizard(&self) -> &PlanWizard {
        &self.plan_wizard
    }

    pub fn story_wizard(&self) -> &StoryWizard {
        &self.story_wizard
    }

    /// Keys are text while a wizard or path prompt has focus.
    pub fn is_input_mode(&self) -> bool {
        matches!(
            self.mode,
            Mode::PlanWizard | Mode::StoryWizard | Mode::ImagePath { .. }
        )
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.store.with(|s| s.notice.is_some()) {
            self.store.dispatch(Action::ClearNotice);
        }

        match &self.mode.clone() {
            Mode::Feed => self.handle_feed(key),
            Mode::PlanWizard => match drive_wizard(&mut self.plan_wizard, key) {
                WizardIntent::Stay | WizardIntent::PickImage => {}
                WizardIntent::Cancel => {
                    self.plan_wizard.cancel();
                    self.store.dispatch(Action::CloseModals);
                }
                WizardIntent::Submit => self.submit_plan(),
            },
            Mode::StoryWizard => match drive_wizard(&mut self.story_wizard, key) {
                WizardIntent::Stay => {}
                WizardIntent::Cancel => {
                    self.story_wizard.cancel();
                    self.store.dispatch(Action::CloseModals);
                }
                WizardIntent::Submit => self.submit_story(),
                WizardIntent::PickImage => {
                    self.mode = Mode::ImagePath {
                        input: String::new(),
                    }
                }
            },
            Mode::ConfirmDelete { target } => self.handle_confirm_delete(key, target.clone()),
            Mode::ImagePath { input } => self.handle_image_path(key, input.clone()),
        }

        self.sync_from_store();
    }

    fn handle_feed(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('n') => self.store.dispatch(Action::OpenCreatePlan),
            KeyCode::Char('s') | KeyCode::Char('p') => {
                self.store.dispatch(self.quick_post.activate())
            }
            KeyCode::Char('e') => self.edit_selected(),
            KeyCode::Char('d') => self.confirm_delete_selected(),
            KeyCode::Char('r') => {
                // Failure is already on the notice bar.
                let _ = self.sync.refresh_all();
            }
            _ => self.feed.handle_key(key),
        }
    }

    fn edit_selected(&mut self) {
        let user = self.store.with(|s| s.current_user().cloned());
        let action = match self.feed.active_column() {
            Column::Plans => self
                .feed
                .selected_plan()
                .map(|card| card.can_manage(user.as_ref()).then(|| card.edit())),
            Column::Stories => self
                .feed
                .selected_story()
                .map(|card| card.can_manage(user.as_ref()).then(|| card.edit())),
        };
        match action {
            Some(Some(action)) => self.store.dispatch(action),
            Some(None) => self.notify(Notice::info("Only the author can edit this post")),
            None => {}
        }
    }

    fn confirm_delete_selected(&mut self) {
        let user = self.store.with(|s| s.current_user().cloned());
        let target = match self.feed.active_column() {
            Column::Plans => self
                .feed
                .selected_plan()
                .map(|card| (card.can_manage(user.as_ref()), DeleteTarget::Plan(card.plan().clone()))),
            Column::Stories => self.feed.selected_story().map(|card| {
                (
                    card.can_manage(user.as_ref()),
                    DeleteTarget::Story(card.story().clone()),
                )
            }),
        };
        match target {
            Some((true, target)) => self.mode = Mode::ConfirmDelete { target },
            Some((false, _)) => self.notify(Notice::info("Only the author can delete this post")),
            None => {}
        }
    }

    fn handle_confirm_delete(&mut self, key: KeyEvent, target: DeleteTarget) {
        if let KeyCode::Char('y') | KeyCode::Char('Y') = key.code {
            // Run on the card the feed owns. Outcome and notice are handled
            // by sync.
            let _ = match &target {
                DeleteTarget::Plan(plan) => {
                    match self.feed.plans().iter().find(|c| c.plan().id == plan.id) {
                        Some(card) => card.delete(&self.sync),
                        None => PlanCard::new(plan.clone()).delete(&self.sync),
                    }
                }
                DeleteTarget::Story(story) => {
                    match self.feed.stories().iter().find(|c| c.story().id == story.id) {
                        Some(card) => card.delete(&self.sync),
                        None => StoryCard::new(story.clone()).delete(&self.sync),
                    }
                }
            };
        }
        self.mode = Mode::Feed;
    }

    fn handle_image_path(&mut self, key: KeyEvent, mut input: String) {
        match key.code {
            KeyCode::Enter => {
                let path = input.trim();
                if !path.is_empty() {
                    match self.sync.service().upload_path(Path::new(path), STORY_FOLDER) {
                        Ok(url) => {
                            self.story_wizard.attach_image(url);
                            self.notify(Notice::success("Image uploaded"));
                        }
                        Err(e) => {
                            self.story_wizard.upload_failed(&e);
                            self.notify(Notice::error(Operation::Upload.failure_notice()));
                        }
                    }
                }
                self.mode = Mode::StoryWizard;
            }
            KeyCode::Esc => self.mode = Mode::StoryWizard,
            KeyCode::Backspace => {
                input.pop();
                self.mode = Mode::ImagePath { input };
            }
            KeyCode::Char(c) => {
                input.push(c);
                self.mode = Mode::ImagePath { input };
            }
            _ => {}
        }
    }

    //  Submit

    fn submit_plan(&mut self) {
        let user = self.store.with(|s| s.current_user().cloned());
        let input = match self
            .plan_wizard
            .begin_submit(user.as_ref(), Local::now().date_naive())
        {
            Ok(input) => input,
            Err(e) => return self.submit_rejected(e),
        };

        let (op, result) = match self.plan_wizard.original().map(|p| p.id.clone()) {
            Some(id) => (
                Operation::UpdatePlan,
                self.sync.update_plan(&id, &input).map(|r| r.id),
            ),
            None => (
                Operation::CreatePlan,
                self.sync.create_plan(&input).map(|r| r.id),
            ),
        };
        let saved = result.as_ref().ok().cloned();
        let outcome = self
            .plan_wizard
            .finish_submit(result.map(drop).map_err(|_| op.failure_notice()));
        if outcome == SubmitOutcome::Closed {
            self.store.dispatch(Action::CloseModals);
        }
        if let Some(id) = saved {
            // Cursor lands on the record just saved.
            self.feed.load(&self.store.snapshot().feed);
            self.feed.select_plan_by_id(&id);
        }
    }

    fn submit_story(&mut self) {
        let user = self.store.with(|s| s.current_user().cloned());
        let input = match self
            .story_wizard
            .begin_submit(user.as_ref(), Local::now().date_naive())
        {
            Ok(input) => input,
            Err(e) => return self.submit_rejected(e),
        };

        let (op, result) = match self.story_wizard.original().map(|s| s.id.clone()) {
            Some(id) => (
                Operation::UpdateStory,
                self.sync.update_story(&id, &input).map(|r| r.id),
            ),
            None => (
                Operation::CreateStory,
                self.sync.create_story(&input).map(|r| r.id),
            ),
        };
        let saved = result.as_ref().ok().cloned();
        let outcome = self
            .story_wizard
            .finish_submit(result.map(drop).map_err(|_| op.failure_notice()));
        if outcome == SubmitOutcome::Closed {
            self.store.dispatch(Action::CloseModals);
        }
        if let Some(id) = saved {
            // Cursor lands on the record just saved.
            self.feed.load(&self.store.snapshot().feed);
            self.feed.select_story_by_id(&id);
        }
    }

    fn submit_rejected(&mut self, err: SubmitError) {
        match err {
            // Field errors are drawn inline.
            SubmitError::Invalid(_) => {}
            other => self.notify(Notice::info(other.to_string())),
        }
    }

    fn notify(&self, notice: Notice) {
        self.store.dispatch(Action::Notify(notice));
    }

    //  Store

    /// Pull the feed and open/close wizards to match the Store's modal flags.
    fn sync_from_store(&mut self) {
        let state = self.store.snapshot();
        self.feed.load(&state.feed);
        self.sync_overlay(&state);
    }

    fn sync_overlay(&mut self, state: &AppState) {
        let modals = state.modals;
        let wanted = if modals.create_plan || modals.edit_plan {
            Some(Overlay::Plan)
        } else if modals.create_story || modals.edit_story {
            Some(Overlay::Story)
        } else {
            None
        };
        let showing = match self.mode {
            Mode::PlanWizard => Some(Overlay::Plan),
            Mode::StoryWizard | Mode::ImagePath { .. } => Some(Overlay::Story),
            Mode::Feed | Mode::ConfirmDelete { .. } => None,
        };
        if wanted == showing {
            return;
        }

        match wanted {
            Some(Overlay::Plan) => {
                self.plan_wizard = match (&state.selection.plan, modals.edit_plan) {
                    (Some(plan), true) => PlanWizard::edit(plan),
                    _ => PlanWizard::create(),
                };
                self.mode = Mode::PlanWizard;
            }
            Some(Overlay::Story) => {
                self.story_wizard = match (&state.selection.story, modals.edit_story) {
                    (Some(story), true) => StoryWizard::edit(story),
                    _ => StoryWizard::create(),
                };
                self.mode = Mode::StoryWizard;
            }
            None => self.mode = Mode::Feed,
        }
    }

    //  Rendering

    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        let state = self.store.snapshot();
        self.render_title_bar(frame, &state, layout[0]);
        self.render_quick_post(frame, &state, layout[1]);
        self.feed.render(frame, layout[2], state.current_user());
        self.render_status_bar(frame, &state, layout[3]);

        // Overlays
        match &self.mode {
            Mode::Feed => {}
            Mode::PlanWizard => {
                let title = if self.plan_wizard.is_edit() {
                    "Edit Meal Plan"
                } else {
                    "New Meal Plan"
                };
                render_wizard(frame, area, title, &self.plan_wizard);
            }
            Mode::StoryWizard => self.render_story_wizard(frame, area),
            Mode::ImagePath { input } => {
                self.render_story_wizard(frame, area);
                self.render_input_bar(frame, " Image file path ", input, area);
            }
            Mode::ConfirmDelete { target } => {
                self.render_confirm_delete_dialog(frame, target, area)
            }
        }
    }

    fn render_story_wizard(&self, frame: &mut Frame, area: Rect) {
        let title = if self.story_wizard.is_edit() {
            "Edit Workout Story"
        } else {
            "Share a Workout Story"
        };
        render_wizard(frame, area, title, &self.story_wizard);
    }

    fn render_title_bar(&self, frame: &mut Frame, state: &AppState, area: Rect) {
        let who = match state.current_user() {
            Some(user) => Span::styled(
                user.display_name().to_string(),
                Style::default().fg(Color::Yellow),
            ),
            None => Span::styled("signed out (read-only)", Style::default().fg(Color::DarkGray)),
        };
        let spans = vec![
            Span::styled(" fitshare ", Style::default().bold().fg(Color::Cyan)),
            Span::raw("| "),
            who,
        ];
        frame.render_widget(Line::from(spans), area);
    }

    fn render_quick_post(&self, frame: &mut Frame, state: &AppState, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let text = Line::from(vec![
            Span::styled(
                QuickPost::placeholder(state.current_user()),
                Style::default().fg(Color::Gray).italic(),
            ),
            Span::styled("  (s)", Style::default().fg(Color::Yellow)),
        ]);
        frame.render_widget(Paragraph::new(text).block(block), area);
    }

    fn render_status_bar(&self, frame: &mut Frame, state: &AppState, area: Rect) {
        if let Some(ref notice) = state.notice {
            let color = match notice.kind {
                NoticeKind::Success => Color::Green,
                NoticeKind::Error => Color::Red,
                NoticeKind::Info => Color::Yellow,
            };
            let line = Line::from(Span::styled(
                format!(" {}", notice.text),
                Style::default().fg(color),
            ));
            frame.render_widget(line, area);
            return;
        }

        let hints = match &self.mode {
            Mode::Feed => vec![
                ("q", "quit"),
                ("h/l", "cols"),
                ("j/k", "posts"),
                ("n", "new plan"),
                ("s", "share story"),
                ("e", "edit"),
                ("d", "del"),
                ("r", "refresh"),
            ],
            Mode::PlanWizard | Mode::StoryWizard => vec![
                ("Tab", "field"),
                ("Enter", "next"),
                ("PgUp", "back"),
                ("Ctrl+S", "submit"),
                ("Esc", "cancel"),
            ],
            Mode::ImagePath { .. } => vec![("Enter", "upload"), ("Esc", "back")],
            Mode::ConfirmDelete { .. } => vec![("y", "delete"), ("any", "cancel")],
        };

        let spans: Vec<Span> = hints
            .into_iter()
            .flat_map(|(key, desc)| {
                vec![
                    Span::styled(
                        format!(" {key}"),
                        Style::default().fg(Color::Yellow).bold(),
                    ),
                    Span::raw(format!(" {desc} ")),
                ]
            })
            .collect();

        frame.render_widget(Line::from(spans), area);
    }

    fn render_input_bar(&self, frame: &mut Frame, label: &str, input: &str, area: Rect) {
        let input_area = Rect {
            x: area.x,
            y: area.y + area.height.saturating_sub(3),
            width: area.width,
            height: 3.min(area.height),
        };
        frame.render_widget(Clear, input_area);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(label);
        let paragraph = Paragraph::new(input).block(block);
        frame.render_widget(paragraph, input_area);
    }

    fn render_confirm_delete_dialog(&self, frame: &mut Frame, target: &DeleteTarget, area: Rect) {
        let popup = centered_rect(50, 20, area);
        frame.render_widget(Clear, popup);

        let block = Block::default()
            .title(" Confirm Delete ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red));

        let text = format!("Delete \"{}\"?\n\n(y)es / (any key) cancel", target.title());
        let paragraph = Paragraph::new(text)
            .block(block)
            .wrap(Wrap { trim: false })
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, popup);
    }
}

/// Apply one keystroke to a wizard. Enter commits the focused field and
/// advances; on the preview step it submits.
fn drive_wizard<D: Draft>(wizard: &mut Wizard<D>, key: KeyEvent) -> WizardIntent {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => return WizardIntent::Cancel,
        KeyCode::Char('s') if ctrl => return WizardIntent::Submit,
        KeyCode::Tab | KeyCode::Down => wizard.focus_next(),
        KeyCode::BackTab | KeyCode::Up => wizard.focus_prev(),
        KeyCode::Left => wizard.edit_focused(FieldEdit::Prev),
        KeyCode::Right => wizard.edit_focused(FieldEdit::Next),
        KeyCode::PageUp => {
            wizard.back();
        }
        KeyCode::PageDown => {
            wizard.next();
        }
        KeyCode::Backspace => wizard.edit_focused(FieldEdit::Backspace),
        KeyCode::Enter => {
            if wizard.step() == WizardStep::Preview {
                return WizardIntent::Submit;
            }
            if wizard.accepts_image() && wizard.focused_field() == Some("image") {
                return WizardIntent::PickImage;
            }
            wizard.edit_focused(FieldEdit::Commit);
            wizard.next();
        }
        KeyCode::Char(c) if !ctrl => wizard.edit_focused(FieldEdit::Insert(c)),
        _ => {}
    }
    WizardIntent::Stay
}
