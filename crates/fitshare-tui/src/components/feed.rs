use crossterm::event::{KeyCode, KeyEvent};
use fitshare_core::{Progress, User};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Gauge, List, ListItem, ListState, Paragraph, Wrap};

use crate::card::{PlanCard, StoryCard};
use crate::state::Feed;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Plans,
    Stories,
}

/// Two-column community feed: meal plans on the left, stories on the right.
pub struct FeedView {
    plans: Vec<PlanCard>,
    stories: Vec<StoryCard>,
    plan_state: ListState,
    story_state: ListState,
    active: Column,
}

impl Default for FeedView {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedView {
    pub fn new() -> Self {
        Self {
            plans: Vec::new(),
            stories: Vec::new(),
            plan_state: ListState::default(),
            story_state: ListState::default(),
            active: Column::Plans,
        }
    }

    /// Rebuild the cards from the cached feed, keeping the cursor on the
    /// same record when it still exists.
    pub fn load(&mut self, feed: &Feed) {
        let plan_id = self.selected_plan().map(|c| c.plan().id.clone());
        let story_id = self.selected_story().map(|c| c.story().id.clone());

        self.plans = feed.plans.iter().cloned().map(PlanCard::new).collect();
        self.stories = feed.stories.iter().cloned().map(StoryCard::new).collect();

        let plan_idx = plan_id
            .and_then(|id| self.plans.iter().position(|c| c.plan().id == id))
            .or_else(|| (!self.plans.is_empty()).then_some(0));
        self.plan_state.select(plan_idx);

        let story_idx = story_id
            .and_then(|id| self.stories.iter().position(|c| c.story().id == id))
            .or_else(|| (!self.stories.is_empty()).then_some(0));
        self.story_state.select(story_idx);
    }

    pub fn active_column(&self) -> Column {
        self.active
    }

    pub fn plans(&self) -> &[PlanCard] {
        &self.plans
    }

    pub fn stories(&self) -> &[StoryCard] {
        &self.stories
    }

    pub fn selected_plan(&self) -> Option<&PlanCard> {
        self.plans.get(self.plan_state.selected()?)
    }

    pub fn selected_story(&self) -> Option<&StoryCard> {
        self.stories.get(self.story_state.selected()?)
    }

    pub fn select_plan_by_id(&mut self, id: &str) -> bool {
        match self.plans.iter().position(|c| c.plan().id == id) {
            Some(idx) => {
                self.active = Column::Plans;
                self.plan_state.select(Some(idx));
                true
            }
            None => false,
        }
    }

    pub fn select_story_by_id(&mut self, id: &str) -> bool {
        match self.stories.iter().position(|c| c.story().id == id) {
            Some(idx) => {
                self.active = Column::Stories;
                self.story_state.select(Some(idx));
                true
            }
            None => false,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let (len, state) = match self.active {
            Column::Plans => (self.plans.len(), &mut self.plan_state),
            Column::Stories => (self.stories.len(), &mut self.story_state),
        };
        match key.code {
            KeyCode::Char('h') | KeyCode::Left => self.active = Column::Plans,
            KeyCode::Char('l') | KeyCode::Right => self.active = Column::Stories,
            KeyCode::Char('j') | KeyCode::Down => {
                let current = state.selected().unwrap_or(0);
                if current + 1 < len {
                    state.select(Some(current + 1));
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                let current = state.selected().unwrap_or(0);
                if current > 0 {
                    state.select(Some(current - 1));
                }
            }
            KeyCode::Char('g') => {
                if len > 0 {
                    state.select(Some(0));
                }
            }
            KeyCode::Char('G') => {
                if len > 0 {
                    state.select(Some(len - 1));
                }
            }
            _ => {}
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, user: Option<&User>) {
        let halves = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)])
            .split(area);

        self.render_plans(frame, halves[0], user);
        self.render_stories(frame, halves[1], user);
    }

    fn render_plans(&self, frame: &mut Frame, area: Rect, user: Option<&User>) {
        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(9)])
            .split(area);

        let items: Vec<ListItem> = self
            .plans
            .iter()
            .map(|card| {
                let mut spans = vec![Span::raw(card.title().to_string())];
                spans.push(Span::styled(
                    format!("  {}", card.progress()),
                    progress_style(card.progress()),
                ));
                if card.can_manage(user) {
                    spans.push(Span::styled("  (yours)", Style::default().fg(Color::DarkGray)));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();

        let title = format!(" Meal Plans ({}) ", self.plans.len());
        let list = List::new(items)
            .block(column_block(title, self.active == Column::Plans))
            .highlight_style(highlight())
            .highlight_symbol("> ");
        let mut state = self.plan_state.clone();
        frame.render_stateful_widget(list, parts[0], &mut state);

        if let Some(card) = self.selected_plan() {
            render_plan_detail(frame, card, parts[1]);
        }
    }

    fn render_stories(&self, frame: &mut Frame, area: Rect, user: Option<&User>) {
        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(9)])
            .split(area);

        let items: Vec<ListItem> = self
            .stories
            .iter()
            .map(|card| {
                let mut spans = vec![
                    Span::styled(
                        format!("{:<12} ", card.category_label()),
                        Style::default().fg(Color::Magenta),
                    ),
                    Span::raw(card.title().to_string()),
                ];
                if card.can_manage(user) {
                    spans.push(Span::styled("  (yours)", Style::default().fg(Color::DarkGray)));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();

        let title = format!(" Workout Stories ({}) ", self.stories.len());
        let list = List::new(items)
            .block(column_block(title, self.active == Column::Stories))
            .highlight_style(highlight())
            .highlight_symbol("> ");
        let mut state = self.story_state.clone();
        frame.render_stateful_widget(list, parts[0], &mut state);

        if let Some(card) = self.selected_story() {
            render_story_detail(frame, card, parts[1]);
        }
    }
}

fn render_plan_detail(frame: &mut Frame, card: &PlanCard, area: Rect) {
    let block = Block::default()
        .title(format!(" {} ", card.title()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(inner);

    let progress = card.progress();
    let label = if progress.is_placeholder() {
        format!("{progress} (no items tracked)")
    } else {
        progress.to_string()
    };
    let gauge = Gauge::default()
        .gauge_style(progress_style(progress))
        .ratio(progress.ratio())
        .label(label);
    frame.render_widget(gauge, rows[0]);

    let plan = card.plan();
    let tags = card.routine_tags();
    let lines = vec![
        Line::from(plan.description.as_str()),
        Line::from(vec![
            Span::styled("Meals: ", Style::default().fg(Color::DarkGray)),
            Span::raw(plan.goal.as_str()),
        ]),
        Line::from(vec![
            Span::styled("Routines: ", Style::default().fg(Color::DarkGray)),
            Span::styled(tags.join(" | "), Style::default().fg(Color::Cyan)),
        ]),
        Line::from(vec![
            Span::styled("Updated: ", Style::default().fg(Color::DarkGray)),
            Span::raw(card.last_updated_label()),
        ]),
    ];
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, rows[1]);
}

fn render_story_detail(frame: &mut Frame, card: &StoryCard, area: Rect) {
    let block = Block::default()
        .title(format!(" {} ", card.title()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let story = card.story();
    let mut lines = vec![
        Line::from(vec![
            Span::styled(card.date_label(), Style::default().fg(Color::DarkGray)),
            Span::raw("  "),
            Span::raw(story.exercise_type.as_str()),
        ]),
        Line::from(vec![
            Span::styled(card.duration_label(), Style::default().fg(Color::Yellow)),
            Span::raw("  "),
            Span::styled(card.intensity_label(), Style::default().fg(Color::LightRed)),
        ]),
        Line::from(story.description.as_str()),
    ];
    if let Some(image) = &story.image {
        lines.push(Line::from(Span::styled(
            image.as_str(),
            Style::default().fg(Color::Blue).underlined(),
        )));
    }
    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn column_block(title: String, active: bool) -> Block<'static> {
    let border_style = if active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style)
}

fn highlight() -> Style {
    Style::default().fg(Color::Black).bg(Color::Cyan).bold()
}

fn progress_style(progress: Progress) -> Style {
    match progress {
        Progress::Placeholder => Style::default().fg(Color::DarkGray),
        Progress::Computed(pct) if pct >= 100 => Style::default().fg(Color::Green),
        Progress::Computed(_) => Style::default().fg(Color::Yellow),
    }
}
