use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use super::centered_rect;
use crate::wizard::{preview_rows, Draft, Phase, Wizard, WizardStep};

/// Overlay for a create/edit wizard of any draft type.
pub fn render_wizard<D: Draft>(frame: &mut Frame, area: Rect, title: &str, wizard: &Wizard<D>) {
    let popup = centered_rect(70, 80, area);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(3),
            Constraint::Length(2),
        ])
        .split(inner);

    frame.render_widget(Paragraph::new(step_line(wizard.step())), rows[0]);

    let body = match wizard.step() {
        WizardStep::Preview => preview_lines(wizard),
        step => field_lines(wizard, step),
    };
    frame.render_widget(Paragraph::new(body).wrap(Wrap { trim: false }), rows[1]);

    frame.render_widget(Paragraph::new(footer(wizard)), rows[2]);
}

fn step_line(current: WizardStep) -> Line<'static> {
    let mut spans = Vec::new();
    for (i, step) in WizardStep::ALL.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" > ", Style::default().fg(Color::DarkGray)));
        }
        let label = format!("{} {}", step.index() + 1, step.title());
        let style = if *step == current {
            Style::default().fg(Color::Cyan).bold()
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(label, style));
    }
    Line::from(spans)
}

fn field_lines<D: Draft>(wizard: &Wizard<D>, step: WizardStep) -> Vec<Line<'static>> {
    let focused = wizard.focused_field();
    let mut lines = Vec::new();

    for &field in D::fields(step) {
        let is_focused = focused == Some(field);
        let label_style = if is_focused {
            Style::default().fg(Color::Yellow).bold()
        } else {
            Style::default().fg(Color::Gray)
        };
        let value = if field == "image" {
            wizard
                .image()
                .unwrap_or_else(|| "none (Enter to attach a file)".into())
        } else {
            wizard.draft().value(field)
        };
        let mut spans = vec![
            Span::styled(if is_focused { "> " } else { "  " }, label_style),
            Span::styled(format!("{:<18}", D::label(field)), label_style),
            Span::raw(value),
        ];
        if is_focused {
            spans.push(Span::styled("_", Style::default().fg(Color::Yellow)));
        }
        lines.push(Line::from(spans));

        if let Some(msg) = wizard.error_for(field) {
            lines.push(Line::from(Span::styled(
                format!("    {msg}"),
                Style::default().fg(Color::Red),
            )));
        }
    }
    lines
}

fn preview_lines<D: Draft>(wizard: &Wizard<D>) -> Vec<Line<'static>> {
    preview_rows(wizard.draft())
        .into_iter()
        .map(|(label, value)| {
            // Image rows read the wizard's resolved upload, not the draft.
            let value = if label == "Image" {
                wizard.image().unwrap_or_else(|| "none".into())
            } else {
                value
            };
            Line::from(vec![
                Span::styled(format!("{label:<18}"), Style::default().fg(Color::DarkGray)),
                Span::raw(value),
            ])
        })
        .collect()
}

fn footer<D: Draft>(wizard: &Wizard<D>) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    if wizard.phase() == Phase::Submitting {
        lines.push(Line::from(Span::styled(
            "Submitting...",
            Style::default().fg(Color::Yellow),
        )));
    } else if let Some(notice) = wizard.notice() {
        lines.push(Line::from(Span::styled(
            notice.to_string(),
            Style::default().fg(Color::Red),
        )));
    }

    let hint = match wizard.step() {
        WizardStep::Preview => " Enter: submit | PgUp: back | Esc: cancel",
        _ => " Tab: field | Left/Right: pick | Enter: next | PgUp: back | Esc: cancel",
    };
    lines.push(Line::from(Span::styled(
        hint,
        Style::default().fg(Color::DarkGray),
    )));
    lines
}
