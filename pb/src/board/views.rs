//! Board rendering
//!
//! A pure function of the board state: no side effects, identical state
//! renders an identical frame. All user intent flows back through the key
//! handlers in `app`, never from here.

use chrono::{DateTime, Local};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};

use plansvc::Task;

use super::state::{BoardState, Focus};

/// Main render function
pub fn render(state: &BoardState, frame: &mut Frame) {
    let constraints = if state.read_only {
        vec![
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Task list
            Constraint::Length(3), // Footer
        ]
    } else {
        vec![
            Constraint::Length(3), // Header
            Constraint::Length(3), // Add bar
            Constraint::Min(0),    // Task list
            Constraint::Length(3), // Footer
        ]
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(frame.area());

    render_header(state, frame, chunks[0]);
    if state.read_only {
        render_task_list(state, frame, chunks[1]);
        render_footer(state, frame, chunks[2]);
    } else {
        render_add_bar(state, frame, chunks[1]);
        render_task_list(state, frame, chunks[2]);
        render_footer(state, frame, chunks[3]);
    }
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

/// Header: plan picker, or a static title when the board is pinned
fn render_header(state: &BoardState, frame: &mut Frame, area: Rect) {
    let line = if state.picker_visible() {
        let mut spans = Vec::new();
        for (i, plan) in state.plans.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw("  "));
            }
            let style = if Some(&plan.id) == state.selected_plan_id.as_ref() {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            spans.push(Span::styled(plan.title.as_str(), style));
        }
        if spans.is_empty() {
            spans.push(Span::styled("No plans", Style::default().fg(Color::DarkGray)));
        }
        Line::from(spans)
    } else {
        Line::from(Span::styled(
            state.pinned_plan_title(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
    };

    let header = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Plans ")
            .border_style(focus_style(state.focus == Focus::PlanPicker)),
    );
    frame.render_widget(header, area);
}

/// Add bar: title input, due-date input, and the add affordance
fn render_add_bar(state: &BoardState, frame: &mut Frame, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(50),
            Constraint::Percentage(30),
            Constraint::Min(10),
        ])
        .split(area);

    let title = Paragraph::new(state.draft_title.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" New task ")
            .border_style(focus_style(state.focus == Focus::TitleInput)),
    );
    frame.render_widget(title, chunks[0]);

    let due = Paragraph::new(state.draft_due.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Due ")
            .border_style(focus_style(state.focus == Focus::DueInput)),
    );
    frame.render_widget(due, chunks[1]);

    // The affordance only arms once there is a title to submit
    let add_style = if state.draft_title.is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    };
    let add = Paragraph::new(Span::styled("Enter: add", add_style))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(add, chunks[2]);
}

/// One row per task of the selected plan
fn render_task_list(state: &BoardState, frame: &mut Frame, area: Rect) {
    let items: Vec<ListItem> = state
        .visible_tasks()
        .iter()
        .enumerate()
        .map(|(i, task)| {
            let row = task_row(state, task);
            if i == state.task_selection.selected_index && state.focus == Focus::TaskList {
                ListItem::new(row).style(Style::default().bg(Color::DarkGray))
            } else {
                ListItem::new(row)
            }
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Tasks ")
            .border_style(focus_style(state.focus == Focus::TaskList)),
    );
    frame.render_widget(list, area);
}

fn task_row<'a>(state: &BoardState, task: &'a Task) -> Line<'a> {
    let checkbox = if task.is_complete() { "[x] " } else { "[ ] " };
    let title_style = if task.is_complete() {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default()
    };

    let mut spans = vec![
        Span::styled(checkbox, Style::default().fg(Color::Green)),
        Span::styled(task.title.as_str(), title_style),
        // The service has richer assignment data, but the assignee label is
        // a fixed placeholder until identity resolution lands
        Span::styled("  Assigned to me", Style::default().fg(Color::DarkGray)),
    ];

    if let Some(due) = &task.due_date_time {
        spans.push(Span::styled(
            format!("  due {}", format_due(due)),
            Style::default().fg(Color::Magenta),
        ));
    }

    for person_id in task.assignments.keys() {
        spans.push(Span::styled(
            format!("  {}", person_label(person_id)),
            Style::default().fg(Color::Blue),
        ));
    }

    Line::from(spans)
}

/// Footer: error banner when present, key hints otherwise
fn render_footer(state: &BoardState, frame: &mut Frame, area: Rect) {
    let line = if let Some(error) = &state.last_error {
        Line::from(Span::styled(
            format!("{} (press any key to dismiss)", error),
            Style::default().fg(Color::Red),
        ))
    } else {
        let mut spans = vec![Span::raw("q quit │ tab focus │ j/k move │ r refresh")];
        if !state.read_only {
            spans.push(Span::raw(" │ space complete │ d delete │ n new"));
        }
        spans.push(Span::styled(
            if state.signed_in { " │ signed in" } else { " │ signed out" },
            Style::default().fg(if state.signed_in { Color::Green } else { Color::Red }),
        ));
        if state.loading {
            spans.push(Span::styled(" │ loading...", Style::default().fg(Color::Yellow)));
        }
        Line::from(spans)
    };

    let footer = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}

/// Render a person reference by id
///
/// Seam for an identity resolver; the default shows the raw id.
fn person_label(person_id: &str) -> String {
    format!("@{}", person_id)
}

/// Localize a due date for display
///
/// Full timestamps are shifted to the viewer's timezone; bare dates pass
/// through; anything unparseable is shown raw.
fn format_due(raw: &str) -> String {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string();
    }
    raw.to_string()
}
