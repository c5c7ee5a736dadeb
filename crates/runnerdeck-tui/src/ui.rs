//! Table rendering and geometry.

use crate::state::{App, FetchPhase};
use crate::theme;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};
use runnerdeck_core::{format_duration, UnifiedRow};

const COLUMN_TITLES: [&str; 4] = ["Runner", "Status", "Job", "Time"];

// Fixed widths for the narrow columns, minimums plus a proportional share of
// the slack for the two that carry names.
const MIN_RUNNER_WIDTH: u16 = 10;
const STATUS_WIDTH: u16 = 12;
const MIN_JOB_WIDTH: u16 = 10;
const TIME_WIDTH: u16 = 10;
const CHROME_WIDTH: u16 = 7;
const RATIO_RUNNER: f64 = 0.25;

pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.size();
    let banner_height = if app.error.is_some() { 2 } else { 0 };
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(banner_height),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(frame, app, layout[0]);
    if let Some(error) = &app.error {
        render_error(frame, error, layout[1]);
    }
    if app.snapshot.is_some() {
        render_table(frame, app, layout[2]);
    } else {
        render_waiting(frame, app, layout[2]);
    }
    render_footer(frame, app, layout[3]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let scope = if app.target.is_org() {
        "Organization"
    } else {
        "Repository"
    };
    let updated = app
        .last_success
        .map(|at| at.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string());
    let lines = vec![
        Line::from(Span::styled(
            format!("runnerdeck - {scope}: {}", app.target.label()),
            theme::HEADER_STYLE,
        )),
        Line::from(Span::styled(
            format!("Last updated: {updated} | {}", phase_label(app.phase)),
            theme::MUTED_STYLE,
        )),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_error(frame: &mut Frame, error: &str, area: Rect) {
    let banner = Paragraph::new(Line::from(Span::styled(
        format!("Error: {error}"),
        theme::ERROR_STYLE,
    )))
    .wrap(Wrap { trim: true });
    frame.render_widget(banner, area);
}

fn render_waiting(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Runners");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let message = if app.error.is_some() {
        "No data yet. Press r to retry, q to quit."
    } else {
        "Waiting for the first poll..."
    };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(message, theme::MUTED_STYLE))),
        inner,
    );
}

fn render_table(frame: &mut Frame, app: &App, area: Rect) {
    let widths = column_widths(area.width);
    let header = Row::new(COLUMN_TITLES.map(Cell::from)).style(theme::HEADER_STYLE);
    let rows: Vec<Row> = app
        .rows()
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let [runner, status, job, time] = row_cells(row);
            let status_style = Style::default().fg(theme::status_color(row.runner.status));
            Row::new(vec![
                Cell::from(runner),
                Cell::from(status).style(status_style),
                Cell::from(job),
                Cell::from(time),
            ])
            .style(theme::zebra_row_style(index))
        })
        .collect();

    let table = Table::new(rows, widths.map(Constraint::Length))
        .header(header)
        .block(Block::default().borders(Borders::ALL).title("Runners"))
        .highlight_style(theme::SELECTED_STYLE);

    let mut table_state = TableState::default();
    if !app.rows().is_empty() {
        table_state.select(Some(app.selected));
    }
    frame.render_stateful_widget(table, area, &mut table_state);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let mut help = "q quit | r refresh | up/down navigate | enter open job".to_string();
    if let Some(row) = app.selected_row() {
        let labels = if row.runner.labels.is_empty() {
            "-".to_string()
        } else {
            row.runner.labels.join(", ")
        };
        help.push_str(&format!(
            " | {}: {} [{labels}]",
            row.runner.name, row.runner.os
        ));
    }
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(help, theme::MUTED_STYLE))),
        area,
    );
}

fn phase_label(phase: FetchPhase) -> &'static str {
    match phase {
        FetchPhase::Idle => "starting",
        FetchPhase::Fetching => "refreshing...",
        FetchPhase::Success => "live",
        FetchPhase::Failed => "stale",
    }
}

/// Cell text for one unified row: runner name, status with icon, job as
/// "name (workflow)" or "-", elapsed time or "-".
pub(crate) fn row_cells(row: &UnifiedRow) -> [String; 4] {
    let status = format!(
        "{} {}",
        theme::status_icon(row.runner.status),
        row.runner.status
    );
    let (job, time) = match &row.current_job {
        Some(job) => (
            format!("{} ({})", job.name, job.workflow_name),
            if job.started_at.is_some() {
                format_duration(row.elapsed)
            } else {
                "-".to_string()
            },
        ),
        None => ("-".to_string(), "-".to_string()),
    };
    [row.runner.name.clone(), status, job, time]
}

/// Distributes the width left over after every column has its minimum.
/// Status and Time stay fixed; Runner and Job absorb the slack. The total
/// never exceeds the terminal width, and never shrinks below the minimums.
pub(crate) fn column_widths(total: u16) -> [u16; 4] {
    let minimums = [MIN_RUNNER_WIDTH, STATUS_WIDTH, MIN_JOB_WIDTH, TIME_WIDTH];
    let available = total.saturating_sub(CHROME_WIDTH);
    let floor: u16 = minimums.iter().sum();
    if available <= floor {
        return minimums;
    }
    let slack = available - floor;
    let runner_extra = (f64::from(slack) * RATIO_RUNNER) as u16;
    let job_extra = slack - runner_extra;
    [
        MIN_RUNNER_WIDTH + runner_extra,
        STATUS_WIDTH,
        MIN_JOB_WIDTH + job_extra,
        TIME_WIDTH,
    ]
}
