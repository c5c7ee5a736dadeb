//! Application state. Poll results enter through `apply_event`, key input
//! through `handle_key`; nothing else mutates the model, and published
//! snapshots are swapped in whole, never edited in place.

use crate::poll::PollEvent;
use chrono::{DateTime, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use runnerdeck_core::{MonitorTarget, Snapshot, UnifiedRow};
use std::process::Command;
use tracing::warn;

/// Where the poller is in its Idle -> Fetching -> (Success | Failed) cycle,
/// as far as the UI knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPhase {
    Idle,
    Fetching,
    Success,
    Failed,
}

/// Side effect the key handler asks the main loop to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    Refresh,
}

pub struct App {
    pub target: MonitorTarget,
    pub phase: FetchPhase,
    pub snapshot: Option<Snapshot>,
    pub last_success: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub selected: usize,
}

impl App {
    pub fn new(target: MonitorTarget) -> Self {
        Self {
            target,
            phase: FetchPhase::Idle,
            snapshot: None,
            last_success: None,
            error: None,
            selected: 0,
        }
    }

    pub fn rows(&self) -> &[UnifiedRow] {
        self.snapshot
            .as_ref()
            .map(|snapshot| snapshot.rows.as_slice())
            .unwrap_or(&[])
    }

    pub fn selected_row(&self) -> Option<&UnifiedRow> {
        self.rows().get(self.selected)
    }

    /// A failed tick keeps the last good snapshot on screen and surfaces the
    /// error next to it; only a success clears it.
    pub fn apply_event(&mut self, event: PollEvent) {
        match event {
            PollEvent::Started => self.phase = FetchPhase::Fetching,
            PollEvent::Snapshot(snapshot) => {
                self.phase = FetchPhase::Success;
                self.last_success = Some(snapshot.fetched_at);
                self.snapshot = Some(snapshot);
                self.error = None;
                self.clamp_selection();
            }
            PollEvent::Failed { error } => {
                self.phase = FetchPhase::Failed;
                self.error = Some(error);
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Action::Quit;
        }
        match key.code {
            KeyCode::Char('q') => Action::Quit,
            KeyCode::Char('r') => Action::Refresh,
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_selection(1);
                Action::None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_selection(-1);
                Action::None
            }
            KeyCode::Enter => {
                self.open_selected_job();
                Action::None
            }
            _ => Action::None,
        }
    }

    pub fn selected_job_url(&self) -> Option<&str> {
        self.selected_row()?
            .current_job
            .as_ref()
            .map(|job| job.html_url.as_str())
    }

    fn open_selected_job(&self) {
        let Some(url) = self.selected_job_url() else {
            return;
        };
        if let Err(error) = open_url(url) {
            warn!(%error, url, "failed to open job url");
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.rows().len();
        if len == 0 {
            self.selected = 0;
            return;
        }
        let current = self.selected as isize;
        self.selected = current.saturating_add(delta).clamp(0, len as isize - 1) as usize;
    }

    fn clamp_selection(&mut self) {
        let len = self.rows().len();
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }
}

#[cfg(target_os = "macos")]
fn open_url(url: &str) -> std::io::Result<()> {
    Command::new("open").arg(url).spawn().map(|_| ())
}

#[cfg(target_os = "windows")]
fn open_url(url: &str) -> std::io::Result<()> {
    Command::new("cmd").args(["/C", "start", "", url]).spawn().map(|_| ())
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn open_url(url: &str) -> std::io::Result<()> {
    Command::new("xdg-open").arg(url).spawn().map(|_| ())
}
