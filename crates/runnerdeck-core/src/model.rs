use chrono::{DateTime, Duration, Utc};
use std::fmt;
use thiserror::Error;

/// Scope being monitored: one repository or a whole organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorTarget {
    Repository { owner: String, repo: String },
    Organization { org: String },
}

/// Raised when a repository spec is not exactly `owner/repo`.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid repository format {input:?}: expected owner/repo")]
pub struct InvalidRepoSpec {
    pub input: String,
}

impl MonitorTarget {
    pub fn parse_repo(input: &str) -> Result<Self, InvalidRepoSpec> {
        match input.split('/').collect::<Vec<_>>().as_slice() {
            [owner, repo] if !owner.is_empty() && !repo.is_empty() => {
                Ok(MonitorTarget::Repository {
                    owner: owner.to_string(),
                    repo: repo.to_string(),
                })
            }
            _ => Err(InvalidRepoSpec {
                input: input.to_string(),
            }),
        }
    }

    pub fn label(&self) -> String {
        match self {
            MonitorTarget::Repository { owner, repo } => format!("{owner}/{repo}"),
            MonitorTarget::Organization { org } => org.clone(),
        }
    }

    pub fn is_org(&self) -> bool {
        matches!(self, MonitorTarget::Organization { .. })
    }
}

/// Derived runner state. Never taken verbatim from the API: the raw
/// online/busy pair maps in through `from_raw`, and job claims may later
/// promote Idle to Active (but never Offline, see `reconcile`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerStatus {
    Idle,
    Active,
    Offline,
}

impl RunnerStatus {
    /// Anything the API reports that is not an online runner counts as
    /// offline.
    pub fn from_raw(status: &str, busy: bool) -> Self {
        match (status, busy) {
            ("online", true) => RunnerStatus::Active,
            ("online", false) => RunnerStatus::Idle,
            _ => RunnerStatus::Offline,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunnerStatus::Idle => "idle",
            RunnerStatus::Active => "active",
            RunnerStatus::Offline => "offline",
        }
    }
}

impl fmt::Display for RunnerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A self-hosted worker agent as observed on one poll tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Runner {
    pub id: i64,
    pub name: String,
    pub status: RunnerStatus,
    pub labels: Vec<String>,
    pub os: String,
    pub observed_at: DateTime<Utc>,
}

/// Only live jobs exist in this model; terminal statuses are filtered out at
/// the fetch boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Queued,
    InProgress,
}

impl JobStatus {
    /// Returns `None` for completed or otherwise terminal statuses.
    pub fn from_raw(status: &str) -> Option<Self> {
        match status {
            "queued" => Some(JobStatus::Queued),
            "in_progress" => Some(JobStatus::InProgress),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::InProgress => "in_progress",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One executable unit within a workflow run.
///
/// `runner_id` and `runner_name` are independently nullable: a queued job has
/// neither, and a matrix-expanded job can carry the runner name before a
/// numeric id is assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: i64,
    pub run_id: i64,
    pub name: String,
    pub status: JobStatus,
    pub runner_id: Option<i64>,
    pub runner_name: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub workflow_name: String,
    pub repository: String,
    pub html_url: String,
}

impl Job {
    pub fn is_running(&self) -> bool {
        self.status == JobStatus::InProgress
    }
}

/// One table row: a runner plus the job currently claiming it, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnifiedRow {
    pub runner: Runner,
    pub current_job: Option<Job>,
    pub elapsed: Duration,
}

/// Immutable result of one successful poll tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub rows: Vec<UnifiedRow>,
    pub fetched_at: DateTime<Utc>,
}
