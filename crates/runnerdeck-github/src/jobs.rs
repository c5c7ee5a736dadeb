//! Active-job discovery: sweep in-progress and queued workflow runs, then
//! pull each run's jobs. One failed per-run jobs fetch skips that run only,
//! so a single flaky run never blanks the whole tick.

use crate::error::Result;
use crate::{GithubClient, PAGE_SIZE};
use chrono::{DateTime, Utc};
use runnerdeck_core::{Job, JobStatus, MonitorTarget};
use serde::Deserialize;
use tracing::warn;

const ACTIVE_RUN_STATUSES: [&str; 2] = ["in_progress", "queued"];

#[derive(Debug, Deserialize)]
pub(crate) struct RunsPage {
    workflow_runs: Vec<RawRun>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawRun {
    id: i64,
    name: String,
    repository: RawRepository,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawRepository {
    full_name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JobsPage {
    jobs: Vec<RawJob>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawJob {
    id: i64,
    run_id: i64,
    name: String,
    status: String,
    #[serde(default)]
    runner_id: Option<i64>,
    #[serde(default)]
    runner_name: Option<String>,
    #[serde(default)]
    started_at: Option<DateTime<Utc>>,
    html_url: String,
}

fn runs_path(target: &MonitorTarget, status: &str) -> String {
    match target {
        MonitorTarget::Repository { owner, repo } => {
            format!("repos/{owner}/{repo}/actions/runs?status={status}")
        }
        MonitorTarget::Organization { org } => format!("orgs/{org}/actions/runs?status={status}"),
    }
}

fn run_jobs_path(owner: &str, repo: &str, run_id: i64, page: usize) -> String {
    format!("repos/{owner}/{repo}/actions/runs/{run_id}/jobs?per_page={PAGE_SIZE}&page={page}")
}

/// Owner and repo for a run's jobs path. Repo scope uses the target as-is;
/// org scope takes them from the run's own repository full name.
fn run_scope<'a>(target: &'a MonitorTarget, run: &'a RawRun) -> Option<(&'a str, &'a str)> {
    match target {
        MonitorTarget::Repository { owner, repo } => Some((owner.as_str(), repo.as_str())),
        MonitorTarget::Organization { .. } => run
            .repository
            .full_name
            .split_once('/')
            .filter(|(owner, repo)| !owner.is_empty() && !repo.is_empty() && !repo.contains('/')),
    }
}

/// `None` for jobs already in a terminal state.
fn map_job(raw: RawJob, run: &RawRun) -> Option<Job> {
    let status = JobStatus::from_raw(&raw.status)?;
    Some(Job {
        id: raw.id,
        run_id: raw.run_id,
        name: raw.name,
        status,
        runner_id: raw.runner_id,
        runner_name: raw.runner_name,
        started_at: raw.started_at,
        workflow_name: run.name.clone(),
        repository: run.repository.full_name.clone(),
        html_url: raw.html_url,
    })
}

impl GithubClient {
    pub(crate) async fn fetch_active_jobs(&self, target: &MonitorTarget) -> Result<Vec<Job>> {
        let mut all = Vec::new();
        for status in ACTIVE_RUN_STATUSES {
            let runs = self.fetch_runs(target, status).await?;
            for run in runs {
                let Some((owner, repo)) = run_scope(target, &run) else {
                    warn!(
                        run_id = run.id,
                        repository = %run.repository.full_name,
                        "skipping run with malformed repository name"
                    );
                    continue;
                };
                match self.fetch_run_jobs(owner, repo, run.id).await {
                    Ok(jobs) => {
                        all.extend(jobs.into_iter().filter_map(|raw| map_job(raw, &run)));
                    }
                    Err(error) => {
                        warn!(run_id = run.id, %error, "skipping jobs for run");
                        continue;
                    }
                }
            }
        }
        Ok(all)
    }

    /// All pages of one run's jobs, or the first error. A matrix run can
    /// expand past one page; stopping at page 1 would drop the overflow and
    /// leave their runners looking idle.
    async fn fetch_run_jobs(&self, owner: &str, repo: &str, run_id: i64) -> Result<Vec<RawJob>> {
        let mut all = Vec::new();
        let mut page = 1usize;
        loop {
            let path = run_jobs_path(owner, repo, run_id, page);
            let body: JobsPage = self.get_json(&path).await?;
            let count = body.jobs.len();
            all.extend(body.jobs);
            if count < PAGE_SIZE {
                break;
            }
            page += 1;
        }
        Ok(all)
    }

    async fn fetch_runs(&self, target: &MonitorTarget, status: &str) -> Result<Vec<RawRun>> {
        let path = runs_path(target, status);
        let mut all = Vec::new();
        let mut page = 1usize;
        loop {
            let url = format!("{path}&per_page={PAGE_SIZE}&page={page}");
            let body: RunsPage = self.get_json(&url).await?;
            let count = body.workflow_runs.len();
            all.extend(body.workflow_runs);
            if count < PAGE_SIZE {
                break;
            }
            page += 1;
        }
        Ok(all)
    }
}
