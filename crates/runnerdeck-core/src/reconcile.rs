use crate::model::{Job, Runner, RunnerStatus, UnifiedRow};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// Joins the runner and job feeds into exactly one row per runner, in runner
/// input order.
///
/// The join key is the runner name; the numeric id is only consulted for
/// jobs that carry no runner name. A matrix job can name its runner before
/// an id is assigned, so the name is the one key guaranteed present on both
/// sides. The first in-progress job claiming a runner wins; later claims on
/// the same runner are dropped.
///
/// Offline is sticky: a runner whose raw status is offline stays offline
/// even when a job claims it. Such a claim is stale data and the job is left
/// off the row entirely.
pub fn reconcile(runners: &[Runner], jobs: &[Job], now: DateTime<Utc>) -> Vec<UnifiedRow> {
    let mut by_name: HashMap<&str, usize> = HashMap::new();
    let mut by_id: HashMap<i64, usize> = HashMap::new();
    for (index, runner) in runners.iter().enumerate() {
        by_name.entry(runner.name.as_str()).or_insert(index);
        by_id.entry(runner.id).or_insert(index);
    }

    let mut claims: Vec<Option<&Job>> = vec![None; runners.len()];
    for job in jobs {
        if !job.is_running() {
            continue;
        }
        let index = match (&job.runner_name, job.runner_id) {
            (Some(name), _) => by_name.get(name.as_str()).copied(),
            (None, Some(id)) => by_id.get(&id).copied(),
            (None, None) => None,
        };
        let Some(index) = index else { continue };
        if claims[index].is_none() {
            claims[index] = Some(job);
        }
    }

    runners
        .iter()
        .zip(claims)
        .map(|(runner, claim)| {
            let mut runner = runner.clone();
            match claim {
                Some(_) if runner.status == RunnerStatus::Offline => UnifiedRow {
                    runner,
                    current_job: None,
                    elapsed: Duration::zero(),
                },
                Some(job) => {
                    runner.status = RunnerStatus::Active;
                    let elapsed = job
                        .started_at
                        .map(|started| now - started)
                        .unwrap_or_else(Duration::zero);
                    UnifiedRow {
                        runner,
                        current_job: Some(job.clone()),
                        elapsed,
                    }
                }
                None => {
                    if runner.status != RunnerStatus::Offline {
                        runner.status = RunnerStatus::Idle;
                    }
                    UnifiedRow {
                        runner,
                        current_job: None,
                        elapsed: Duration::zero(),
                    }
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::JobStatus;
    use crate::format_duration;

    fn now() -> DateTime<Utc> {
        "2026-08-28T12:00:00Z".parse().unwrap()
    }

    fn runner(id: i64, name: &str, status: RunnerStatus) -> Runner {
        Runner {
            id,
            name: name.to_string(),
            status,
            labels: vec!["self-hosted".to_string()],
            os: "linux".to_string(),
            observed_at: now(),
        }
    }

    fn job(id: i64, status: JobStatus, runner_name: Option<&str>) -> Job {
        Job {
            id,
            run_id: 9000 + id,
            name: format!("job-{id}"),
            status,
            runner_id: None,
            runner_name: runner_name.map(str::to_string),
            started_at: Some(now() - Duration::minutes(5)),
            workflow_name: "ci".to_string(),
            repository: "octo/widgets".to_string(),
            html_url: format!("https://github.com/octo/widgets/runs/{id}"),
        }
    }

    #[test]
    fn one_row_per_runner_in_input_order() {
        let runners = vec![
            runner(3, "gamma", RunnerStatus::Idle),
            runner(1, "alpha", RunnerStatus::Offline),
            runner(2, "beta", RunnerStatus::Idle),
        ];
        let jobs = vec![job(100, JobStatus::InProgress, Some("beta"))];

        let rows = reconcile(&runners, &jobs, now());

        assert_eq!(rows.len(), 3);
        let names: Vec<&str> = rows.iter().map(|r| r.runner.name.as_str()).collect();
        assert_eq!(names, ["gamma", "alpha", "beta"]);
    }

    #[test]
    fn claimed_runner_becomes_active_with_its_job() {
        let runners = vec![runner(1, "r1", RunnerStatus::Idle)];
        let jobs = vec![job(100, JobStatus::InProgress, Some("r1"))];

        let rows = reconcile(&runners, &jobs, now());

        assert_eq!(rows[0].runner.status, RunnerStatus::Active);
        assert_eq!(rows[0].current_job.as_ref().unwrap().id, 100);
        assert_eq!(rows[0].elapsed, Duration::minutes(5));
    }

    #[test]
    fn unclaimed_runner_is_idle_even_when_raw_busy() {
        let runners = vec![runner(1, "r1", RunnerStatus::Active)];

        let rows = reconcile(&runners, &[], now());

        assert_eq!(rows[0].runner.status, RunnerStatus::Idle);
        assert!(rows[0].current_job.is_none());
    }

    #[test]
    fn offline_is_sticky_against_job_claims() {
        let runners = vec![runner(2, "r2", RunnerStatus::Offline)];
        let jobs = vec![job(100, JobStatus::InProgress, Some("r2"))];

        let rows = reconcile(&runners, &jobs, now());

        assert_eq!(rows[0].runner.status, RunnerStatus::Offline);
        assert!(rows[0].current_job.is_none());
        assert_eq!(rows[0].elapsed, Duration::zero());
    }

    #[test]
    fn queued_jobs_never_claim() {
        let runners = vec![runner(1, "r1", RunnerStatus::Idle)];
        let jobs = vec![job(100, JobStatus::Queued, Some("r1"))];

        let rows = reconcile(&runners, &jobs, now());

        assert_eq!(rows[0].runner.status, RunnerStatus::Idle);
        assert!(rows[0].current_job.is_none());
    }

    #[test]
    fn matrix_job_joins_by_name_without_runner_id() {
        let runners = vec![runner(1, "r1", RunnerStatus::Idle)];
        let mut matrix = job(100, JobStatus::InProgress, Some("r1"));
        matrix.runner_id = None;

        let rows = reconcile(&runners, &[matrix], now());

        assert_eq!(rows[0].runner.status, RunnerStatus::Active);
        assert_eq!(rows[0].current_job.as_ref().unwrap().id, 100);
    }

    #[test]
    fn id_is_only_a_fallback_when_the_name_is_absent() {
        let runners = vec![runner(7, "r7", RunnerStatus::Idle)];
        let mut by_id = job(100, JobStatus::InProgress, None);
        by_id.runner_id = Some(7);
        // A name that resolves nowhere must not fall through to the id.
        let mut stale = job(101, JobStatus::InProgress, Some("gone"));
        stale.runner_id = Some(7);

        let rows = reconcile(&runners, &[stale.clone(), by_id.clone()], now());
        assert_eq!(rows[0].current_job.as_ref().unwrap().id, 100);

        let rows = reconcile(&runners, &[stale], now());
        assert!(rows[0].current_job.is_none());
    }

    #[test]
    fn first_claim_wins_and_duplicates_are_dropped() {
        let runners = vec![runner(1, "r1", RunnerStatus::Idle)];
        let jobs = vec![
            job(100, JobStatus::InProgress, Some("r1")),
            job(101, JobStatus::InProgress, Some("r1")),
        ];

        let rows = reconcile(&runners, &jobs, now());

        assert_eq!(rows[0].current_job.as_ref().unwrap().id, 100);
    }

    #[test]
    fn elapsed_is_exact_and_may_be_negative() {
        let runners = vec![runner(1, "r1", RunnerStatus::Idle)];
        let mut skewed = job(100, JobStatus::InProgress, Some("r1"));
        skewed.started_at = Some(now() + Duration::seconds(90));

        let rows = reconcile(&runners, &[skewed], now());

        assert_eq!(rows[0].elapsed, Duration::seconds(-90));
    }

    #[test]
    fn elapsed_is_zero_without_a_start_time() {
        let runners = vec![runner(1, "r1", RunnerStatus::Idle)];
        let mut unstarted = job(100, JobStatus::InProgress, Some("r1"));
        unstarted.started_at = None;

        let rows = reconcile(&runners, &[unstarted], now());

        assert_eq!(rows[0].elapsed, Duration::zero());
        assert!(rows[0].current_job.is_some());
    }

    #[test]
    fn jobs_with_no_assignment_key_are_ignored() {
        let runners = vec![runner(1, "r1", RunnerStatus::Idle)];
        let unassigned = job(100, JobStatus::InProgress, None);

        let rows = reconcile(&runners, &[unassigned], now());

        assert!(rows[0].current_job.is_none());
        assert_eq!(rows[0].runner.status, RunnerStatus::Idle);
    }

    #[test]
    fn mixed_fleet_scenario() {
        let runners = vec![
            runner(1, "r1", RunnerStatus::Idle),
            runner(2, "r2", RunnerStatus::Offline),
        ];
        let jobs = vec![job(100, JobStatus::InProgress, Some("r1"))];

        let rows = reconcile(&runners, &jobs, now());

        assert_eq!(rows[0].runner.status, RunnerStatus::Active);
        assert_eq!(rows[0].current_job.as_ref().unwrap().id, 100);
        assert_eq!(format_duration(rows[0].elapsed), "05:00");
        assert_eq!(rows[1].runner.status, RunnerStatus::Offline);
        assert!(rows[1].current_job.is_none());
    }
}
