//! Runner registry listing.

use crate::error::Result;
use crate::{GithubClient, PAGE_SIZE};
use chrono::{DateTime, Utc};
use runnerdeck_core::{MonitorTarget, Runner, RunnerStatus};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct RunnersPage {
    runners: Vec<RawRunner>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawRunner {
    id: i64,
    name: String,
    os: String,
    status: String,
    busy: bool,
    #[serde(default)]
    labels: Vec<RawLabel>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawLabel {
    name: String,
}

fn runners_path(target: &MonitorTarget) -> String {
    match target {
        MonitorTarget::Repository { owner, repo } => {
            format!("repos/{owner}/{repo}/actions/runners")
        }
        MonitorTarget::Organization { org } => format!("orgs/{org}/actions/runners"),
    }
}

fn map_runner(raw: RawRunner, observed_at: DateTime<Utc>) -> Runner {
    Runner {
        id: raw.id,
        name: raw.name,
        status: RunnerStatus::from_raw(&raw.status, raw.busy),
        labels: raw.labels.into_iter().map(|label| label.name).collect(),
        os: raw.os,
        observed_at,
    }
}

impl GithubClient {
    pub(crate) async fn fetch_runners(&self, target: &MonitorTarget) -> Result<Vec<Runner>> {
        let path = runners_path(target);
        let observed_at = Utc::now();
        let mut all = Vec::new();
        let mut page = 1usize;
        loop {
            let url = format!("{path}?per_page={PAGE_SIZE}&page={page}");
            let body: RunnersPage = self.get_json(&url).await?;
            let count = body.runners.len();
            all.extend(
                body.runners
                    .into_iter()
                    .map(|raw| map_runner(raw, observed_at)),
            );
            // A short page means the collection is exhausted.
            if count < PAGE_SIZE {
                break;
            }
            page += 1;
        }
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_cover_both_scopes() {
        let repo = MonitorTarget::parse_repo("octo/widgets").unwrap();
        assert_eq!(runners_path(&repo), "repos/octo/widgets/actions/runners");

        let org = MonitorTarget::Organization {
            org: "octo".to_string(),
        };
        assert_eq!(runners_path(&org), "orgs/octo/actions/runners");
    }

    #[test]
    fn decodes_and_maps_a_registry_page() {
        let body = r#"{
            "total_count": 2,
            "runners": [
                {
                    "id": 11,
                    "name": "builder-1",
                    "os": "linux",
                    "status": "online",
                    "busy": true,
                    "labels": [{"id": 1, "name": "self-hosted"}, {"id": 2, "name": "gpu"}]
                },
                {
                    "id": 12,
                    "name": "builder-2",
                    "os": "macos",
                    "status": "offline",
                    "busy": false
                }
            ]
        }"#;

        let page: RunnersPage = serde_json::from_str(body).unwrap();
        let observed_at = Utc::now();
        let runners: Vec<Runner> = page
            .runners
            .into_iter()
            .map(|raw| map_runner(raw, observed_at))
            .collect();

        assert_eq!(runners[0].id, 11);
        assert_eq!(runners[0].status, RunnerStatus::Active);
        assert_eq!(runners[0].labels, ["self-hosted", "gpu"]);
        assert_eq!(runners[1].status, RunnerStatus::Offline);
        assert!(runners[1].labels.is_empty());
    }
}
