//! Implements the Forge trait for Github
use async_trait::async_trait;
use graphql_client::GraphQLQuery;
use log::*;
use octocrab::Octocrab;
use serde::de::DeserializeOwned;
use std::cmp;

use crate::{
    PatchesError, Result,
    forge::{
        config::{DEFAULT_PAGE_SIZE, RemoteConfig},
        github::{
            graphql::{
                ClosingReferencesData, ClosingReferencesQuery,
                ClosingReferencesVars,
            },
            types::{
                GithubCommit, GithubIssue, GithubIssueEvent, GithubMilestone,
                GithubPullRequest,
            },
        },
        traits::Forge,
        types::{
            ClosingReference, ForgeCommit, Issue, IssueEvent, Milestone,
            PullRequest,
        },
    },
};

mod graphql;
mod types;

const USER_AGENT: &str =
    concat!("milestone-patches/", env!("CARGO_PKG_VERSION"));

/// GitHub forge implementation using Octocrab for REST and GraphQL calls and
/// a plain reqwest client for raw patch downloads.
pub struct Github {
    config: RemoteConfig,
    base_uri: String,
    instance: Octocrab,
    http: reqwest::Client,
}

impl Github {
    /// Create GitHub client with personal access token authentication and API
    /// base URL configuration.
    pub fn new(config: RemoteConfig) -> Result<Self> {
        let base_uri = config.api_base();
        let instance = Octocrab::builder()
            .personal_token(config.token.clone())
            .base_uri(base_uri.clone())?
            .build()?;

        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            config,
            base_uri,
            instance,
            http,
        })
    }

    fn repo_endpoint(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.base_uri, self.config.owner, self.config.repo, path
        )
    }

    /// Follow page numbers until a short page comes back or `limit` items
    /// have been collected.
    async fn get_paged<T: DeserializeOwned + Send>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
        limit: Option<u64>,
    ) -> Result<Vec<T>> {
        let limit = limit.unwrap_or(u64::MAX);
        let per_page = cmp::min(u64::from(DEFAULT_PAGE_SIZE), limit);
        let mut items: Vec<T> = vec![];
        let mut page = 1;

        while (items.len() as u64) < limit {
            let mut params = query.to_vec();
            params.push(("per_page", per_page.to_string()));
            params.push(("page", page.to_string()));

            debug!("fetching {endpoint} page {page}");

            let batch: Vec<T> =
                self.instance.get(endpoint, Some(&params)).await?;

            let short_page = (batch.len() as u64) < per_page;
            items.extend(batch);

            if short_page {
                break;
            }

            page += 1;
        }

        items.truncate(limit.try_into().unwrap_or(usize::MAX));

        Ok(items)
    }
}

#[async_trait]
impl Forge for Github {
    fn repo_name(&self) -> String {
        format!("{}/{}", self.config.owner, self.config.repo)
    }

    async fn get_milestone(&self, number: u64) -> Result<Milestone> {
        let endpoint = self.repo_endpoint(&format!("milestones/{number}"));
        let milestone: GithubMilestone =
            self.instance.get(endpoint, None::<&()>).await?;
        Ok(milestone.into())
    }

    async fn list_closed_issues(&self, milestone: u64) -> Result<Vec<Issue>> {
        let endpoint = self.repo_endpoint("issues");
        let query = [
            ("milestone", milestone.to_string()),
            ("state", "closed".to_string()),
        ];

        let issues: Vec<GithubIssue> =
            self.get_paged(&endpoint, &query, None).await?;

        Ok(issues.into_iter().map(Issue::from).collect())
    }

    async fn get_pull_request(&self, number: u64) -> Result<PullRequest> {
        let endpoint = self.repo_endpoint(&format!("pulls/{number}"));
        let pr: GithubPullRequest =
            self.instance.get(endpoint, None::<&()>).await?;
        Ok(pr.into())
    }

    async fn list_pr_commits(&self, number: u64) -> Result<Vec<ForgeCommit>> {
        let endpoint = self.repo_endpoint(&format!("pulls/{number}/commits"));
        let commits: Vec<GithubCommit> =
            self.get_paged(&endpoint, &[], None).await?;

        commits.into_iter().map(ForgeCommit::try_from).collect()
    }

    async fn list_issue_events(&self, number: u64) -> Result<Vec<IssueEvent>> {
        let endpoint = self.repo_endpoint(&format!("issues/{number}/events"));
        let events: Vec<GithubIssueEvent> =
            self.get_paged(&endpoint, &[], None).await?;

        Ok(events.into_iter().map(IssueEvent::from).collect())
    }

    async fn get_commit(&self, sha: &str) -> Result<ForgeCommit> {
        let endpoint = self.repo_endpoint(&format!("commits/{sha}"));
        let commit: GithubCommit =
            self.instance.get(endpoint, None::<&()>).await?;
        commit.try_into()
    }

    async fn list_commits(
        &self,
        sha: &str,
        limit: u64,
    ) -> Result<Vec<ForgeCommit>> {
        if limit == 0 {
            return Ok(vec![]);
        }

        let endpoint = self.repo_endpoint("commits");
        let query = [("sha", sha.to_string())];
        let commits: Vec<GithubCommit> =
            self.get_paged(&endpoint, &query, Some(limit)).await?;

        commits.into_iter().map(ForgeCommit::try_from).collect()
    }

    async fn closing_references(
        &self,
        issue: u64,
    ) -> Result<Vec<ClosingReference>> {
        let issue_number = i64::try_from(issue).map_err(|_| {
            PatchesError::forge(format!("issue number out of range: {issue}"))
        })?;

        let body = ClosingReferencesQuery::build_query(ClosingReferencesVars {
            owner: self.config.owner.clone(),
            repo: self.config.repo.clone(),
            issue: issue_number,
        });

        let response: graphql_client::Response<ClosingReferencesData> =
            self.instance.graphql(&body).await?;

        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            let messages = errors
                .iter()
                .map(|e| e.message.clone())
                .collect::<Vec<String>>()
                .join("; ");
            return Err(PatchesError::forge(format!(
                "closing references query for issue #{issue} failed: {messages}"
            )));
        }

        let nodes = response
            .data
            .and_then(|data| data.repository.issue)
            .map(|issue| issue.closed_by.nodes)
            .unwrap_or_default();

        Ok(nodes
            .into_iter()
            .map(|node| ClosingReference {
                permalink: node.permalink,
                merge_commit: node.merge_commit.map(|c| c.oid),
            })
            .collect())
    }

    async fn fetch_patch(&self, url: &str) -> Result<String> {
        let response = self.http.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(PatchesError::transport(status.as_u16(), url));
        }

        Ok(response.text().await?)
    }
}
