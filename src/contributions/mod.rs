//! Contribution calendar from the code-hosting provider, with a REST fallback for basic stats.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::warn;

use crate::server::metrics::record_upstream_fallback;

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_GITHUB_LOGIN: &str = "yashs33244";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const CALENDAR_QUERY: &str = r#"
query($login: String!) {
  user(login: $login) {
    contributionsCollection {
      contributionCalendar {
        totalContributions
        weeks {
          contributionDays {
            contributionCount
            date
            color
          }
        }
      }
    }
  }
}
"#;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionDay {
    pub contribution_count: u32,
    pub date: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionWeek {
    #[serde(default)]
    pub contribution_days: Vec<ContributionDay>,
}

/// `total_contributions` is `None` when only the REST fallback answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contributions {
    pub total_contributions: Option<u64>,
    pub weeks: Vec<ContributionWeek>,
    pub public_repos: u64,
    pub followers: u64,
}

impl Contributions {
    pub fn empty() -> Self {
        Self {
            total_contributions: Some(0),
            weeks: Vec::new(),
            public_repos: 0,
            followers: 0,
        }
    }
}

#[derive(Deserialize)]
struct GraphQlResponse {
    data: Option<GraphQlData>,
}

#[derive(Deserialize)]
struct GraphQlData {
    user: Option<GraphQlUser>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphQlUser {
    contributions_collection: Option<ContributionsCollection>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContributionsCollection {
    contribution_calendar: Option<Calendar>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Calendar {
    total_contributions: u64,
    #[serde(default)]
    weeks: Vec<ContributionWeek>,
}

impl GraphQlResponse {
    fn calendar(self) -> Option<Calendar> {
        self.data?
            .user?
            .contributions_collection?
            .contribution_calendar
    }
}

#[derive(Deserialize, Default)]
struct UserStats {
    #[serde(default)]
    public_repos: Option<u64>,
    #[serde(default)]
    followers: Option<u64>,
}

pub struct GitHubClient {
    client: Client,
    api_url: String,
    login: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(api_url: impl Into<String>, login: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .user_agent(concat!("portfolio-server/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_default(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            login: login.into(),
            token: token.filter(|t| !t.is_empty()),
        }
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Contribution calendar and profile stats. Failures degrade to zeros.
    pub async fn contributions(&self) -> Contributions {
        match self.try_contributions().await {
            Ok(c) => c,
            Err(err) => {
                warn!("Contributions unavailable: {:#}", err);
                record_upstream_fallback("contributions");
                Contributions::empty()
            }
        }
    }

    async fn try_contributions(&self) -> Result<Contributions> {
        let response = self
            .authorized(self.client.post(format!("{}/graphql", self.api_url)))
            .json(&json!({
                "query": CALENDAR_QUERY,
                "variables": { "login": self.login },
            }))
            .send()
            .await
            .context("graphql request failed")?;

        if !response.status().is_success() {
            warn!("GraphQL returned {}, falling back to REST", response.status());
            record_upstream_fallback("contributions_rest");
            let stats = self.user_stats().await?;
            return Ok(Contributions {
                total_contributions: None,
                weeks: Vec::new(),
                public_repos: stats.public_repos.unwrap_or(0),
                followers: stats.followers.unwrap_or(0),
            });
        }

        let body: GraphQlResponse = response.json().await.context("graphql response")?;
        let Some(calendar) = body.calendar() else {
            return Ok(Contributions::empty());
        };

        let stats = self.user_stats().await?;
        Ok(Contributions {
            total_contributions: Some(calendar.total_contributions),
            weeks: calendar.weeks,
            public_repos: stats.public_repos.unwrap_or(0),
            followers: stats.followers.unwrap_or(0),
        })
    }

    async fn user_stats(&self) -> Result<UserStats> {
        self.authorized(
            self.client
                .get(format!("{}/users/{}", self.api_url, self.login)),
        )
        .send()
        .await
        .context("user request failed")?
        .json()
        .await
        .context("user response")
    }
}
