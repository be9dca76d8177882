//! Weekly Report Tool
//!
//! GitHub contribution summary for one user over a weekly window, read
//! from the GraphQL API.

use async_trait::async_trait;
use chrono::{Datelike, Duration as ChronoDuration, Local, NaiveDate};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{http_client, require_str, whole_number, Tool, ToolOutput};
use crate::config::AgentConfig;
use crate::error::{AgentError, AgentResult};

const GRAPHQL_URL: &str = "https://api.github.com/graphql";
pub const DEFAULT_ORGANIZATION: &str = "Triple-Whale";
const MAX_RETRIES: u32 = 3;
const MAX_BACKOFF: Duration = Duration::from_secs(60);
const MAX_RESET_WAIT: Duration = Duration::from_secs(10 * 60);

const VIEWER_QUERY: &str = "query { viewer { login } }";

/// Report window for `offset` weeks back from `today`.
///
/// Offset 0 is the trailing seven days ending today. Any other offset is a
/// Sunday to Saturday week, counted back from the most recent Sunday
/// strictly before today. `None` when the window falls outside the
/// calendar chrono can represent.
pub fn date_range(today: NaiveDate, offset: u32) -> Option<(NaiveDate, NaiveDate)> {
    if offset == 0 {
        return Some((today.checked_sub_signed(ChronoDuration::days(7))?, today));
    }

    let weekday = today.weekday().num_days_from_sunday() as i64;
    let back = if weekday == 0 { 7 } else { weekday };
    let start = today.checked_sub_signed(ChronoDuration::days(back + 7 * offset as i64))?;
    Some((start, start.checked_add_signed(ChronoDuration::days(6))?))
}

/// How long to wait before retry number `retry` (0-based).
///
/// When GitHub sends `X-RateLimit-Reset` the wait runs until one second
/// past the reset, capped at ten minutes; otherwise it doubles from one
/// second, capped at a minute.
pub fn backoff_delay(retry: u32, reset_epoch_secs: Option<i64>, now_epoch_ms: i64) -> Duration {
    match reset_epoch_secs {
        Some(reset) => {
            let wait_ms = reset
                .saturating_mul(1000)
                .saturating_sub(now_epoch_ms)
                .saturating_add(1000)
                .max(0) as u64;
            Duration::from_millis(wait_ms).min(MAX_RESET_WAIT)
        }
        None => Duration::from_millis(1000u64 << retry.min(16)).min(MAX_BACKOFF),
    }
}

fn contributions_query(start: NaiveDate, end: NaiveDate) -> String {
    format!(
        r#"query($username: String!) {{
  user(login: $username) {{
    login
    name
    contributionsCollection(from: "{}T00:00:00Z", to: "{}T23:59:59Z") {{
      totalCommitContributions
      totalPullRequestContributions
      totalRepositoryContributions
      contributionCalendar {{ totalContributions }}
    }}
  }}
}}"#,
        start, end
    )
}

/// Contribution counts for one user and window
#[derive(Debug, Clone, PartialEq)]
pub struct Contributions {
    pub login: String,
    pub name: Option<String>,
    pub total: u64,
    pub commits: u64,
    pub pull_requests: u64,
    pub repositories: u64,
}

impl Contributions {
    /// Parse the `data` object of a contributions query
    pub fn from_graphql(data: &Value) -> Option<Self> {
        let user = data.get("user").filter(|u| !u.is_null())?;
        let collection = &user["contributionsCollection"];
        Some(Self {
            login: user["login"].as_str()?.to_string(),
            name: user["name"]
                .as_str()
                .filter(|n| !n.is_empty())
                .map(str::to_string),
            total: collection["contributionCalendar"]["totalContributions"]
                .as_u64()
                .unwrap_or(0),
            commits: collection["totalCommitContributions"].as_u64().unwrap_or(0),
            pull_requests: collection["totalPullRequestContributions"]
                .as_u64()
                .unwrap_or(0),
            repositories: collection["totalRepositoryContributions"]
                .as_u64()
                .unwrap_or(0),
        })
    }

    pub fn render(&self, start: NaiveDate, end: NaiveDate, organization: &str) -> String {
        let mut out = format!(
            "# Weekly Report for {} (@{})\n",
            self.name.as_deref().unwrap_or(&self.login),
            self.login
        );
        out.push_str(&format!("**Period:** {} to {}\n", start, end));
        out.push_str(&format!("**Organization:** {}\n\n", organization));

        out.push_str("## 📊 **Summary Statistics**\n\n");
        out.push_str(&format!("- **Total Contributions:** {}\n", self.total));
        out.push_str(&format!("- **Commits:** {}\n", self.commits));
        out.push_str(&format!("- **Pull Requests:** {}\n", self.pull_requests));
        out.push_str(&format!(
            "- **Repositories Contributed To:** {}\n\n",
            self.repositories
        ));

        out.push_str("## 🎯 **Activity Overview**\n\n");
        if self.commits > 0 {
            out.push_str(&format!("✅ Made {} commits this week\n", self.commits));
        }
        if self.pull_requests > 0 {
            out.push_str(&format!("🔄 Created {} pull requests\n", self.pull_requests));
        }
        if self.repositories > 0 {
            out.push_str(&format!("📂 Contributed to {} repositories\n", self.repositories));
        }
        if self.total == 0 {
            out.push_str("ℹ️ No public contributions found for this period\n");
        }

        out.push_str("\n---\n\n");
        out.push_str("*Report generated using GitHub's contributions API*\n");
        out.push_str("*Note: This includes public contributions only*");
        out
    }
}

pub struct WeeklyReportTool {
    client: Client,
    token: Option<String>,
}

impl WeeklyReportTool {
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            client: http_client(config),
            token: config.github_token.clone(),
        }
    }

    /// POST a GraphQL query, retrying on rate limits
    async fn graphql(&self, token: &str, query: &str, variables: Value) -> AgentResult<Value> {
        let body = json!({ "query": query, "variables": variables });
        let mut retry = 0;

        loop {
            debug!("GitHub GraphQL request: {}", variables);
            let response = self
                .client
                .post(GRAPHQL_URL)
                .bearer_auth(token)
                .header("Accept", "application/vnd.github.v4+json")
                .json(&body)
                .send()
                .await?;

            let status = response.status();
            let header = |name: &str| {
                response
                    .headers()
                    .get(name)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string)
            };
            let rate_limited = status == StatusCode::TOO_MANY_REQUESTS
                || (status == StatusCode::FORBIDDEN
                    && header("x-ratelimit-remaining").as_deref() == Some("0"));

            if rate_limited {
                if retry >= MAX_RETRIES {
                    return Err(AgentError::Tool(
                        "GitHub API rate limit exceeded. Please try again later.".to_string(),
                    ));
                }
                let reset = header("x-ratelimit-reset").and_then(|r| r.parse::<i64>().ok());
                let wait = backoff_delay(retry, reset, chrono::Utc::now().timestamp_millis());
                warn!(
                    "Rate limit hit. Retrying in {} seconds (retry {}/{})",
                    wait.as_secs(),
                    retry + 1,
                    MAX_RETRIES
                );
                tokio::time::sleep(wait).await;
                retry += 1;
                continue;
            }

            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                return Err(AgentError::Tool(format!(
                    "GitHub GraphQL API error ({}): {}",
                    status.as_u16(),
                    text
                )));
            }

            let data: Value = response.json().await?;
            if let Some(errors) = data.get("errors").filter(|e| !e.is_null()) {
                return Err(AgentError::Tool(format!(
                    "GitHub GraphQL response errors: {}",
                    errors
                )));
            }
            return Ok(data["data"].clone());
        }
    }

    async fn report(
        &self,
        username: &str,
        (start, end): (NaiveDate, NaiveDate),
        organization: &str,
    ) -> Result<String, String> {
        let token = self.token.as_deref().ok_or_else(|| {
            "GitHub token is required. Please set GITHUB_TOKEN in your environment variables."
                .to_string()
        })?;

        self.graphql(token, VIEWER_QUERY, json!({}))
            .await
            .map_err(|e| format!("GitHub token validation failed - {}", e))?;

        info!("Weekly report for {} from {} to {}", username, start, end);

        let data = self
            .graphql(
                token,
                &contributions_query(start, end),
                json!({ "username": username }),
            )
            .await
            .map_err(|e| e.to_string())?;

        let contributions = Contributions::from_graphql(&data)
            .ok_or_else(|| format!("GitHub user '{}' not found", username))?;
        Ok(contributions.render(start, end, organization))
    }
}

#[async_trait]
impl Tool for WeeklyReportTool {
    fn name(&self) -> String {
        "weekly_report".to_string()
    }

    fn description(&self) -> String {
        "Generate comprehensive GitHub activity reports including contribution statistics for a \
         specific user over a weekly period. Useful for team reports, performance reviews, and \
         activity tracking."
            .to_string()
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "username": { "type": "string", "description": "GitHub username to generate report for" },
                "offset": {
                    "type": "integer",
                    "minimum": 0,
                    "default": 0,
                    "description": "Offset the week range by this many weeks (default: 0 for last 7 days)"
                },
                "generateSummary": {
                    "type": "boolean",
                    "default": false,
                    "description": "Whether to generate an AI summary (reserved)"
                },
                "organization": {
                    "type": "string",
                    "default": DEFAULT_ORGANIZATION,
                    "description": "GitHub organization name"
                }
            },
            "required": ["username"]
        })
    }

    fn requires_approval(&self, _params: &Value) -> bool {
        true
    }

    fn approval_note(&self) -> Option<String> {
        Some("always".to_string())
    }

    fn cacheable(&self) -> bool {
        false
    }

    async fn execute(&self, params: Value) -> AgentResult<ToolOutput> {
        let username = require_str(&params, "username")?.trim();
        if username.is_empty() {
            return Ok(ToolOutput::failure(
                "Error generating weekly report: Username cannot be empty",
            ));
        }

        let offset = match &params["offset"] {
            Value::Null => 0,
            v => match whole_number(v).and_then(|o| u32::try_from(o).ok()) {
                Some(o) => o,
                None => {
                    return Ok(ToolOutput::failure(
                        "Error generating weekly report: Offset must be a non-negative number of weeks",
                    ))
                }
            },
        };
        let Some(window) = date_range(Local::now().date_naive(), offset) else {
            return Ok(ToolOutput::failure(
                "Error generating weekly report: Offset is out of range",
            ));
        };
        let organization = params["organization"]
            .as_str()
            .filter(|o| !o.trim().is_empty())
            .unwrap_or(DEFAULT_ORGANIZATION);
        let generate_summary = params["generateSummary"].as_bool().unwrap_or(false);

        match self.report(username, window, organization).await {
            Ok(report) => {
                let mut text = String::from("📊 **GitHub Weekly Report Generated**\n\n");
                text.push_str(&format!("👤 **User:** {}\n", username));
                text.push_str(&format!("🏢 **Organization:** {}\n", organization));
                if offset != 0 {
                    text.push_str(&format!("📅 **Week Offset:** {} weeks ago\n", offset));
                }
                text.push_str(&format!("\n---\n\n{}", report));

                Ok(ToolOutput::success(
                    json!({
                        "username": username,
                        "organization": organization,
                        "offset": offset,
                        "generateSummary": generate_summary,
                        "report": report,
                    }),
                    text,
                ))
            }
            Err(message) => {
                warn!("Weekly report failed: {}", message);
                Ok(ToolOutput::failure(format!(
                    "Error generating weekly report: {}",
                    message
                )))
            }
        }
    }
}
