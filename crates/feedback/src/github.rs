//! GitHub issues as a feedback source.

use std::fmt::Write as _;

use {
    chrono::NaiveDateTime,
    reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT},
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
    tracing::debug,
};

use crate::error::{Error, Result};

const PER_PAGE: usize = 100;
const MAX_CRITICAL: usize = 5;
const MAX_MAJOR: usize = 5;
const MAX_MINOR: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    pub state: String,
    pub html_url: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub labels: Vec<Label>,
    /// Present only when the item is a pull request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request: Option<serde_json::Value>,
}

impl Issue {
    pub fn is_open(&self) -> bool {
        self.state == "open"
    }

    fn has_label(&self, needles: &[&str]) -> bool {
        self.labels.iter().any(|label| {
            let name = label.name.to_lowercase();
            needles.iter().any(|n| name.contains(n))
        })
    }

    fn created_date(&self) -> &str {
        self.created_at.get(..10).unwrap_or(&self.created_at)
    }
}

pub struct GithubClient {
    http: reqwest::Client,
    api_base: String,
    token: Option<Secret<String>>,
}

impl GithubClient {
    pub fn new(api_base: &str, token: Option<Secret<String>>) -> Result<Self> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Issues of `repo` (`owner/name`) in API order, pull requests excluded.
    pub async fn list_issues(&self, repo: &str, limit: usize) -> Result<Vec<Issue>> {
        validate_repo(repo)?;
        let url = format!(
            "{}/repos/{repo}/issues?state=all&per_page={PER_PAGE}",
            self.api_base
        );
        let mut request = self
            .http
            .get(&url)
            .header(ACCEPT, "application/vnd.github+json")
            .header(USER_AGENT, "skilldeck");
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token.expose_secret()));
        }
        let body = request.send().await?.error_for_status()?.text().await?;
        let items: Vec<Issue> = serde_json::from_str(&body)?;
        let fetched = items.len();
        let issues: Vec<Issue> = items
            .into_iter()
            .filter(|i| i.pull_request.is_none())
            .take(limit)
            .collect();
        debug!(repo, fetched, kept = issues.len(), "fetched GitHub issues");
        Ok(issues)
    }
}

fn validate_repo(repo: &str) -> Result<()> {
    match repo.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
            Ok(())
        },
        _ => Err(Error::message(format!(
            "repository must be `owner/name`, got `{repo}`"
        ))),
    }
}

#[derive(Debug, Default)]
pub struct IssueBuckets<'a> {
    pub critical: Vec<&'a Issue>,
    pub major: Vec<&'a Issue>,
    pub minor: Vec<&'a Issue>,
}

impl<'a> IssueBuckets<'a> {
    pub fn classify(issues: &'a [Issue]) -> Self {
        let mut buckets = Self::default();
        for issue in issues {
            if issue.has_label(&["bug", "critical", "p0"]) {
                buckets.critical.push(issue);
            } else if issue.has_label(&["enhancement", "p1"]) {
                buckets.major.push(issue);
            } else if issue.is_open() {
                buckets.minor.push(issue);
            }
        }
        buckets
    }
}

pub fn render_issues_report(repo: &str, issues: &[Issue], generated_at: NaiveDateTime) -> String {
    let buckets = IssueBuckets::classify(issues);
    let mut md = String::from("# GitHub Issues Analysis\n\n");
    let _ = writeln!(md, "**Repository:** {repo}");
    let _ = writeln!(md, "**Analyzed:** {}", generated_at.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(md, "**Issues:** {}\n", issues.len());

    push_bucket(&mut md, "Critical", &buckets.critical, MAX_CRITICAL);
    push_bucket(&mut md, "Major", &buckets.major, MAX_MAJOR);
    push_bucket(&mut md, "Minor", &buckets.minor, MAX_MINOR);

    md.push_str("## Label Distribution\n\n| Label | Count |\n|-------|-------|\n");
    for label in ["bug", "enhancement", "documentation"] {
        let n = issues.iter().filter(|i| i.has_label(&[label])).count();
        let _ = writeln!(md, "| {label} | {n} |");
    }

    let open = issues.iter().filter(|i| i.is_open()).count();
    md.push_str("\n## Statistics\n\n");
    let _ = writeln!(md, "- Open: {open}");
    let _ = writeln!(md, "- Closed: {}", issues.len() - open);
    let _ = writeln!(md, "- Critical: {}", buckets.critical.len());
    let _ = writeln!(md, "- Major: {}", buckets.major.len());
    let _ = writeln!(md, "- Minor (open, unlabelled): {}", buckets.minor.len());
    md
}

fn push_bucket(md: &mut String, title: &str, issues: &[&Issue], max: usize) {
    let _ = writeln!(md, "## {title} ({})\n", issues.len());
    if issues.is_empty() {
        md.push_str("_None._\n\n");
        return;
    }
    for issue in issues.iter().take(max) {
        let _ = writeln!(
            md,
            "- [#{}]({}) {} ({}, {})",
            issue.number,
            issue.html_url,
            issue.title,
            issue.state,
            issue.created_date()
        );
    }
    if issues.len() > max {
        let _ = writeln!(md, "- _{} more not shown._", issues.len() - max);
    }
    md.push('\n');
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, chrono::NaiveDate, serde_json::json};

    fn issue(number: u64, state: &str, labels: &[&str]) -> Issue {
        Issue {
            number,
            title: format!("Issue {number}"),
            state: state.into(),
            html_url: format!("https://github.com/o/r/issues/{number}"),
            created_at: "2026-03-04T05:06:07Z".into(),
            body: None,
            labels: labels.iter().map(|l| Label { name: (*l).into() }).collect(),
            pull_request: None,
        }
    }

    fn issues_json() -> String {
        json!([
            {
                "number": 1,
                "title": "Crash on lint",
                "state": "open",
                "html_url": "https://github.com/o/r/issues/1",
                "created_at": "2026-03-01T00:00:00Z",
                "body": "boom",
                "labels": [{ "name": "bug", "color": "d73a4a" }]
            },
            {
                "number": 2,
                "title": "Bump deps",
                "state": "open",
                "html_url": "https://github.com/o/r/pull/2",
                "created_at": "2026-03-02T00:00:00Z",
                "labels": [],
                "pull_request": { "url": "https://api.github.com/repos/o/r/pulls/2" }
            },
            {
                "number": 3,
                "title": "Support rst",
                "state": "closed",
                "html_url": "https://github.com/o/r/issues/3",
                "created_at": "2026-03-03T00:00:00Z",
                "body": null,
                "labels": [{ "name": "enhancement" }]
            }
        ])
        .to_string()
    }

    #[tokio::test]
    async fn list_issues_skips_pull_requests() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/repos/o/r/issues")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("state".into(), "all".into()),
                mockito::Matcher::UrlEncoded("per_page".into(), "100".into()),
            ]))
            .match_header("accept", "application/vnd.github+json")
            .match_header("user-agent", "skilldeck")
            .match_header("authorization", "Bearer ghp_test")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(issues_json())
            .create_async()
            .await;

        let client =
            GithubClient::new(&server.url(), Some(Secret::new("ghp_test".into()))).unwrap();
        let issues = client.list_issues("o/r", 50).await.unwrap();

        let numbers: Vec<_> = issues.iter().map(|i| i.number).collect();
        assert_eq!(numbers, vec![1, 3]);
        assert_eq!(issues[0].labels, vec![Label { name: "bug".into() }]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn list_issues_truncates_to_limit() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/repos/o/r/issues")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(issues_json())
            .create_async()
            .await;

        let client = GithubClient::new(&server.url(), None).unwrap();
        let issues = client.list_issues("o/r", 1).await.unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].number, 1);
    }

    #[tokio::test]
    async fn list_issues_reports_http_errors() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/repos/o/missing/issues")
            .match_query(mockito::Matcher::Any)
            .with_status(404)
            .with_body(r#"{"message":"Not Found"}"#)
            .create_async()
            .await;

        let client = GithubClient::new(&server.url(), None).unwrap();
        let err = client.list_issues("o/missing", 10).await.unwrap_err();
        assert!(matches!(err, Error::Http(_)));
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn list_issues_rejects_bad_repo() {
        let client = GithubClient::new("http://127.0.0.1:9", None).unwrap();
        for repo in ["noslash", "/r", "o/", "a/b/c"] {
            let err = client.list_issues(repo, 10).await.unwrap_err();
            assert!(err.to_string().contains("owner/name"), "{repo}");
        }
    }

    #[test]
    fn classify_buckets() {
        let issues = vec![
            issue(1, "open", &["Bug"]),
            issue(2, "open", &["P0-urgent"]),
            issue(3, "open", &["enhancement", "critical"]),
            issue(4, "closed", &["enhancement"]),
            issue(5, "open", &["question"]),
            issue(6, "closed", &[]),
        ];
        let buckets = IssueBuckets::classify(&issues);

        fn numbers(v: &[&Issue]) -> Vec<u64> {
            v.iter().map(|i| i.number).collect()
        }
        assert_eq!(numbers(&buckets.critical), vec![1, 2, 3]);
        assert_eq!(numbers(&buckets.major), vec![4]);
        assert_eq!(numbers(&buckets.minor), vec![5]);
    }

    #[test]
    fn report_caps_and_counts() {
        let mut issues: Vec<_> = (1..=7).map(|n| issue(n, "open", &["bug"])).collect();
        issues.push(issue(8, "closed", &["documentation"]));
        let at = NaiveDate::from_ymd_opt(2026, 3, 5)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let md = render_issues_report("o/r", &issues, at);
        assert!(md.contains("**Repository:** o/r"));
        assert!(md.contains("## Critical (7)"));
        assert!(md.contains("- [#1](https://github.com/o/r/issues/1) Issue 1 (open, 2026-03-04)"));
        assert!(!md.contains("[#6]"));
        assert!(md.contains("- _2 more not shown._"));
        assert!(md.contains("## Major (0)\n\n_None._"));
        assert!(md.contains("| bug | 7 |"));
        assert!(md.contains("| documentation | 1 |"));
        assert!(md.contains("- Open: 7"));
        assert!(md.contains("- Closed: 1"));
    }
}
