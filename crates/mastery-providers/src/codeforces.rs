//! Codeforces submission-history provider.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;

use mastery_core::model::{ProblemRef, RawAttempt, Verdict};
use mastery_core::traits::HistoryProvider;

use crate::error::ProviderError;

pub const DEFAULT_BASE_URL: &str = "https://codeforces.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RETRY_AFTER_SECS: u64 = 2;

/// Reads a handle's full submission list from the Codeforces API.
pub struct CodeforcesProvider {
    base_url: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl CodeforcesProvider {
    pub fn new(base_url: Option<String>, timeout_secs: u64) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        let base_url = base_url
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[derive(Deserialize)]
struct CfResponse {
    status: String,
    #[serde(default)]
    comment: Option<String>,
    #[serde(default)]
    result: Option<Vec<CfSubmission>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CfSubmission {
    creation_time_seconds: i64,
    problem: CfProblem,
    #[serde(default)]
    verdict: Option<Verdict>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CfProblem {
    #[serde(default)]
    contest_id: Option<u32>,
    index: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    rating: Option<u32>,
    #[serde(default)]
    tags: Vec<String>,
}

impl From<CfSubmission> for RawAttempt {
    fn from(s: CfSubmission) -> Self {
        RawAttempt {
            verdict: s.verdict,
            problem: ProblemRef {
                contest_id: s.problem.contest_id,
                index: s.problem.index,
                name: s.problem.name,
                rating: s.problem.rating,
                tags: s.problem.tags,
            },
            created_at: s.creation_time_seconds,
        }
    }
}

#[async_trait]
impl HistoryProvider for CodeforcesProvider {
    fn name(&self) -> &str {
        "codeforces"
    }

    #[instrument(skip(self))]
    async fn fetch_history(&self, learner: &str) -> anyhow::Result<Vec<RawAttempt>> {
        let url = reqwest::Url::parse_with_params(
            &format!("{}/api/user.status", self.base_url),
            &[("handle", learner)],
        )
        .with_context(|| format!("invalid base URL: {}", self.base_url))?;

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout(self.timeout_secs)
            } else if e.is_connect() {
                ProviderError::NetworkError(format!(
                    "Codeforces not reachable at {}: {e}",
                    self.base_url
                ))
            } else {
                ProviderError::NetworkError(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        if status == 429 || status == 503 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
                * 1000;
            return Err(ProviderError::RateLimited {
                retry_after_ms: retry_after,
            }
            .into());
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout(self.timeout_secs)
            } else {
                ProviderError::NetworkError(e.to_string())
            }
        })?;

        // Failed calls come back as HTTP 400 with a JSON body explaining why.
        let api_response: CfResponse = match serde_json::from_str(&body) {
            Ok(r) => r,
            Err(_) if status >= 400 => {
                return Err(ProviderError::ApiError {
                    status,
                    message: body,
                }
                .into())
            }
            Err(e) => return Err(ProviderError::Decode(e.to_string()).into()),
        };

        if api_response.status != "OK" {
            let comment = api_response.comment.unwrap_or_default();
            if comment.contains("not found") {
                return Err(ProviderError::LearnerNotFound(learner.to_string()).into());
            }
            return Err(ProviderError::ApiError {
                status,
                message: comment,
            }
            .into());
        }

        let attempts: Vec<RawAttempt> = api_response
            .result
            .unwrap_or_default()
            .into_iter()
            .map(RawAttempt::from)
            .collect();
        tracing::debug!(learner, attempts = attempts.len(), "fetched submissions");
        Ok(attempts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> CodeforcesProvider {
        CodeforcesProvider::new(Some(server.uri()), DEFAULT_TIMEOUT_SECS).unwrap()
    }

    fn provider_error(err: &anyhow::Error) -> &ProviderError {
        err.downcast_ref::<ProviderError>()
            .expect("expected a ProviderError")
    }

    #[tokio::test]
    async fn successful_fetch() {
        let server = MockServer::start().await;

        let response_body = serde_json::json!({
            "status": "OK",
            "result": [
                {
                    "id": 2,
                    "contestId": 1520,
                    "creationTimeSeconds": 1_700_000_100,
                    "problem": {
                        "contestId": 1520,
                        "index": "F",
                        "name": "Guess the K-th Zero",
                        "rating": 1600,
                        "tags": ["binary search", "interactive"]
                    },
                    "verdict": "OK"
                },
                {
                    "id": 1,
                    "contestId": 1520,
                    "creationTimeSeconds": 1_700_000_000,
                    "problem": {
                        "contestId": 1520,
                        "index": "F",
                        "name": "Guess the K-th Zero",
                        "tags": []
                    },
                    "verdict": "WRONG_ANSWER"
                },
                {
                    "id": 3,
                    "creationTimeSeconds": 1_700_000_200,
                    "problem": {"index": "Z", "name": "Testing"}
                }
            ]
        });

        Mock::given(method("GET"))
            .and(path("/api/user.status"))
            .and(query_param("handle", "tourist"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&server)
            .await;

        let attempts = provider(&server).fetch_history("tourist").await.unwrap();
        assert_eq!(attempts.len(), 3);
        assert_eq!(attempts[0].verdict, Some(Verdict::Ok));
        assert_eq!(attempts[0].problem.key(), "1520F");
        assert_eq!(attempts[0].problem.rating, Some(1600));
        assert_eq!(attempts[0].created_at, 1_700_000_100);
        assert_eq!(attempts[1].verdict, Some(Verdict::WrongAnswer));
        assert_eq!(attempts[2].verdict, None);
        assert_eq!(attempts[2].problem.contest_id, None);
    }

    #[tokio::test]
    async fn unknown_verdicts_are_kept() {
        let server = MockServer::start().await;
        let response_body = serde_json::json!({
            "status": "OK",
            "result": [{
                "creationTimeSeconds": 1,
                "problem": {"contestId": 1, "index": "A"},
                "verdict": "SOMETHING_NEW"
            }]
        });
        Mock::given(method("GET"))
            .and(path("/api/user.status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&server)
            .await;

        let attempts = provider(&server).fetch_history("x").await.unwrap();
        assert_eq!(attempts[0].verdict, Some(Verdict::Other));
    }

    #[tokio::test]
    async fn unknown_handle() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/user.status"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "status": "FAILED",
                "comment": "handle: User with handle nobody_xyz not found"
            })))
            .mount(&server)
            .await;

        let err = provider(&server)
            .fetch_history("nobody_xyz")
            .await
            .unwrap_err();
        let err = provider_error(&err);
        assert!(matches!(err, ProviderError::LearnerNotFound(h) if h == "nobody_xyz"));
        assert!(err.is_permanent());
    }

    #[tokio::test]
    async fn other_failures_are_api_errors() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/user.status"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "status": "FAILED",
                "comment": "count: Field should contain positive integer"
            })))
            .mount(&server)
            .await;

        let err = provider(&server).fetch_history("tourist").await.unwrap_err();
        assert!(matches!(
            provider_error(&err),
            ProviderError::ApiError { status: 400, .. }
        ));
    }

    #[tokio::test]
    async fn rate_limiting() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/user.status"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "5"))
            .mount(&server)
            .await;

        let err = provider(&server).fetch_history("tourist").await.unwrap_err();
        assert!(err.to_string().contains("rate limited"));
        assert!(matches!(
            provider_error(&err),
            ProviderError::RateLimited {
                retry_after_ms: 5000
            }
        ));
    }

    #[tokio::test]
    async fn server_error_with_html_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/user.status"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
            .mount(&server)
            .await;

        let err = provider(&server).fetch_history("tourist").await.unwrap_err();
        let err = provider_error(&err);
        assert!(matches!(err, ProviderError::ApiError { status: 502, .. }));
        assert!(!err.is_permanent());
    }

    #[tokio::test]
    async fn malformed_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/user.status"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"status\": \"OK\", \"result\": ["))
            .mount(&server)
            .await;

        let err = provider(&server).fetch_history("tourist").await.unwrap_err();
        assert!(matches!(provider_error(&err), ProviderError::Decode(_)));
    }

    #[tokio::test]
    async fn slow_response_times_out() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/user.status"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"status": "OK", "result": []}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let provider = CodeforcesProvider::new(Some(server.uri()), 1).unwrap();
        let err = provider.fetch_history("tourist").await.unwrap_err();
        assert!(matches!(provider_error(&err), ProviderError::Timeout(1)));
    }

    #[test]
    fn default_base_url() {
        let provider = CodeforcesProvider::new(None, DEFAULT_TIMEOUT_SECS).unwrap();
        assert_eq!(provider.base_url(), DEFAULT_BASE_URL);
        let provider =
            CodeforcesProvider::new(Some("http://localhost:8080/".into()), 5).unwrap();
        assert_eq!(provider.base_url(), "http://localhost:8080");
    }
}
