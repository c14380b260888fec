//! Task execution: optional URL fetch followed by an optional pause.

use crate::config::FetchConfig;
use crate::error::Result;
use crate::types::Task;
use async_trait::async_trait;

/// Performs the side effects of a single task
///
/// Implementations must absorb every failure: the dispatcher counts a task as
/// finished as soon as `execute` returns, whatever happened inside it.
///
/// # Examples
///
/// ```no_run
/// use task_dispatch::{FetchConfig, HttpTaskExecutor, Task, TaskExecutor};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let executor = HttpTaskExecutor::new(&FetchConfig::default())?;
/// executor
///     .execute(&Task {
///         url: "https://example.com".to_string(),
///         ..Default::default()
///     })
///     .await;
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    /// Run the task to completion
    async fn execute(&self, task: &Task);

    /// Short name for logs
    fn name(&self) -> &'static str;
}

/// Default executor: HTTP GET via a shared `reqwest` client, then sleep
#[derive(Clone, Debug)]
pub struct HttpTaskExecutor {
    client: reqwest::Client,
}

impl HttpTaskExecutor {
    /// Build the executor with the configured timeout and user agent
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { client })
    }

    /// Fetch `url` and discard the body; failures are logged only
    async fn fetch(&self, task_id: i64, url: &str) {
        match self.client.get(url).send().await {
            Ok(response) if response.status().is_success() => {
                tracing::debug!(task_id, url, status = %response.status(), "Fetched URL");
            }
            Ok(response) => {
                tracing::warn!(task_id, url, status = %response.status(), "Fetch returned non-success status");
            }
            Err(e) if e.is_timeout() => {
                tracing::warn!(task_id, url, error = %e, "Timeout fetching URL");
            }
            Err(e) if e.is_connect() => {
                tracing::warn!(task_id, url, error = %e, "Connection failed fetching URL");
            }
            Err(e) => {
                tracing::warn!(task_id, url, error = %e, "Error fetching URL");
            }
        }
    }
}

#[async_trait]
impl TaskExecutor for HttpTaskExecutor {
    async fn execute(&self, task: &Task) {
        if let Some(url) = task.fetch_url() {
            self.fetch(task.id, url).await;
        }

        if let Some(pause) = task.pause() {
            tracing::debug!(task_id = task.id, seconds = pause.as_secs(), "Sleeping");
            tokio::time::sleep(pause).await;
        }

        tracing::debug!(task_id = task.id, kind = %task.kind, "Task completed");
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn executor() -> HttpTaskExecutor {
        HttpTaskExecutor::new(&FetchConfig {
            timeout: Duration::from_secs(2),
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn fetches_the_task_url_once() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .respond_with(ResponseTemplate::new(200).set_body_string("pong"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let task = Task {
            id: 1,
            url: format!("{}/ping", mock_server.uri()),
            ..Default::default()
        };
        executor().execute(&task).await;

        // Dropping the server verifies the `expect(1)` above
        drop(mock_server);
    }

    #[tokio::test]
    async fn non_success_status_is_absorbed() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&mock_server)
            .await;

        let task = Task {
            url: format!("{}/broken", mock_server.uri()),
            ..Default::default()
        };
        executor().execute(&task).await;
    }

    #[tokio::test]
    async fn unreachable_url_is_absorbed() {
        let task = Task {
            // Port 9 (discard) on localhost is not expected to be listening
            url: "http://127.0.0.1:9/".to_string(),
            ..Default::default()
        };
        tokio::time::timeout(Duration::from_secs(5), executor().execute(&task))
            .await
            .expect("execute should return after a failed fetch");
    }

    #[tokio::test]
    async fn malformed_url_is_absorbed() {
        let task = Task {
            url: "not a url".to_string(),
            ..Default::default()
        };
        executor().execute(&task).await;
    }

    #[tokio::test]
    async fn slow_response_hits_the_configured_timeout() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(10)))
            .mount(&mock_server)
            .await;

        let executor = HttpTaskExecutor::new(&FetchConfig {
            timeout: Duration::from_millis(200),
            ..Default::default()
        })
        .unwrap();

        let started = Instant::now();
        executor
            .execute(&Task {
                url: mock_server.uri(),
                ..Default::default()
            })
            .await;
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn sleeps_for_the_requested_seconds() {
        let started = Instant::now();
        executor()
            .execute(&Task {
                sleep_duration: 1,
                ..Default::default()
            })
            .await;
        assert!(started.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test]
    async fn empty_task_returns_immediately() {
        let started = Instant::now();
        executor().execute(&Task::default()).await;
        assert!(started.elapsed() < Duration::from_millis(500));
    }
}
