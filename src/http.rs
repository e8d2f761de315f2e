//! # HTTP Transport and Retry Policy
//!
//! All provider traffic goes through the [`HttpTransport`] trait so that the
//! network can be replaced with an in-memory implementation in tests. The
//! default implementation, [`UreqTransport`], uses a blocking `ureq` agent.
//!
//! [`HttpClient`] layers the shared retry/backoff policy on top:
//!
//! - transport failures and 5xx responses are retried up to
//!   `max_attempts` times, sleeping `base_delay * 2^attempt` in between;
//! - a response whose rate-limit metadata reports zero remaining quota on a
//!   403/429 fails immediately with [`Error::RateLimitExceeded`];
//! - any other non-success status is a non-retryable
//!   [`Error::ProviderRequest`].

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{debug, warn};

use crate::config::{HttpSettings, RetrySettings};
use crate::error::{Error, Result};

/// Response headers carrying rate-limit metadata: GitHub, then GitLab names.
const REMAINING_HEADERS: [&str; 2] = ["x-ratelimit-remaining", "ratelimit-remaining"];
const RESET_HEADERS: [&str; 2] = ["x-ratelimit-reset", "ratelimit-reset"];

/// A response as seen by the retry layer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Header names are lower-cased.
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_ascii_lowercase(), value.into()));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Rate-limit metadata reported by a provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimit {
    pub remaining: Option<u64>,
    /// Unix timestamp at which the quota resets.
    pub reset_at: Option<u64>,
}

impl RateLimit {
    pub fn from_response(response: &HttpResponse) -> Self {
        let numeric = |names: &[&str]| {
            names
                .iter()
                .find_map(|name| response.header(name))
                .and_then(|value| value.trim().parse::<u64>().ok())
        };
        Self {
            remaining: numeric(&REMAINING_HEADERS),
            reset_at: numeric(&RESET_HEADERS),
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == Some(0)
    }
}

/// Performs a single GET request.
///
/// Implementations return `Ok` for every HTTP response regardless of status,
/// and `Err(Error::TransientProvider { .. })` when no response was received.
pub trait HttpTransport: Send + Sync {
    fn get(&self, url: &str, headers: &[(String, String)]) -> Result<HttpResponse>;
}

/// Blocking transport backed by a `ureq` agent.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
    user_agent: String,
}

impl UreqTransport {
    pub fn new(settings: &HttpSettings) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(settings.connect_timeout())
            .timeout_read(settings.read_timeout())
            .build();
        Self {
            agent,
            user_agent: settings.user_agent.clone(),
        }
    }

    fn convert(response: ureq::Response) -> Result<HttpResponse> {
        let status = response.status();
        let headers = response
            .headers_names()
            .into_iter()
            .filter_map(|name| {
                response
                    .header(&name)
                    .map(|value| (name.to_ascii_lowercase(), value.to_string()))
            })
            .collect();
        let body = response.into_string()?;
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

impl HttpTransport for UreqTransport {
    fn get(&self, url: &str, headers: &[(String, String)]) -> Result<HttpResponse> {
        let mut request = self.agent.get(url).set("User-Agent", &self.user_agent);
        for (name, value) in headers {
            request = request.set(name, value);
        }

        match request.call() {
            Ok(response) => Self::convert(response),
            Err(ureq::Error::Status(_, response)) => Self::convert(response),
            Err(ureq::Error::Transport(transport)) => Err(Error::TransientProvider {
                url: url.to_string(),
                attempts: 1,
                message: transport.to_string(),
            }),
        }
    }
}

/// Attempt bound and backoff base for provider calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Delay after the failed attempt with zero-based index `attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts.max(1),
            base_delay: Duration::from_millis(settings.base_delay_ms),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetrySettings::default())
    }
}

/// A transport wrapped with the retry/backoff and rate-limit policy.
#[derive(Clone)]
pub struct HttpClient {
    transport: Arc<dyn HttpTransport>,
    policy: RetryPolicy,
}

impl HttpClient {
    pub fn new(transport: Arc<dyn HttpTransport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// GET `url`, retrying transient failures. `provider` names the hosting
    /// provider in rate-limit errors.
    pub fn get(
        &self,
        provider: &str,
        url: &str,
        headers: &[(String, String)],
    ) -> Result<HttpResponse> {
        let mut last_failure = String::new();

        for attempt in 0..self.policy.max_attempts {
            match self.transport.get(url, headers) {
                Ok(response) => {
                    let limit = RateLimit::from_response(&response);
                    if limit.is_exhausted() {
                        if response.status == 403 || response.status == 429 {
                            return Err(Error::RateLimitExceeded {
                                provider: provider.to_string(),
                                reset_at: limit.reset_at,
                            });
                        }
                        warn!(
                            "{} API quota exhausted; further requests will fail until it resets",
                            provider
                        );
                    } else if response.status == 429 {
                        return Err(Error::RateLimitExceeded {
                            provider: provider.to_string(),
                            reset_at: limit.reset_at,
                        });
                    }

                    if response.is_success() {
                        return Ok(response);
                    }
                    if response.status < 500 {
                        return Err(Error::ProviderRequest {
                            url: url.to_string(),
                            status: response.status,
                            message: summarize_body(&response.body),
                        });
                    }
                    last_failure = format!("HTTP {}", response.status);
                }
                Err(e) if e.is_transient() => last_failure = e.to_string(),
                Err(e) => return Err(e),
            }

            if attempt + 1 < self.policy.max_attempts {
                let delay = self.policy.delay_for(attempt);
                debug!(
                    "Retry {}/{} for {} after {:?} ({})",
                    attempt + 1,
                    self.policy.max_attempts,
                    url,
                    delay,
                    last_failure
                );
                thread::sleep(delay);
            }
        }

        Err(Error::TransientProvider {
            url: url.to_string(),
            attempts: self.policy.max_attempts,
            message: last_failure,
        })
    }
}

fn summarize_body(body: &str) -> String {
    let line = body.lines().next().unwrap_or_default().trim();
    if line.chars().count() > 200 {
        format!("{}...", line.chars().take(200).collect::<String>())
    } else {
        line.to_string()
    }
}
