//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the scraper, including:
//! - Building the HTTP client with browser-like default headers
//! - GET requests with a fixed timeout, following redirects
//! - Classifying the outcome without ever returning an error
//!
//! Retries are not handled here; see the retry module.

use crate::config::Config;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL};
use reqwest::{redirect::Policy, Client, StatusCode};
use std::future::Future;

/// Maximum number of redirects followed for one request
const MAX_REDIRECTS: usize = 10;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// The server answered 200 OK
    Success {
        /// Final URL after redirects
        final_url: String,
        /// Page body content
        body: String,
    },

    /// Any status other than 200
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, unreadable body, etc.)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    /// The page content, if the fetch produced any
    ///
    /// An empty body counts as no content.
    pub fn into_content(self) -> Option<String> {
        match self {
            FetchResult::Success { body, .. } if !body.is_empty() => Some(body),
            _ => None,
        }
    }

    /// Short description of the outcome for log messages
    pub fn describe(&self) -> String {
        match self {
            FetchResult::Success { body, .. } if body.is_empty() => "empty body".to_string(),
            FetchResult::Success { final_url, .. } => format!("ok ({})", final_url),
            FetchResult::HttpError { status_code } => format!("HTTP {}", status_code),
            FetchResult::NetworkError { error } => error.clone(),
        }
    }
}

/// Source of page content for the retry policy
///
/// Implementations must not fail: every problem is reported as a non-success
/// [`FetchResult`].
pub trait PageFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> impl Future<Output = FetchResult> + Send;
}

/// Fetcher backed by a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a fetcher with a client configured from `config`
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?))
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchResult {
        fetch_url(&self.client, url).await
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The scraper configuration (user agent, timeout, pool size)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use yc_harvest::config::Config;
/// use yc_harvest::pipeline::build_http_client;
///
/// let client = build_http_client(&Config::default()).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

    let pool_size = config.scraper.concurrency * 2;

    Client::builder()
        .user_agent(config.http.user_agent.clone())
        .default_headers(headers)
        .timeout(config.scraper.request_timeout())
        .connect_timeout(config.scraper.request_timeout())
        .redirect(Policy::limited(MAX_REDIRECTS))
        .pool_max_idle_per_host(pool_size)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL once and classifies the outcome
///
/// | Condition | Result |
/// |-----------|--------|
/// | HTTP 200 | Success with body |
/// | Any other status | HttpError |
/// | Timeout | NetworkError |
/// | Connection failure | NetworkError |
/// | Unreadable body | NetworkError |
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
pub async fn fetch_url(client: &Client, url: &str) -> FetchResult {
    match client.get(url).send().await {
        Ok(response) => {
            let status = response.status();
            let final_url = response.url().to_string();

            if status != StatusCode::OK {
                return FetchResult::HttpError {
                    status_code: status.as_u16(),
                };
            }

            match response.text().await {
                Ok(body) => FetchResult::Success { final_url, body },
                Err(e) => FetchResult::NetworkError {
                    error: e.to_string(),
                },
            }
        }
        Err(e) => {
            if e.is_timeout() {
                FetchResult::NetworkError {
                    error: "Request timeout".to_string(),
                }
            } else if e.is_connect() {
                FetchResult::NetworkError {
                    error: "Connection refused".to_string(),
                }
            } else {
                FetchResult::NetworkError {
                    error: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&Config::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_into_content() {
        let ok = FetchResult::Success {
            final_url: "https://example.com/".to_string(),
            body: "<html></html>".to_string(),
        };
        assert_eq!(ok.into_content().as_deref(), Some("<html></html>"));

        let empty = FetchResult::Success {
            final_url: "https://example.com/".to_string(),
            body: String::new(),
        };
        assert_eq!(empty.into_content(), None);

        assert_eq!(FetchResult::HttpError { status_code: 503 }.into_content(), None);
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/companies/acme"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>acme</html>"))
            .mount(&server)
            .await;

        let client = build_http_client(&Config::default()).unwrap();
        let result = fetch_url(&client, &format!("{}/companies/acme", server.uri())).await;
        assert_eq!(result.into_content().as_deref(), Some("<html>acme</html>"));
    }

    #[tokio::test]
    async fn test_fetch_follows_redirects() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/old"))
            .respond_with(
                ResponseTemplate::new(301)
                    .insert_header("location", format!("{}/new", server.uri()).as_str()),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/new"))
            .respond_with(ResponseTemplate::new(200).set_body_string("moved"))
            .mount(&server)
            .await;

        let client = build_http_client(&Config::default()).unwrap();
        match fetch_url(&client, &format!("{}/old", server.uri())).await {
            FetchResult::Success { final_url, body } => {
                assert!(final_url.ends_with("/new"));
                assert_eq!(body, "moved");
            }
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_non_200_is_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = build_http_client(&Config::default()).unwrap();
        let result = fetch_url(&client, &format!("{}/missing", server.uri())).await;
        assert!(matches!(result, FetchResult::HttpError { status_code: 404 }));
    }

    #[tokio::test]
    async fn test_fetch_timeout_is_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("too late")
                    .set_delay(std::time::Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let mut config = Config::default();
        config.scraper.request_timeout_secs = 1;
        let client = build_http_client(&config).unwrap();

        match fetch_url(&client, &format!("{}/slow", server.uri())).await {
            FetchResult::NetworkError { error } => assert_eq!(error, "Request timeout"),
            other => panic!("expected a timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_connection_failure_is_network_error() {
        let client = build_http_client(&Config::default()).unwrap();
        // Nothing listens on port 9 of the loopback interface
        let result = fetch_url(&client, "http://127.0.0.1:9/").await;
        assert!(matches!(result, FetchResult::NetworkError { .. }));
    }
}
