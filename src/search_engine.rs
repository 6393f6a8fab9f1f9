use reqwest::blocking::Client;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, UPGRADE_INSECURE_REQUESTS,
    USER_AGENT,
};
use reqwest::StatusCode;
use log::{info, warn, debug};

use crate::config::ScraperConfig;
use crate::delay_manager;
use crate::error::FetchError;

const ACCEPT_VALUE: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.9";
const ACCEPT_LANGUAGE_VALUE: &str = "en-GB;q=0.9,en-US;q=0.8,en;q=0.7";

/// A fetched result page. Only ever built from a 200 response.
#[derive(Debug, Clone)]
pub struct PageResponse {
    pub status: u16,
    pub body: String,
}

/// Anything that can turn a company name into a result page.
pub trait Fetch {
    fn fetch(&self, query: &str) -> Result<PageResponse, FetchError>;
}

pub struct SearchEngine {
    client: Client,
    config: ScraperConfig,
}

fn browser_headers(user_agent: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE));
    headers.insert(HeaderName::from_static("dpr"), HeaderValue::from_static("1"));
    headers.insert(HeaderName::from_static("sec-fetch-dest"), HeaderValue::from_static("document"));
    headers.insert(HeaderName::from_static("sec-fetch-mode"), HeaderValue::from_static("navigate"));
    headers.insert(HeaderName::from_static("sec-fetch-site"), HeaderValue::from_static("none"));
    headers.insert(HeaderName::from_static("sec-fetch-user"), HeaderValue::from_static("?1"));
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    match HeaderValue::from_str(user_agent) {
        Ok(ua) => {
            headers.insert(USER_AGENT, ua);
        }
        Err(e) => warn!("Ignoring invalid user agent '{}': {}", user_agent, e),
    }
    headers
}

impl SearchEngine {
    pub fn new(config: ScraperConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .default_headers(browser_headers(&config.user_agent))
            .build()?;

        Ok(SearchEngine { client, config })
    }

    /// One request, no retry. Anything but exactly 200 is a failure.
    fn attempt(&self, search_url: &str) -> Result<PageResponse, FetchError> {
        let resp = self.client.get(search_url).send()?;
        let status = resp.status();
        if status != StatusCode::OK {
            return Err(FetchError::from_status(status.as_u16()));
        }
        let body = resp.text()?;
        Ok(PageResponse {
            status: status.as_u16(),
            body,
        })
    }
}

impl Fetch for SearchEngine {
    fn fetch(&self, query: &str) -> Result<PageResponse, FetchError> {
        let search_url = self.config.search_url(query);
        let max_attempts = self.config.max_attempts.max(1);
        info!("Searching for: '{}'", query);

        let mut last = None;
        for attempt in 1..=max_attempts {
            match self.attempt(&search_url) {
                Ok(page) => {
                    debug!("Attempt {} for '{}' returned {} bytes", attempt, query, page.body.len());
                    return Ok(page);
                }
                Err(e) => {
                    warn!("Attempt {}/{} for '{}' failed: {}", attempt, max_attempts, query, e);
                    last = Some(e);
                }
            }
            if attempt < max_attempts {
                delay_manager::retry_delay(&self.config, attempt);
            }
        }

        Err(FetchError::Exhausted {
            query: query.to_string(),
            attempts: max_attempts,
            last: Box::new(last.unwrap_or(FetchError::BadStatus(0))),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn engine_for(server: &MockServer, attempts: u32) -> SearchEngine {
        let config = ScraperConfig::default()
            .with_endpoint(server.url("/search?q={query}&sourceid=chrome&ie=UTF-8"))
            .with_max_attempts(attempts)
            .with_request_timeout_secs(5)
            .with_backoff_base_ms(0);
        SearchEngine::new(config).unwrap()
    }

    #[test]
    fn returns_body_on_first_200() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/search").query_param("q", "Amazon");
            then.status(200)
                .header("content-type", "text/html; charset=utf-8")
                .body("<html><body>panel</body></html>");
        });

        let page = engine_for(&server, 3).fetch("Amazon").unwrap();
        mock.assert_calls(1);
        assert_eq!(page.status, 200);
        assert!(page.body.contains("panel"));
    }

    #[test]
    fn sends_browser_headers() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/search")
                .header("accept-language", ACCEPT_LANGUAGE_VALUE)
                .header("sec-fetch-mode", "navigate")
                .header("sec-fetch-user", "?1")
                .header("upgrade-insecure-requests", "1")
                .header_exists("user-agent");
            then.status(200).body("ok");
        });

        assert!(engine_for(&server, 1).fetch("Kroger").is_ok());
        mock.assert();
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/search");
            then.status(503);
        });

        let err = engine_for(&server, 3).fetch("Acme").unwrap_err();
        mock.assert_calls(3);
        match err {
            FetchError::Exhausted { query, attempts, last } => {
                assert_eq!(query, "Acme");
                assert_eq!(attempts, 3);
                assert!(matches!(*last, FetchError::BadStatus(503)));
            }
            other => panic!("expected Exhausted, got {:?}", other),
        }
    }

    #[test]
    fn non_200_success_codes_are_retried() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/search");
            then.status(204);
        });

        assert!(engine_for(&server, 2).fetch("Ebay").is_err());
        mock.assert_calls(2);
    }

    #[test]
    fn rate_limit_is_tagged() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/search");
            then.status(429);
        });

        let err = engine_for(&server, 1).fetch("Rockstar").unwrap_err();
        assert!(err.is_rate_limited());
    }

    #[test]
    fn transport_errors_become_failures() {
        // Grab a free port, then release it so the connection is refused.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let config = ScraperConfig::default()
            .with_endpoint(format!("http://127.0.0.1:{}/search?q={{query}}", port))
            .with_max_attempts(2)
            .with_request_timeout_secs(2)
            .with_backoff_base_ms(0);
        let engine = SearchEngine::new(config).unwrap();

        match engine.fetch("Walgreens").unwrap_err() {
            FetchError::Exhausted { attempts, last, .. } => {
                assert_eq!(attempts, 2);
                assert!(matches!(*last, FetchError::Transport(_)));
            }
            other => panic!("expected Exhausted, got {:?}", other),
        }
    }
}
