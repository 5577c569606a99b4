use crate::config::{EnrichConfig, UNSPLASH_KEY_VAR};
use crate::error::{EnrichError, Result};
use reqwest::Client;
use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

const PLACEHOLDER_BASE: &str = "https://source.unsplash.com/400x300/";
const USER_AGENT: &str = "VisualNotes/0.1 (https://github.com/trapdoorsec/visualnotes)";

/// Looks up an illustration URL for a search query
pub trait ImageSource: Send + Sync {
    /// `Ok(None)` means the source had nothing for this query
    fn find_image(&self, query: &str) -> impl Future<Output = Result<Option<String>>> + Send;

    /// Image to use when a lookup fails or times out
    fn placeholder(&self, _query: &str) -> Option<String> {
        None
    }
}

/// Stand-in used when image lookup is switched off
#[derive(Debug, Clone, Copy, Default)]
pub struct NoImages;

impl ImageSource for NoImages {
    async fn find_image(&self, _query: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

/// `https://source.unsplash.com/400x300/?<query>`
pub fn placeholder_url(query: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
    format!("{}?{}", PLACEHOLDER_BASE, encoded)
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    urls: PhotoUrls,
}

#[derive(Debug, Deserialize)]
struct PhotoUrls {
    small: Option<String>,
}

/// Pull `results[0].urls.small` out of a search response body
pub fn parse_search_response(body: &str) -> Result<Option<String>> {
    let response: SearchResponse = serde_json::from_str(body)?;
    Ok(response
        .results
        .into_iter()
        .next()
        .and_then(|photo| photo.urls.small)
        .filter(|url| !url.is_empty()))
}

/// Unsplash photo search client
#[derive(Debug, Clone)]
pub struct UnsplashClient {
    client: Client,
    access_key: Option<String>,
    base_url: String,
    warned: Arc<AtomicBool>,
}

impl UnsplashClient {
    pub fn new(access_key: Option<String>) -> Result<Self> {
        Self::with_timeout(access_key, Duration::from_secs(10))
    }

    pub fn with_timeout(access_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .connect_timeout(timeout / 2)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        Ok(Self {
            client,
            access_key,
            base_url: crate::config::DEFAULT_UNSPLASH_API_URL.to_string(),
            warned: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn from_config(config: &EnrichConfig) -> Result<Self> {
        Ok(Self::with_timeout(config.unsplash_access_key.clone(), config.timeout)?
            .with_base_url(&config.unsplash_api_url))
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn has_key(&self) -> bool {
        self.access_key.is_some()
    }

    fn search_url(&self, query: &str, key: &str) -> Result<Url> {
        let url = Url::parse_with_params(
            &format!("{}/search/photos", self.base_url),
            &[
                ("query", query),
                ("client_id", key),
                ("per_page", "1"),
                ("orientation", "landscape"),
            ],
        )?;
        Ok(url)
    }

    /// One search request; `Ok(None)` when there are no results
    pub async fn search(&self, query: &str) -> Result<Option<String>> {
        let key = self.access_key.as_deref().ok_or_else(|| EnrichError::MissingApiKey {
            var: UNSPLASH_KEY_VAR.to_string(),
        })?;
        let url = self.search_url(query, key)?;

        debug!("Searching images for: {}", query);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(EnrichError::ApiStatus {
                status: status.as_u16(),
                body,
            });
        }

        parse_search_response(&body)
    }
}

impl ImageSource for UnsplashClient {
    async fn find_image(&self, query: &str) -> Result<Option<String>> {
        if !self.has_key() {
            if !self.warned.swap(true, Ordering::Relaxed) {
                warn!("{} not set, using placeholder images", UNSPLASH_KEY_VAR);
            }
            debug!("Placeholder for: {}", query);
            return Ok(self.placeholder(query));
        }

        let enhanced = format!("{} illustration", query);
        for candidate in [enhanced.as_str(), query] {
            if let Some(url) = self.search(candidate).await? {
                debug!("Found image for {} via \"{}\"", query, candidate);
                return Ok(Some(url));
            }
        }

        debug!("No search results for {}, using placeholder", query);
        Ok(self.placeholder(query))
    }

    fn placeholder(&self, query: &str) -> Option<String> {
        Some(placeholder_url(query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn photo(url: &str) -> serde_json::Value {
        json!({ "results": [{ "urls": { "small": url, "regular": "ignored" } }] })
    }

    fn client(server: &MockServer) -> UnsplashClient {
        UnsplashClient::new(Some("test-key".to_string()))
            .unwrap()
            .with_base_url(&server.uri())
    }

    #[test]
    fn test_parse_search_response() {
        let body = photo("https://images.test/cell.jpg").to_string();
        assert_eq!(
            parse_search_response(&body).unwrap().as_deref(),
            Some("https://images.test/cell.jpg")
        );
        assert_eq!(parse_search_response(r#"{"results": []}"#).unwrap(), None);
        assert_eq!(parse_search_response("{}").unwrap(), None);
        assert!(matches!(
            parse_search_response("not json"),
            Err(EnrichError::ParseError(_))
        ));
    }

    #[test]
    fn test_placeholder_url_encodes_query() {
        assert_eq!(
            placeholder_url("Natural selection"),
            "https://source.unsplash.com/400x300/?Natural+selection"
        );
        assert_eq!(placeholder_url("a&b"), "https://source.unsplash.com/400x300/?a%26b");
    }

    #[tokio::test]
    async fn test_enhanced_query_is_tried_first() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/photos"))
            .and(query_param("query", "Cells illustration"))
            .and(query_param("client_id", "test-key"))
            .and(query_param("per_page", "1"))
            .and(query_param("orientation", "landscape"))
            .respond_with(ResponseTemplate::new(200).set_body_json(photo("https://img/cells-art.jpg")))
            .expect(1)
            .mount(&server)
            .await;

        let url = client(&server).find_image("Cells").await.unwrap();
        assert_eq!(url.as_deref(), Some("https://img/cells-art.jpg"));
    }

    #[tokio::test]
    async fn test_falls_back_to_plain_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/photos"))
            .and(query_param("query", "Cells illustration"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/search/photos"))
            .and(query_param("query", "Cells"))
            .respond_with(ResponseTemplate::new(200).set_body_json(photo("https://img/cells.jpg")))
            .expect(1)
            .mount(&server)
            .await;

        let url = client(&server).find_image("Cells").await.unwrap();
        assert_eq!(url.as_deref(), Some("https://img/cells.jpg"));
    }

    #[tokio::test]
    async fn test_no_results_gives_placeholder() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/photos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
            .expect(2)
            .mount(&server)
            .await;

        let url = client(&server).find_image("Quarks").await.unwrap();
        assert_eq!(url, Some(placeholder_url("Quarks")));
    }

    #[tokio::test]
    async fn test_missing_key_skips_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(photo("https://img/x.jpg")))
            .expect(0)
            .mount(&server)
            .await;

        let client = UnsplashClient::new(None).unwrap().with_base_url(&server.uri());
        let url = client.find_image("Atoms").await.unwrap();
        assert_eq!(url, Some(placeholder_url("Atoms")));
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/photos"))
            .respond_with(ResponseTemplate::new(403).set_body_string("Rate Limit Exceeded"))
            .mount(&server)
            .await;

        let err = client(&server).find_image("Cells").await.unwrap_err();
        match err {
            EnrichError::ApiStatus { status, body } => {
                assert_eq!(status, 403);
                assert_eq!(body, "Rate Limit Exceeded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_search_without_key_is_an_error() {
        let client = UnsplashClient::new(None).unwrap();
        assert!(matches!(
            client.search("x").await,
            Err(EnrichError::MissingApiKey { .. })
        ));
    }
}
