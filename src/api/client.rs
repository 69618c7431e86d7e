//! HTTP implementation of [`PaperApi`].

use async_trait::async_trait;
use http::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use http::{Method, StatusCode};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use super::{
    paper_path, ApiError, PaperApi, FALLBACK_ERROR_MESSAGE, IMPORT_PATH, PAPERS_PATH, SEARCH_PATH,
};
use crate::config::ApiConfig;
use crate::models::{
    ExternalCandidate, ExternalSearchRequest, ImportRequest, Paper, PaperDraft, PaperUpdate,
    SearchResults,
};

/// Catalog service client
///
/// Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Arc<Client>,
    base_url: Url,
    default_headers: HeaderMap,
}

impl ApiClient {
    /// Create a client for the configured endpoint
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let client = builder
            .build()
            .map_err(|e| ApiError::InvalidRequest(format!("Failed to create HTTP client: {}", e)))?;

        Self::from_client(Arc::new(client), config)
    }

    /// Create from an existing reqwest Client
    pub fn from_client(client: Arc<Client>, config: &ApiConfig) -> Result<Self, ApiError> {
        let base_url = parse_base_url(&config.base_url)?;

        let mut default_headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let (name, value) = header_pair(name, value)?;
            default_headers.insert(name, value);
        }

        Ok(Self {
            client,
            base_url,
            default_headers,
        })
    }

    /// The configured base endpoint
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Add a header sent with every request from this client
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, ApiError> {
        let (name, value) = header_pair(name, value)?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Issue one request and decode the JSON response
    ///
    /// Headers are layered: `Content-Type: application/json`, then the
    /// client's default headers, then `overrides`. A later layer replaces an
    /// earlier value for the same header.
    pub async fn send_with_headers<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        overrides: &HeaderMap,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let result = async {
            let bytes = self.execute(method.clone(), path, body, overrides).await?;
            decode(&bytes)
        }
        .await;

        log_failure(&method, path, result)
    }

    async fn send<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_with_headers(method, path, body, &HeaderMap::new())
            .await
    }

    /// Build the absolute URL for a service path
    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let joined = format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path);
        Url::parse(&joined).map_err(|e| ApiError::InvalidRequest(format!("{}: {}", joined, e)))
    }

    fn headers(&self, overrides: &HeaderMap) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in self.default_headers.iter().chain(overrides.iter()) {
            headers.insert(name.clone(), value.clone());
        }
        headers
    }

    /// Send the request and return the body of a success response
    async fn execute<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        overrides: &HeaderMap,
    ) -> Result<Vec<u8>, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(path)?;
        tracing::debug!(%method, %url, "sending catalog request");

        let mut request = self
            .client
            .request(method, url)
            .headers(self.headers(overrides));
        if let Some(body) = body {
            let payload = serde_json::to_vec(body)
                .map_err(|e| ApiError::InvalidRequest(format!("Failed to encode body: {}", e)))?;
            request = request.body(payload);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let message = error_detail(&bytes);
            return Err(if status == StatusCode::NOT_FOUND {
                ApiError::NotFound(message)
            } else {
                ApiError::Status {
                    status: status.as_u16(),
                    message,
                }
            });
        }

        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl PaperApi for ApiClient {
    async fn list_papers(&self) -> Result<Vec<Paper>, ApiError> {
        let papers: Vec<Paper> = self.send(Method::GET, PAPERS_PATH, None::<&()>).await?;
        log_failure(&Method::GET, PAPERS_PATH, validate_all(papers))
    }

    async fn get_paper(&self, id: i64) -> Result<Paper, ApiError> {
        let path = paper_path(id);
        let paper: Paper = self.send(Method::GET, &path, None::<&()>).await?;
        log_failure(&Method::GET, &path, validate(paper))
    }

    async fn create_paper(&self, draft: &PaperDraft) -> Result<Paper, ApiError> {
        let paper: Paper = self.send(Method::POST, PAPERS_PATH, Some(draft)).await?;
        log_failure(&Method::POST, PAPERS_PATH, validate(paper))
    }

    async fn update_paper(&self, id: i64, update: &PaperUpdate) -> Result<Paper, ApiError> {
        let path = paper_path(id);
        let paper: Paper = self.send(Method::PUT, &path, Some(update)).await?;
        log_failure(&Method::PUT, &path, validate(paper))
    }

    async fn delete_paper(&self, id: i64) -> Result<(), ApiError> {
        let path = paper_path(id);
        let result = self
            .execute(Method::DELETE, &path, None::<&()>, &HeaderMap::new())
            .await
            .map(|_| ());
        log_failure(&Method::DELETE, &path, result)
    }

    async fn search_external_index(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<ExternalCandidate>, ApiError> {
        let request = ExternalSearchRequest::new(query).limit(limit);
        let results: SearchResults = self.send(Method::POST, SEARCH_PATH, Some(&request)).await?;

        let mut candidates = results.into_candidates();
        candidates.truncate(limit);
        Ok(candidates)
    }

    async fn import_from_external_index(
        &self,
        external_id: &str,
        notes: &str,
    ) -> Result<Paper, ApiError> {
        let request = ImportRequest::new(external_id, notes);
        let paper: Paper = self.send(Method::POST, IMPORT_PATH, Some(&request)).await?;
        log_failure(&Method::POST, IMPORT_PATH, validate(paper))
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ApiError> {
    let url = Url::parse(raw)
        .map_err(|e| ApiError::InvalidRequest(format!("Invalid base URL '{}': {}", raw, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ApiError::InvalidRequest(format!(
            "Unsupported URL scheme '{}' in base URL '{}'",
            other, raw
        ))),
    }
}

fn header_pair(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), ApiError> {
    let name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| ApiError::InvalidRequest(format!("Invalid header name '{}': {}", name, e)))?;
    let value = HeaderValue::from_str(value)
        .map_err(|e| ApiError::InvalidRequest(format!("Invalid value for header '{}': {}", name, e)))?;
    Ok((name, value))
}

/// Pull the `detail` string out of an error body, or fall back
fn error_detail(body: &[u8]) -> String {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("detail")
                .and_then(|detail| detail.as_str())
                .filter(|detail| !detail.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string())
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(bytes).map_err(|e| ApiError::MalformedResponse(e.to_string()))
}

fn validate(paper: Paper) -> Result<Paper, ApiError> {
    paper
        .validate()
        .map_err(ApiError::MalformedResponse)
        .map(|_| paper)
}

fn validate_all(papers: Vec<Paper>) -> Result<Vec<Paper>, ApiError> {
    for paper in &papers {
        paper.validate().map_err(ApiError::MalformedResponse)?;
    }
    Ok(papers)
}

fn log_failure<T>(method: &Method, path: &str, result: Result<T, ApiError>) -> Result<T, ApiError> {
    if let Err(ref err) = result {
        tracing::error!(%method, path, error = %err, "catalog API request failed");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> ApiClient {
        ApiClient::new(&ApiConfig::with_base_url(base_url)).unwrap()
    }

    #[test]
    fn test_error_detail() {
        assert_eq!(error_detail(br#"{"detail":"Paper not found"}"#), "Paper not found");
        assert_eq!(error_detail(br#"{"detail":""}"#), FALLBACK_ERROR_MESSAGE);
        assert_eq!(error_detail(br#"{"message":"nope"}"#), FALLBACK_ERROR_MESSAGE);
        assert_eq!(
            error_detail(br#"{"detail":[{"loc":["body","title"],"msg":"field required"}]}"#),
            FALLBACK_ERROR_MESSAGE
        );
        assert_eq!(error_detail(b"<html>Bad Gateway</html>"), FALLBACK_ERROR_MESSAGE);
        assert_eq!(error_detail(b""), FALLBACK_ERROR_MESSAGE);
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let api = client("http://localhost:8000");
        assert_eq!(
            api.endpoint("/papers/").unwrap().as_str(),
            "http://localhost:8000/papers/"
        );

        let api = client("https://catalog.example.org/api/");
        assert_eq!(
            api.endpoint("/papers/3").unwrap().as_str(),
            "https://catalog.example.org/api/papers/3"
        );
    }

    #[test]
    fn test_rejects_bad_base_url() {
        assert!(matches!(
            ApiClient::new(&ApiConfig::with_base_url("not a url")),
            Err(ApiError::InvalidRequest(_))
        ));
        assert!(matches!(
            ApiClient::new(&ApiConfig::with_base_url("ftp://example.org")),
            Err(ApiError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_header_layering() {
        let mut config = ApiConfig::with_base_url("http://localhost:8000");
        config
            .headers
            .insert("x-client".to_string(), "config".to_string());
        let api = ApiClient::new(&config).unwrap();

        let mut overrides = HeaderMap::new();
        overrides.insert("x-client", HeaderValue::from_static("override"));
        overrides.insert(CONTENT_TYPE, HeaderValue::from_static("application/vnd.api+json"));

        let headers = api.headers(&overrides);
        assert_eq!(headers.get("x-client").unwrap(), "override");
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/vnd.api+json");

        let headers = api.headers(&HeaderMap::new());
        assert_eq!(headers.get("x-client").unwrap(), "config");
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[test]
    fn test_invalid_header_is_rejected() {
        let api = client("http://localhost:8000");
        assert!(matches!(
            api.with_header("bad header", "x"),
            Err(ApiError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_validate_all() {
        assert!(validate_all(vec![Paper::new(1, "A"), Paper::new(2, "B")]).is_ok());
        assert!(matches!(
            validate_all(vec![Paper::new(1, "A"), Paper::new(2, "")]),
            Err(ApiError::MalformedResponse(_))
        ));
    }
}
