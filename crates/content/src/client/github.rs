//! GitHub contents API client.
//!
//! Files are read with `GET /repos/{owner}/{repo}/contents/{path}?ref={branch}`
//! and written with `PUT` on the same path. The blob `sha` returned by the API
//! is the version token.

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use url::Url;

use super::{ContentClient, RemoteFile, VersionToken};
use crate::config::ContentConfig;
use crate::error::ContentError;

const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = "glint";
const MAX_ERROR_BODY_CHARS: usize = 200;

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct FileResponse {
    sha: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: String,
}

#[derive(Debug, Serialize)]
struct WriteRequest<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct WriteResponse {
    content: WrittenFile,
}

#[derive(Debug, Deserialize)]
struct WrittenFile {
    sha: String,
}

// =============================================================================
// GitHubContentClient
// =============================================================================

/// Client for the GitHub contents API.
#[derive(Clone)]
pub struct GitHubContentClient {
    inner: Arc<GitHubContentClientInner>,
}

struct GitHubContentClientInner {
    client: reqwest::Client,
    api_url: Url,
    repo: String,
    branch: String,
    token: SecretString,
}

impl GitHubContentClient {
    /// Create a new client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::Configuration` if the HTTP client cannot be built.
    pub fn new(config: &ContentConfig) -> Result<Self, ContentError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ContentError::Configuration(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(GitHubContentClientInner {
                client,
                api_url: config.api_url.clone(),
                repo: config.repo.clone(),
                branch: config.branch.clone(),
                token: config.token.clone(),
            }),
        })
    }

    /// Build the contents URL for a repository path.
    fn contents_url(&self, path: &str, with_ref: bool) -> Result<Url, ContentError> {
        let mut url = self.inner.api_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| ContentError::Configuration("API URL cannot be a base".to_string()))?;
            segments.pop_if_empty().push("repos");
            for part in self.inner.repo.split('/') {
                segments.push(part);
            }
            segments.push("contents");
            for part in path.split('/').filter(|p| !p.is_empty()) {
                segments.push(part);
            }
        }
        if with_ref {
            url.query_pairs_mut().append_pair("ref", &self.inner.branch);
        }
        Ok(url)
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        self.inner
            .client
            .request(method, url)
            .bearer_auth(self.inner.token.expose_secret())
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
    }
}

fn transport_error(err: &reqwest::Error) -> ContentError {
    if err.is_timeout() {
        ContentError::Transient("request timed out".to_string())
    } else {
        ContentError::Transient(err.to_string())
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(MAX_ERROR_BODY_CHARS).collect()
}

/// Map a non-success status to a content error.
fn status_error(status: StatusCode, path: &str, body: &str) -> ContentError {
    let lower = body.to_lowercase();
    match status.as_u16() {
        404 => ContentError::NotFound(path.to_string()),
        401 | 403 if lower.contains("rate limit") => ContentError::Transient(truncate(body)),
        401 | 403 => ContentError::Auth(truncate(body)),
        409 => ContentError::Conflict(path.to_string()),
        422 if lower.contains("sha") => ContentError::Conflict(path.to_string()),
        429 => ContentError::Transient(truncate(body)),
        code if status.is_server_error() => {
            ContentError::Transient(format!("HTTP {code}: {}", truncate(body)))
        }
        code => ContentError::Rejected {
            status: code,
            message: truncate(body),
        },
    }
}

fn decode_file(file: &FileResponse) -> Result<Vec<u8>, ContentError> {
    if file.encoding != "base64" {
        return Err(ContentError::Decode(format!(
            "unsupported encoding {:?}",
            file.encoding
        )));
    }
    let compact: String = file
        .content
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    STANDARD
        .decode(compact)
        .map_err(|e| ContentError::Decode(e.to_string()))
}

#[async_trait]
impl ContentClient for GitHubContentClient {
    #[instrument(skip(self))]
    async fn fetch(&self, path: &str) -> Result<RemoteFile, ContentError> {
        let url = self.contents_url(path, true)?;
        let response = self
            .request(reqwest::Method::GET, url)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| transport_error(&e))?;

        if !status.is_success() {
            let err = status_error(status, path, &body);
            if !matches!(err, ContentError::NotFound(_)) {
                warn!(status = %status, error = %err, "Content fetch failed");
            }
            return Err(err);
        }

        let file: FileResponse =
            serde_json::from_str(&body).map_err(|e| ContentError::Decode(e.to_string()))?;
        let content = decode_file(&file)?;

        debug!(bytes = content.len(), sha = %file.sha, "Fetched content file");
        Ok(RemoteFile {
            content,
            token: VersionToken::new(file.sha),
        })
    }

    #[instrument(skip(self, content, token), fields(bytes = content.len(), create = token.is_none()))]
    async fn write(
        &self,
        path: &str,
        content: &[u8],
        token: Option<&VersionToken>,
        message: &str,
    ) -> Result<VersionToken, ContentError> {
        let url = self.contents_url(path, false)?;
        let request = WriteRequest {
            message,
            content: STANDARD.encode(content),
            branch: &self.inner.branch,
            sha: token.map(VersionToken::as_str),
        };

        let response = self
            .request(reqwest::Method::PUT, url)
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| transport_error(&e))?;

        if !status.is_success() {
            let err = status_error(status, path, &body);
            warn!(status = %status, error = %err, "Content write failed");
            return Err(err);
        }

        let written: WriteResponse =
            serde_json::from_str(&body).map_err(|e| ContentError::Decode(e.to_string()))?;

        debug!(sha = %written.content.sha, "Committed content file");
        Ok(VersionToken::new(written.content.sha))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn client(api_url: &str) -> GitHubContentClient {
        GitHubContentClient::new(&ContentConfig {
            api_url: Url::parse(api_url).unwrap(),
            repo: "glint/tienda".to_string(),
            branch: "main".to_string(),
            token: SecretString::from("ghp_test_token"),
            timeout: Duration::from_secs(10),
        })
        .unwrap()
    }

    #[test]
    fn test_contents_url_with_ref() {
        let url = client("https://api.github.com")
            .contents_url("files_csv/products.csv", true)
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/glint/tienda/contents/files_csv/products.csv?ref=main"
        );
    }

    #[test]
    fn test_contents_url_escapes_segments() {
        let url = client("https://ghe.example.com/api/v3/")
            .contents_url("img/aro plata.jpg", false)
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://ghe.example.com/api/v3/repos/glint/tienda/contents/img/aro%20plata.jpg"
        );
    }

    #[test]
    fn test_status_mapping() {
        let path = "files_csv/products.csv";
        assert_eq!(
            status_error(StatusCode::NOT_FOUND, path, ""),
            ContentError::NotFound(path.to_string())
        );
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, path, "Bad credentials"),
            ContentError::Auth(_)
        ));
        assert!(matches!(
            status_error(StatusCode::FORBIDDEN, path, "API rate limit exceeded"),
            ContentError::Transient(_)
        ));
        assert!(status_error(StatusCode::CONFLICT, path, "").is_conflict());
        assert!(
            status_error(
                StatusCode::UNPROCESSABLE_ENTITY,
                path,
                r#"{"message":"Invalid request.\n\n\"sha\" wasn't supplied."}"#
            )
            .is_conflict()
        );
        assert!(matches!(
            status_error(StatusCode::UNPROCESSABLE_ENTITY, path, "bad branch"),
            ContentError::Rejected { status: 422, .. }
        ));
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, path, ""),
            ContentError::Transient(_)
        ));
        assert!(matches!(
            status_error(StatusCode::BAD_GATEWAY, path, ""),
            ContentError::Transient(_)
        ));
    }

    #[test]
    fn test_decode_file_strips_line_breaks() {
        let file = FileResponse {
            sha: "abc".to_string(),
            content: "aWQsbmFt\nZQo=\n".to_string(),
            encoding: "base64".to_string(),
        };
        assert_eq!(decode_file(&file).unwrap(), b"id,name\n");
    }

    #[test]
    fn test_decode_file_rejects_unknown_encoding() {
        let file = FileResponse {
            sha: "abc".to_string(),
            content: String::new(),
            encoding: "none".to_string(),
        };
        assert!(matches!(decode_file(&file), Err(ContentError::Decode(_))));
    }

    #[test]
    fn test_write_request_omits_missing_sha() {
        let request = WriteRequest {
            message: "Nueva categoría añadida",
            content: STANDARD.encode(b"{}"),
            branch: "main",
            sha: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("sha").is_none());
        assert_eq!(json["content"], "e30=");
    }
}
