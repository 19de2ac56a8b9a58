//! Client for the remote user-listing service.
//!
//! Used by the admin users table and for file downloads. No retries and no
//! timeouts: a failure is reported once and the caller decides what to show.

use std::fmt;

use reqwest::header::{AUTHORIZATION, CONTENT_DISPOSITION, HeaderMap, HeaderValue};
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tracing::{debug, error};

use crate::config::ApiConfig;
use crate::content_disposition::extract_filename_from_content_disposition;

/// The one message the users table shows when loading fails.
pub const USERS_LOAD_ERROR: &str = "Não foi possível carregar os usuários. Tente novamente.";

/// Remote service errors.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// A user as returned by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteUser {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(alias = "nome")]
    pub name: String,
    pub email: String,
    #[serde(default, alias = "telefone")]
    pub phone: Option<String>,
    #[serde(default, alias = "cpf")]
    pub tax_id: Option<String>,
    #[serde(default, alias = "created_at")]
    pub created_at: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Str(String),
        Num(serde_json::Number),
    }
    Ok(match Id::deserialize(deserializer)? {
        Id::Str(s) => s,
        Id::Num(n) => n.to_string(),
    })
}

/// A downloaded file.
#[derive(Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    /// From `Content-Disposition`, when the server sent one.
    pub filename: Option<String>,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for DownloadedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloadedFile")
            .field("filename", &self.filename)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[derive(Debug)]
pub struct UsersApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl UsersApiClient {
    /// Create a client. `token`, when given, is sent as a bearer token.
    pub fn new(config: &ApiConfig, token: Option<&str>) -> Result<Self, ApiError> {
        if config.base_url.trim().is_empty() {
            return Err(ApiError::Config("api base_url is empty".into()));
        }

        let mut headers = HeaderMap::new();
        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| ApiError::Config("Invalid token format".into()))?;
            headers.insert(AUTHORIZATION, value);
        }

        // reqwest is built with rustls-no-provider; an `Err` here only means a
        // provider is already installed.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    pub(crate) fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    fn check_status(resp: &reqwest::Response) -> Result<(), ApiError> {
        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Api {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").into(),
            });
        }
        Ok(())
    }

    /// `GET /users`.
    pub async fn list_users(&self) -> Result<Vec<RemoteUser>, ApiError> {
        let resp = self.http.get(self.url("/users")).send().await?;
        Self::check_status(&resp)?;
        let users: Vec<RemoteUser> = resp.json().await?;
        debug!(count = users.len(), "Fetched remote users");
        Ok(users)
    }

    /// Download `path`, naming it from the `Content-Disposition` header.
    pub async fn download(&self, path: &str) -> Result<DownloadedFile, ApiError> {
        let resp = self.http.get(self.url(path)).send().await?;
        Self::check_status(&resp)?;
        let filename = resp
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(extract_filename_from_content_disposition);
        let bytes = resp.bytes().await?.to_vec();
        Ok(DownloadedFile { filename, bytes })
    }
}

/// Load rows for the admin users table. Any failure is logged and replaced
/// by [`USERS_LOAD_ERROR`].
pub async fn load_users_table(client: &UsersApiClient) -> Result<Vec<RemoteUser>, String> {
    client.list_users().await.map_err(|e| {
        error!(error = %e, "Failed to load users");
        USERS_LOAD_ERROR.to_string()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> ApiConfig {
        ApiConfig {
            base_url: base_url.into(),
        }
    }

    #[test]
    fn empty_base_url_is_config_error() {
        let err = UsersApiClient::new(&config("  "), None).unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn invalid_token_is_config_error() {
        let err = UsersApiClient::new(&config("https://api.example"), Some("bad\ntoken"))
            .unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn url_joins_paths() {
        let client = UsersApiClient::new(&config("https://api.example/v1/"), Some("t")).unwrap();
        assert_eq!(client.url("/users"), "https://api.example/v1/users");
        assert_eq!(client.url("export.csv"), "https://api.example/v1/export.csv");
    }

    #[test]
    fn remote_user_accepts_both_field_spellings() {
        let users: Vec<RemoteUser> = serde_json::from_str(
            r#"[
                {"id": 7, "nome": "Ana", "email": "ana@x.io", "telefone": "11 9999", "cpf": "123", "createdAt": "2026-01-01T00:00:00Z"},
                {"id": "u-2", "name": "Bia", "email": "bia@x.io"}
            ]"#,
        )
        .unwrap();
        assert_eq!(users[0].id, "7");
        assert_eq!(users[0].name, "Ana");
        assert_eq!(users[0].phone.as_deref(), Some("11 9999"));
        assert_eq!(users[0].tax_id.as_deref(), Some("123"));
        assert_eq!(users[0].created_at.as_deref(), Some("2026-01-01T00:00:00Z"));
        assert_eq!(users[1].id, "u-2");
        assert_eq!(users[1].phone, None);
        assert_eq!(users[1].created_at, None);
    }

    /// Serve one canned HTTP response on an ephemeral local port.
    async fn serve_once(response: String) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf).await;
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.ok();
        });
        format!("http://{addr}")
    }

    fn http_response(status: &str, headers: &[(&str, &str)], body: &str) -> String {
        let mut out = format!("HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n", body.len());
        for (name, value) in headers {
            out.push_str(&format!("{name}: {value}\r\n"));
        }
        out.push_str("\r\n");
        out.push_str(body);
        out
    }

    #[tokio::test]
    async fn list_users_parses_body() {
        let body = r#"[{"id": 1, "nome": "Ana", "email": "ana@x.io"}]"#;
        let base = serve_once(http_response(
            "200 OK",
            &[("Content-Type", "application/json")],
            body,
        ))
        .await;
        let client = UsersApiClient::new(&config(&base), Some("tok")).unwrap();
        let users = load_users_table(&client).await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].name, "Ana");
    }

    #[tokio::test]
    async fn server_error_maps_to_generic_message() {
        let base = serve_once(http_response("500 Internal Server Error", &[], "boom")).await;
        let client = UsersApiClient::new(&config(&base), None).unwrap();

        let err = client.list_users().await;
        assert!(matches!(err, Err(ApiError::Api { status: 500, .. })));
    }

    #[tokio::test]
    async fn load_users_table_hides_error_details() {
        let base = serve_once(http_response("200 OK", &[], "not json")).await;
        let client = UsersApiClient::new(&config(&base), None).unwrap();
        assert_eq!(load_users_table(&client).await.unwrap_err(), USERS_LOAD_ERROR);
    }

    #[tokio::test]
    async fn download_uses_content_disposition() {
        let base = serve_once(http_response(
            "200 OK",
            &[("Content-Disposition", "attachment; filename*=UTF-8''ganhadores%202026.csv")],
            "id;nome\n1;Ana\n",
        ))
        .await;
        let client = UsersApiClient::new(&config(&base), None).unwrap();
        let file = client.download("/exports/winners").await.unwrap();
        assert_eq!(file.filename.as_deref(), Some("ganhadores 2026.csv"));
        assert_eq!(file.bytes, b"id;nome\n1;Ana\n");
    }
}
