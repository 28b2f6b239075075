//! HTTP client for the content server's plugin API.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::error::RemoteError;
use super::protocol::{
    ErrorBody, GroupItem, GroupResponse, PagesResponse, SetGroupRequest, SetGroupResponse,
    UpdatePagesRequest, UpdatePagesResponse,
};
use super::ContentService;
use crate::models::{Page, SpaGroup};

/// Path prefix of every plugin endpoint.
const API_PREFIX: &str = "/api/plugin_api/el-x";

/// Header carrying the authentication token.
const TOKEN_HEADER: &str = "_token";

/// Longest response excerpt kept in an error message.
const MAX_ERROR_BODY: usize = 200;

/// [`ContentService`] backed by the server's JSON API.
#[derive(Debug, Clone)]
pub struct HttpContentService {
    base_url: String,
    token: String,
    http: reqwest::Client,
}

impl HttpContentService {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_url(&self, endpoint: &str) -> String {
        format!(
            "{}{}/{}",
            self.base_url.trim_end_matches('/'),
            API_PREFIX,
            endpoint
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, RemoteError> {
        let url = self.build_url(endpoint);
        tracing::debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .header(TOKEN_HEADER, &self.token)
            .send()
            .await
            .map_err(|e| RemoteError::Http(e.to_string()))?;

        read_json(response).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, RemoteError> {
        let url = self.build_url(endpoint);
        tracing::debug!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .header(TOKEN_HEADER, &self.token)
            .json(body)
            .send()
            .await
            .map_err(|e| RemoteError::Http(e.to_string()))?;

        read_json(response).await
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, RemoteError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| RemoteError::Http(e.to_string()))?;

    if !status.is_success() {
        return Err(RemoteError::Status {
            status: status.as_u16(),
            message: error_message(&body),
        });
    }

    serde_json::from_str(&body).map_err(|e| RemoteError::Decode(e.to_string()))
}

/// Prefers the server's `message` field, falling back to a body excerpt.
fn error_message(body: &str) -> String {
    if let Ok(ErrorBody {
        message: Some(message),
    }) = serde_json::from_str::<ErrorBody>(body)
    {
        return message;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "empty response".to_string();
    }
    trimmed.chars().take(MAX_ERROR_BODY).collect()
}

#[async_trait]
impl ContentService for HttpContentService {
    async fn fetch_pages(&self) -> Result<PagesResponse, RemoteError> {
        self.get_json("get_elx_pages").await
    }

    async fn fetch_default_pages(&self) -> Result<PagesResponse, RemoteError> {
        self.get_json("get_defaults_for_elx_pages").await
    }

    async fn submit_pages(&self, pages: &[Page]) -> Result<UpdatePagesResponse, RemoteError> {
        self.post_json("update_elx_pages", &UpdatePagesRequest { pages })
            .await
    }

    async fn fetch_group(&self, group: SpaGroup) -> Result<GroupResponse, RemoteError> {
        self.get_json(&format!("get_{}", group.id())).await
    }

    async fn submit_group(
        &self,
        group: SpaGroup,
        items: &[GroupItem],
    ) -> Result<SetGroupResponse, RemoteError> {
        self.post_json(&format!("set_{}", group.id()), &SetGroupRequest { items })
            .await
    }
}
