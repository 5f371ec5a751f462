use crate::config::SyncConfig;
use crate::error::{Result, SyncError};
use crate::remote::{Patch, RemoteResponse, RemoteStore};
use crate::session::SessionContext;
use async_trait::async_trait;
use reelboard_core::types::{ItemId, ItemKind};
use reqwest::{Client, RequestBuilder, StatusCode};

const MAX_ERROR_BODY_CHARS: usize = 200;

/// [`RemoteStore`] over the authoring backend's REST API.
///
/// - `POST {base_url}/{kind}/{id}` with a [`Patch`] body updates one item.
/// - `GET {base_url}/{kind}` lists a board.
#[derive(Debug, Clone)]
pub struct HttpRemoteStore {
    client: Client,
    base_url: String,
}

impl HttpRemoteStore {
    pub fn new(config: &SyncConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| SyncError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn board_url(&self, kind: ItemKind) -> String {
        format!("{}/{}", self.base_url, kind)
    }

    pub fn item_url(&self, kind: ItemKind, id: &ItemId) -> String {
        format!("{}/{}/{}", self.base_url, kind, id)
    }

    async fn send(&self, request: RequestBuilder, session: &SessionContext) -> Result<RemoteResponse> {
        let request = match session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request
            .send()
            .await
            .map_err(|e| SyncError::Transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SyncError::Transport(e.to_string()))?;
        decode_response(status, &body)
    }
}

/// Turn an HTTP status and body into an envelope.
///
/// A parseable envelope wins even on error statuses, since the backend puts
/// its own code there. HTTP 401 is always treated as an expired session.
pub fn decode_response(status: StatusCode, body: &str) -> Result<RemoteResponse> {
    if status == StatusCode::UNAUTHORIZED {
        return Err(SyncError::Unauthorized {
            message: truncate(body),
        });
    }

    match serde_json::from_str::<RemoteResponse>(body) {
        Ok(envelope) => Ok(envelope),
        Err(_) if !status.is_success() => Err(SyncError::Rejected {
            code: status.as_u16() as i64,
            message: truncate(body),
        }),
        Err(e) => Err(SyncError::MalformedResponse(format!(
            "{e}: {}",
            truncate(body)
        ))),
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(MAX_ERROR_BODY_CHARS).collect()
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn update(
        &self,
        session: &SessionContext,
        kind: ItemKind,
        id: &ItemId,
        patch: &Patch,
    ) -> Result<RemoteResponse> {
        let url = self.item_url(kind, id);
        tracing::debug!("POST {} {:?}", url, patch);
        self.send(self.client.post(url).json(patch), session).await
    }

    async fn list(&self, session: &SessionContext, kind: ItemKind) -> Result<RemoteResponse> {
        let url = self.board_url(kind);
        tracing::debug!("GET {}", url);
        self.send(self.client.get(url), session).await
    }
}
