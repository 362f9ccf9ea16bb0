//! HTTP client for the backend's organization-join endpoint.

use edgegate_core::{JoinOrgError, JoinOrgRequest, JoinOrgResponse, JoinOrgResult, OrgJoiner};

use crate::config::BackendConfig;

pub const JOIN_ORG_PATH: &str = "/user/join-org";

/// `POST /user/join-org` against the internal backend.
///
/// The caller's credential and current organization are forwarded as the
/// `auth` and `showorg` headers. One attempt, bounded by the configured timeout.
#[derive(Debug, Clone)]
pub struct HttpOrgJoiner {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpOrgJoiner {
    pub fn new(config: &BackendConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            endpoint: config.url(JOIN_ORG_PATH),
        })
    }
}

#[async_trait::async_trait]
impl OrgJoiner for HttpOrgJoiner {
    async fn join(&self, request: JoinOrgRequest) -> JoinOrgResult<JoinOrgResponse> {
        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(auth) = request.auth.as_deref() {
            builder = builder.header("auth", auth);
        }
        if let Some(show_org) = request.show_org.as_deref() {
            builder = builder.header("showorg", show_org);
        }

        let res = builder.send().await.map_err(map_reqwest_error)?;

        let status = res.status();
        if !status.is_success() {
            return Err(JoinOrgError::Status(status.as_u16()));
        }

        let body = res.bytes().await.map_err(map_reqwest_error)?;
        let response: JoinOrgResponse =
            serde_json::from_slice(&body).map_err(|e| JoinOrgError::decode(e.to_string()))?;

        tracing::info!(org = %request.org, joined = response.org_id().is_some(), "joined organization");
        Ok(response)
    }
}

fn map_reqwest_error(e: reqwest::Error) -> JoinOrgError {
    if e.is_timeout() {
        JoinOrgError::Timeout
    } else {
        JoinOrgError::transport(e.to_string())
    }
}
