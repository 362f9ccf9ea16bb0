//! Organization-join collaborator seam.

use serde::{Deserialize, Serialize};

use crate::error::JoinOrgResult;

/// Body sent to `POST /user/join-org`, plus the caller context forwarded as headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinOrgRequest {
    pub org: String,
    /// Session credential of the caller, forwarded as the `auth` header.
    #[serde(skip)]
    pub auth: Option<String>,
    /// Currently selected organization, forwarded as the `showorg` header.
    #[serde(skip)]
    pub show_org: Option<String>,
}

impl JoinOrgRequest {
    pub fn new(org: impl Into<String>) -> Self {
        Self {
            org: org.into(),
            auth: None,
            show_org: None,
        }
    }
}

/// Response of the join call. `id` is the organization to show next.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct JoinOrgResponse {
    #[serde(default)]
    pub id: Option<String>,
}

impl JoinOrgResponse {
    /// The returned id, if present and non-empty.
    pub fn org_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }
}

/// Adds the current user to an organization.
///
/// Implementations perform a single attempt: no retries.
#[async_trait::async_trait]
pub trait OrgJoiner: Send + Sync {
    async fn join(&self, request: JoinOrgRequest) -> JoinOrgResult<JoinOrgResponse>;
}
