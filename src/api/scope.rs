use axum::http::request::Parts;

use super::response::ApiError;

/// Standalone-mode defaults, matching what the upstream auth layer emits when
/// no auth is configured.
pub const DEFAULT_TENANT_ID: &str = "default-tenant-id";
pub const DEFAULT_ORGANIZATION_ID: &str = "default";
pub const DEFAULT_PROJECT_ID: &str = "default";

const TENANT_HEADER: &str = "x-tenant-id";
const ORGANIZATION_HEADER: &str = "x-organization-id";
const PROJECT_HEADER: &str = "x-project-id";

/// The caller's isolation boundary, resolved by the external auth middleware.
///
/// The triple arrives in trusted headers and is accepted without further
/// verification; organization is informational, tenant and project are the
/// enforced isolation keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    pub tenant_id: String,
    pub organization_id: String,
    pub project_id: String,
}

impl Default for Scope {
    fn default() -> Self {
        Self {
            tenant_id: DEFAULT_TENANT_ID.to_string(),
            organization_id: DEFAULT_ORGANIZATION_ID.to_string(),
            project_id: DEFAULT_PROJECT_ID.to_string(),
        }
    }
}

#[axum::async_trait]
impl<S: Send + Sync> axum::extract::FromRequestParts<S> for Scope {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, ApiError> {
        let header = |name: &str, default: &str| -> Result<String, ApiError> {
            match parts.headers.get(name) {
                Some(value) => value
                    .to_str()
                    .map(|s| s.to_string())
                    .map_err(|_| ApiError::bad_request(format!("Invalid {name} header"))),
                None => Ok(default.to_string()),
            }
        };

        Ok(Scope {
            tenant_id: header(TENANT_HEADER, DEFAULT_TENANT_ID)?,
            organization_id: header(ORGANIZATION_HEADER, DEFAULT_ORGANIZATION_ID)?,
            project_id: header(PROJECT_HEADER, DEFAULT_PROJECT_ID)?,
        })
    }
}
