use serde::Serialize;

/// Health snapshot reported by the binary at startup.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// Description of the installed storage backend, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
}

impl HealthResponse {
    /// Storage reachable.
    pub fn ok(storage: String) -> Self {
        Self {
            status: "ok".to_owned(),
            storage: Some(storage),
        }
    }

    /// Running without a usable storage backend.
    pub fn degraded(storage: Option<String>) -> Self {
        Self {
            status: "degraded".to_owned(),
            storage,
        }
    }

    /// Whether the status is `ok`.
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}
