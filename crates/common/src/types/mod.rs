use serde::Serialize;

/// Body of `GET /health`.
#[derive(Serialize, Debug, Clone)]
pub struct Health {
    pub status: &'static str,
    /// Name of the storage backend the process was started with.
    pub storage: String,
}

/// Uniform `{"success": true}` acknowledgement used by delete endpoints.
#[derive(Serialize, Debug, Clone, Copy)]
pub struct Success {
    pub success: bool,
}

impl Success {
    pub const OK: Success = Success { success: true };
}
