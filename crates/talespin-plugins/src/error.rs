//! Plugin error types.

/// Errors from plugin operations.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// The plugin host has been closed.
    #[error("plugin host closed")]
    HostClosed,

    /// The requested plugin is not loaded.
    #[error("plugin not found: {0}")]
    PluginNotFound(String),

    /// Plugin failed to load.
    #[error("plugin load failed: {name} - {message}")]
    LoadFailed {
        /// The plugin that failed to load.
        name: String,
        /// Failure reason.
        message: String,
    },

    /// Failed to encode an event for the guest.
    #[error("failed to encode event: {0}")]
    EncodeEvent(#[from] serde_json::Error),

    /// The guest returned syntactically invalid response JSON.
    #[error("malformed plugin response: {0}")]
    MalformedResponse(serde_json::Error),

    /// WASM runtime error (Extism).
    #[error("WASM error: {0}")]
    Wasm(String),
}

/// Result type for plugin operations.
pub type PluginResult<T> = Result<T, PluginError>;
