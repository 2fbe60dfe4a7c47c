//! Builder-pattern configuration for the WASM host.

use std::time::Duration;

use crate::host::WasmHost;

/// Default maximum WASM linear memory: 64 MB.
const DEFAULT_MAX_MEMORY_BYTES: u64 = 64 * 1024 * 1024;

/// Default maximum execution time per guest call: 30 seconds.
const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Resolved host configuration.
#[derive(Debug, Clone)]
pub(crate) struct WasmHostConfig {
    /// Maximum WASM linear memory in bytes.
    pub max_memory_bytes: u64,
    /// Maximum execution time per guest call.
    pub call_timeout: Duration,
    /// Whether guests get WASI.
    pub wasi: bool,
}

impl WasmHostConfig {
    /// Memory cap in 64 KiB WASM pages, saturating at `u32::MAX`.
    pub fn max_memory_pages(&self) -> u32 {
        let pages = self.max_memory_bytes / (64 * 1024);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }
}

/// Builder for [`WasmHost`] instances.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use talespin_plugins::WasmHostBuilder;
///
/// let host = WasmHostBuilder::new()
///     .with_memory_limit(32 * 1024 * 1024) // 32 MB
///     .with_call_timeout(Duration::from_secs(10))
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct WasmHostBuilder {
    max_memory_bytes: u64,
    call_timeout: Duration,
    wasi: bool,
}

impl Default for WasmHostBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl WasmHostBuilder {
    /// Create a builder with default settings (64 MB memory, 30s timeout,
    /// WASI enabled).
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_memory_bytes: DEFAULT_MAX_MEMORY_BYTES,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            wasi: true,
        }
    }

    /// Set the maximum WASM linear memory in bytes.
    #[must_use]
    pub fn with_memory_limit(mut self, bytes: u64) -> Self {
        self.max_memory_bytes = bytes;
        self
    }

    /// Set the maximum execution time per guest call.
    #[must_use]
    pub fn with_call_timeout(mut self, duration: Duration) -> Self {
        self.call_timeout = duration;
        self
    }

    /// Enable or disable WASI for guests. Enabled by default; guests built
    /// against wasi targets need it.
    #[must_use]
    pub fn with_wasi(mut self, wasi: bool) -> Self {
        self.wasi = wasi;
        self
    }

    /// Build the host.
    #[must_use]
    pub fn build(self) -> WasmHost {
        WasmHost::new(WasmHostConfig {
            max_memory_bytes: self.max_memory_bytes,
            call_timeout: self.call_timeout,
            wasi: self.wasi,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let builder = WasmHostBuilder::new();
        assert_eq!(builder.max_memory_bytes, 64 * 1024 * 1024);
        assert_eq!(builder.call_timeout, Duration::from_secs(30));
        assert!(builder.wasi);
    }

    #[test]
    fn custom_config() {
        let builder = WasmHostBuilder::new()
            .with_memory_limit(32 * 1024 * 1024)
            .with_call_timeout(Duration::from_secs(10))
            .with_wasi(false);
        assert_eq!(builder.max_memory_bytes, 32 * 1024 * 1024);
        assert_eq!(builder.call_timeout, Duration::from_secs(10));
        assert!(!builder.wasi);
    }

    #[test]
    fn memory_pages_conversion() {
        let config = WasmHostConfig {
            max_memory_bytes: 64 * 1024 * 1024,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            wasi: true,
        };
        assert_eq!(config.max_memory_pages(), 1024);

        let huge = WasmHostConfig {
            max_memory_bytes: u64::MAX,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            wasi: true,
        };
        assert_eq!(huge.max_memory_pages(), u32::MAX);
    }
}
