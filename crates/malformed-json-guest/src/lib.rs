//! Malformed-JSON WASM guest.
//!
//! Always answers with the same truncated response string, regardless of
//! input, to exercise the host's parse-failure path. Testing only; never
//! load this in a real deployment.

use extism_pdk::*;

/// Truncated response: the closing braces are missing on purpose.
const MALFORMED_RESPONSE: &str = r#"{"events": [{"stream": "test""#;

#[plugin_fn]
pub fn handle_event(_input: String) -> FnResult<String> {
    Ok(MALFORMED_RESPONSE.to_string())
}
