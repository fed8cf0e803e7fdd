//! Input validation utilities.
//!
//! Values that end up pasted into a user's terminal (the network check command block) are
//! checked here before they reach any rendered text.

use crate::{HelperError, HelperResult};

/// Validates that a PACS host (IP address or hostname) is safe to embed in shell commands.
///
/// The host is substituted into `ping`, `tracert`, `telnet` and `Test-NetConnection` lines
/// that users copy into a terminal, so only a conservative ASCII set is accepted:
/// - Rejects empty or whitespace-only strings
/// - Bounds the length to a DNS name maximum
/// - Restricts characters to alphanumerics, `.`, `-` and `:` (IPv6)
///
/// # Errors
///
/// Returns a `HelperError::InvalidInput` if the host is invalid.
pub fn validate_host_safe_for_commands(host: &str) -> HelperResult<()> {
    const MAX_HOST_LEN: usize = 253;

    if host.trim().is_empty() {
        return Err(HelperError::InvalidInput("PACS host cannot be empty".into()));
    }

    if host.len() > MAX_HOST_LEN {
        return Err(HelperError::InvalidInput(format!(
            "PACS host exceeds maximum length of {} characters",
            MAX_HOST_LEN
        )));
    }

    if !host.is_ascii() {
        return Err(HelperError::InvalidInput(
            "PACS host must contain only ASCII characters".into(),
        ));
    }

    let ok = host
        .bytes()
        .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' | b'.' | b'-' | b':'));

    if !ok {
        return Err(HelperError::InvalidInput(
            "PACS host contains invalid characters (only alphanumeric, '.', '-', ':' allowed)"
                .into(),
        ));
    }

    if host.starts_with('-') {
        return Err(HelperError::InvalidInput(
            "PACS host must not start with '-'".into(),
        ));
    }

    Ok(())
}
