//! Static help panels.
//!
//! The universal fix and clear-cache how-to come from catalog data. The network check panel is
//! a block of commands for the user to run themselves: nothing here probes the network.

use crate::catalog::{Catalog, HelpPanel};
use crate::constants::{DICOM_PORT, PACS_HOST_PLACEHOLDER, VIEWER_PORT};
use crate::validation::validate_host_safe_for_commands;
use crate::HelperResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelKind {
    UniversalFix,
    ClearCache,
}

impl PanelKind {
    pub fn panel(self, catalog: &Catalog) -> &HelpPanel {
        match self {
            PanelKind::UniversalFix => &catalog.panels().universal_fix,
            PanelKind::ClearCache => &catalog.panels().clear_cache,
        }
    }
}

/// Render the ping / traceroute / port check commands for `host`.
///
/// Without a host the `YOUR_PACS_IP_HERE` placeholder is used so the user can fill it in.
///
/// # Errors
///
/// Returns `HelperError::InvalidInput` if `host` is not safe to paste into a shell.
pub fn network_check_commands(host: Option<&str>) -> HelperResult<String> {
    let host = match host.map(str::trim).filter(|h| !h.is_empty()) {
        Some(host) => {
            validate_host_safe_for_commands(host)?;
            host
        }
        None => PACS_HOST_PLACEHOLDER,
    };

    let commands = [
        format!("ping {host}"),
        format!("tracert {host}"),
        format!("telnet {host} {DICOM_PORT}"),
        format!("telnet {host} {VIEWER_PORT}"),
        format!("Test-NetConnection {host} -Port {DICOM_PORT}"),
    ];

    Ok(commands.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::small_catalog;
    use crate::HelperError;

    #[test]
    fn uses_placeholder_without_host() {
        let commands = network_check_commands(None).expect("commands");
        assert_eq!(commands.lines().count(), 5);
        assert!(commands.lines().all(|line| line.contains(PACS_HOST_PLACEHOLDER)));
        assert!(commands.contains("telnet YOUR_PACS_IP_HERE 104"));
        assert!(commands.contains("telnet YOUR_PACS_IP_HERE 443"));
    }

    #[test]
    fn blank_host_is_treated_as_missing() {
        let commands = network_check_commands(Some("   ")).expect("commands");
        assert!(commands.starts_with("ping YOUR_PACS_IP_HERE"));
    }

    #[test]
    fn substitutes_configured_host() {
        let commands = network_check_commands(Some("10.1.2.3")).expect("commands");
        assert_eq!(
            commands,
            "ping 10.1.2.3\ntracert 10.1.2.3\ntelnet 10.1.2.3 104\ntelnet 10.1.2.3 443\nTest-NetConnection 10.1.2.3 -Port 104"
        );
    }

    #[test]
    fn rejects_unsafe_host() {
        let err = network_check_commands(Some("10.0.0.1 && shutdown")).expect_err("unsafe");
        assert!(matches!(err, HelperError::InvalidInput(_)));
    }

    #[test]
    fn panels_come_from_catalog() {
        let catalog = small_catalog();
        assert_eq!(
            PanelKind::UniversalFix.panel(&catalog).title.as_str(),
            "Universal fix"
        );
        assert_eq!(
            PanelKind::ClearCache.panel(&catalog).steps[0].as_str(),
            "Ctrl+Shift+Delete"
        );
    }
}
