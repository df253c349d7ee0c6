//! Preflight checks for virt-passwd.
//!
//! Validates that the external tools exist and that libvirt answers before
//! any real work. Run with `virt-passwd --check`.

use crate::config::Config;
use crate::process::{self, CommandRunner};
use crate::virsh::Inventory;

/// Result of a single preflight check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub details: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    /// Check passed.
    Pass,
    /// Check failed - the tool cannot work.
    Fail,
    /// Check failed but may be transient (e.g. libvirtd stopped).
    Warn,
}

impl CheckResult {
    fn pass_with(name: &str, details: String) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Pass,
            details: Some(details),
        }
    }

    fn fail(name: &str, details: String) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Fail,
            details: Some(details),
        }
    }

    fn warn(name: &str, details: String) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warn,
            details: Some(details),
        }
    }
}

/// Results of all preflight checks.
pub struct PreflightReport {
    pub checks: Vec<CheckResult>,
}

impl PreflightReport {
    /// Returns true if no check failed (warnings allowed).
    pub fn all_passed(&self) -> bool {
        !self.checks.iter().any(|c| c.status == CheckStatus::Fail)
    }

    /// Print the report to stdout.
    pub fn print(&self) {
        println!("=== Preflight Check Results ===\n");

        for check in &self.checks {
            let status_str = match check.status {
                CheckStatus::Pass => "PASS",
                CheckStatus::Fail => "FAIL",
                CheckStatus::Warn => "WARN",
            };

            print!("  [{}] {}", status_str, check.name);
            match &check.details {
                Some(details) => println!(": {}", details),
                None => println!(),
            }
        }

        let failed = self
            .checks
            .iter()
            .filter(|c| c.status == CheckStatus::Fail)
            .count();
        let warned = self
            .checks
            .iter()
            .filter(|c| c.status == CheckStatus::Warn)
            .count();

        println!();
        println!(
            "Summary: {}/{} passed",
            self.checks.len() - failed - warned,
            self.checks.len()
        );
        if failed > 0 {
            println!("         {} FAILED - password changes will not work", failed);
        }
        if warned > 0 {
            println!("         {} warnings", warned);
        }
    }
}

/// Run all preflight checks.
pub fn run_preflight(runner: &dyn CommandRunner, config: &Config) -> PreflightReport {
    let mut checks = Vec::new();

    let required_tools = [
        (config.virsh.as_str(), "libvirt-clients"),
        (config.virt_customize.as_str(), "guestfs-tools"),
    ];
    for (tool, package) in required_tools {
        checks.push(check_tool(tool, package));
    }

    if let Some(helper) = &config.privilege_helper {
        checks.push(check_tool(helper, helper));
    }

    checks.push(check_libvirt_reachable(runner, config));

    PreflightReport { checks }
}

/// Check that a tool exists in PATH.
fn check_tool(tool: &str, package: &str) -> CheckResult {
    match process::find_in_path(tool) {
        Some(path) => CheckResult::pass_with(tool, path.display().to_string()),
        None => CheckResult::fail(
            tool,
            format!("not found in PATH (install the '{}' package)", package),
        ),
    }
}

/// Check that libvirt answers an inventory query.
fn check_libvirt_reachable(runner: &dyn CommandRunner, config: &Config) -> CheckResult {
    let inventory = Inventory::new(runner, config);
    match inventory.all_vms() {
        Ok(vms) => CheckResult::pass_with("libvirt", format!("{} VM(s) defined", vms.len())),
        Err(err) => CheckResult::warn("libvirt", format!("inventory query failed: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_tool_found() {
        // `sh` exists on any Unix system
        let result = check_tool("sh", "shell");
        assert_eq!(result.status, CheckStatus::Pass);
    }

    #[test]
    fn test_check_tool_missing() {
        let result = check_tool("nonexistent_program_12345", "nothing");
        assert_eq!(result.status, CheckStatus::Fail);
        assert!(result.details.unwrap().contains("not found in PATH"));
    }

    #[test]
    fn test_report_all_passed_ignores_warnings() {
        let report = PreflightReport {
            checks: vec![
                CheckResult::pass_with("a", "ok".to_string()),
                CheckResult::warn("b", "transient".to_string()),
            ],
        };
        assert!(report.all_passed());
    }

    #[test]
    fn test_report_fails_on_any_failure() {
        let report = PreflightReport {
            checks: vec![
                CheckResult::pass_with("a", "ok".to_string()),
                CheckResult::fail("b", "missing".to_string()),
            ],
        };
        assert!(!report.all_passed());
    }
}
