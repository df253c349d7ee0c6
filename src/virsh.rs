//! Hypervisor inventory queries via virsh.
//!
//! Each operation runs exactly one virsh command through the injected
//! [`CommandRunner`]. Run-state is re-queried on every invocation and never
//! cached. No retries: a single failure is surfaced to the caller.

use std::collections::HashSet;
use std::io;

use thiserror::Error;

use crate::config::Config;
use crate::process::{display_command, CommandRunner};

/// An inventory command failed to start or exited non-zero.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("failed to run '{command}': {source}")]
    Launch {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("'{command}' failed with exit code {code}: {stderr}")]
    Failed {
        command: String,
        code: i32,
        stderr: String,
    },
}

/// Typed view of the hypervisor's VM registry.
pub struct Inventory<'a> {
    runner: &'a dyn CommandRunner,
    virsh: &'a str,
}

impl<'a> Inventory<'a> {
    pub fn new(runner: &'a dyn CommandRunner, config: &'a Config) -> Self {
        Self {
            runner,
            virsh: &config.virsh,
        }
    }

    fn query(&self, args: &[&str]) -> Result<String, QueryError> {
        let command = display_command(self.virsh, args);
        let result = self
            .runner
            .output(self.virsh, args)
            .map_err(|source| QueryError::Launch {
                command: command.clone(),
                source,
            })?;

        if !result.success() {
            return Err(QueryError::Failed {
                command,
                code: result.code,
                stderr: result.stderr_trimmed().to_string(),
            });
        }

        Ok(result.stdout)
    }

    /// Names of all currently running VMs.
    pub fn running_vms(&self) -> Result<HashSet<String>, QueryError> {
        let output = self.query(&["list", "--name", "--state-running"])?;
        Ok(split_names(&output).into_iter().collect())
    }

    /// Names of all defined VMs, in the hypervisor's listing order.
    pub fn all_vms(&self) -> Result<Vec<String>, QueryError> {
        let output = self.query(&["list", "--name", "--all"])?;
        Ok(split_names(&output))
    }

    /// The named VM's domain XML definition.
    ///
    /// Fails with [`QueryError`] if the hypervisor cannot produce it, e.g.
    /// for an unknown VM name.
    pub fn domain_xml(&self, vm: &str) -> Result<String, QueryError> {
        self.query(&["dumpxml", vm])
    }
}

/// Split a `virsh list --name` listing into VM names.
///
/// Entries are trimmed; blank lines (virsh always prints a trailing one)
/// are discarded.
fn split_names(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
