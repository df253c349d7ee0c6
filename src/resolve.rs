//! Resolution of a user-supplied target into one verified disk image.
//!
//! The single authoritative decision of "which image file may be mutated".
//! Two branches, no shared state between them:
//!
//! - an explicit image path must be attached to some known VM (run-state is
//!   deliberately not checked — the operator already knows the file);
//! - a VM name must refer to a stopped VM, whose first declared disk becomes
//!   the target.
//!
//! All I/O happens through [`Inventory`]; the terminal decisions are pure
//! functions over the queried facts.

use thiserror::Error;

use crate::domain::{self, ParseError};
use crate::virsh::{Inventory, QueryError};

/// Why resolution failed. Terminal for the invocation: no retry, no
/// partial recovery.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("the VM '{0}' is currently running; stop it before changing passwords")]
    VmRunning(String),
    #[error("the VM '{0}' has no disks with a backing file")]
    NoDisks(String),
    #[error("the specified image '{0}' is not connected to any known VM")]
    UnownedImage(String),
}

/// How a target was accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetOrigin {
    /// Explicit path, verified to be attached to `owner` (recorded for
    /// diagnostics only).
    ExplicitImage { owner: String },
    /// First declared disk of the stopped VM `vm`.
    VmFirstDisk { vm: String },
}

/// The one disk image this invocation may mutate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub image: String,
    pub origin: TargetOrigin,
}

/// Branch A: verify that an explicit image path belongs to a known VM.
///
/// Scans every defined VM in listing order and accepts on the first VM
/// whose disk list contains the path (textual comparison, no
/// normalization). A VM whose definition cannot be fetched or parsed is
/// skipped with a warning; one unreadable VM must not block verifying the
/// rest of the inventory.
pub fn verify_explicit_image(
    inventory: &Inventory,
    image: &str,
) -> Result<ResolvedTarget, ResolveError> {
    for vm in inventory.all_vms()? {
        let disks = match fetch_disks(inventory, &vm) {
            Ok(disks) => disks,
            Err(err) => {
                eprintln!("warning: failed to get disks for VM '{vm}': {err}");
                continue;
            }
        };

        if disks.iter().any(|disk| disk == image) {
            return Ok(ResolvedTarget {
                image: image.to_string(),
                origin: TargetOrigin::ExplicitImage { owner: vm },
            });
        }
    }

    Err(ResolveError::UnownedImage(image.to_string()))
}

/// Branch B: resolve a VM name to its first declared disk.
///
/// Refuses unconditionally if the VM is running — mutating a live guest's
/// on-disk image is unsafe and there is no override flag. Run-state is
/// queried fresh here, never reused from an earlier call.
pub fn resolve_vm_disk(inventory: &Inventory, vm: &str) -> Result<ResolvedTarget, ResolveError> {
    let running = inventory.running_vms()?;
    if running.contains(vm) {
        return Err(ResolveError::VmRunning(vm.to_string()));
    }

    let disks = fetch_disks(inventory, vm)?;
    first_disk(vm, disks)
}

fn fetch_disks(inventory: &Inventory, vm: &str) -> Result<Vec<String>, ResolveError> {
    let xml = inventory.domain_xml(vm)?;
    Ok(domain::disk_sources(&xml)?)
}

/// Terminal decision of Branch B: the first disk in declaration order, or
/// `NoDisks` when the VM has none with a backing file.
///
/// Multi-disk VMs are not disambiguated further; first declared disk is a
/// deliberate simplification.
fn first_disk(vm: &str, disks: Vec<String>) -> Result<ResolvedTarget, ResolveError> {
    match disks.into_iter().next() {
        Some(image) => Ok(ResolvedTarget {
            image,
            origin: TargetOrigin::VmFirstDisk { vm: vm.to_string() },
        }),
        None => Err(ResolveError::NoDisks(vm.to_string())),
    }
}
