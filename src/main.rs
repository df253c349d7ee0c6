//! virt-passwd - change passwords inside libvirt guest disk images.
//!
//! Resolves a VM name (or explicit image path) to exactly one verified disk
//! image via virsh, refuses to touch running guests, then delegates the
//! actual mutation to virt-customize.

use std::process::ExitCode;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;

use virt_passwd::config::Config;
use virt_passwd::customize::{self, Credential};
use virt_passwd::preflight;
use virt_passwd::process::HostRunner;
use virt_passwd::resolve::{self, TargetOrigin};
use virt_passwd::virsh::Inventory;

const USAGE: &str =
    "Usage: virt-passwd (--root | --user <NAME>) --password <PASSWORD> (--image <PATH> | <VM_NAME>)";

#[derive(Parser)]
#[command(name = "virt-passwd")]
#[command(about = "Change root or user passwords inside libvirt guest disk images")]
#[command(
    after_help = "EXAMPLES:\n  virt-passwd --root --password secret web01\n  virt-passwd --user alice --password secret --image /var/lib/libvirt/images/web01.qcow2\n  virt-passwd --check"
)]
struct Cli {
    /// Change the root password
    #[arg(long)]
    root: bool,

    /// Change the password of this user
    #[arg(long, value_name = "NAME", conflicts_with = "root")]
    user: Option<String>,

    /// The new password
    #[arg(long, value_name = "PASSWORD")]
    password: Option<String>,

    /// Operate on this disk image instead of resolving a VM's first disk.
    /// The image must still be attached to some known VM.
    #[arg(long, value_name = "PATH", conflicts_with = "vm_name")]
    image: Option<String>,

    /// Name of the VM whose first disk should be modified (must be stopped)
    #[arg(value_name = "VM_NAME")]
    vm_name: Option<String>,

    /// Check that the required host tools are available, then exit
    #[arg(long, exclusive = true)]
    check: bool,
}

/// A fully validated invocation.
struct Request {
    credential: Credential,
    password: String,
    target: TargetSpec,
}

enum TargetSpec {
    Image(String),
    Vm(String),
}

/// Enforce the constraints clap's conflict rules cannot express.
fn validate(cli: Cli) -> Result<Request, String> {
    let credential = match (cli.root, cli.user) {
        (true, None) => Credential::Root,
        (false, Some(name)) => Credential::User(name),
        (false, None) => return Err("either --root or --user must be specified".to_string()),
        // --root/--user conflict is rejected by clap before we get here
        (true, Some(_)) => unreachable!("clap rejects --root with --user"),
    };

    let password = match cli.password {
        Some(password) if !password.is_empty() => password,
        _ => return Err("a non-empty --password is required".to_string()),
    };

    let target = match (cli.image, cli.vm_name) {
        (Some(image), None) => TargetSpec::Image(image),
        (None, Some(vm)) => TargetSpec::Vm(vm),
        (None, None) => return Err("either --image or a VM name must be specified".to_string()),
        (Some(_), Some(_)) => unreachable!("clap rejects --image with a VM name"),
    };

    Ok(Request {
        credential,
        password,
        target,
    })
}

fn run(config: &Config, request: &Request) -> Result<()> {
    let runner = HostRunner::new(config.privilege_helper.clone());
    let inventory = Inventory::new(&runner, config);

    let target = match &request.target {
        TargetSpec::Image(image) => {
            println!("Using specified image: {image}");
            resolve::verify_explicit_image(&inventory, image)?
        }
        TargetSpec::Vm(vm) => resolve::resolve_vm_disk(&inventory, vm)?,
    };

    match &target.origin {
        TargetOrigin::ExplicitImage { owner } => {
            println!("Image '{}' belongs to VM '{}'", target.image, owner);
        }
        TargetOrigin::VmFirstDisk { vm } => {
            println!("Using disk of VM '{}': {}", vm, target.image);
        }
    }

    customize::set_password(
        &runner,
        config,
        &target,
        &request.credential,
        &request.password,
    )?;

    println!("Password changed successfully.");
    Ok(())
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    // Load .env if present
    dotenvy::dotenv().ok();
    let config = Config::load();

    if cli.check {
        let runner = HostRunner::new(config.privilege_helper.clone());
        let report = preflight::run_preflight(&runner, &config);
        report.print();
        return if report.all_passed() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        };
    }

    let request = match validate(cli) {
        Ok(request) => request,
        Err(message) => {
            eprintln!("Error: {message}");
            eprintln!("{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    match run(&config, &request) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
