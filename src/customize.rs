//! Password mutation via virt-customize.
//!
//! Builds the credential-set directive for a verified image and streams the
//! tool's output through. The hashing/injection mechanism inside the image
//! is virt-customize's business, not ours.

use std::io;

use thiserror::Error;

use crate::config::Config;
use crate::process::CommandRunner;
use crate::resolve::ResolvedTarget;

/// Which account's password to change. The two intents are mutually
/// exclusive by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    Root,
    User(String),
}

impl Credential {
    /// The account name, for diagnostics.
    pub fn account(&self) -> &str {
        match self {
            Credential::Root => "root",
            Credential::User(name) => name,
        }
    }
}

/// The customization tool failed or could not be started.
#[derive(Debug, Error)]
pub enum MutationError {
    #[error("failed to start '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("'{program}' exited with code {code}")]
    Failed { program: String, code: i32 },
}

/// Build the virt-customize argument list for a password change.
pub fn customize_args(image: &str, credential: &Credential, password: &str) -> Vec<String> {
    match credential {
        Credential::Root => vec![
            "-a".to_string(),
            image.to_string(),
            "--root-password".to_string(),
            format!("password:{password}"),
        ],
        Credential::User(name) => vec![
            "-a".to_string(),
            image.to_string(),
            "--password".to_string(),
            format!("{name}:password:{password}"),
        ],
    }
}

/// Change the password of `credential`'s account inside the resolved image.
///
/// The tool's stdout/stderr are streamed through unmodified. The password
/// itself is never echoed by virt-passwd.
pub fn set_password(
    runner: &dyn CommandRunner,
    config: &Config,
    target: &ResolvedTarget,
    credential: &Credential,
    password: &str,
) -> Result<(), MutationError> {
    let args = customize_args(&target.image, credential, password);
    let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();

    println!(
        "Setting password for '{}' in {}",
        credential.account(),
        target.image
    );

    let code = runner
        .stream(&config.virt_customize, &arg_refs)
        .map_err(|source| MutationError::Launch {
            program: config.virt_customize.clone(),
            source,
        })?;

    if code != 0 {
        return Err(MutationError::Failed {
            program: config.virt_customize.clone(),
            code,
        });
    }

    Ok(())
}
