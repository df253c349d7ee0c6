//! Configuration for virt-passwd.
//!
//! Reads overrides from the environment (and a `.env` file loaded at
//! startup). Everything has a working default; configuration exists for
//! hosts where the tools live under different names or where the tool
//! already runs as root.

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Program used for hypervisor inventory queries (default: virsh)
    pub virsh: String,
    /// Program used to mutate guest images (default: virt-customize)
    pub virt_customize: String,
    /// Privilege helper prepended to every external command
    /// (default: sudo; None when disabled via an empty VIRT_PASSWD_SUDO)
    pub privilege_helper: Option<String>,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// `.env` is folded into the environment by `dotenvy` before this runs.
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let virsh = lookup("VIRT_PASSWD_VIRSH")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "virsh".to_string());

        let virt_customize = lookup("VIRT_PASSWD_VIRT_CUSTOMIZE")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "virt-customize".to_string());

        // Empty string explicitly disables the privilege helper.
        let privilege_helper = match lookup("VIRT_PASSWD_SUDO") {
            Some(helper) if helper.is_empty() => None,
            Some(helper) => Some(helper),
            None => Some("sudo".to_string()),
        };

        Self {
            virsh,
            virt_customize,
            privilege_helper,
        }
    }
}
