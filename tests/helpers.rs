//! Shared test utilities for virt-passwd tests.
//!
//! [`FakeHost`] stands in for the privileged host: every command the code
//! under test may run must be scripted, and every invocation is recorded so
//! tests can assert what was (and was not) executed.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io;

use virt_passwd::config::Config;
use virt_passwd::process::{CommandResult, CommandRunner};

/// Scripted reply for one command line.
pub enum Reply {
    /// Exit 0 with this stdout.
    Ok(String),
    /// Non-zero exit with this stderr.
    Fail { code: i32, stderr: String },
    /// The command cannot be started at all.
    Unlaunchable,
}

/// A fake [`CommandRunner`] driven by scripted replies.
pub struct FakeHost {
    replies: HashMap<String, Reply>,
    calls: RefCell<Vec<String>>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self {
            replies: HashMap::new(),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Script a reply for the exact command line `command`
    /// (program and arguments joined with single spaces).
    pub fn on(mut self, command: &str, reply: Reply) -> Self {
        self.replies.insert(command.to_string(), reply);
        self
    }

    /// Every command line executed so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, program: &str, args: &[&str]) -> String {
        let mut line = String::from(program);
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        self.calls.borrow_mut().push(line.clone());
        line
    }

    fn reply_for(&self, key: &str) -> &Reply {
        self.replies
            .get(key)
            .unwrap_or_else(|| panic!("unscripted command executed: {key}"))
    }
}

impl CommandRunner for FakeHost {
    fn output(&self, program: &str, args: &[&str]) -> io::Result<CommandResult> {
        let key = self.record(program, args);
        match self.reply_for(&key) {
            Reply::Ok(stdout) => Ok(CommandResult {
                code: 0,
                stdout: stdout.clone(),
                stderr: String::new(),
            }),
            Reply::Fail { code, stderr } => Ok(CommandResult {
                code: *code,
                stdout: String::new(),
                stderr: stderr.clone(),
            }),
            Reply::Unlaunchable => Err(io::Error::new(
                io::ErrorKind::NotFound,
                "command not found",
            )),
        }
    }

    fn stream(&self, program: &str, args: &[&str]) -> io::Result<i32> {
        let key = self.record(program, args);
        match self.reply_for(&key) {
            Reply::Ok(_) => Ok(0),
            Reply::Fail { code, .. } => Ok(*code),
            Reply::Unlaunchable => Err(io::Error::new(
                io::ErrorKind::NotFound,
                "command not found",
            )),
        }
    }
}

/// Default configuration (virsh / virt-customize, sudo helper). The fake
/// host never consults the privilege helper, so the default is fine.
pub fn test_config() -> Config {
    Config::from_lookup(|_| None)
}

/// Minimal domain XML with the given disk backing files.
pub fn domain_xml(disks: &[&str]) -> String {
    let mut xml = String::from("<domain type='kvm'>\n  <devices>\n");
    for disk in disks {
        xml.push_str(&format!(
            "    <disk type='file' device='disk'>\n      <source file='{disk}'/>\n    </disk>\n"
        ));
    }
    xml.push_str("  </devices>\n</domain>\n");
    xml
}
