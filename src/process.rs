//! Centralized command execution.
//!
//! All external programs (virsh, virt-customize, the privilege helper) are
//! invoked through this module. The [`CommandRunner`] trait is the seam that
//! lets tests substitute a fake host without real privilege or a real
//! hypervisor.

use std::io;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Result of a captured command execution.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code, or -1 if terminated by signal.
    pub code: i32,
    /// Captured stdout as a string.
    pub stdout: String,
    /// Captured stderr as a string.
    pub stderr: String,
}

impl CommandResult {
    /// Returns true if the command exited successfully.
    pub fn success(&self) -> bool {
        self.code == 0
    }

    /// Get stdout, trimmed of whitespace.
    pub fn stdout_trimmed(&self) -> &str {
        self.stdout.trim()
    }

    /// Get stderr, trimmed of whitespace.
    pub fn stderr_trimmed(&self) -> &str {
        self.stderr.trim()
    }
}

/// Builder for configuring command execution.
pub struct Cmd {
    program: String,
    args: Vec<String>,
}

impl Cmd {
    /// Create a new command builder.
    pub fn new(program: impl AsRef<str>) -> Self {
        Self {
            program: program.as_ref().to_string(),
            args: Vec::new(),
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<str>) -> Self {
        self.args.push(arg.as_ref().to_string());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for arg in args {
            self.args.push(arg.as_ref().to_string());
        }
        self
    }

    /// Run the command and capture output.
    ///
    /// A non-zero exit is reported through [`CommandResult`], not as an
    /// error; `Err` means the command could not be started at all.
    pub fn run(self) -> io::Result<CommandResult> {
        let output = Command::new(&self.program).args(&self.args).output()?;

        Ok(CommandResult {
            code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    /// Run the command with inherited stdio (interactive/streaming).
    ///
    /// Output goes directly to the terminal. Use for long-running commands
    /// where the user should see progress (virt-customize can take a while
    /// on large images). Returns the exit code.
    pub fn run_streaming(self) -> io::Result<i32> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()?;

        Ok(status.code().unwrap_or(-1))
    }
}

/// Capability to run external commands on the host.
///
/// Production code uses [`HostRunner`]; tests use a scripted fake. An `Err`
/// from either method means the command could not be started; exit status is
/// always reported through the return value.
pub trait CommandRunner {
    /// Run a command and capture its output.
    fn output(&self, program: &str, args: &[&str]) -> io::Result<CommandResult>;

    /// Run a command with inherited stdio, returning its exit code.
    fn stream(&self, program: &str, args: &[&str]) -> io::Result<i32>;
}

/// Runs commands on the real host, wrapped in the configured privilege
/// helper (`sudo` by default).
pub struct HostRunner {
    privilege_helper: Option<String>,
}

impl HostRunner {
    pub fn new(privilege_helper: Option<String>) -> Self {
        Self { privilege_helper }
    }

    fn command(&self, program: &str, args: &[&str]) -> Cmd {
        match &self.privilege_helper {
            Some(helper) => Cmd::new(helper).arg(program).args(args),
            None => Cmd::new(program).args(args),
        }
    }
}

impl CommandRunner for HostRunner {
    fn output(&self, program: &str, args: &[&str]) -> io::Result<CommandResult> {
        self.command(program, args).run()
    }

    fn stream(&self, program: &str, args: &[&str]) -> io::Result<i32> {
        self.command(program, args).run_streaming()
    }
}

/// Render a command line for diagnostics.
pub fn display_command(program: &str, args: &[&str]) -> String {
    let mut line = String::from(program);
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}

/// Look up a program in PATH.
pub fn find_in_path(program: &str) -> Option<PathBuf> {
    which::which(program).ok()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_success() {
        let result = Cmd::new("echo").arg("hello").run().unwrap();
        assert!(result.success());
        assert_eq!(result.stdout_trimmed(), "hello");
    }

    #[test]
    fn test_run_nonzero_is_not_an_error() {
        // `false` always exits with 1
        let result = Cmd::new("false").run().unwrap();
        assert!(!result.success());
        assert_eq!(result.code, 1);
    }

    #[test]
    fn test_run_captures_stderr() {
        let result = Cmd::new("ls").arg("/nonexistent_path_12345").run().unwrap();
        assert!(!result.success());
        assert!(!result.stderr.is_empty());
    }

    #[test]
    fn test_run_missing_program_is_an_error() {
        assert!(Cmd::new("nonexistent_program_12345").run().is_err());
    }

    #[test]
    fn test_cmd_builder_chaining() {
        let result = Cmd::new("echo").arg("hello").arg("world").run().unwrap();
        assert_eq!(result.stdout_trimmed(), "hello world");
    }

    #[test]
    fn test_cmd_args_iterator() {
        let args = vec!["one", "two", "three"];
        let result = Cmd::new("echo").args(args).run().unwrap();
        assert_eq!(result.stdout_trimmed(), "one two three");
    }

    #[test]
    fn test_host_runner_without_helper() {
        let runner = HostRunner::new(None);
        let result = runner.output("echo", &["direct"]).unwrap();
        assert_eq!(result.stdout_trimmed(), "direct");
    }

    #[test]
    fn test_host_runner_prepends_helper() {
        // `env echo wrapped` exercises the same prepend path as
        // `sudo virsh ...` without needing real privilege.
        let runner = HostRunner::new(Some("env".to_string()));
        let result = runner.output("echo", &["wrapped"]).unwrap();
        assert_eq!(result.stdout_trimmed(), "wrapped");
    }

    #[test]
    fn test_display_command() {
        assert_eq!(
            display_command("virsh", &["list", "--name", "--all"]),
            "virsh list --name --all"
        );
    }

    #[test]
    fn test_find_in_path() {
        assert!(find_in_path("sh").is_some());
        assert!(find_in_path("nonexistent_program_12345").is_none());
    }
}
