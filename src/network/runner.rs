//! Host command execution
//!
//! Interface provisioning only needs "run this command, tell me how it
//! exited". Keeping that behind a trait lets the provisioning flow run
//! against a fake host in tests and against stdout in dry-run mode.

use std::fmt;
use std::io;
use std::process::Command;

/// A single host command (program plus arguments)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostCommand {
    program: String,
    args: Vec<String>,
}

impl HostCommand {
    /// Create a command for `program` with no arguments
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
        }
    }

    /// Append arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_string()));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for HostCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Runs host commands and reports their exit status
///
/// `Ok(Some(code))` is a normal exit, `Ok(None)` means the process was
/// terminated by a signal, `Err` means it could not be started.
pub trait CommandRunner {
    fn run(&mut self, command: &HostCommand) -> io::Result<Option<i32>>;
}

/// Runs commands on the real host, blocking until each one exits
///
/// stdout/stderr are inherited so the operator sees what `ip` and
/// `ifconfig` complain about.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&mut self, command: &HostCommand) -> io::Result<Option<i32>> {
        let status = Command::new(command.program())
            .args(command.arguments())
            .status()?;
        Ok(status.code())
    }
}

/// Prints commands instead of running them; every command "succeeds"
#[derive(Debug, Default)]
pub struct DryRunRunner;

impl CommandRunner for DryRunRunner {
    fn run(&mut self, command: &HostCommand) -> io::Result<Option<i32>> {
        println!("[dry-run] {}", command);
        Ok(Some(0))
    }
}
