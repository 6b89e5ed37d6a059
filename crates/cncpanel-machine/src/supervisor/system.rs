//! Operating system process host
//!
//! Enumerates and kills processes through the platform tools (`ps`/`kill`
//! on Unix, `tasklist`/`taskkill` on Windows) and spawns companions with
//! `std::process::Command`.

use super::{CompanionHandle, ProcessHost, RunningProcess};
use cncpanel_core::{ProcessError, Result};
use std::path::Path;
use std::process::{Child, Command};

/// [`ProcessHost`] backed by the real operating system
#[derive(Debug, Default)]
pub struct SystemProcessHost;

impl SystemProcessHost {
    /// Create a new host
    pub fn new() -> Self {
        Self
    }
}

impl ProcessHost for SystemProcessHost {
    fn running(&mut self) -> Result<Vec<RunningProcess>> {
        let output = list_command().output().map_err(|e| ProcessError::EnumerationFailed {
            reason: e.to_string(),
        })?;
        if !output.status.success() {
            return Err(ProcessError::EnumerationFailed {
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }

        let text = String::from_utf8_lossy(&output.stdout);
        Ok(text.lines().filter_map(parse_process_line).collect())
    }

    fn terminate(&mut self, pid: u32) -> Result<()> {
        let failed = |reason: String| ProcessError::TerminateFailed { pid, reason };
        let output = kill_command(pid).output().map_err(|e| failed(e.to_string()))?;
        if output.status.success() {
            Ok(())
        } else {
            Err(failed(String::from_utf8_lossy(&output.stderr).trim().to_string()).into())
        }
    }

    fn launch(&mut self, program: &Path) -> Result<Box<dyn CompanionHandle>> {
        let mut command = Command::new(program);
        if let Some(dir) = program.parent().filter(|dir| dir.is_dir()) {
            command.current_dir(dir);
        }

        let child = command.spawn().map_err(|e| ProcessError::LaunchFailed {
            path: program.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Box::new(ChildHandle { child }))
    }
}

/// Companion spawned by [`SystemProcessHost`]
struct ChildHandle {
    child: Child,
}

impl CompanionHandle for ChildHandle {
    fn id(&self) -> u32 {
        self.child.id()
    }

    fn has_exited(&mut self) -> Result<bool> {
        Ok(self.child.try_wait()?.is_some())
    }

    fn kill(&mut self) -> Result<()> {
        if self.child.try_wait()?.is_some() {
            return Ok(());
        }
        match self.child.kill() {
            Ok(()) => {}
            // Exited since the check above
            Err(e) if e.kind() == std::io::ErrorKind::InvalidInput => {}
            Err(e) => {
                return Err(ProcessError::TerminateFailed {
                    pid: self.child.id(),
                    reason: e.to_string(),
                }
                .into())
            }
        }
        self.child.wait()?;
        Ok(())
    }
}

#[cfg(unix)]
fn list_command() -> Command {
    let mut command = Command::new("ps");
    command.args(["-A", "-o", "pid=,comm="]);
    command
}

#[cfg(windows)]
fn list_command() -> Command {
    let mut command = Command::new("tasklist");
    command.args(["/FO", "CSV", "/NH"]);
    command
}

#[cfg(unix)]
fn kill_command(pid: u32) -> Command {
    let mut command = Command::new("kill");
    command.args(["-9", &pid.to_string()]);
    command
}

#[cfg(windows)]
fn kill_command(pid: u32) -> Command {
    let mut command = Command::new("taskkill");
    command.args(["/F", "/PID", &pid.to_string()]);
    command
}

#[cfg(unix)]
fn parse_process_line(line: &str) -> Option<RunningProcess> {
    parse_ps_line(line)
}

#[cfg(windows)]
fn parse_process_line(line: &str) -> Option<RunningProcess> {
    parse_tasklist_line(line)
}

/// Parse one `ps -o pid=,comm=` line (`  1234 name`)
#[cfg_attr(not(unix), allow(dead_code))]
fn parse_ps_line(line: &str) -> Option<RunningProcess> {
    let (pid, image) = line.trim().split_once(char::is_whitespace)?;
    let image = image.trim();
    if image.is_empty() {
        return None;
    }
    Some(RunningProcess {
        pid: pid.parse().ok()?,
        image: image.to_string(),
    })
}

/// Parse one `tasklist /FO CSV /NH` line (`"name.exe","1234",...`)
#[cfg_attr(not(windows), allow(dead_code))]
fn parse_tasklist_line(line: &str) -> Option<RunningProcess> {
    let mut fields = line.trim().split("\",\"");
    let image = fields.next()?.trim_start_matches('"');
    let pid = fields.next()?.trim_end_matches('"');
    if image.is_empty() {
        return None;
    }
    Some(RunningProcess {
        pid: pid.parse().ok()?,
        image: image.to_string(),
    })
}
