//! Companion process supervision
//!
//! The laser software and the router software both want the motion
//! controller's serial port, so at most one of them may run. The supervisor
//! finds and kills running instances by image name, launches the companion
//! for the selected mode and keeps its handle so the control loop can watch
//! for its exit.

pub mod system;

pub use system::SystemProcessHost;

use cncpanel_core::Result;
use std::path::{Path, PathBuf};

/// Linux truncates process names to 15 bytes in `comm`
const COMM_NAME_LIMIT: usize = 15;

/// An entry of the running process list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningProcess {
    /// Process id
    pub pid: u32,
    /// Image name as reported by the OS (may be a full path)
    pub image: String,
}

/// Handle to a launched companion
pub trait CompanionHandle: Send {
    /// Process id
    fn id(&self) -> u32;

    /// Whether the process has exited
    fn has_exited(&mut self) -> Result<bool>;

    /// Kill the process; killing an exited process succeeds
    fn kill(&mut self) -> Result<()>;
}

/// Operating system process services
pub trait ProcessHost: Send {
    /// List running processes
    fn running(&mut self) -> Result<Vec<RunningProcess>>;

    /// Forcibly terminate a process
    fn terminate(&mut self, pid: u32) -> Result<()>;

    /// Start an executable
    fn launch(&mut self, program: &Path) -> Result<Box<dyn CompanionHandle>>;
}

struct Companion {
    program: PathBuf,
    handle: Box<dyn CompanionHandle>,
}

/// Keeps the companion applications mutually exclusive
pub struct ProcessSupervisor {
    host: Box<dyn ProcessHost>,
    companion: Option<Companion>,
}

impl ProcessSupervisor {
    /// Create a supervisor over `host`
    pub fn new(host: Box<dyn ProcessHost>) -> Self {
        Self {
            host,
            companion: None,
        }
    }

    /// Supervisor over the real operating system
    pub fn system() -> Self {
        Self::new(Box::new(SystemProcessHost::new()))
    }

    /// Kill every running process whose image matches `program`
    ///
    /// Returns the number of processes terminated.
    pub fn terminate_by_image(&mut self, program: &Path) -> Result<usize> {
        let own_pid = std::process::id();
        let targets: Vec<RunningProcess> = self
            .host
            .running()?
            .into_iter()
            .filter(|p| p.pid != own_pid && image_matches(&p.image, program))
            .collect();

        let mut terminated = 0;
        for process in targets {
            tracing::info!("Terminating {} (pid {})", process.image, process.pid);
            if let Err(e) = self.host.terminate(process.pid) {
                // It may have exited between listing and killing
                if self.host.running()?.iter().any(|p| p.pid == process.pid) {
                    return Err(e);
                }
                tracing::debug!("Process {} already gone", process.pid);
            }
            terminated += 1;
        }
        Ok(terminated)
    }

    /// Terminate every listed companion, leaving none of them running
    pub fn ensure_exclusive(&mut self, programs: &[&Path]) -> Result<usize> {
        let mut terminated = 0;
        for program in programs {
            terminated += self.terminate_by_image(program)?;
        }
        Ok(terminated)
    }

    /// Launch `program` and retain its handle
    ///
    /// A previously retained companion is killed first.
    pub fn launch(&mut self, program: &Path) -> Result<u32> {
        self.shutdown()?;
        let handle = self.host.launch(program)?;
        let pid = handle.id();
        tracing::info!("Launched {} (pid {})", program.display(), pid);
        self.companion = Some(Companion {
            program: program.to_path_buf(),
            handle,
        });
        Ok(pid)
    }

    /// Program of the retained companion
    pub fn companion(&self) -> Option<&Path> {
        self.companion.as_ref().map(|c| c.program.as_path())
    }

    /// Whether the retained companion has exited; false when none is retained
    pub fn has_exited(&mut self) -> Result<bool> {
        match self.companion.as_mut() {
            Some(companion) => companion.handle.has_exited(),
            None => Ok(false),
        }
    }

    /// Kill the retained companion, if any
    pub fn shutdown(&mut self) -> Result<()> {
        if let Some(mut companion) = self.companion.take() {
            tracing::info!(
                "Stopping {} (pid {})",
                companion.program.display(),
                companion.handle.id()
            );
            companion.handle.kill()?;
        }
        Ok(())
    }
}

impl Drop for ProcessSupervisor {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            tracing::warn!("Failed to stop companion process: {}", e);
        }
    }
}

/// Whether an OS image name refers to `program`
///
/// Compares file names ASCII case-insensitively, with or without extension,
/// and accepts Linux's 15-byte truncated names.
pub fn image_matches(image: &str, program: &Path) -> bool {
    let image = image.trim();
    let image = image
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(image);
    if image.is_empty() {
        return false;
    }

    let file_name = program
        .to_str()
        .and_then(|p| p.rsplit(['/', '\\']).next())
        .unwrap_or_default();
    let stem = file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(file_name);

    [file_name, stem].iter().any(|candidate| {
        !candidate.is_empty()
            && (image.eq_ignore_ascii_case(candidate)
                || (image.len() == COMM_NAME_LIMIT
                    && candidate.len() > COMM_NAME_LIMIT
                    && candidate
                        .get(..COMM_NAME_LIMIT)
                        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(image))))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_matches_windows_names() {
        let program = Path::new(r"C:\Program Files\LightBurn\LightBurn.exe");
        assert!(image_matches("LightBurn.exe", program));
        assert!(image_matches("lightburn.EXE", program));
        assert!(image_matches("LightBurn", program));
        assert!(!image_matches("carbidemotion.exe", program));
        assert!(!image_matches("", program));
    }

    #[test]
    fn test_image_matches_unix_names() {
        let program = Path::new("/opt/carbide/carbidemotion");
        assert!(image_matches("carbidemotion", program));
        assert!(image_matches("/opt/carbide/carbidemotion", program));
        assert!(!image_matches("carbide", program));
    }

    #[test]
    fn test_image_matches_truncated_comm() {
        let program = Path::new("/usr/local/bin/lightburn-launcher");
        assert!(image_matches("lightburn-launc", program));
        assert!(!image_matches("lightburn-laun", program));
    }
}
