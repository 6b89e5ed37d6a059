//! Shared fixtures: scripted devices and an in-memory process table
#![allow(dead_code)]

use cncpanel_communication::{LinkTiming, MotionLink, PeripheralLink, VirtualPort};
use cncpanel_core::{ProcessError, Result};
use cncpanel_machine::{CompanionHandle, MachineController, ProcessHost, ProcessSupervisor, RunningProcess};
use cncpanel_settings::CompanionSettings;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub const LASER_IMAGE: &str = "LightBurn";
pub const ROUTER_IMAGE: &str = "carbidemotion";

/// Far from any real pid so the supervisor's own-pid filter never applies
const FIRST_PID: u32 = 4_000_000_000;

/// Something the fake host was asked to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Terminated(String),
    /// Image launched and the images running at that moment
    Launched(String, Vec<String>),
    Killed(String),
}

#[derive(Default)]
struct HostState {
    next_pid: u32,
    processes: Vec<RunningProcess>,
    events: Vec<Event>,
}

impl HostState {
    fn add(&mut self, image: &str) -> u32 {
        let pid = FIRST_PID + self.next_pid;
        self.next_pid += 1;
        self.processes.push(RunningProcess {
            pid,
            image: image.to_string(),
        });
        pid
    }

    fn remove(&mut self, pid: u32) -> Option<RunningProcess> {
        let index = self.processes.iter().position(|p| p.pid == pid)?;
        Some(self.processes.remove(index))
    }
}

/// In-memory [`ProcessHost`] recording every action
#[derive(Clone, Default)]
pub struct FakeHost {
    state: Arc<Mutex<HostState>>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// A process started outside the panel
    pub fn start_external(&self, image: &str) -> u32 {
        self.state.lock().unwrap().add(image)
    }

    /// Let a process exit on its own
    pub fn exit(&self, image: &str) {
        self.state
            .lock()
            .unwrap()
            .processes
            .retain(|p| p.image != image);
    }

    pub fn events(&self) -> Vec<Event> {
        self.state.lock().unwrap().events.clone()
    }

    pub fn running_images(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state.processes.iter().map(|p| p.image.clone()).collect()
    }

    pub fn boxed(&self) -> Box<dyn ProcessHost> {
        Box::new(self.clone())
    }
}

impl ProcessHost for FakeHost {
    fn running(&mut self) -> Result<Vec<RunningProcess>> {
        Ok(self.state.lock().unwrap().processes.clone())
    }

    fn terminate(&mut self, pid: u32) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        match state.remove(pid) {
            Some(process) => {
                state.events.push(Event::Terminated(process.image));
                Ok(())
            }
            None => Err(ProcessError::TerminateFailed {
                pid,
                reason: "no such process".to_string(),
            }
            .into()),
        }
    }

    fn launch(&mut self, program: &Path) -> Result<Box<dyn CompanionHandle>> {
        let image = program
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        if image.starts_with("missing") {
            return Err(ProcessError::LaunchFailed {
                path: program.display().to_string(),
                reason: "not found".to_string(),
            }
            .into());
        }

        let mut state = self.state.lock().unwrap();
        let running = state.processes.iter().map(|p| p.image.clone()).collect();
        state.events.push(Event::Launched(image.clone(), running));
        let pid = state.add(&image);
        Ok(Box::new(FakeHandle {
            pid,
            state: self.state.clone(),
        }))
    }
}

struct FakeHandle {
    pid: u32,
    state: Arc<Mutex<HostState>>,
}

impl CompanionHandle for FakeHandle {
    fn id(&self) -> u32 {
        self.pid
    }

    fn has_exited(&mut self) -> Result<bool> {
        let state = self.state.lock().unwrap();
        Ok(!state.processes.iter().any(|p| p.pid == self.pid))
    }

    fn kill(&mut self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(process) = state.remove(self.pid) {
            state.events.push(Event::Killed(process.image));
        }
        Ok(())
    }
}

pub fn companions() -> CompanionSettings {
    CompanionSettings {
        laser: PathBuf::from(format!("/opt/lightburn/{}", LASER_IMAGE)),
        router: PathBuf::from(format!("/opt/carbide/{}", ROUTER_IMAGE)),
    }
}

/// GRBL answering `ok` to everything, with an 800 x 400 mm table
pub fn grbl() -> VirtualPort {
    VirtualPort::new("grbl", |line| match line {
        "" => None,
        "$$" => Some("$10=255\r\n$32=0\r\n$130=800.000\r\n$131=400.000\r\n".to_string()),
        _ => Some("ok\r\n".to_string()),
    })
}

/// GRBL that rejects one command with `error:9`
pub fn grbl_rejecting(rejected: &'static str) -> VirtualPort {
    VirtualPort::new("grbl", move |line| match line {
        "" => None,
        line if line == rejected => Some("error:9\r\n".to_string()),
        _ => Some("ok\r\n".to_string()),
    })
}

/// Peripheral board replaying `reports` in order, then the last one forever
pub fn board(reports: &[&str]) -> VirtualPort {
    let mut reports: VecDeque<String> = reports.iter().map(|r| r.to_string()).collect();
    VirtualPort::new("board", move |line| match line {
        "" => None,
        "status" => {
            if reports.len() > 1 {
                reports.pop_front()
            } else {
                reports.front().cloned()
            }
        }
        _ => Some("done\r\n".to_string()),
    })
}

pub fn controller(
    grbl: Option<&VirtualPort>,
    board: &VirtualPort,
    host: &FakeHost,
) -> MachineController {
    let timing = LinkTiming::simulated();
    let motion = grbl.map(|device| MotionLink::new(device.boxed(), timing));
    let peripheral = PeripheralLink::open(board.boxed(), timing);
    MachineController::new(motion, peripheral, ProcessSupervisor::new(host.boxed()))
        .with_companions(companions())
}

/// Lines written to `device` after the first `skip`
pub fn lines_after(device: &VirtualPort, skip: usize) -> Vec<String> {
    device.written_lines().into_iter().skip(skip).collect()
}
