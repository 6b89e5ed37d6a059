//! Machine controller
//!
//! Owns both serial links, the retained status snapshot, the session mode
//! and the companion supervisor. Everything a presentation can ask for goes
//! through here.

use crate::sequence::{laser_sequence, router_sequence};
use crate::supervisor::ProcessSupervisor;
use cncpanel_communication::firmware::grbl::utils::{X_MAX_TRAVEL, Y_MAX_TRAVEL};
use cncpanel_communication::{MotionLink, PeripheralLink};
use cncpanel_core::data::{format_flag, keys, pump_interval_from_speed};
use cncpanel_core::{
    ControllerError, Mode, Peripheral, PeripheralStatus, Presentation, Result, StatusSnapshot,
    UserIntent,
};
use cncpanel_settings::{CompanionSettings, MachineSettings};
use std::collections::BTreeMap;
use std::path::Path;

/// Drives the machine for one run of the panel
pub struct MachineController {
    motion: Option<MotionLink>,
    peripheral: PeripheralLink,
    snapshot: StatusSnapshot,
    mode: Mode,
    supervisor: ProcessSupervisor,
    machine: MachineSettings,
    companions: CompanionSettings,
    grbl_settings: BTreeMap<u16, String>,
}

impl MachineController {
    /// Create a controller in `Idle` with default machine profile and companions
    pub fn new(
        motion: Option<MotionLink>,
        peripheral: PeripheralLink,
        supervisor: ProcessSupervisor,
    ) -> Self {
        Self {
            motion,
            peripheral,
            snapshot: StatusSnapshot::default(),
            mode: Mode::Idle,
            supervisor,
            machine: MachineSettings::default(),
            companions: CompanionSettings::default(),
            grbl_settings: BTreeMap::new(),
        }
    }

    /// Use the given machine profile
    pub fn with_machine(mut self, machine: MachineSettings) -> Self {
        self.machine = machine;
        self
    }

    /// Use the given companion executables
    pub fn with_companions(mut self, companions: CompanionSettings) -> Self {
        self.companions = companions;
        self
    }

    /// Session mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Last retained status
    pub fn snapshot(&self) -> &StatusSnapshot {
        &self.snapshot
    }

    /// Whether the motion link is still held
    pub fn has_motion_link(&self) -> bool {
        self.motion.is_some()
    }

    /// Settings read from the motion controller
    pub fn motion_settings(&self) -> &BTreeMap<u16, String> {
        &self.grbl_settings
    }

    /// Read and retain the motion controller's settings table
    pub fn read_motion_settings(&mut self) -> Result<&BTreeMap<u16, String>> {
        let motion = self.motion.as_mut().ok_or(ControllerError::NotConnected)?;
        self.grbl_settings = motion.read_settings()?;
        Ok(&self.grbl_settings)
    }

    /// Read the peripheral status and merge it into the snapshot
    pub fn poll(&mut self) -> Result<&StatusSnapshot> {
        let report = self.peripheral.read_status()?;
        let status = PeripheralStatus::from_report(&report);
        self.snapshot.apply_report(&status);
        Ok(&self.snapshot)
    }

    /// Flip a switched peripheral and return its new state
    ///
    /// An unknown state counts as off.
    pub fn toggle(&mut self, peripheral: Peripheral) -> Result<bool> {
        let on = !self
            .snapshot
            .peripherals
            .switch_state(peripheral)
            .unwrap_or(false);
        self.peripheral
            .write_value(peripheral.key(), format_flag(on))?;
        self.snapshot.peripherals.set_switch_state(peripheral, on);
        tracing::info!("{} {}", peripheral, if on { "on" } else { "off" });
        Ok(on)
    }

    /// [`toggle`](Self::toggle) by peripheral name
    pub fn toggle_by_name(&mut self, name: &str) -> Result<bool> {
        let peripheral: Peripheral = name.parse()?;
        self.toggle(peripheral)
    }

    /// Set the vacuum pump speed in percent; returns the interval written
    pub fn set_pump_speed(&mut self, percent: f64) -> Result<u32> {
        let interval = pump_interval_from_speed(percent);
        self.peripheral
            .write_value(keys::PUMP_INTERVAL_MS, &interval.to_string())?;
        tracing::info!("Pump speed {:.0}% (interval {}ms)", percent, interval);
        Ok(interval)
    }

    /// Announce `mode` to the peripheral controller
    ///
    /// The retained snapshot is not touched; the next poll reports the mode
    /// the board actually switched to.
    pub fn set_mode(&mut self, mode: Mode) -> Result<()> {
        self.peripheral
            .write_value(keys::MODE, &mode.code().to_string())
    }

    /// Configure GRBL for `mode`, then hand the motion link over
    ///
    /// On failure the link stays with the controller and is released by
    /// [`shutdown`](Self::shutdown).
    pub fn configure_for_mode(&mut self, mode: Mode) -> Result<()> {
        let steps = match mode {
            Mode::Laser => {
                let x = self.travel(X_MAX_TRAVEL, self.machine.x_travel_mm, "machine.x_travel_mm")?;
                let y = self.travel(Y_MAX_TRAVEL, self.machine.y_travel_mm, "machine.y_travel_mm")?;
                laser_sequence(x, y)
            }
            Mode::Router => router_sequence(self.machine.spindle_max_rpm),
            Mode::Idle | Mode::Manual => return Ok(()),
        };

        let motion = self.motion.as_mut().ok_or(ControllerError::NotConnected)?;
        tracing::info!("Configuring {} for {} mode", motion.port_name(), mode);
        for step in &steps {
            tracing::debug!("Step: {}", step);
            step.run(motion)?;
        }

        if let Some(motion) = self.motion.take() {
            motion.close()?;
        }
        tracing::info!("Motion controller ready for {} mode", mode);
        Ok(())
    }

    /// Leave `Idle` for `mode`
    ///
    /// Companion modes kill every running companion, configure the motion
    /// controller and launch the mode's companion.
    pub fn enter_mode(&mut self, mode: Mode) -> Result<()> {
        if self.mode != Mode::Idle {
            return Err(ControllerError::InvalidStateTransition {
                current: self.mode.to_string(),
                requested: mode.to_string(),
            }
            .into());
        }
        if mode == Mode::Idle {
            return Ok(());
        }

        tracing::info!("Entering {} mode", mode);
        match self.companions.for_mode(mode).map(Path::to_path_buf) {
            Some(program) => {
                if self.motion.is_none() {
                    return Err(ControllerError::NotConnected.into());
                }
                let terminated = self.supervisor.ensure_exclusive(&self.companions.all())?;
                if terminated > 0 {
                    tracing::info!("Terminated {} running companion(s)", terminated);
                }

                self.configure_for_mode(mode)?;
                self.set_mode(mode)?;
                self.supervisor.launch(&program)?;
            }
            None => self.set_mode(mode)?,
        }

        self.mode = mode;
        Ok(())
    }

    /// Whether the launched companion has exited
    pub fn companion_exited(&mut self) -> Result<bool> {
        self.supervisor.has_exited()
    }

    /// Push the snapshot to whatever views the presentation offers
    pub fn publish(&self, presentation: &mut dyn Presentation) {
        let snapshot = &self.snapshot;
        if let Some(view) = presentation.toggles() {
            view.show_switches(&snapshot.peripherals);
        }
        if let Some(view) = presentation.gauges() {
            if let Some(speed) = snapshot.pump_speed {
                view.show_pump_speed(speed);
            }
            if let Some(pressure) = snapshot.pressure_percent {
                view.show_pressure(pressure);
            }
            if let Some(pwm) = snapshot.pwm_percent {
                view.show_pwm(pwm);
            }
        }
        if let Some(view) = presentation.mode_view() {
            if let Some(mode) = snapshot.peripherals.mode {
                view.show_mode(mode);
            }
        }
    }

    /// Carry out a user request
    pub fn apply(&mut self, intent: UserIntent) -> Result<()> {
        tracing::debug!("Intent: {:?}", intent);
        match intent {
            UserIntent::Toggle(peripheral) => self.toggle(peripheral).map(|_| ()),
            UserIntent::SetMode(mode) => self.set_mode(mode),
            UserIntent::SetPumpSpeed(percent) => self.set_pump_speed(percent).map(|_| ()),
        }
    }

    /// Stop the companion and release the motion link; safe to call repeatedly
    pub fn shutdown(&mut self) -> Result<()> {
        let stopped = self.supervisor.shutdown();
        let closed = match self.motion.take() {
            Some(motion) => motion.close(),
            None => Ok(()),
        };
        stopped.and(closed)
    }

    /// Shut down and release the peripheral link
    pub fn close(mut self) -> Result<()> {
        let shutdown = self.shutdown();
        let closed = self.peripheral.close();
        shutdown.and(closed)
    }

    fn travel(&self, setting: u16, configured: Option<f64>, name: &str) -> Result<f64> {
        if let Some(travel) = configured {
            return Ok(travel);
        }
        self.grbl_settings
            .get(&setting)
            .and_then(|value| value.trim().parse::<f64>().ok())
            .filter(|travel| travel.is_finite() && *travel > 0.0)
            .ok_or_else(|| {
                ControllerError::MissingSetting {
                    name: format!("{} (${})", name, setting),
                }
                .into()
            })
    }
}
