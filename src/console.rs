//! Terminal presentations
//!
//! [`ConsolePresentation`] logs status changes and turns lines typed on
//! stdin into intents. [`HeadlessPresentation`] shows nothing and never
//! closes, so the session lasts as long as the companion application.

use cncpanel_core::{
    GaugeView, Mode, ModeView, Peripheral, PeripheralStatus, PeripheralView, Presentation,
    UserIntent,
};
use std::io::{self, BufRead};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

/// A parsed console line
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    /// Forward to the controller
    Intent(UserIntent),
    /// Close the presentation
    Quit,
}

/// Parse one console line; blank lines give `Ok(None)`
///
/// Accepts a peripheral name (`air`, `vacuum`, `hood`, `spindle`, `laser`),
/// `pump <percent>`, `mode <name|code>` and `quit`/`exit`.
pub fn parse_command(line: &str) -> Result<Option<ConsoleCommand>, String> {
    let mut words = line.split_whitespace();
    let Some(word) = words.next() else {
        return Ok(None);
    };
    let argument = words.next();
    if words.next().is_some() {
        return Err(format!("too many arguments: {}", line.trim()));
    }

    let command = match (word.to_ascii_lowercase().as_str(), argument) {
        ("quit" | "exit", None) => ConsoleCommand::Quit,
        ("pump", Some(value)) => {
            let percent: f64 = value
                .parse()
                .map_err(|_| format!("invalid pump speed: {}", value))?;
            ConsoleCommand::Intent(UserIntent::SetPumpSpeed(percent))
        }
        ("mode", Some(value)) => {
            let mode: Mode = value.parse().map_err(|e| format!("{}", e))?;
            ConsoleCommand::Intent(UserIntent::SetMode(mode))
        }
        (name, None) => {
            let peripheral: Peripheral = name.parse().map_err(|e| format!("{}", e))?;
            ConsoleCommand::Intent(UserIntent::Toggle(peripheral))
        }
        _ => return Err(format!("unrecognized command: {}", line.trim())),
    };
    Ok(Some(command))
}

/// Interactive presentation on the terminal
pub struct ConsolePresentation {
    intents: Receiver<UserIntent>,
    closed: Arc<AtomicBool>,
    switches: Option<PeripheralStatus>,
    pump_speed: Option<f64>,
    pressure: Option<f64>,
    pwm: Option<f64>,
    mode: Option<Mode>,
}

impl ConsolePresentation {
    /// Read commands from stdin
    pub fn stdin() -> io::Result<Self> {
        Self::spawn(io::BufReader::new(io::stdin()))
    }

    /// Read commands from `input` on a helper thread
    pub fn spawn(input: impl BufRead + Send + 'static) -> io::Result<Self> {
        let (sender, intents) = mpsc::channel();
        let closed = Arc::new(AtomicBool::new(false));
        let flag = closed.clone();
        thread::Builder::new()
            .name("console-input".to_string())
            .spawn(move || read_commands(input, sender, flag))?;

        tracing::info!("Commands: air, vacuum, hood, spindle, laser, pump <percent>, mode <name>, quit");
        Ok(Self {
            intents,
            closed,
            switches: None,
            pump_speed: None,
            pressure: None,
            pwm: None,
            mode: None,
        })
    }
}

fn read_commands(input: impl BufRead, sender: Sender<UserIntent>, closed: Arc<AtomicBool>) {
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!("Console input failed: {}", e);
                break;
            }
        };
        match parse_command(&line) {
            Ok(Some(ConsoleCommand::Intent(intent))) => {
                if sender.send(intent).is_err() {
                    break;
                }
            }
            Ok(Some(ConsoleCommand::Quit)) => break,
            Ok(None) => {}
            Err(message) => tracing::warn!("{}", message),
        }
    }
    closed.store(true, Ordering::SeqCst);
}

impl Presentation for ConsolePresentation {
    fn is_open(&self) -> bool {
        !self.closed.load(Ordering::SeqCst)
    }

    fn take_intents(&mut self) -> Vec<UserIntent> {
        self.intents.try_iter().collect()
    }

    fn toggles(&mut self) -> Option<&mut dyn PeripheralView> {
        Some(self)
    }

    fn gauges(&mut self) -> Option<&mut dyn GaugeView> {
        Some(self)
    }

    fn mode_view(&mut self) -> Option<&mut dyn ModeView> {
        Some(self)
    }
}

impl PeripheralView for ConsolePresentation {
    fn show_switches(&mut self, status: &PeripheralStatus) {
        if self.switches.as_ref() == Some(status) {
            return;
        }
        let state = |value: Option<bool>| match value {
            Some(true) => "on",
            Some(false) => "off",
            None => "?",
        };
        tracing::info!(
            "air {} | vacuum {} | hood {} | spindle {} | laser {} | door {} | laser head {}",
            state(status.air),
            state(status.vacuum),
            state(status.hood),
            state(status.spindle),
            state(status.laser),
            state(status.door),
            state(status.laser_head)
        );
        self.switches = Some(status.clone());
    }
}

impl GaugeView for ConsolePresentation {
    fn show_pump_speed(&mut self, speed: f64) {
        if self.pump_speed.replace(speed) != Some(speed) {
            tracing::info!("Pump speed {:.0}%", speed);
        }
    }

    fn show_pressure(&mut self, percent: f64) {
        if self.pressure.replace(percent) != Some(percent) {
            tracing::info!("Vacuum pressure {:.1}%", percent);
        }
    }

    fn show_pwm(&mut self, percent: f64) {
        if self.pwm.replace(percent) != Some(percent) {
            tracing::info!("PWM {:.1}%", percent);
        }
    }
}

impl ModeView for ConsolePresentation {
    fn show_mode(&mut self, mode: Mode) {
        if self.mode.replace(mode) != Some(mode) {
            tracing::info!("Peripheral controller in {} mode", mode);
        }
    }
}

/// Presentation for unattended runs
///
/// Only useful with a companion mode; [`Args::load_config`](crate::Args::load_config)
/// refuses `--headless` otherwise.
#[derive(Debug, Default)]
pub struct HeadlessPresentation;

impl Presentation for HeadlessPresentation {
    fn is_open(&self) -> bool {
        true
    }

    fn take_intents(&mut self) -> Vec<UserIntent> {
        Vec::new()
    }
}
