//! In-memory serial device
//!
//! A [`VirtualPort`] plays the device side of a link: every complete line
//! written to it is handed to a responder closure whose reply is queued as
//! incoming bytes. Clones share the same device, so a test keeps one clone
//! to inspect the traffic while a driver owns the other.

use super::SerialLink;
use cncpanel_core::{ConnectionError, Result};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Device behaviour: receives a request line (without `\r`/`\n`) and
/// returns the bytes to send back, if any
pub type Responder = Box<dyn FnMut(&str) -> Option<String> + Send>;

struct DeviceState {
    rx: VecDeque<u8>,
    written: Vec<u8>,
    pending_line: Vec<u8>,
    responder: Responder,
    closed: bool,
}

/// Scripted serial device
#[derive(Clone)]
pub struct VirtualPort {
    name: String,
    state: Arc<Mutex<DeviceState>>,
}

impl VirtualPort {
    /// Create a device driven by `responder`
    pub fn new(
        name: impl Into<String>,
        responder: impl FnMut(&str) -> Option<String> + Send + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(DeviceState {
                rx: VecDeque::new(),
                written: Vec::new(),
                pending_line: Vec::new(),
                responder: Box::new(responder),
                closed: false,
            })),
        }
    }

    /// A device that never answers
    pub fn silent(name: impl Into<String>) -> Self {
        Self::new(name, |_| None)
    }

    /// A device that answers every non-empty line with `reply`
    pub fn replying(name: impl Into<String>, reply: impl Into<String>) -> Self {
        let reply = reply.into();
        Self::new(name, move |line| {
            (!line.is_empty()).then(|| reply.clone())
        })
    }

    /// Queue bytes as if the device had sent them unprompted
    pub fn push_rx(&self, data: impl AsRef<[u8]>) {
        self.state.lock().rx.extend(data.as_ref());
    }

    /// Everything written to the device so far
    pub fn written(&self) -> String {
        String::from_utf8_lossy(&self.state.lock().written).into_owned()
    }

    /// Complete request lines written so far, without terminators
    pub fn written_lines(&self) -> Vec<String> {
        self.written()
            .split_inclusive('\n')
            .filter(|line| line.ends_with('\n'))
            .map(|line| line.trim_end_matches(['\r', '\n']).to_string())
            .collect()
    }

    /// Whether the owning driver closed the link
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Boxed clone for handing to a driver
    pub fn boxed(&self) -> Box<dyn SerialLink> {
        Box::new(self.clone())
    }

    fn ensure_open(&self, state: &DeviceState) -> Result<()> {
        if state.closed {
            return Err(ConnectionError::Closed {
                port: self.name.clone(),
            }
            .into());
        }
        Ok(())
    }
}

impl SerialLink for VirtualPort {
    fn name(&self) -> &str {
        &self.name
    }

    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        let mut state = self.state.lock();
        self.ensure_open(&state)?;
        state.written.extend_from_slice(data);

        for &byte in data {
            if byte != b'\n' {
                state.pending_line.push(byte);
                continue;
            }

            let raw = std::mem::take(&mut state.pending_line);
            let line = String::from_utf8_lossy(&raw).replace('\r', "");
            if let Some(reply) = (state.responder)(&line) {
                state.rx.extend(reply.into_bytes());
            }
        }
        Ok(())
    }

    fn bytes_to_read(&mut self) -> Result<usize> {
        let state = self.state.lock();
        self.ensure_open(&state)?;
        Ok(state.rx.len())
    }

    fn read_available(&mut self) -> Result<Vec<u8>> {
        let mut state = self.state.lock();
        self.ensure_open(&state)?;
        Ok(state.rx.drain(..).collect())
    }

    fn clear_input(&mut self) -> Result<()> {
        let mut state = self.state.lock();
        self.ensure_open(&state)?;
        state.rx.clear();
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<()> {
        self.state.lock().closed = true;
        Ok(())
    }
}
