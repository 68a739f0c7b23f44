//! Shared fixtures: changers built from TOML and a log capture.

use std::io;
use std::sync::{Arc, Mutex};

use mtc_common::tool::types::Xyz;
use mtc_hal::SimulatedMachine;
use mtc_toolchange::ToolChanger;
use mtc_toolchange::config::load_config_from_str;

/// Changer for a `[toolchange]` body, machine at `start`.
pub fn changer_at(toolchange_toml: &str, start: Xyz) -> ToolChanger<SimulatedMachine> {
    let loaded = load_config_from_str(toolchange_toml).unwrap();
    let machine = loaded.simulated_machine().with_position(start);
    ToolChanger::new(&loaded.toolchange, machine).unwrap()
}

pub fn changer(toolchange_toml: &str) -> ToolChanger<SimulatedMachine> {
    changer_at(toolchange_toml, Xyz::new(100.0, 100.0, 5.0))
}

pub fn approx_eq(a: Xyz, b: Xyz) -> bool {
    (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9 && (a.z - b.z).abs() < 1e-9
}

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl io::Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a thread-local subscriber and return its log output.
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
    let buf = SharedBuf::default();
    let writer = buf.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(move || writer.clone())
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    let logs = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
    (result, logs)
}
