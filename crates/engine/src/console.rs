//! Output sink for contract `print` calls

use parking_lot::Mutex;
use tessera_core::Name;
use tracing::info;

/// Destination of text printed by contracts
pub trait Console: Send + Sync {
    /// Emit `message` on behalf of `contract`
    fn print(&self, contract: &Name, message: &str);
}

/// Emits each message as an `info` event on the `tessera::console` target
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingConsole;

impl Console for TracingConsole {
    fn print(&self, contract: &Name, message: &str) {
        info!(target: "tessera::console", contract = %contract, "{}", message.trim_end());
    }
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentConsole;

impl Console for SilentConsole {
    fn print(&self, _contract: &Name, _message: &str) {}
}

/// Keeps every message in memory
#[derive(Debug, Default)]
pub struct BufferConsole {
    lines: Mutex<Vec<(Name, String)>>,
}

impl BufferConsole {
    /// Empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages printed so far, oldest first
    pub fn lines(&self) -> Vec<(Name, String)> {
        self.lines.lock().clone()
    }

    /// Messages only, oldest first
    pub fn messages(&self) -> Vec<String> {
        self.lines.lock().iter().map(|(_, m)| m.clone()).collect()
    }

    /// Drop everything captured
    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}

impl Console for BufferConsole {
    fn print(&self, contract: &Name, message: &str) {
        self.lines.lock().push((contract.clone(), message.to_string()));
    }
}
