//! Process memory sampling for per-file logs

use parking_lot::Mutex;
use sysinfo::{Pid, ProcessesToUpdate, System};

/// Reads the resident memory of the current process
pub struct ResourceProbe {
    pid: Option<Pid>,
    system: Mutex<System>,
}

impl ResourceProbe {
    pub fn new() -> Self {
        Self {
            pid: sysinfo::get_current_pid().ok(),
            system: Mutex::new(System::new()),
        }
    }

    /// Resident set size in bytes, when the platform exposes it
    pub fn resident_memory_bytes(&self) -> Option<u64> {
        let pid = self.pid?;
        let mut system = self.system.lock();
        system.refresh_processes(ProcessesToUpdate::Some(&[pid]));
        system.process(pid).map(|process| process.memory())
    }

    pub fn resident_memory_mb(&self) -> Option<f64> {
        self.resident_memory_bytes()
            .map(|bytes| bytes as f64 / (1024.0 * 1024.0))
    }
}

impl Default for ResourceProbe {
    fn default() -> Self {
        Self::new()
    }
}
