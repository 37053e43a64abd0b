//! Live process memory sampling.
//!
//! `used` is the resident set of this process and `total` the memory of the
//! host, both in bytes, read through sysinfo on every call.

use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use sysinfo::{Pid, System};
use thiserror::Error;

/// One memory reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemoryUsage {
    pub used: u64,
    pub total: u64,
    pub percentage: f64,
}

impl MemoryUsage {
    pub fn new(used: u64, total: u64) -> Result<Self, MemoryProbeError> {
        if total == 0 {
            return Err(MemoryProbeError::NoTotal);
        }
        Ok(Self {
            used,
            total,
            percentage: used as f64 / total as f64 * 100.0,
        })
    }
}

#[derive(Debug, Clone, Error)]
pub enum MemoryProbeError {
    #[error("current process id unavailable: {0}")]
    Pid(String),

    #[error("process {0} missing from the process table")]
    ProcessMissing(u32),

    #[error("host reported zero total memory")]
    NoTotal,
}

/// Source of memory readings.
pub trait MemoryProbe: Send + Sync {
    fn sample(&self) -> Result<MemoryUsage, MemoryProbeError>;
}

/// Reads the current process through sysinfo.
pub struct ProcessMemoryProbe {
    system: Mutex<System>,
    pid: Pid,
}

impl ProcessMemoryProbe {
    pub fn new() -> Result<Self, MemoryProbeError> {
        let pid = sysinfo::get_current_pid().map_err(|e| MemoryProbeError::Pid(e.to_string()))?;
        Ok(Self {
            system: Mutex::new(System::new()),
            pid,
        })
    }
}

impl MemoryProbe for ProcessMemoryProbe {
    fn sample(&self) -> Result<MemoryUsage, MemoryProbeError> {
        let mut system = self.system.lock().unwrap_or_else(PoisonError::into_inner);
        system.refresh_memory();
        system.refresh_process(self.pid);

        let used = system
            .process(self.pid)
            .map(|process| process.memory())
            .ok_or(MemoryProbeError::ProcessMissing(self.pid.as_u32()))?;
        MemoryUsage::new(used, system.total_memory())
    }
}

/// Fixed reading, for embedding hosts that report memory themselves and for
/// tests.
#[derive(Debug, Clone, Copy)]
pub struct StaticMemoryProbe {
    pub used: u64,
    pub total: u64,
}

impl MemoryProbe for StaticMemoryProbe {
    fn sample(&self) -> Result<MemoryUsage, MemoryProbeError> {
        MemoryUsage::new(self.used, self.total)
    }
}
