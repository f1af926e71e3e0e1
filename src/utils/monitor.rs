use crate::domain::model::YearbookTiming;
use std::collections::BTreeMap;
#[cfg(feature = "cli")]
use std::sync::{Arc, Mutex};
#[cfg(feature = "cli")]
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, RefreshKind, System};

/// Throughput over every yearbook of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct ThroughputSummary {
    pub yearbooks: usize,
    pub pages: usize,
    pub records: usize,
    /// Summed per-yearbook time; parallel runs finish sooner than this.
    pub busy_ms: u64,
    pub slowest_file: String,
    pub slowest_ms: u64,
}

impl ThroughputSummary {
    pub fn pages_per_second(&self) -> f64 {
        if self.busy_ms == 0 {
            return self.pages as f64;
        }
        self.pages as f64 * 1000.0 / self.busy_ms as f64
    }
}

pub fn summarize_timings(timings: &BTreeMap<String, YearbookTiming>) -> Option<ThroughputSummary> {
    let (slowest_file, slowest) = timings.iter().max_by_key(|(_, t)| t.elapsed_ms)?;
    Some(ThroughputSummary {
        yearbooks: timings.len(),
        pages: timings.values().map(|t| t.pages).sum(),
        records: timings.values().map(|t| t.records).sum(),
        busy_ms: timings.values().map(|t| t.elapsed_ms).sum(),
        slowest_file: slowest_file.clone(),
        slowest_ms: slowest.elapsed_ms,
    })
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone)]
pub struct SystemStats {
    pub cpu_usage: f32,
    pub memory_usage_mb: u64,
    pub memory_usage_percent: f32,
    pub peak_memory_mb: u64,
    pub elapsed_time: Duration,
}

/// Samples CPU and memory of this process between pipeline stages.
#[cfg(feature = "cli")]
pub struct SystemMonitor {
    system: Arc<Mutex<System>>,
    pid: Option<Pid>,
    start_time: Instant,
    peak_memory: Arc<Mutex<u64>>,
    enabled: bool,
}

#[cfg(feature = "cli")]
impl SystemMonitor {
    pub fn new(enabled: bool) -> Self {
        let mut system = System::new_with_specifics(RefreshKind::everything());

        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => Some(pid),
            Err(e) => {
                tracing::warn!("System monitoring unavailable: {}", e);
                None
            }
        };

        if enabled {
            system.refresh_all();
        }

        Self {
            system: Arc::new(Mutex::new(system)),
            pid,
            start_time: Instant::now(),
            peak_memory: Arc::new(Mutex::new(0)),
            enabled: enabled && pid.is_some(),
        }
    }

    pub fn get_stats(&self) -> Option<SystemStats> {
        if !self.enabled {
            return None;
        }

        let mut system = self.system.lock().ok()?;
        system.refresh_all();

        let process = system.process(self.pid?)?;
        let memory_mb = process.memory() / 1024 / 1024;
        let total_memory = system.total_memory() / 1024 / 1024;
        let memory_percent = if total_memory > 0 {
            (memory_mb as f32 / total_memory as f32) * 100.0
        } else {
            0.0
        };

        let mut peak = self.peak_memory.lock().ok()?;
        if memory_mb > *peak {
            *peak = memory_mb;
        }

        Some(SystemStats {
            cpu_usage: process.cpu_usage(),
            memory_usage_mb: memory_mb,
            memory_usage_percent: memory_percent,
            peak_memory_mb: *peak,
            elapsed_time: self.start_time.elapsed(),
        })
    }

    pub fn log_stats(&self, phase: &str) {
        if let Some(stats) = self.get_stats() {
            tracing::info!(
                "📊 {} - CPU: {:.1}%, Memory: {}MB ({:.1}%), Peak: {}MB, Time: {:?}",
                phase,
                stats.cpu_usage,
                stats.memory_usage_mb,
                stats.memory_usage_percent,
                stats.peak_memory_mb,
                stats.elapsed_time
            );
        }
    }

    /// Per-yearbook parse times from the extract stage, with current memory.
    pub fn log_yearbooks(&self, timings: &BTreeMap<String, YearbookTiming>) {
        if !self.enabled {
            return;
        }
        for (file, timing) in timings {
            tracing::debug!(
                "📊 {} - {} pages, {} records, {}ms",
                file,
                timing.pages,
                timing.records,
                timing.elapsed_ms
            );
        }
        let Some(summary) = summarize_timings(timings) else {
            return;
        };
        let memory = self
            .get_stats()
            .map(|stats| format!("{}MB", stats.memory_usage_mb))
            .unwrap_or_else(|| "n/a".to_string());
        tracing::info!(
            "📊 Yearbooks - {} files, {} pages, {:.1} pages/s, slowest {} ({}ms), Memory: {}",
            summary.yearbooks,
            summary.pages,
            summary.pages_per_second(),
            summary.slowest_file,
            summary.slowest_ms,
            memory
        );
    }

    pub fn log_final_stats(&self) {
        if let Some(stats) = self.get_stats() {
            tracing::info!(
                "📊 Final Stats - Total Time: {:?}, Peak Memory: {}MB",
                stats.elapsed_time,
                stats.peak_memory_mb
            );
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(feature = "cli")]
impl Default for SystemMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

// Library builds without the cli feature get a no-op monitor.
#[cfg(not(feature = "cli"))]
#[derive(Default)]
pub struct SystemMonitor;

#[cfg(not(feature = "cli"))]
impl SystemMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn log_stats(&self, _phase: &str) {}

    pub fn log_yearbooks(&self, _timings: &BTreeMap<String, YearbookTiming>) {}

    pub fn log_final_stats(&self) {}

    pub fn is_enabled(&self) -> bool {
        false
    }
}
