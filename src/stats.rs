//! Host statistics: memory figures from `sysinfo`, CPU tick counters from
//! procfs, plus the per-cycle CPU delta bookkeeping used by the overlay.

use std::fmt;
use std::fs;
use std::path::PathBuf;

use sysinfo::{RefreshKind, System, SystemExt};
use tracing::trace;

use crate::error::{Error, Result};

/// Memory figures in bytes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MemoryStats {
    pub ram_total: u64,
    pub ram_used: u64,
    pub ram_free: u64,
    pub swap_total: u64,
    pub swap_used: u64,
    pub swap_free: u64,
}

/// Absolute CPU time counters since boot, in clock ticks.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CpuCounters {
    pub user: u64,
    pub system: u64,
    pub idle: u64,
    pub total: u64,
}

/// One cycle's worth of statistics as presented to overlay templates.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub memory: MemoryStats,
    pub cpu_user_pct: u64,
    pub cpu_system_pct: u64,
    pub cpu_idle_pct: u64,
}

/// Where memory and CPU figures come from.
pub trait StatsSource {
    fn memory(&mut self) -> Result<MemoryStats>;
    fn cpu(&mut self) -> Result<CpuCounters>;
}

/// The live host: memory through a long-lived [`System`], raw CPU ticks
/// from the `stat` file under a procfs root (normally `/proc`).
pub struct HostStats {
    system: System,
    proc_root: PathBuf,
}

impl fmt::Debug for HostStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostStats").field("proc_root", &self.proc_root).finish_non_exhaustive()
    }
}

impl Default for HostStats {
    fn default() -> Self {
        Self::new("/proc")
    }
}

impl HostStats {
    pub fn new(proc_root: impl Into<PathBuf>) -> Self {
        Self {
            system: System::new_with_specifics(RefreshKind::new().with_memory()),
            proc_root: proc_root.into(),
        }
    }

    fn read(&self, name: &str) -> Result<String> {
        let path = self.proc_root.join(name);
        fs::read_to_string(&path).map_err(|err| Error::Stats(format!("failed to read {}: {err}", path.display())))
    }
}

impl StatsSource for HostStats {
    fn memory(&mut self) -> Result<MemoryStats> {
        self.system.refresh_memory();
        memory_from(&self.system)
    }

    fn cpu(&mut self) -> Result<CpuCounters> {
        parse_cpu_line(&self.read("stat")?)
    }
}

fn memory_from(system: &System) -> Result<MemoryStats> {
    let ram_total = system.total_memory();
    if ram_total == 0 {
        return Err(Error::Stats("host reported no physical memory".into()));
    }
    Ok(MemoryStats {
        ram_total,
        ram_used: system.used_memory(),
        ram_free: system.free_memory(),
        swap_total: system.total_swap(),
        swap_used: system.used_swap(),
        swap_free: system.free_swap(),
    })
}

fn parse_cpu_line(raw: &str) -> Result<CpuCounters> {
    let line = raw
        .lines()
        .find(|line| line.split_whitespace().next() == Some("cpu"))
        .ok_or_else(|| Error::Stats("stat lacks an aggregate cpu line".into()))?;
    let values = line
        .split_whitespace()
        .skip(1)
        .map(|v| v.parse::<u64>().map_err(|err| Error::Stats(format!("bad cpu counter {v:?}: {err}"))))
        .collect::<Result<Vec<_>>>()?;
    if values.len() < 4 {
        return Err(Error::Stats(format!("cpu line has {} counters, need at least 4", values.len())));
    }
    // user nice system idle iowait irq softirq steal [guest guest_nice]
    // guest time is already folded into user/nice.
    let total = values.iter().take(8).sum();
    Ok(CpuCounters {
        user: values[0],
        system: values[2],
        idle: values[3],
        total,
    })
}

/// Carries the previous cycle's CPU counters so each refresh can report
/// percentages over the elapsed interval. Starts from zero.
#[derive(Debug, Default, Clone)]
pub struct StatsTracker {
    previous: CpuCounters,
}

impl StatsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Query `source` and produce the snapshot for this cycle.
    ///
    /// # Errors
    /// Propagates any [`Error::Stats`] from the source.
    pub fn refresh<S: StatsSource + ?Sized>(&mut self, source: &mut S) -> Result<StatsSnapshot> {
        let memory = source.memory()?;
        let cpu = source.cpu()?;
        let snapshot = self.advance(memory, cpu);
        trace!(?snapshot, "stats refreshed");
        Ok(snapshot)
    }

    fn advance(&mut self, memory: MemoryStats, cpu: CpuCounters) -> StatsSnapshot {
        let total = cpu.total.saturating_sub(self.previous.total);
        let pct = |cur: u64, prev: u64| -> u64 {
            if total == 0 {
                return 0;
            }
            (cur.saturating_sub(prev) as f64 / total as f64 * 100.0) as u64
        };
        let snapshot = StatsSnapshot {
            memory,
            cpu_user_pct: pct(cpu.user, self.previous.user),
            cpu_system_pct: pct(cpu.system, self.previous.system),
            cpu_idle_pct: pct(cpu.idle, self.previous.idle),
        };
        self.previous = cpu;
        snapshot
    }
}

/// Human-readable SI byte count: `"512 B"`, `"1.2 GB"`, `"82 MB"`.
#[must_use]
pub fn humanize_bytes(bytes: u64) -> String {
    const UNITS: [&str; 7] = ["B", "kB", "MB", "GB", "TB", "PB", "EB"];
    if bytes < 10 {
        return format!("{bytes} B");
    }
    let value = bytes as f64;
    let exp = (value.ln() / 1000f64.ln()).floor() as usize;
    let exp = exp.min(UNITS.len() - 1);
    let scaled = (value / 1000f64.powi(exp as i32) * 10.0 + 0.5).floor() / 10.0;
    if scaled < 10.0 {
        format!("{scaled:.1} {}", UNITS[exp])
    } else {
        format!("{scaled:.0} {}", UNITS[exp])
    }
}
