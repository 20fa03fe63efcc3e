//! Host utilization sampling.
//!
//! Point-in-time reads with no state kept between calls.

use sysinfo::{CpuRefreshKind, MemoryRefreshKind, RefreshKind, System};

use lineflux_core::error::{LineFluxError, Result};
use lineflux_core::SystemUsage;

/// Source of host CPU/memory utilization, called once per export tick.
pub trait HostSampler: Send + Sync {
    fn sample(&self) -> Result<SystemUsage>;
}

/// Samples the local machine through `sysinfo`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SysinfoSampler;

impl SysinfoSampler {
    pub fn new() -> Self {
        Self
    }
}

impl HostSampler for SysinfoSampler {
    fn sample(&self) -> Result<SystemUsage> {
        Ok(SystemUsage {
            cpu_percent: sample_cpu_percent()?,
            memory_percent: sample_memory_percent()?,
        })
    }
}

/// 1-minute load average over logical core count, in percent. Not clamped.
pub fn sample_cpu_percent() -> Result<f64> {
    let sys = System::new_with_specifics(RefreshKind::nothing().with_cpu(CpuRefreshKind::nothing()));
    let cores = sys.cpus().len();
    if cores == 0 {
        return Err(LineFluxError::Sampling("no logical cpus reported".into()));
    }
    Ok(cpu_percent(System::load_average().one, cores))
}

/// Used memory over total memory, in percent.
pub fn sample_memory_percent() -> Result<f64> {
    let sys = System::new_with_specifics(
        RefreshKind::nothing().with_memory(MemoryRefreshKind::nothing().with_ram()),
    );
    memory_percent(sys.total_memory(), sys.free_memory())
}

pub fn cpu_percent(load_one: f64, cores: usize) -> f64 {
    load_one / cores as f64 * 100.0
}

pub fn memory_percent(total: u64, free: u64) -> Result<f64> {
    if total == 0 {
        return Err(LineFluxError::Sampling("total memory reported as zero".into()));
    }
    let used = total.saturating_sub(free);
    Ok(used as f64 / total as f64 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_percent_is_not_clamped() {
        assert_eq!(cpu_percent(2.0, 4), 50.0);
        assert_eq!(cpu_percent(6.0, 4), 150.0);
    }

    #[test]
    fn memory_percent_from_totals() {
        let p = memory_percent(8_000, 2_000).unwrap();
        assert_eq!(p, 75.0);
        assert_eq!(
            memory_percent(0, 0).unwrap_err().kind().as_str(),
            "SAMPLING_FAILURE"
        );
    }
}
