//! Host utilization sample (value type only; sampling lives in the agent).

use serde::Serialize;

use crate::error::Result;
use crate::line::{Batch, FieldValue};

pub const SYSTEM_CATEGORY: &str = "system";

/// CPU and memory utilization at one point in time, in percent.
///
/// `cpu_percent` may exceed 100 when the load average is higher than the
/// logical core count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SystemUsage {
    pub cpu_percent: f64,
    pub memory_percent: f64,
}

impl SystemUsage {
    pub fn describe(&self, batch: &mut Batch) -> Result<()> {
        batch.add_line(SYSTEM_CATEGORY, "cpu", "usage", FieldValue::percent(self.cpu_percent))?;
        batch.add_line(
            SYSTEM_CATEGORY,
            "memory",
            "usage",
            FieldValue::percent(self.memory_percent),
        )
    }
}
