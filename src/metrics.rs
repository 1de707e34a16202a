//! Performance metrics for a single VM instance.
//!
//! The execution substrate is single-threaded per instance (§5), so these
//! counters are plain integers rather than the `Arc<AtomicU64>` fields a
//! shared, multi-reader metrics struct would need; the field and method
//! names otherwise follow the record_* / accessor convention of a
//! multi-threaded VM's metrics collector.

use std::time::Duration;

/// Monotonically increasing counters describing one VM instance's
/// lifetime, until [`PerformanceMetrics::reset`] is called.
#[derive(Debug, Clone, Default)]
pub struct PerformanceMetrics {
    instructions_executed: u64,
    memory_operations: u64,
    io_operations: u64,
    programs_executed: u64,
    failed_programs: u64,
    total_execution_time: Duration,
}

impl PerformanceMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one retired instruction.
    pub fn record_instruction(&mut self) {
        self.instructions_executed += 1;
    }

    /// Records one global/array load or store.
    pub fn record_memory_operation(&mut self) {
        self.memory_operations += 1;
    }

    /// Records one call through the I/O Port.
    pub fn record_io_operation(&mut self) {
        self.io_operations += 1;
    }

    /// Records the completion (successful or not) of one `execute_program`
    /// call and accumulates its wall-clock duration.
    pub fn record_execution(&mut self, success: bool, elapsed: Duration) {
        self.programs_executed += 1;
        if !success {
            self.failed_programs += 1;
        }
        self.total_execution_time += elapsed;
    }

    pub fn instructions_executed(&self) -> u64 {
        self.instructions_executed
    }

    pub fn memory_operations(&self) -> u64 {
        self.memory_operations
    }

    pub fn io_operations(&self) -> u64 {
        self.io_operations
    }

    pub fn programs_executed(&self) -> u64 {
        self.programs_executed
    }

    pub fn failed_programs(&self) -> u64 {
        self.failed_programs
    }

    pub fn total_execution_time(&self) -> Duration {
        self.total_execution_time
    }

    /// Zeroes every counter. Called on VM reset (§4.4).
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_until_reset() {
        let mut metrics = PerformanceMetrics::new();
        metrics.record_instruction();
        metrics.record_instruction();
        metrics.record_memory_operation();
        metrics.record_execution(true, Duration::from_millis(5));
        assert_eq!(metrics.instructions_executed(), 2);
        assert_eq!(metrics.memory_operations(), 1);
        assert_eq!(metrics.programs_executed(), 1);
        assert_eq!(metrics.failed_programs(), 0);

        metrics.reset();
        assert_eq!(metrics.instructions_executed(), 0);
        assert_eq!(metrics.total_execution_time(), Duration::ZERO);
    }

    #[test]
    fn failed_execution_is_counted_separately() {
        let mut metrics = PerformanceMetrics::new();
        metrics.record_execution(false, Duration::from_micros(10));
        assert_eq!(metrics.programs_executed(), 1);
        assert_eq!(metrics.failed_programs(), 1);
    }
}
