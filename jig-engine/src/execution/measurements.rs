use super::opts::ExecOpts;
use crate::errors::*;

pub const MOVED_DATA_TAG: &str = "Moved Data";
pub const RAW_EXECUTION_TAG: &str = "Raw Execution";
pub const NUM_CONTAINERS_TAG: &str = "Num Containers";
pub const NUM_SIGS_TAG: &str = "Num Sigs";
pub const ORIGIN_CHECKS_TAG: &str = "Load By Origin";
pub const NEW_JIGS_TAG: &str = "New Jigs";
pub const DEPLOYS_TAG: &str = "Deploys";

/// Counts a resource in hydros: one hydro every `hydro_size` units, rounded up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HydroCounter {
    tag: &'static str,
    hydro_size: u64,
    max_hydros: u64,
    count: u64,
}

impl HydroCounter {
    pub fn new(tag: &'static str, hydro_size: u64, max_hydros: u64) -> Self {
        Self {
            tag,
            hydro_size: hydro_size.max(1),
            max_hydros,
            count: 0,
        }
    }

    pub fn tag(&self) -> &'static str {
        self.tag
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn hydros(&self) -> u64 {
        self.count.div_ceil(self.hydro_size)
    }

    pub fn add(&mut self, amount: u64) -> Result<(), ExecutionError> {
        self.count = self.count.saturating_add(amount);
        if self.hydros() > self.max_hydros {
            return Err(self.exceeded());
        }
        Ok(())
    }

    pub fn inc(&mut self) -> Result<(), ExecutionError> {
        self.add(1)
    }

    pub fn exceeded(&self) -> ExecutionError {
        ExecutionError::HydrosExceeded {
            tag: self.tag.to_string(),
            max: self.max_hydros,
        }
    }

    /// Resets the counter, returning the hydros it had.
    pub fn clear(&mut self) -> u64 {
        let hydros = self.hydros();
        self.count = 0;
        hydros
    }
}

/// Hydros spent by a transaction, per counter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HydrosReport {
    pub moved_data: u64,
    pub wasm_executed: u64,
    pub num_containers: u64,
    pub num_sigs: u64,
    pub origin_checks: u64,
    pub new_jigs: u64,
    pub deploys: u64,
}

impl HydrosReport {
    pub fn total(&self) -> u64 {
        self.moved_data
            + self.wasm_executed
            + self.num_containers
            + self.num_sigs
            + self.origin_checks
            + self.new_jigs
            + self.deploys
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Measurements {
    pub moved_data: HydroCounter,
    pub wasm_executed: HydroCounter,
    pub num_containers: HydroCounter,
    pub num_sigs: HydroCounter,
    pub origin_checks: HydroCounter,
    pub new_jigs: HydroCounter,
    pub deploys: HydroCounter,
}

impl Measurements {
    pub fn new(opts: &ExecOpts) -> Self {
        Self {
            moved_data: HydroCounter::new(
                MOVED_DATA_TAG,
                opts.move_data_hydro_size,
                opts.move_data_max_hydros,
            ),
            wasm_executed: HydroCounter::new(
                RAW_EXECUTION_TAG,
                opts.wasm_execution_hydro_size,
                opts.wasm_execution_max_hydros,
            ),
            num_containers: HydroCounter::new(
                NUM_CONTAINERS_TAG,
                opts.num_cont_hydro_size,
                opts.num_cont_max_hydros,
            ),
            num_sigs: HydroCounter::new(
                NUM_SIGS_TAG,
                opts.num_sigs_hydro_size,
                opts.num_sigs_max_hydros,
            ),
            origin_checks: HydroCounter::new(
                ORIGIN_CHECKS_TAG,
                opts.origin_check_hydro_size,
                opts.origin_check_max_hydros,
            ),
            new_jigs: HydroCounter::new(
                NEW_JIGS_TAG,
                opts.new_jig_hydro_size,
                opts.new_jig_max_hydros,
            ),
            deploys: HydroCounter::new(
                DEPLOYS_TAG,
                opts.deploy_hydro_size,
                opts.deploy_max_hydros,
            ),
        }
    }

    pub fn clear(&mut self) -> HydrosReport {
        HydrosReport {
            moved_data: self.moved_data.clear(),
            wasm_executed: self.wasm_executed.clear(),
            num_containers: self.num_containers.clear(),
            num_sigs: self.num_sigs.clear(),
            origin_checks: self.origin_checks.clear(),
            new_jigs: self.new_jigs.clear(),
            deploys: self.deploys.clear(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hydros_round_up() {
        let mut counter = HydroCounter::new(MOVED_DATA_TAG, 10, 5);
        assert_eq!(counter.hydros(), 0);
        counter.add(1).unwrap();
        assert_eq!(counter.hydros(), 1);
        counter.add(9).unwrap();
        assert_eq!(counter.hydros(), 1);
        counter.add(1).unwrap();
        assert_eq!(counter.hydros(), 2);
    }

    #[test]
    fn test_exceeding_max_fails() {
        let mut counter = HydroCounter::new(NEW_JIGS_TAG, 1, 2);
        counter.inc().unwrap();
        counter.inc().unwrap();
        let error = counter.inc().unwrap_err();
        assert_eq!(error.to_string(), "Max hydros for New Jigs (2) was over passed");
    }

    #[test]
    fn test_clear_reports_and_resets() {
        let mut measurements = Measurements::new(&ExecOpts::default());
        measurements.num_containers.inc().unwrap();
        measurements.num_sigs.add(2).unwrap();
        measurements.moved_data.add(1500).unwrap();

        let report = measurements.clear();
        assert_eq!(report.num_containers, 1);
        assert_eq!(report.num_sigs, 2);
        assert_eq!(report.moved_data, 2);
        assert_eq!(report.total(), 5);
        assert_eq!(measurements.clear().total(), 0);
    }
}
