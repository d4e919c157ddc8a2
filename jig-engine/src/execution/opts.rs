use jig_common::constants::MIN_FUND_AMOUNT;

/// Options of a transaction execution: tracing, funding and hydro limits.
///
/// A counter turns its raw count into hydros by dividing it by the hydro size, rounding up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOpts {
    pub trace: bool,
    pub min_fund_amount: u64,

    pub move_data_hydro_size: u64,
    pub move_data_max_hydros: u64,
    pub wasm_execution_hydro_size: u64,
    pub wasm_execution_max_hydros: u64,
    pub num_cont_hydro_size: u64,
    pub num_cont_max_hydros: u64,
    pub num_sigs_hydro_size: u64,
    pub num_sigs_max_hydros: u64,
    pub origin_check_hydro_size: u64,
    pub origin_check_max_hydros: u64,
    pub new_jig_hydro_size: u64,
    pub new_jig_max_hydros: u64,
    pub deploy_hydro_size: u64,
    pub deploy_max_hydros: u64,
}

impl Default for ExecOpts {
    fn default() -> Self {
        Self {
            trace: false,
            min_fund_amount: MIN_FUND_AMOUNT,
            move_data_hydro_size: 1024,
            move_data_max_hydros: 500,
            wasm_execution_hydro_size: 10_000,
            wasm_execution_max_hydros: 10_000,
            num_cont_hydro_size: 1,
            num_cont_max_hydros: 100,
            num_sigs_hydro_size: 1,
            num_sigs_max_hydros: 100,
            origin_check_hydro_size: 1,
            origin_check_max_hydros: 500,
            new_jig_hydro_size: 1,
            new_jig_max_hydros: 500,
            deploy_hydro_size: 1,
            deploy_max_hydros: 30_000,
        }
    }
}

impl ExecOpts {
    /// Same sizes as the default profile, with limits nobody reaches in a test.
    pub fn for_tests() -> Self {
        Self {
            move_data_max_hydros: 1_000_000,
            wasm_execution_max_hydros: 1_000_000,
            num_cont_max_hydros: 1_000_000,
            num_sigs_max_hydros: 1_000_000,
            origin_check_max_hydros: 1_000_000,
            new_jig_max_hydros: 1_000_000,
            deploy_max_hydros: 1_000_000,
            ..Self::default()
        }
    }

    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    pub fn with_min_fund_amount(mut self, amount: u64) -> Self {
        self.min_fund_amount = amount;
        self
    }

    pub fn with_move_data_limit(mut self, hydro_size: u64, max_hydros: u64) -> Self {
        self.move_data_hydro_size = hydro_size;
        self.move_data_max_hydros = max_hydros;
        self
    }

    pub fn with_wasm_execution_limit(mut self, hydro_size: u64, max_hydros: u64) -> Self {
        self.wasm_execution_hydro_size = hydro_size;
        self.wasm_execution_max_hydros = max_hydros;
        self
    }

    pub fn with_containers_limit(mut self, hydro_size: u64, max_hydros: u64) -> Self {
        self.num_cont_hydro_size = hydro_size;
        self.num_cont_max_hydros = max_hydros;
        self
    }

    pub fn with_sigs_limit(mut self, hydro_size: u64, max_hydros: u64) -> Self {
        self.num_sigs_hydro_size = hydro_size;
        self.num_sigs_max_hydros = max_hydros;
        self
    }

    pub fn with_origin_checks_limit(mut self, hydro_size: u64, max_hydros: u64) -> Self {
        self.origin_check_hydro_size = hydro_size;
        self.origin_check_max_hydros = max_hydros;
        self
    }

    pub fn with_new_jigs_limit(mut self, hydro_size: u64, max_hydros: u64) -> Self {
        self.new_jig_hydro_size = hydro_size;
        self.new_jig_max_hydros = max_hydros;
        self
    }

    pub fn with_deploys_limit(mut self, hydro_size: u64, max_hydros: u64) -> Self {
        self.deploy_hydro_size = hydro_size;
        self.deploy_max_hydros = max_hydros;
        self
    }

    /// Fuel handed to the store. Running out of it exceeds the raw execution limit.
    pub fn max_fuel(&self) -> u64 {
        self.wasm_execution_hydro_size
            .saturating_mul(self.wasm_execution_max_hydros)
    }
}
