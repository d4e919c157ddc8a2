//! Hand-written packages used by the integration tests, under `assets/`.

pub mod common {
    pub use jig_common::prelude::*;
    pub use jig_engine::context::*;
    pub use jig_engine::errors::*;
    pub use jig_engine::execution::*;
    pub use jig_engine::vm::Vm;
    pub use jig_unit::*;
    pub use std::collections::BTreeMap;

    /// Entries and sources of the package `assets/{name}.wat`, with the ABI next to it.
    #[macro_export]
    macro_rules! include_package {
        ($name:literal) => {
            $crate::common::package_sources(
                concat!($name, ".wat"),
                include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/", $name, ".wat")),
                include_str!(concat!(
                    env!("CARGO_MANIFEST_DIR"),
                    "/assets/",
                    $name,
                    ".abi.json"
                )),
            )
        };
    }

    pub const COUNTER_INC: u16 = 0;
    pub const COUNTER_ADD: u16 = 1;
    pub const COUNTER_PROBE_CALLER: u16 = 2;
    pub const COUNTER_CALLER_ORIGIN: u16 = 3;
    pub const COUNTER_FREEZE: u16 = 4;
    pub const COUNTER_SEVEN: u16 = 5;
    pub const DOUBLE_FN: u16 = 1;
    pub const HALF_FN: u16 = 2;

    pub const PARENT_CLASS: u16 = 0;
    pub const CHILD_CLASS: u16 = 1;
    pub const PARENT_PING_CHILD: u16 = 0;
    pub const PARENT_CHECK_CHILD: u16 = 1;
    pub const PARENT_READ_PINGS: u16 = 2;
    pub const PARENT_AUTH_CHILD: u16 = 3;
    pub const CHILD_PING: u16 = 0;

    pub const FACTORY_MAKE_COUNTER: u16 = 0;
    pub const FACTORY_DOUBLE_REMOTE: u16 = 1;
    pub const FACTORY_SEVEN_REMOTE: u16 = 2;

    pub fn deploy_counter(runner: &TestRunner) -> PackageId {
        let (entries, sources) = crate::include_package!("counter");
        runner.deploy(entries, sources)
    }

    pub fn deploy_family(runner: &TestRunner) -> PackageId {
        let (entries, sources) = crate::include_package!("family");
        runner.deploy(entries, sources)
    }

    pub fn deploy_factory(runner: &TestRunner) -> PackageId {
        let (entries, sources) = crate::include_package!("factory");
        runner.deploy(entries, sources)
    }

    /// Wire form of a `Counter` state.
    pub fn counter_state(count: u32, saw_caller: bool) -> Vec<u8> {
        let mut writer = BufWriter::new();
        writer.write_u32(count).write_bool(saw_caller);
        writer.into_bytes()
    }
}
