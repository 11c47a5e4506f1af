use alloy_primitives::{Address, U256};

pub mod launch;
pub mod loader;
pub mod types;

pub use launch::{LaunchError, build_composer};
pub use loader::*;
pub use types::*;

use self::types as cfg;

/// `composer init` 写出的配置模板。
pub const CONFIG_TEMPLATE: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/composer.toml"));

pub(crate) fn default_logging_level() -> String {
    "info".to_string()
}

pub(crate) fn default_logging_profile() -> cfg::LoggingProfile {
    cfg::LoggingProfile::Lean
}

pub(crate) fn default_timezone_offset_hours() -> i8 {
    0
}

pub(crate) fn default_prometheus_listen() -> String {
    "0.0.0.0:9898".to_string()
}

pub(crate) fn default_engine_address() -> Address {
    Address::with_last_byte(0xe0)
}

pub(crate) fn default_admin_address() -> Address {
    Address::with_last_byte(0xad)
}

pub(crate) fn default_trader_module_address() -> Address {
    Address::with_last_byte(0x21)
}

pub(crate) fn default_lens_module_address() -> Address {
    Address::with_last_byte(0x22)
}

pub(crate) fn default_flash_provider_address() -> Address {
    Address::with_last_byte(0xf1)
}

pub(crate) fn default_flash_fee() -> u64 {
    9
}

pub(crate) fn default_flash_fee_denom() -> u64 {
    10_000
}

pub(crate) fn default_rate_part() -> u64 {
    1
}

pub(crate) fn default_price() -> U256 {
    U256::from(1)
}

pub(crate) fn default_ltv_bps() -> u16 {
    8_000
}
