use alloy_primitives::{Address, U256};
use serde::Deserialize;
use serde_with::{DisplayFromStr, serde_as};

use crate::flashloan::FeeMode;

/// `composer.toml` 的完整结构。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComposerConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub composer: FacadeConfig,
    #[serde(default)]
    pub flashloan: FlashloanConfig,
    #[serde(default)]
    pub venues: Vec<VenueConfig>,
    #[serde(default)]
    pub lenders: Vec<LenderConfig>,
    #[serde(default)]
    pub balances: Vec<BalanceSeed>,
    #[serde(default)]
    pub positions: Vec<PositionSeed>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoggingProfile {
    #[default]
    Lean,
    Verbose,
}

impl LoggingProfile {
    pub fn is_verbose(self) -> bool {
        matches!(self, Self::Verbose)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "super::default_logging_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
    #[serde(default = "super::default_logging_profile")]
    pub profile: LoggingProfile,
    #[serde(default = "super::default_timezone_offset_hours")]
    pub timezone_offset_hours: i8,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: super::default_logging_level(),
            json: false,
            profile: super::default_logging_profile(),
            timezone_offset_hours: super::default_timezone_offset_hours(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default)]
    pub enable: bool,
    #[serde(default = "super::default_prometheus_listen")]
    pub prometheus_listen: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enable: false,
            prometheus_listen: super::default_prometheus_listen(),
        }
    }
}

/// façade 本身及两个内置模块的地址。
#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct FacadeConfig {
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default = "super::default_engine_address")]
    pub engine: Address,
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default = "super::default_admin_address")]
    pub admin: Address,
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default = "super::default_trader_module_address")]
    pub trader_module: Address,
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default = "super::default_lens_module_address")]
    pub lens_module: Address,
}

impl Default for FacadeConfig {
    fn default() -> Self {
        Self {
            engine: super::default_engine_address(),
            admin: super::default_admin_address(),
            trader_module: super::default_trader_module_address(),
            lens_module: super::default_lens_module_address(),
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct FlashloanConfig {
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default = "super::default_flash_provider_address")]
    pub provider: Address,
    #[serde(default = "super::default_flash_fee")]
    pub fee: u64,
    #[serde(default = "super::default_flash_fee_denom")]
    pub denom: u64,
    #[serde(default)]
    pub mode: FeeMode,
}

impl Default for FlashloanConfig {
    fn default() -> Self {
        Self {
            provider: super::default_flash_provider_address(),
            fee: super::default_flash_fee(),
            denom: super::default_flash_fee_denom(),
            mode: FeeMode::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VenueKindConfig {
    ConstantProduct,
    FixedRate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VenueConfig {
    pub provider_id: u8,
    pub kind: VenueKindConfig,
    #[serde(default)]
    pub pools: Vec<PoolConfig>,
}

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct PoolConfig {
    #[serde_as(as = "DisplayFromStr")]
    pub token0: Address,
    #[serde_as(as = "DisplayFromStr")]
    pub token1: Address,
    pub fee: u32,
    #[serde_as(as = "DisplayFromStr")]
    pub address: Address,
    /// 仅 fixed-rate：1 单位 token0 可换 `rate_numerator / rate_denominator` 单位 token1。
    #[serde(default = "super::default_rate_part")]
    pub rate_numerator: u64,
    #[serde(default = "super::default_rate_part")]
    pub rate_denominator: u64,
}

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct LenderConfig {
    pub id: u8,
    #[serde_as(as = "DisplayFromStr")]
    pub address: Address,
    #[serde(default)]
    pub assets: Vec<LenderAssetConfig>,
}

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct LenderAssetConfig {
    #[serde_as(as = "DisplayFromStr")]
    pub token: Address,
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default = "super::default_price")]
    pub price: U256,
    #[serde(default = "super::default_ltv_bps")]
    pub ltv_bps: u16,
}

/// 初始余额。
#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct BalanceSeed {
    #[serde_as(as = "DisplayFromStr")]
    pub token: Address,
    #[serde_as(as = "DisplayFromStr")]
    pub holder: Address,
    #[serde_as(as = "DisplayFromStr")]
    pub amount: U256,
}

/// 初始借贷仓位，`lender` 为已配置的 lender id。
#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct PositionSeed {
    pub lender: u8,
    #[serde_as(as = "DisplayFromStr")]
    pub user: Address,
    #[serde_as(as = "DisplayFromStr")]
    pub asset: Address,
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default)]
    pub collateral: U256,
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default)]
    pub debt: U256,
}
