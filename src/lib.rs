//! 链上杠杆交易组合引擎：路径编码、闪电贷编排、借贷与兑换场所适配，
//! 以及由模块注册表驱动的统一调用入口。

pub mod cli;
pub mod config;
pub mod engine;
pub mod flashloan;
pub mod lending;
pub mod modules;
pub mod monitoring;
pub mod path;
pub mod registry;
pub mod state;
pub mod venues;
