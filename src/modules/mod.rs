//! 注册到 façade 上的命令模块。

pub mod lens;
pub mod trader;

pub use lens::LensModule;
pub use trader::{TRADE_ENTRIES, TradeEntry, TraderModule, trade_entry, trade_entry_by_name};
