//! 模块注册表与统一入口：多个命令模块共享同一个对外地址。

pub mod calldata;
mod dispatcher;
mod error;
mod module;
mod selector;
mod table;

pub use dispatcher::Composer;
pub use error::{DispatchError, DispatchResult, RegistryError, RegistryResult};
pub use module::{Call, CallEnv, Module};
pub use selector::OperationId;
pub use table::{CutAction, ModuleCut, ModuleRecord, ModuleRegistry};
