use alloy_primitives::Address;

use crate::flashloan::{FlashLoanOrchestrator, FlashLoanProvider};
use crate::lending::LenderBook;
use crate::state::WorldState;
use crate::venues::VenueBook;

use super::error::DispatchResult;
use super::selector::OperationId;

/// 模块执行时可见的环境。`state` 是当前事务的工作副本。
pub struct CallEnv<'a> {
    pub engine: Address,
    pub state: &'a mut WorldState,
    pub venues: &'a VenueBook,
    pub lenders: &'a LenderBook,
    pub flash: &'a dyn FlashLoanProvider,
    /// façade 持有的闪电贷状态机，跨调用保留 nonce。
    pub orchestrator: &'a mut FlashLoanOrchestrator,
}

/// 转发给模块的调用。`caller` 是外部原始调用方，`args` 不含 selector。
#[derive(Debug, Clone, Copy)]
pub struct Call<'a> {
    pub caller: Address,
    pub operation: OperationId,
    pub args: &'a [u8],
}

/// 可注册到 façade 的命令模块。
pub trait Module: Send + Sync {
    /// 实现地址，registry 以此区分模块。
    fn address(&self) -> Address;

    fn name(&self) -> &'static str;

    /// 模块实现的全部操作，用于生成注册变更。
    fn operations(&self) -> Vec<OperationId>;

    fn invoke(&self, env: &mut CallEnv<'_>, call: &Call<'_>) -> DispatchResult<Vec<u8>>;
}
