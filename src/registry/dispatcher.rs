use std::sync::Arc;

use alloy_primitives::Address;
use tracing::{debug, warn};

use crate::flashloan::{FlashLoanOrchestrator, FlashLoanProvider, FlashState};
use crate::lending::LenderBook;
use crate::monitoring::events;
use crate::state::{Ledger, WorldState};
use crate::venues::VenueBook;

use super::error::{DispatchError, DispatchResult, RegistryResult};
use super::module::{Call, CallEnv};
use super::selector::OperationId;
use super::table::{ModuleCut, ModuleRegistry};

/// 唯一对外入口：按 selector 找到模块并在一个缓冲事务内执行。
pub struct Composer {
    address: Address,
    registry: ModuleRegistry,
    ledger: Ledger,
    venues: Arc<VenueBook>,
    lenders: Arc<LenderBook>,
    flash: Arc<dyn FlashLoanProvider>,
    orchestrator: FlashLoanOrchestrator,
}

impl std::fmt::Debug for Composer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Composer")
            .field("address", &self.address)
            .field("registry", &self.registry)
            .field("committed", &self.ledger.committed())
            .field("venues", &self.venues)
            .field("lenders", &self.lenders)
            .field("flash_provider", &self.flash.address())
            .field("flash_state", &self.orchestrator.state().as_str())
            .finish()
    }
}

impl Composer {
    pub fn new(
        address: Address,
        admin: Address,
        state: WorldState,
        venues: Arc<VenueBook>,
        lenders: Arc<LenderBook>,
        flash: Arc<dyn FlashLoanProvider>,
    ) -> Self {
        Self {
            address,
            registry: ModuleRegistry::new(admin),
            ledger: Ledger::new(state),
            venues,
            lenders,
            flash,
            orchestrator: FlashLoanOrchestrator::new(address),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn state(&self) -> &WorldState {
        self.ledger.state()
    }

    pub fn committed(&self) -> u64 {
        self.ledger.committed()
    }

    pub fn venues(&self) -> &VenueBook {
        &self.venues
    }

    pub fn lenders(&self) -> &LenderBook {
        &self.lenders
    }

    pub fn flash_provider(&self) -> &dyn FlashLoanProvider {
        self.flash.as_ref()
    }

    pub fn flash_state(&self) -> &FlashState {
        self.orchestrator.state()
    }

    pub fn flash_nonce(&self) -> u64 {
        self.orchestrator.nonce()
    }

    pub fn configure(&mut self, caller: Address, cuts: &[ModuleCut]) -> RegistryResult<()> {
        self.registry.configure(caller, cuts)
    }

    pub fn transfer_admin(&mut self, caller: Address, admin: Address) -> RegistryResult<()> {
        self.registry.transfer_admin(caller, admin)
    }

    /// 转发调用；模块的返回值或错误原样传回，失败时整笔事务丢弃。
    pub fn call(&mut self, caller: Address, calldata: &[u8]) -> DispatchResult<Vec<u8>> {
        let operation = OperationId::from_calldata(calldata)
            .ok_or(DispatchError::UnrecognizedOperation { selector: None })?;
        let module = self
            .registry
            .resolve(operation)
            .cloned()
            .ok_or(DispatchError::UnrecognizedOperation {
                selector: Some(operation),
            })?;

        let engine = self.address;
        let venues = self.venues.as_ref();
        let lenders = self.lenders.as_ref();
        let flash = self.flash.as_ref();
        let orchestrator = &mut self.orchestrator;
        let call = Call {
            caller,
            operation,
            args: &calldata[OperationId::LEN..],
        };
        let outcome = self.ledger.transact(|state| {
            let mut env = CallEnv {
                engine,
                state,
                venues,
                lenders,
                flash,
                orchestrator,
            };
            module.invoke(&mut env, &call)
        });

        match &outcome {
            Ok(output) => {
                debug!(
                    target: "dispatcher",
                    %caller,
                    %operation,
                    module = module.name(),
                    output_len = output.len(),
                    "call committed"
                );
                events::call_dispatched(module.name(), "ok");
            }
            Err(err) => {
                warn!(
                    target: "dispatcher",
                    %caller,
                    %operation,
                    module = module.name(),
                    category = err.category().as_str(),
                    error = %err,
                    "call reverted"
                );
                events::call_dispatched(module.name(), err.category().as_str());
            }
        }
        outcome
    }
}
