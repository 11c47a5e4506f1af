use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use alloy_primitives::Address;
use tracing::info;

use crate::monitoring::events;

use super::error::{RegistryError, RegistryResult};
use super::module::Module;
use super::selector::OperationId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutAction {
    Add,
    Replace,
    Remove,
}

impl CutAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            CutAction::Add => "add",
            CutAction::Replace => "replace",
            CutAction::Remove => "remove",
        }
    }
}

/// 一条注册变更。Remove 时 `module` 必须为空。
#[derive(Clone)]
pub struct ModuleCut {
    pub module: Option<Arc<dyn Module>>,
    pub action: CutAction,
    pub operations: Vec<OperationId>,
}

impl ModuleCut {
    pub fn add(module: Arc<dyn Module>) -> Self {
        let operations = module.operations();
        Self {
            module: Some(module),
            action: CutAction::Add,
            operations,
        }
    }

    pub fn replace(module: Arc<dyn Module>, operations: Vec<OperationId>) -> Self {
        Self {
            module: Some(module),
            action: CutAction::Replace,
            operations,
        }
    }

    pub fn remove(operations: Vec<OperationId>) -> Self {
        Self {
            module: None,
            action: CutAction::Remove,
            operations,
        }
    }
}

impl fmt::Debug for ModuleCut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleCut")
            .field("module", &self.module.as_ref().map(|module| module.address()))
            .field("action", &self.action)
            .field("operations", &self.operations)
            .finish()
    }
}

#[derive(Clone)]
pub struct ModuleRecord {
    pub module: Arc<dyn Module>,
    pub operations: BTreeSet<OperationId>,
}

/// OperationId -> 模块。任一时刻每个操作至多由一个模块持有。
#[derive(Clone)]
pub struct ModuleRegistry {
    admin: Address,
    owners: BTreeMap<OperationId, Address>,
    records: BTreeMap<Address, ModuleRecord>,
}

impl fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("admin", &self.admin)
            .field("owners", &self.owners)
            .finish()
    }
}

impl ModuleRegistry {
    pub fn new(admin: Address) -> Self {
        Self {
            admin,
            owners: BTreeMap::new(),
            records: BTreeMap::new(),
        }
    }

    pub fn admin(&self) -> Address {
        self.admin
    }

    /// 原子地应用一组变更：在副本上逐条校验并执行，全部成功才替换。
    pub fn configure(&mut self, caller: Address, cuts: &[ModuleCut]) -> RegistryResult<()> {
        self.ensure_admin(caller)?;
        let mut working = self.clone();
        for cut in cuts {
            working.apply(cut)?;
        }
        *self = working;

        for cut in cuts {
            let module = cut.module.as_ref().map(|module| module.address());
            info!(
                target: "registry",
                action = cut.action.as_str(),
                module = ?module,
                operations = cut.operations.len(),
                "module cut applied"
            );
            events::module_cut(cut.action.as_str(), cut.operations.len());
        }
        Ok(())
    }

    pub fn transfer_admin(&mut self, caller: Address, admin: Address) -> RegistryResult<()> {
        self.ensure_admin(caller)?;
        info!(target: "registry", from = %self.admin, to = %admin, "admin transferred");
        self.admin = admin;
        Ok(())
    }

    pub fn resolve(&self, operation: OperationId) -> Option<&Arc<dyn Module>> {
        let owner = self.owners.get(&operation)?;
        self.records.get(owner).map(|record| &record.module)
    }

    pub fn module_of(&self, operation: OperationId) -> Option<Address> {
        self.owners.get(&operation).copied()
    }

    pub fn modules(&self) -> Vec<Address> {
        self.records.keys().copied().collect()
    }

    pub fn operations_of(&self, module: Address) -> Vec<OperationId> {
        self.records
            .get(&module)
            .map(|record| record.operations.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn records(&self) -> impl Iterator<Item = &ModuleRecord> + '_ {
        self.records.values()
    }

    fn ensure_admin(&self, caller: Address) -> RegistryResult<()> {
        if caller != self.admin {
            return Err(RegistryError::NotAdministrator { caller });
        }
        Ok(())
    }

    fn apply(&mut self, cut: &ModuleCut) -> RegistryResult<()> {
        if cut.operations.is_empty() {
            return Err(RegistryError::EmptyCut);
        }
        match cut.action {
            CutAction::Add => {
                let module = cut.module.as_ref().ok_or(RegistryError::MissingImplementation)?;
                for operation in &cut.operations {
                    if let Some(owner) = self.owners.get(operation) {
                        return Err(RegistryError::AlreadyOwned {
                            operation: *operation,
                            owner: *owner,
                        });
                    }
                    self.assign(*operation, module);
                }
            }
            CutAction::Replace => {
                let module = cut.module.as_ref().ok_or(RegistryError::MissingImplementation)?;
                for operation in &cut.operations {
                    let owner = *self
                        .owners
                        .get(operation)
                        .ok_or(RegistryError::ReplaceUnowned(*operation))?;
                    if owner == module.address() {
                        return Err(RegistryError::ReplaceSameImplementation {
                            operation: *operation,
                            implementation: owner,
                        });
                    }
                    self.release(*operation);
                    self.assign(*operation, module);
                }
            }
            CutAction::Remove => {
                if let Some(module) = &cut.module {
                    return Err(RegistryError::RemoveWithImplementation(module.address()));
                }
                for operation in &cut.operations {
                    self.release(*operation);
                }
            }
        }
        Ok(())
    }

    fn assign(&mut self, operation: OperationId, module: &Arc<dyn Module>) {
        let address = module.address();
        self.owners.insert(operation, address);
        self.records
            .entry(address)
            .or_insert_with(|| ModuleRecord {
                module: Arc::clone(module),
                operations: BTreeSet::new(),
            })
            .operations
            .insert(operation);
    }

    fn release(&mut self, operation: OperationId) {
        let Some(owner) = self.owners.remove(&operation) else {
            return;
        };
        if let Some(record) = self.records.get_mut(&owner) {
            record.operations.remove(&operation);
            if record.operations.is_empty() {
                self.records.remove(&owner);
            }
        }
    }
}
