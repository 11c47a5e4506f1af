use anyhow::Result;

use crate::modules::lens::{BALANCE_OF, COLLATERAL_OF, DEBT_OF};
use crate::modules::trade_entry;
use crate::registry::{ModuleRegistry, OperationId};

pub fn handle_operations_cmd(registry: &ModuleRegistry) -> Result<()> {
    for line in render_operations(registry) {
        println!("{line}");
    }
    Ok(())
}

fn signature_of(operation: OperationId) -> Option<&'static str> {
    if let Some(entry) = trade_entry(operation) {
        return Some(entry.signature);
    }
    [BALANCE_OF, COLLATERAL_OF, DEBT_OF]
        .into_iter()
        .find(|signature| OperationId::from_signature(signature) == operation)
}

fn render_operations(registry: &ModuleRegistry) -> Vec<String> {
    let mut lines = vec![format!("admin {}", registry.admin())];
    for record in registry.records() {
        lines.push(format!(
            "{} @ {} ({} 个操作)",
            record.module.name(),
            record.module.address(),
            record.operations.len()
        ));
        for operation in &record.operations {
            lines.push(format!(
                "  {operation} {}",
                signature_of(*operation).unwrap_or("?")
            ));
        }
    }
    lines
}
