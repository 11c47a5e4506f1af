use alloy_primitives::{Address, U256};
use metrics::{counter, histogram};
use tracing::{debug, info};

use crate::flashloan::FlashTerms;

use super::metrics::prometheus_enabled;

fn as_f64(value: U256) -> f64 {
    value.saturating_to::<u128>() as f64
}

pub fn flashloan_completed(provider: &Address, asset: &Address, terms: &FlashTerms) {
    info!(
        target: "monitoring::flashloan",
        event = "completed",
        provider = %provider,
        asset = %asset,
        gross = %terms.gross,
        fee = %terms.fee,
        owed = %terms.owed,
        "flashloan repaid"
    );

    if prometheus_enabled() {
        counter!("composer_flashloans_total", "provider" => provider.to_string()).increment(1);
        histogram!("composer_flashloan_fee", "provider" => provider.to_string())
            .record(as_f64(terms.fee));
    }
}

pub fn hop_executed(provider_id: u8, direction: &str) {
    debug!(
        target: "monitoring::engine",
        event = "hop",
        provider_id,
        direction,
        "hop executed"
    );

    if prometheus_enabled() {
        counter!(
            "composer_hops_total",
            "provider" => provider_id.to_string(),
            "direction" => direction.to_string()
        )
        .increment(1);
    }
}

pub fn execution_settled(composition: &str, direction: &str, hops: usize) {
    info!(
        target: "monitoring::engine",
        event = "settled",
        composition,
        direction,
        hops,
        "execution settled"
    );

    if prometheus_enabled() {
        counter!(
            "composer_executions_total",
            "composition" => composition.to_string(),
            "direction" => direction.to_string()
        )
        .increment(1);
        histogram!("composer_execution_hops", "composition" => composition.to_string())
            .record(hops as f64);
    }
}

pub fn module_cut(action: &str, operations: usize) {
    info!(
        target: "monitoring::registry",
        event = "cut",
        action,
        operations,
        "registry updated"
    );

    if prometheus_enabled() {
        counter!("composer_module_cuts_total", "action" => action.to_string()).increment(1);
    }
}

pub fn call_dispatched(module: &str, outcome: &str) {
    debug!(
        target: "monitoring::dispatcher",
        event = "call",
        module,
        outcome,
        "call dispatched"
    );

    if prometheus_enabled() {
        counter!(
            "composer_calls_total",
            "module" => module.to_string(),
            "outcome" => outcome.to_string()
        )
        .increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn large_amounts_saturate() {
        assert_eq!(as_f64(U256::from(1_500u64)), 1_500.0);
        assert_eq!(as_f64(U256::MAX), u128::MAX as f64);
    }
}
