use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use metrics::{Unit, describe_counter, describe_histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use once_cell::sync::OnceCell;
use tracing::info;

use crate::config::MetricsConfig;

static EXPORTER: OnceCell<SocketAddr> = OnceCell::new();
static PROMETHEUS_ENABLED: AtomicBool = AtomicBool::new(false);

/// 按配置启动 Prometheus exporter；未启用时什么都不做。
pub fn init_from_config(config: &MetricsConfig) -> Result<()> {
    if !config.enable {
        return Ok(());
    }
    try_init_prometheus(&config.prometheus_listen)
}

pub fn try_init_prometheus(listen: &str) -> Result<()> {
    let addr = EXPORTER.get_or_try_init(|| -> Result<SocketAddr> {
        let addr: SocketAddr = listen
            .parse()
            .with_context(|| format!("invalid prometheus listen address: {listen}"))?;
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .context("failed to install prometheus exporter")?;
        describe_all();
        PROMETHEUS_ENABLED.store(true, Ordering::Relaxed);
        Ok(addr)
    })?;
    info!(target: "monitoring", listen = %addr, "prometheus exporter ready");
    Ok(())
}

pub fn prometheus_enabled() -> bool {
    PROMETHEUS_ENABLED.load(Ordering::Relaxed)
}

fn describe_all() {
    describe_counter!("composer_calls_total", "façade 调用次数，按模块与结果分类");
    describe_counter!("composer_executions_total", "完成结算的执行次数");
    describe_counter!("composer_hops_total", "执行的兑换跳数");
    describe_counter!("composer_flashloans_total", "已归还的闪电贷次数");
    describe_counter!("composer_module_cuts_total", "注册表变更次数");
    describe_histogram!("composer_execution_hops", Unit::Count, "单次执行的跳数");
    describe_histogram!("composer_flashloan_fee", "闪电贷手续费（最小单位）");
}
