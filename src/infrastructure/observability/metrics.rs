// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{info, warn};

/// 初始化指标系统
///
/// 启动 Prometheus 导出器并注册流水线指标
pub fn init_metrics(host: &str, port: u16) {
    match format!("{}:{}", host, port).parse::<SocketAddr>() {
        Ok(addr) => {
            // Ignore error if address is already in use (for development/testing)
            if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
                warn!("Failed to install Prometheus recorder: {}. This might happen if the port is already in use.", e);
            } else {
                info!("Metrics exporter listening on {}", addr);
            }
        }
        Err(e) => warn!("Invalid metrics address {}:{}: {}", host, port, e),
    }

    describe_metrics();
}

/// 注册指标描述
pub fn describe_metrics() {
    describe_counter!(
        "keywords_generated_total",
        "Total number of keywords whose content was published"
    );
    describe_counter!(
        "keywords_failed_total",
        "Total number of keywords that ended in the failed state"
    );
    describe_counter!(
        "keywords_researched_total",
        "Total number of keywords inserted by keyword research"
    );
    describe_counter!(
        "translations_created_total",
        "Total number of localized content rows created"
    );
    describe_counter!(
        "translations_failed_total",
        "Total number of per-language translation failures"
    );
    describe_counter!(
        "scheduler_runs_total",
        "Total number of scheduler invocations by outcome"
    );
    describe_histogram!(
        "pipeline_duration_seconds",
        "Duration of a single keyword pipeline run in seconds"
    );
}
