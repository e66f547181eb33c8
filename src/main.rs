// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use contentrs::application::container::{AppContainer, Providers};
use contentrs::config::settings::Settings;
use contentrs::infrastructure::database::connection;
use contentrs::infrastructure::observability::metrics;
use contentrs::presentation::routes;
use contentrs::utils::telemetry;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting contentrs...");

    // 2. Load configuration
    let settings = Arc::new(Settings::new()?);
    info!("Configuration loaded");

    // Initialize Prometheus Metrics
    metrics::init_metrics(&settings.server.host, settings.server.metrics_port);

    // 3. Connect to database
    let db = connection::create_pool(&settings.database).await?;
    let db = Arc::new(db);
    info!("Database connection established");

    info!("Running database migrations...");
    connection::run_migrations(db.as_ref()).await?;
    info!("Database migrations applied");

    // 4. Initialize providers and services
    if settings.llm.api_key.is_none() {
        warn!("LLM API key is not configured, generation requests will fail");
    }
    if settings.translation.api_key.is_none() {
        warn!("Translation API key is not configured, translations will fail");
    }
    let providers = Providers::from_settings(&settings);
    let container = AppContainer::build(&settings, db.clone(), providers);

    // 5. Start HTTP server
    let app = routes::app(container, settings.clone());

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
