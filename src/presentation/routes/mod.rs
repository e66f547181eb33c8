// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::container::AppContainer;
use crate::config::settings::Settings;
use crate::presentation::handlers::{
    content_handler, keyword_handler, pipeline_handler, scheduler_handler,
};
use axum::{
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// 创建应用路由
///
/// # 返回值
///
/// 返回未注入依赖的路由
pub fn routes() -> Router {
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/v1/version", get(version));

    let keyword_routes = Router::new()
        .route("/v1/keywords", post(keyword_handler::create_keyword))
        .route("/v1/keywords/stats", get(keyword_handler::keyword_stats))
        .route("/v1/keywords/research", post(keyword_handler::research_keywords))
        .route("/v1/keywords/{id}", get(keyword_handler::get_keyword))
        .route(
            "/v1/keywords/{id}/generate",
            post(pipeline_handler::generate_keyword),
        )
        .route("/v1/keywords/{id}/retry", post(pipeline_handler::retry_keyword));

    let content_routes = Router::new()
        .route(
            "/v1/contents/{id}",
            get(content_handler::get_content).delete(content_handler::delete_content),
        )
        .route(
            "/v1/contents/{id}/translations",
            get(content_handler::list_translations).post(content_handler::translate_content),
        )
        .route(
            "/v1/contents/{id}/publish",
            post(content_handler::publish_content),
        )
        .route(
            "/v1/contents/{id}/unpublish",
            post(content_handler::unpublish_content),
        );

    let pipeline_routes = Router::new()
        .route("/v1/pipeline/run", post(pipeline_handler::run_pipeline))
        .route(
            "/v1/scheduler/settings",
            get(scheduler_handler::get_settings).put(scheduler_handler::update_settings),
        );

    Router::new()
        .merge(public_routes)
        .merge(keyword_routes)
        .merge(content_routes)
        .merge(pipeline_routes)
}

/// 创建注入了全部依赖的应用
///
/// # 参数
///
/// * `container` - 服务容器
/// * `settings` - 应用配置
pub fn app(container: AppContainer, settings: Arc<Settings>) -> Router {
    routes()
        .layer(Extension(container.keywords))
        .layer(Extension(container.contents))
        .layer(Extension(container.localized))
        .layer(Extension(container.pipeline))
        .layer(Extension(container.research))
        .layer(Extension(container.scheduler))
        .layer(Extension(settings))
        .layer(TraceLayer::new_for_http())
}

/// 健康检查端点
///
/// # 返回值
///
/// 返回"OK"字符串
pub async fn health_check() -> &'static str {
    "OK"
}

/// 版本信息端点
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
