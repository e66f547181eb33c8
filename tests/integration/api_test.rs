// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{draft_response, FakeTranslator, ScriptedGenerator, TestContext};
use axum::http::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn test_health_check() {
    let ctx = TestContext::new(ScriptedGenerator::new(vec![]), FakeTranslator::new()).await;
    let server = ctx.server();

    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_text("OK");
}

/// 新建关键词：首次 201，重复 200
#[tokio::test]
async fn test_create_keyword_is_idempotent() {
    let ctx = TestContext::new(ScriptedGenerator::new(vec![]), FakeTranslator::new()).await;
    let server = ctx.server();

    let created = server
        .post("/v1/keywords")
        .json(&json!({ "text": "Korea SIM card", "priority": "high" }))
        .await;
    created.assert_status(StatusCode::CREATED);
    let body: Value = created.json();
    assert_eq!(body["created"], true);
    assert_eq!(body["keyword"]["status"], "pending");
    assert_eq!(body["keyword"]["priority"], "high");

    let duplicate = server
        .post("/v1/keywords")
        .json(&json!({ "text": "korea sim CARD" }))
        .await;
    duplicate.assert_status_ok();
    let body: Value = duplicate.json();
    assert_eq!(body["created"], false);
    assert!(body["keyword"].is_null());

    let stats: Value = server.get("/v1/keywords/stats").await.json();
    assert_eq!(stats["pending"], 1);
    assert_eq!(stats["total"], 1);
}

#[tokio::test]
async fn test_blank_keyword_is_rejected() {
    let ctx = TestContext::new(ScriptedGenerator::new(vec![]), FakeTranslator::new()).await;
    let server = ctx.server();

    let response = server
        .post("/v1/keywords")
        .json(&json!({ "text": "   " }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["kind"], "invalid_request");
}

#[tokio::test]
async fn test_unknown_keyword_is_not_found() {
    let ctx = TestContext::new(ScriptedGenerator::new(vec![]), FakeTranslator::new()).await;
    let server = ctx.server();

    let id = uuid::Uuid::new_v4();
    let response = server.post(&format!("/v1/keywords/{}/generate", id)).await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["kind"], "not_found");
}

/// 通过接口生成、查看、取消发布和删除内容
#[tokio::test]
async fn test_generate_and_manage_content() {
    let generator = ScriptedGenerator::new(vec![Ok(draft_response("Japan eSIM Guide", 5, 5, 2600))]);
    let ctx = TestContext::new(generator, FakeTranslator::new()).await;
    let keyword = ctx.insert_keyword("japan esim guide").await;
    let server = ctx.server();

    let response = server
        .post(&format!("/v1/keywords/{}/generate", keyword.id))
        .await;
    response.assert_status_ok();
    let outcome: Value = response.json();
    assert_eq!(outcome["content"]["slug"], "japan-esim-guide");
    let content_id = outcome["content"]["id"].as_str().unwrap().to_string();

    let conflict = server
        .post(&format!("/v1/keywords/{}/generate", keyword.id))
        .await;
    conflict.assert_status(StatusCode::CONFLICT);

    let keyword_body: Value = server
        .get(&format!("/v1/keywords/{}", keyword.id))
        .await
        .json();
    assert_eq!(keyword_body["status"], "published");
    assert_eq!(keyword_body["result_content_id"], content_id.as_str());

    let translations: Value = server
        .get(&format!("/v1/contents/{}/translations", content_id))
        .await
        .json();
    assert_eq!(translations.as_array().unwrap().len(), 11);

    server
        .post(&format!("/v1/contents/{}/unpublish", content_id))
        .await
        .assert_status_ok();
    let content: Value = server
        .get(&format!("/v1/contents/{}", content_id))
        .await
        .json();
    assert_eq!(content["is_published"], false);

    server
        .delete(&format!("/v1/contents/{}", content_id))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server
        .get(&format!("/v1/contents/{}", content_id))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

/// 生成失败映射为 502，重试成功
#[tokio::test]
async fn test_generation_failure_and_retry() {
    let generator = ScriptedGenerator::new(vec![Ok("no structured output here".to_string())]);
    let ctx = TestContext::new(generator.clone(), FakeTranslator::new()).await;
    let keyword = ctx.insert_keyword("pocket wifi").await;
    let server = ctx.server();

    let failed = server
        .post(&format!("/v1/keywords/{}/generate", keyword.id))
        .await;
    failed.assert_status(StatusCode::BAD_GATEWAY);
    let body: Value = failed.json();
    assert_eq!(body["kind"], "malformed_response");

    generator.push(Ok(draft_response("Pocket WiFi", 5, 5, 2600)));
    let retried = server
        .post(&format!("/v1/keywords/{}/retry", keyword.id))
        .await;
    retried.assert_status_ok();

    let stats: Value = server.get("/v1/keywords/stats").await.json();
    assert_eq!(stats["published"], 1);
    assert_eq!(stats["failed"], 0);
}

#[tokio::test]
async fn test_scheduler_settings_roundtrip() {
    let ctx = TestContext::new(ScriptedGenerator::new(vec![]), FakeTranslator::new()).await;
    let server = ctx.server();

    let current: Value = server.get("/v1/scheduler/settings").await.json();
    assert_eq!(current["enabled"], true);

    let updated = server
        .put("/v1/scheduler/settings")
        .json(&json!({ "enabled": false, "items_per_run": 10 }))
        .await;
    updated.assert_status_ok();
    let body: Value = updated.json();
    assert_eq!(body["enabled"], false);
    assert_eq!(body["items_per_run"], 10);

    server
        .put("/v1/scheduler/settings")
        .json(&json!({ "items_per_run": 0 }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let run: Value = server.post("/v1/pipeline/run").await.json();
    assert_eq!(run["skipped_reason"], "scheduler is disabled");
}

#[tokio::test]
async fn test_background_run_is_accepted() {
    let ctx = TestContext::new(ScriptedGenerator::new(vec![]), FakeTranslator::new()).await;
    let server = ctx.server();

    let response = server
        .post("/v1/pipeline/run")
        .add_query_param("background", "true")
        .await;
    response.assert_status(StatusCode::ACCEPTED);
}

#[tokio::test]
async fn test_research_dry_run_does_not_insert() {
    let ctx = TestContext::new(ScriptedGenerator::new(vec![]), FakeTranslator::new()).await;
    let server = ctx.server();

    let response = server
        .post("/v1/keywords/research")
        .json(&json!({ "count": 4, "dry_run": true }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["candidates"].as_array().unwrap().len(), 4);
    assert!(body["inserted"].as_array().unwrap().is_empty());

    let stats: Value = server.get("/v1/keywords/stats").await.json();
    assert_eq!(stats["total"], 0);

    let inserted: Value = server
        .post("/v1/keywords/research")
        .json(&json!({ "count": 4 }))
        .await
        .json();
    assert_eq!(inserted["inserted"].as_array().unwrap().len(), 4);
}
