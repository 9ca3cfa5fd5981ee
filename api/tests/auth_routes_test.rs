//! Token lifecycle over HTTP: authentication, refresh rotation, logout and forced logout

mod common;

use std::sync::Arc;
use std::time::Duration;

use actix_web::test;
use tg_api::app::{build_pipeline, create_app};
use tg_core::domain::Identity;

use common::{
    admin_state, app_config, bearer, body_json, state, token_service, token_service_with, DownStore,
};

macro_rules! gate_app {
    ($tokens:expr) => {
        gate_app!($tokens, state(&$tokens))
    };
    ($tokens:expr, $state:expr) => {
        test::init_service(create_app(
            $state,
            build_pipeline(&app_config(), $tokens.clone()),
            &app_config(),
        ))
        .await
    };
}

#[actix_web::test]
async fn test_me_requires_authorization_header() {
    let tokens = token_service();
    let app = gate_app!(tokens);

    let req = test::TestRequest::get().uri("/svc/auth/me").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
    let body = body_json(resp).await;
    assert_eq!(body["code"], 10003);
    assert_eq!(body["msg"], "token验证失败");
}

#[actix_web::test]
async fn test_me_returns_identity() {
    let tokens = token_service();
    let pair = tokens.login(&Identity::new(7, "alice")).await.unwrap();
    let app = gate_app!(tokens);

    let req = test::TestRequest::get()
        .uri("/svc/auth/me")
        .insert_header(bearer(&pair.access_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body = body_json(resp).await;
    assert_eq!(body["code"], 0);
    assert_eq!(body["msg"], "成功");
    assert_eq!(body["data"]["user_id"], 7);
    assert_eq!(body["data"]["user_name"], "alice");
}

#[actix_web::test]
async fn test_malformed_and_foreign_tokens_rejected() {
    let tokens = token_service();
    let app = gate_app!(tokens);

    let other = token_service_with(Arc::new(tg_core::repositories::InMemoryStore::new()));
    let foreign = tg_core::services::TokenCodec::new("some-other-secret")
        .unwrap()
        .sign(&Identity::new(1, "mallory"), Duration::from_secs(60))
        .unwrap();
    let no_scheme = other.login(&Identity::new(1, "x")).await.unwrap().access_token;

    for header in [
        String::from("Bearer garbage"),
        String::from("Token abc"),
        String::from("Bearer "),
        format!("Bearer {}", foreign),
        no_scheme,
    ] {
        let req = test::TestRequest::get()
            .uri("/svc/auth/me")
            .insert_header(("Authorization", header.clone()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401, "{}", header);
        assert_eq!(body_json(resp).await["code"], 10003, "{}", header);
    }
}

#[actix_web::test]
async fn test_expired_token_reports_token_expired() {
    let tokens = token_service();
    let expired = tokens
        .codec()
        .sign_at(
            &Identity::new(3, "carol"),
            Duration::from_secs(60),
            chrono::Utc::now().timestamp() - 7200,
        )
        .unwrap();
    let app = gate_app!(tokens);

    let req = test::TestRequest::get()
        .uri("/svc/auth/me")
        .insert_header(bearer(&expired))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
    assert_eq!(body_json(resp).await["code"], 10005);
}

#[actix_web::test]
async fn test_english_error_messages() {
    let tokens = token_service();
    let app = gate_app!(tokens);

    let req = test::TestRequest::get()
        .uri("/svc/auth/me")
        .insert_header(("Accept-Language", "en-US,en;q=0.9"))
        .to_request();
    let body = body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["msg"], "Token verification failed");
}

#[actix_web::test]
async fn test_refresh_rotates_and_is_single_use() {
    let tokens = token_service();
    let first = tokens.login(&Identity::new(7, "alice")).await.unwrap();
    let app = gate_app!(tokens);

    let req = test::TestRequest::post()
        .uri("/svc/auth/refresh")
        .set_json(serde_json::json!({ "refresh_token": first.refresh_token }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body = body_json(resp).await;
    assert_eq!(body["data"]["expires_in"], 900);
    let second_refresh = body["data"]["refresh_token"].as_str().unwrap().to_string();
    let second_access = body["data"]["access_token"].as_str().unwrap().to_string();
    assert_ne!(second_refresh, first.refresh_token);

    // The new access token authenticates as the same identity
    let req = test::TestRequest::get()
        .uri("/svc/auth/me")
        .insert_header(bearer(&second_access))
        .to_request();
    let body = body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["data"]["user_name"], "alice");

    // Replaying the consumed token fails
    let req = test::TestRequest::post()
        .uri("/svc/auth/refresh")
        .set_json(serde_json::json!({ "refresh_token": first.refresh_token }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
    assert_eq!(body_json(resp).await["code"], 10012);

    // The rotated one still works
    let req = test::TestRequest::post()
        .uri("/svc/auth/refresh")
        .set_json(serde_json::json!({ "refresh_token": second_refresh }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);
}

#[actix_web::test]
async fn test_refresh_rejects_bad_bodies() {
    let tokens = token_service();
    let app = gate_app!(tokens);

    let req = test::TestRequest::post()
        .uri("/svc/auth/refresh")
        .set_json(serde_json::json!({ "refresh_token": "" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    assert_eq!(body_json(resp).await["code"], 10004);

    let req = test::TestRequest::post()
        .uri("/svc/auth/refresh")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body = body_json(resp).await;
    assert_eq!(body["code"], 10004);
    assert_eq!(body["msg"], "参数无效");

    let req = test::TestRequest::post()
        .uri("/svc/auth/refresh")
        .insert_header(("Accept-Language", "en"))
        .set_json(serde_json::json!({ "refresh_token": "unknown" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
    let body = body_json(resp).await;
    assert_eq!(body["code"], 10012);
    assert_eq!(body["msg"], "Refresh token invalid");
}

#[actix_web::test]
async fn test_logout_revokes_latest_refresh_token() {
    let tokens = token_service();
    let pair = tokens.login(&Identity::new(9, "dave")).await.unwrap();
    let app = gate_app!(tokens);

    let req = test::TestRequest::post()
        .uri("/svc/auth/logout")
        .insert_header(bearer(&pair.access_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    assert_eq!(body_json(resp).await["code"], 0);

    let req = test::TestRequest::post()
        .uri("/svc/auth/refresh")
        .set_json(serde_json::json!({ "refresh_token": pair.refresh_token }))
        .to_request();
    assert_eq!(body_json(test::call_service(&app, req).await).await["code"], 10012);
}

#[actix_web::test]
async fn test_logout_with_explicit_token_is_idempotent() {
    let tokens = token_service();
    let pair = tokens.login(&Identity::new(9, "dave")).await.unwrap();
    let app = gate_app!(tokens);

    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/svc/auth/logout")
            .insert_header(bearer(&pair.access_token))
            .set_json(serde_json::json!({ "refresh_token": pair.refresh_token }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 200);
    }

    assert!(tokens.refresh(&pair.refresh_token).await.is_err());
}

#[actix_web::test]
async fn test_force_logout_bans_and_revokes_target() {
    let tokens = token_service();
    let admin = tokens.login(&Identity::new(1, "admin")).await.unwrap();
    let target = tokens.login(&Identity::new(5, "eve")).await.unwrap();
    let app = gate_app!(tokens, admin_state(&tokens));

    let req = test::TestRequest::post()
        .uri("/svc/auth/force-logout")
        .insert_header(bearer(&admin.access_token))
        .set_json(serde_json::json!({ "user_id": 5, "user_name": "eve", "ttl_seconds": 99999 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    // Capped at the access token lifetime
    assert_eq!(body_json(resp).await["data"]["banned_for"], 900);

    let req = test::TestRequest::get()
        .uri("/svc/auth/me")
        .insert_header(bearer(&target.access_token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
    assert_eq!(body_json(resp).await["code"], 10003);

    let req = test::TestRequest::post()
        .uri("/svc/auth/refresh")
        .set_json(serde_json::json!({ "refresh_token": target.refresh_token }))
        .to_request();
    assert_eq!(body_json(test::call_service(&app, req).await).await["code"], 10012);

    // The caller is unaffected
    let req = test::TestRequest::get()
        .uri("/svc/auth/me")
        .insert_header(bearer(&admin.access_token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);
}

#[actix_web::test]
async fn test_force_logout_validates_body() {
    let tokens = token_service();
    let admin = tokens.login(&Identity::new(1, "admin")).await.unwrap();
    let app = gate_app!(tokens, admin_state(&tokens));

    let req = test::TestRequest::post()
        .uri("/svc/auth/force-logout")
        .insert_header(bearer(&admin.access_token))
        .set_json(serde_json::json!({ "user_id": 5, "user_name": "" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    assert_eq!(body_json(resp).await["code"], 10004);
}

#[actix_web::test]
async fn test_force_logout_not_mounted_by_default() {
    let tokens = token_service();
    let caller = tokens.login(&Identity::new(1, "mallory")).await.unwrap();
    let victim = tokens.login(&Identity::new(5, "eve")).await.unwrap();
    let app = gate_app!(tokens);

    let req = test::TestRequest::post()
        .uri("/svc/auth/force-logout")
        .insert_header(bearer(&caller.access_token))
        .set_json(serde_json::json!({ "user_id": 5, "user_name": "eve" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    // The would-be target keeps working
    let req = test::TestRequest::get()
        .uri("/svc/auth/me")
        .insert_header(bearer(&victim.access_token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);
    assert!(!tokens.revocation().is_banned(&Identity::new(5, "eve")).await.unwrap());
}

#[actix_web::test]
async fn test_unknown_path_requires_authentication_first() {
    let tokens = token_service();
    let pair = tokens.login(&Identity::new(7, "alice")).await.unwrap();
    let app = gate_app!(tokens);

    let req = test::TestRequest::get().uri("/svc/nowhere").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 401);

    let req = test::TestRequest::get()
        .uri("/svc/nowhere")
        .insert_header(bearer(&pair.access_token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 404);
}

#[actix_web::test]
async fn test_health_is_public() {
    let tokens = token_service();
    let app = gate_app!(tokens);

    let req = test::TestRequest::get().uri("/svc/system/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body = body_json(resp).await;
    assert_eq!(body["data"]["status"], "ok");
    assert!(body["data"]["timestamp"].as_i64().unwrap() > 0);
    assert!(!body["data"]["host"].as_str().unwrap().is_empty());
}

#[actix_web::test]
async fn test_store_outage_is_service_unavailable() {
    let tokens = token_service_with(Arc::new(DownStore));
    let app = gate_app!(tokens);

    let req = test::TestRequest::post()
        .uri("/svc/auth/refresh")
        .set_json(serde_json::json!({ "refresh_token": "anything" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 503);
    let body = body_json(resp).await;
    assert_eq!(body["code"], 10016);
    assert_eq!(body["msg"], "服务暂不可用");
}

#[actix_web::test]
async fn test_cors_preflight_answered_before_authentication() {
    let tokens = token_service();
    let mut config = app_config();
    config.cors.enabled = true;
    let app = test::init_service(create_app(
        state(&tokens),
        build_pipeline(&config, tokens.clone()),
        &config,
    ))
    .await;

    let req = test::TestRequest::default()
        .method(actix_web::http::Method::OPTIONS)
        .uri("/svc/auth/me")
        .insert_header(("Origin", "https://app.example.com"))
        .insert_header(("Access-Control-Request-Method", "GET"))
        .insert_header(("Access-Control-Request-Headers", "authorization"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    assert!(resp.headers().contains_key("access-control-allow-origin"));

    // Actual requests still go through authentication
    let req = test::TestRequest::get()
        .uri("/svc/auth/me")
        .insert_header(("Origin", "https://app.example.com"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
    assert!(resp.headers().contains_key("access-control-allow-origin"));
}
