//! API endpoint integration tests

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use pitboy_gateway::{ApiServerBuilder, Config, Error};
use tower::ServiceExt;

mod common;
use common::{body_json, counting_router, post_json, router_from_env};

#[tokio::test]
async fn test_health_endpoint() {
    let app = router_from_env(&[]);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["ok"], true);
    assert_eq!(json["service"], "pitboy-backend");
}

#[tokio::test]
async fn test_health_is_public_when_auth_enabled() {
    let app = router_from_env(&[("PITBOY_API_KEY", "secret")]);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_echo_reply() {
    let app = router_from_env(&[("CHAT_PROVIDER", "echo")]);

    for text in ["hello", "what's the weather", "ünïcödé ✓", "a"] {
        let body = serde_json::json!({ "text": text }).to_string();
        let response = app
            .clone()
            .oneshot(post_json("/api/watch-chat", &body, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["reply"], format!("ECHO: {text}"));
    }
}

#[tokio::test]
async fn test_echo_is_default_provider() {
    let app = router_from_env(&[]);

    let response = app
        .oneshot(post_json("/api/watch-chat", r#"{"text":"ping"}"#, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["reply"], "ECHO: ping");
}

#[tokio::test]
async fn test_text_is_trimmed_before_dispatch() {
    let app = router_from_env(&[]);

    let response = app
        .oneshot(post_json("/api/watch-chat", r#"{"text":"  ping \n"}"#, None))
        .await
        .unwrap();

    assert_eq!(body_json(response).await["reply"], "ECHO: ping");
}

#[tokio::test]
async fn test_missing_key_is_unauthorized() {
    let app = router_from_env(&[("PITBOY_API_KEY", "secret")]);

    for (uri, body) in [
        ("/api/watch-chat", r#"{"text":"hello"}"#),
        ("/api/watch-chat", r#"{"text":""}"#),
        ("/api/watch-chat", "not json"),
        ("/api/watch-tts", r#"{"text":"hello"}"#),
        ("/api/watch-tts", "{}"),
    ] {
        let response = app
            .clone()
            .oneshot(post_json(uri, body, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri} {body}");
        assert_eq!(body_json(response).await["error"], "Unauthorized");
    }
}

#[tokio::test]
async fn test_wrong_key_is_unauthorized() {
    let app = router_from_env(&[("PITBOY_API_KEY", "secret")]);

    for uri in ["/api/watch-chat", "/api/watch-tts"] {
        let response = app
            .clone()
            .oneshot(post_json(uri, r#"{"text":"hello"}"#, Some("guess")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn test_matching_key_is_accepted() {
    let app = router_from_env(&[("PITBOY_API_KEY", "secret")]);

    let response = app
        .oneshot(post_json(
            "/api/watch-chat",
            r#"{"text":"hello"}"#,
            Some("  secret "),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["reply"], "ECHO: hello");
}

#[tokio::test]
async fn test_no_key_required_when_unset() {
    let app = router_from_env(&[("PITBOY_API_KEY", "")]);

    let response = app
        .oneshot(post_json("/api/watch-chat", r#"{"text":"hello"}"#, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_empty_text_is_rejected_before_dispatch() {
    let (app, provider) = counting_router(None);

    for body in [
        r#"{"text":""}"#,
        r#"{"text":"   \n\t"}"#,
        r#"{"source":"watch"}"#,
        r#"{"text":null,"source":"watch"}"#,
        "{}",
    ] {
        let response = app
            .clone()
            .oneshot(post_json("/api/watch-chat", body, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(body_json(response).await["error"], "Missing text");
    }

    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let (app, provider) = counting_router(None);

    for body in ["not json", r#"{"text":42}"#, "[]"] {
        let response = app
            .clone()
            .oneshot(post_json("/api/watch-chat", body, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
        assert!(body_json(response).await["error"].is_string());
    }

    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_source_defaults_to_watch() {
    let (app, _) = counting_router(None);

    let response = app
        .clone()
        .oneshot(post_json("/api/watch-chat", r#"{"text":"hi"}"#, None))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["reply"], "pitboy-watch:hi");

    let response = app
        .oneshot(post_json(
            "/api/watch-chat",
            r#"{"text":"hi","source":" wrist "}"#,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["reply"], "wrist:hi");
}

#[tokio::test]
async fn test_tts_empty_text_is_bad_request() {
    let app = router_from_env(&[("OPENAI_API_KEY", "sk-test")]);

    let response = app
        .oneshot(post_json("/api/watch-tts", r#"{"text":"  "}"#, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Missing text");
}

#[tokio::test]
async fn test_tts_null_text_is_missing() {
    let app = router_from_env(&[("OPENAI_API_KEY", "sk-test")]);

    let response = app
        .oneshot(post_json("/api/watch-tts", r#"{"text":null}"#, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Missing text");
}

#[tokio::test]
async fn test_unsupported_tts_provider_is_server_error() {
    let app = router_from_env(&[("TTS_PROVIDER", "elevenlabs"), ("OPENAI_API_KEY", "sk-test")]);

    let response = app
        .oneshot(post_json("/api/watch-tts", r#"{"text":"hello"}"#, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Server error");
}

#[tokio::test]
async fn test_missing_chat_key_is_generic_server_error() {
    let app = router_from_env(&[("CHAT_PROVIDER", "openai")]);

    let response = app
        .oneshot(post_json("/api/watch-chat", r#"{"text":"hello"}"#, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json, serde_json::json!({ "error": "Server error" }));
}

#[tokio::test]
async fn test_missing_gateway_url_is_server_error() {
    let app = router_from_env(&[("CHAT_PROVIDER", "alternate-gateway")]);

    let response = app
        .oneshot(post_json("/api/watch-chat", r#"{"text":"hello"}"#, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let (app, provider) = counting_router(None);
    let huge = "a".repeat(pitboy_gateway::api::BODY_LIMIT_BYTES + 1);
    let body = serde_json::json!({ "text": huge }).to_string();

    let response = app
        .oneshot(post_json("/api/watch-chat", &body, None))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_port_in_use_is_io_error() {
    let taken = tokio::net::TcpListener::bind("0.0.0.0:0").await.unwrap();
    let port = taken.local_addr().unwrap().port();
    let config = Config::from_lookup(|key| (key == "PORT").then(|| port.to_string())).unwrap();

    let err = ApiServerBuilder::from_config(&config)
        .unwrap()
        .build()
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Io(_)), "{err:?}");
}
