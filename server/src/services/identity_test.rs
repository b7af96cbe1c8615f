use super::*;
use std::collections::HashMap;

use axum::Json;
use axum::Router;
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::routing::post;
use serde_json::{Value, json};

// =============================================================================
// Pure parsing
// =============================================================================

#[test]
fn endpoint_joins_base_and_method() {
    assert_eq!(
        endpoint("https://id.example.com/v1", "accounts:lookup"),
        "https://id.example.com/v1/accounts:lookup"
    );
}

#[test]
fn parse_signed_in_reads_token_and_identity() {
    let body = r#"{"idToken":"tok","localId":"uid-1","email":"a@b.com","displayName":"","expiresIn":"1800","refreshToken":"r"}"#;
    let signed_in = parse_signed_in(body).unwrap();
    assert_eq!(signed_in.id_token, "tok");
    assert_eq!(signed_in.expires_in_secs, 1800);
    assert_eq!(signed_in.identity.uid, "uid-1");
    assert_eq!(signed_in.identity.email.as_deref(), Some("a@b.com"));
    assert!(signed_in.identity.display_name.is_none());
}

#[test]
fn parse_signed_in_defaults_bad_expiry() {
    for expires in [r#""abc""#, r#""0""#, "null"] {
        let body = format!(r#"{{"idToken":"t","localId":"u","expiresIn":{expires}}}"#);
        assert_eq!(parse_signed_in(&body).unwrap().expires_in_secs, DEFAULT_EXPIRES_IN_SECS, "{expires}");
    }
}

#[test]
fn parse_signed_in_rejects_missing_token() {
    assert!(matches!(parse_signed_in(r#"{"localId":"u"}"#), Err(IdentityError::Parse(_))));
}

#[test]
fn parse_lookup_takes_first_user() {
    let body = r#"{"kind":"identitytoolkit#GetAccountInfoResponse","users":[{"localId":"u1","email":"u1@x.com","emailVerified":true}]}"#;
    let identity = parse_lookup(body).unwrap().unwrap();
    assert_eq!(identity.uid, "u1");
    assert!(identity.email_verified);
}

#[test]
fn parse_lookup_without_users_is_signed_out() {
    assert_eq!(parse_lookup(r#"{"kind":"x"}"#).unwrap(), None);
    assert_eq!(parse_lookup(r#"{"users":[]}"#).unwrap(), None);
}

#[test]
fn parse_error_code_takes_leading_token() {
    assert_eq!(parse_error_code(r#"{"error":{"code":400,"message":"EMAIL_NOT_FOUND"}}"#), "EMAIL_NOT_FOUND");
    assert_eq!(
        parse_error_code(r#"{"error":{"code":400,"message":"TOO_MANY_ATTEMPTS_TRY_LATER : Access disabled"}}"#),
        "TOO_MANY_ATTEMPTS_TRY_LATER"
    );
}

#[test]
fn parse_error_code_falls_back_to_unknown() {
    assert_eq!(parse_error_code("<html>bad gateway</html>"), "UNKNOWN");
    assert_eq!(parse_error_code(r#"{"error":{"message":""}}"#), "UNKNOWN");
}

// =============================================================================
// Against a local stand-in for the identity service
// =============================================================================

async fn fake_accounts(Path(method): Path<String>, Query(query): Query<HashMap<String, String>>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if query.get("key").map(String::as_str) != Some("test-key") {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": {"message": "API_KEY_INVALID"}})));
    }
    match method.as_str() {
        "accounts:signInWithPassword" if body["password"] == "hunter22" => (
            StatusCode::OK,
            Json(json!({"idToken": "token-1", "localId": "uid-1", "email": body["email"], "expiresIn": "3600"})),
        ),
        "accounts:signInWithPassword" => {
            (StatusCode::BAD_REQUEST, Json(json!({"error": {"message": "INVALID_LOGIN_CREDENTIALS"}})))
        }
        "accounts:signUp" => (
            StatusCode::OK,
            Json(json!({"idToken": "token-new", "localId": "uid-new", "email": body["email"], "expiresIn": "3600"})),
        ),
        "accounts:lookup" if body["idToken"] == "token-1" => {
            (StatusCode::OK, Json(json!({"users": [{"localId": "uid-1", "email": "a@b.com"}]})))
        }
        "accounts:lookup" if body["idToken"] == "boom" => {
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": {"message": "BACKEND_ERROR"}})))
        }
        "accounts:lookup" => (StatusCode::BAD_REQUEST, Json(json!({"error": {"message": "INVALID_ID_TOKEN"}}))),
        _ => (StatusCode::NOT_FOUND, Json(json!({"error": {"message": "NOT_FOUND"}}))),
    }
}

async fn spawn_fake_identity() -> String {
    let app = Router::new().route("/v1/{method}", post(fake_accounts));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/v1/")
}

fn test_config() -> IdentityConfig {
    IdentityConfig::new("test-key", "demo-project", "1", "1:1:web:1")
}

#[tokio::test]
async fn sign_in_returns_session_for_valid_password() {
    let base = spawn_fake_identity().await;
    let client = IdentityClient::new(&test_config(), &base).unwrap();
    let signed_in = client.sign_in("a@b.com", "hunter22").await.unwrap();
    assert_eq!(signed_in.id_token, "token-1");
    assert_eq!(signed_in.identity.email.as_deref(), Some("a@b.com"));
}

#[tokio::test]
async fn sign_in_surfaces_rejection_code() {
    let base = spawn_fake_identity().await;
    let client = IdentityClient::new(&test_config(), &base).unwrap();
    let err = client.sign_in("a@b.com", "wrong").await.unwrap_err();
    match err {
        IdentityError::Rejected { status, code } => {
            assert_eq!(status, 400);
            assert_eq!(code, "INVALID_LOGIN_CREDENTIALS");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn sign_up_returns_new_account() {
    let base = spawn_fake_identity().await;
    let client = IdentityClient::new(&test_config(), &base).unwrap();
    let signed_in = client.sign_up("new@b.com", "whatever").await.unwrap();
    assert_eq!(signed_in.identity.uid, "uid-new");
}

#[tokio::test]
async fn lookup_distinguishes_live_and_dead_tokens() {
    let base = spawn_fake_identity().await;
    let client = IdentityClient::new(&test_config(), &base).unwrap();

    let live = client.lookup("token-1").await.unwrap();
    assert_eq!(live.map(|u| u.uid), Some("uid-1".to_owned()));

    assert_eq!(client.lookup("stale").await.unwrap(), None);
    assert!(matches!(
        client.lookup("boom").await,
        Err(IdentityError::Rejected { status: 500, .. })
    ));
}

#[tokio::test]
async fn wrong_api_key_is_rejected() {
    let base = spawn_fake_identity().await;
    let config = IdentityConfig::new("other-key", "demo-project", "1", "1:1:web:1");
    let client = IdentityClient::new(&config, &base).unwrap();
    assert!(matches!(
        client.sign_in("a@b.com", "hunter22").await,
        Err(IdentityError::Rejected { code, .. }) if code == "API_KEY_INVALID"
    ));
}

#[tokio::test]
async fn unreachable_service_is_request_error() {
    let client = IdentityClient::new(&test_config(), "http://127.0.0.1:9").unwrap();
    assert!(matches!(client.lookup("token-1").await, Err(IdentityError::Request(_))));
}
