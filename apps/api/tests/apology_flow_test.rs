//! # 謝罪メール送信フローのシナリオテスト
//!
//! `build_app` で組み立てたルーター全体（ミドルウェア込み）に対して、
//! インメモリのモックと固定時計を注入してリクエストを流す。
//!
//! - 初回送信は成功し、レコードがちょうど 1 件保存される
//! - 直後の再送は 429 で、件数は変わらない
//! - 24 時間経過後は再び送信できる
//! - 配送失敗は 500 で、レコードは保存されない
//! - 管理 API は正しいトークンでのみ降順の一覧を返す

use std::{sync::Arc, time::Duration as StdDuration};

use axum::{
    Router,
    body::{Body, to_bytes},
};
use chrono::{DateTime, Duration, Utc};
use http::{Method, Request, StatusCode};
use pretty_assertions::assert_eq;
use sorrymail_api::{
    app_builder::build_app,
    handler::{ADMIN_TOKEN_HEADER, ApologyDto, ReadinessState},
    usecase::{AdminUseCaseImpl, ApologyUseCaseImpl},
};
use sorrymail_domain::clock::FixedClock;
use sorrymail_infra::mock::{MockApologyGenerator, MockApologyRepository, MockNotificationSender};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

const ADMIN_TOKEN: &str = "test-admin-token";

struct TestApp {
    router:     Router,
    repository: MockApologyRepository,
    generator:  MockApologyGenerator,
    sender:     MockNotificationSender,
    clock:      Arc<FixedClock>,
}

fn start_time() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

impl TestApp {
    fn new() -> Self {
        let repository = MockApologyRepository::new();
        let generator = MockApologyGenerator::new();
        let sender = MockNotificationSender::new();
        let clock = Arc::new(FixedClock::new(start_time()));

        let apology_usecase = ApologyUseCaseImpl::new(
            Arc::new(repository.clone()),
            Arc::new(generator.clone()),
            Arc::new(sender.clone()),
            clock.clone(),
        );
        let admin_usecase = AdminUseCaseImpl::new(Arc::new(repository.clone()), ADMIN_TOKEN);

        // readiness 以外では使わないため接続は遅延させる
        let pool = PgPoolOptions::new()
            .acquire_timeout(StdDuration::from_millis(500))
            .connect_lazy("postgres://sorrymail@127.0.0.1:1/sorrymail")
            .unwrap();

        let router = build_app(
            Arc::new(apology_usecase),
            Arc::new(admin_usecase),
            Arc::new(ReadinessState { pool }),
        );

        Self {
            router,
            repository,
            generator,
            sender,
            clock,
        }
    }

    async fn send(&self, recipient: &str) -> (StatusCode, serde_json::Value) {
        let body = serde_json::json!({
            "senderName": "amogh",
            "recipientEmail": recipient,
            "tone": "sincere",
            "message": "i missed your birthday",
        });
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/send")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.call(request).await
    }

    async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(ADMIN_TOKEN_HEADER, token);
        }
        self.call(builder.body(Body::empty()).unwrap()).await
    }

    async fn call(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }
}

#[tokio::test]
async fn test_初回送信は成功しレコードが1件保存される() {
    let app = TestApp::new();

    let (status, body) = app.send("x@example.com").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let records = app.repository.records();
    assert_eq!(records.len(), 1);
    assert_eq!(body["id"], records[0].id().to_string());
    assert_eq!(app.sender.call_count(), 1);
}

#[tokio::test]
async fn test_直後の再送は429で件数が変わらない() {
    let app = TestApp::new();
    app.send("x@example.com").await;

    let (status, body) = app.send("x@example.com").await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["status"], 429);
    assert_eq!(app.repository.records().len(), 1);
    assert_eq!(app.generator.call_count(), 1);
    assert_eq!(app.sender.call_count(), 1);
}

#[tokio::test]
async fn test_24時間を過ぎれば同じ宛先に再送できる() {
    let app = TestApp::new();
    app.send("x@example.com").await;

    app.clock.advance(Duration::hours(24) + Duration::seconds(1));
    let (status, _) = app.send("x@example.com").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.repository.records().len(), 2);
}

#[tokio::test]
async fn test_配送失敗は500でレコードを保存しない() {
    let app = TestApp::new();
    app.sender.fail();

    let (status, body) = app.send("x@example.com").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["detail"], "内部エラーが発生しました");
    assert!(app.repository.records().is_empty());
}

#[tokio::test]
async fn test_生成文は小文字でメール本文に使われる() {
    let app = TestApp::new();

    app.send("x@example.com").await;

    let sent = app.sender.sent_emails();
    assert_eq!(sent[0].text_body, "i'm sorry. i should have been there.");
    assert!(sent[0].html_body.contains("i&#39;m sorry."));
}

#[tokio::test]
async fn test_一覧は正しいトークンで作成日時の降順に返す() {
    let app = TestApp::new();
    for (i, recipient) in ["a@example.com", "b@example.com", "c@example.com"]
        .iter()
        .enumerate()
    {
        if i > 0 {
            app.clock.advance(Duration::minutes(5));
        }
        let (status, _) = app.send(recipient).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = app.get("/api/all", Some(ADMIN_TOKEN)).await;

    assert_eq!(status, StatusCode::OK);
    let records: Vec<ApologyDto> = serde_json::from_value(body).unwrap();
    let recipients: Vec<&str> = records.iter().map(|r| r.recipient_email.as_str()).collect();
    assert_eq!(
        recipients,
        vec!["c@example.com", "b@example.com", "a@example.com"]
    );
}

#[tokio::test]
async fn test_不正なトークンは401でストアを参照しない() {
    let app = TestApp::new();
    app.send("x@example.com").await;
    let reads_before = app.repository.read_calls();
    let id = app.repository.records()[0].id().to_string();

    let (all, _) = app.get("/api/all", Some("wrong")).await;
    let (missing, _) = app.get("/api/all", None).await;
    let (detail, _) = app.get(&format!("/api/{id}"), Some("wrong")).await;

    assert_eq!(all, StatusCode::UNAUTHORIZED);
    assert_eq!(missing, StatusCode::UNAUTHORIZED);
    assert_eq!(detail, StatusCode::UNAUTHORIZED);
    assert_eq!(app.repository.read_calls(), reads_before);
}

#[tokio::test]
async fn test_クエリパラメータのトークンでも詳細を取得できる() {
    let app = TestApp::new();
    app.send("x@example.com").await;
    let id = app.repository.records()[0].id().to_string();

    let (status, body) = app
        .get(&format!("/api/{id}?admin_token={ADMIN_TOKEN}"), None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id);
    assert_eq!(body["recipientEmail"], "x@example.com");
    assert_eq!(body["deliveryReference"], "mock-message-id");
}

#[tokio::test]
async fn test_存在しないidと不正な形式のidは404を返す() {
    let app = TestApp::new();

    let (unknown, _) = app
        .get(
            "/api/0190a5f8-0000-7000-8000-000000000000",
            Some(ADMIN_TOKEN),
        )
        .await;
    let (malformed, _) = app.get("/api/not-a-uuid", Some(ADMIN_TOKEN)).await;

    assert_eq!(unknown, StatusCode::NOT_FOUND);
    assert_eq!(malformed, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_不正なjsonは400を返す() {
    let app = TestApp::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/send")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = app.call(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
    assert_eq!(app.generator.call_count(), 0);
}

#[tokio::test]
async fn test_未定義のルートは404を返す() {
    let app = TestApp::new();

    let (status, body) = app.get("/no/such/route", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 404);
}

#[tokio::test]
async fn test_livenessとrequest_idヘッダー() {
    let app = TestApp::new();

    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let request_id = response
        .headers()
        .get("x-request-id")
        .unwrap()
        .to_str()
        .unwrap();
    let uuid = uuid::Uuid::parse_str(request_id).unwrap();
    assert_eq!(uuid.get_version_num(), 7);
}
