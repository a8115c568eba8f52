//! # Canonical Log Line ミドルウェア
//!
//! 1 リクエストにつき 1 行、メソッド・パス・ステータス・処理時間をまとめた
//! サマリログを出力する tower Layer。
//!
//! TraceLayer の内側に置くと、リクエストスパンの `request_id` が JSON ログに含まれる。
//! ヘルスチェック（`/health`, `/health/ready`）はポーリングでログが埋まるため出力しない。
//!
//! | ステータス | `http.outcome` | レベル |
//! |-----------|----------------|--------|
//! | 1xx–3xx | `success` | INFO |
//! | 4xx | `client_error` | INFO |
//! | 5xx | `server_error` | WARN |
//! | Service エラー | — | ERROR |

use std::{
    fmt,
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    time::Instant,
};

use http::{Method, Request, Response, StatusCode};
use tower::{Layer, Service};

/// ログ出力の対象外とするパス
fn is_excluded(path: &str) -> bool {
    path.strip_prefix("/health")
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

fn outcome(status: StatusCode) -> &'static str {
    if status.is_server_error() {
        "server_error"
    } else if status.is_client_error() {
        "client_error"
    } else {
        "success"
    }
}

/// 出力待ちの 1 行分の情報
struct CanonicalLine {
    method: Method,
    path:   String,
    start:  Instant,
}

impl CanonicalLine {
    fn latency_ms(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    fn emit_response(&self, status: StatusCode) {
        let latency_ms = self.latency_ms();
        if status.is_server_error() {
            tracing::warn!(
                log.r#type = "canonical",
                http.method = %self.method,
                http.path = %self.path,
                http.status_code = status.as_u16(),
                http.outcome = outcome(status),
                http.latency_ms = latency_ms,
                "リクエスト完了"
            );
        } else {
            tracing::info!(
                log.r#type = "canonical",
                http.method = %self.method,
                http.path = %self.path,
                http.status_code = status.as_u16(),
                http.outcome = outcome(status),
                http.latency_ms = latency_ms,
                "リクエスト完了"
            );
        }
    }

    fn emit_error(&self, err: &dyn fmt::Display) {
        tracing::error!(
            log.r#type = "canonical",
            http.method = %self.method,
            http.path = %self.path,
            http.latency_ms = self.latency_ms(),
            error.message = %err,
            "リクエスト処理エラー"
        );
    }
}

/// Canonical Log Line を出力する Layer
#[derive(Clone, Copy, Debug, Default)]
pub struct CanonicalLogLineLayer;

impl<S> Layer<S> for CanonicalLogLineLayer {
    type Service = CanonicalLogLineService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CanonicalLogLineService { inner }
    }
}

/// [`CanonicalLogLineLayer`] が生成する Service
#[derive(Clone, Debug)]
pub struct CanonicalLogLineService<S> {
    inner: S,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for CanonicalLogLineService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: fmt::Display + 'static,
    ReqBody: Send + 'static,
    ResBody: Send + 'static,
{
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;
    type Response = S::Response;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        // poll_ready 済みのインスタンスで呼び出す
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        let line = (!is_excluded(req.uri().path())).then(|| CanonicalLine {
            method: req.method().clone(),
            path:   req.uri().path().to_owned(),
            start:  Instant::now(),
        });

        Box::pin(async move {
            let result = inner.call(req).await;
            if let Some(line) = line {
                match &result {
                    Ok(response) => line.emit_response(response.status()),
                    Err(err) => line.emit_error(err),
                }
            }
            result
        })
    }
}
