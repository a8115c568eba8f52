//! # Observability 基盤
//!
//! トレーシングの初期化と、HTTP リクエストごとのスパン・Request ID 生成。
//!
//! - `LOG_FORMAT=json|pretty` で出力形式を切り替える（既定は pretty）
//! - `RUST_LOG` 未設定時のフィルタは [`DEFAULT_LOG_FILTER`]
//!
//! リクエストスパンにはクエリ文字列を含めない。管理 API のトークンが
//! `admin_token` クエリで渡されることがあるため。

use std::str::FromStr;

/// Request ID ヘッダー名
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// `RUST_LOG` 未設定時のフィルタ
pub const DEFAULT_LOG_FILTER: &str = "info,sorrymail=debug";

/// ログ出力形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 1 行 1 JSON（本番向け）
    Json,
    /// 人間向け（開発向け）
    #[default]
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            other => Err(other.to_string()),
        }
    }
}

impl LogFormat {
    /// `LOG_FORMAT` の値から決定する
    ///
    /// 未設定・不正値は [`Pretty`](LogFormat::Pretty)。トレーシング初期化前のため
    /// 不正値の警告は stderr に出す。
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value.map(str::parse::<Self>) {
            Some(Ok(format)) => format,
            Some(Err(other)) => {
                eprintln!("WARNING: unknown LOG_FORMAT={other:?}, falling back to pretty");
                Self::Pretty
            }
            None => Self::default(),
        }
    }
}

/// トレーシング初期化設定
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// サービス名（起動ログと `app` スパンに使う）
    pub service_name: String,
    pub log_format:   LogFormat,
}

impl TracingConfig {
    /// 環境変数 `LOG_FORMAT` から設定を読み取る
    pub fn from_env(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            log_format:   LogFormat::from_env_value(std::env::var("LOG_FORMAT").ok().as_deref()),
        }
    }
}

/// グローバルサブスクライバを登録する
///
/// `tracing_error::ErrorLayer` も登録し、`InfraError` の `SpanTrace` に
/// スパン情報が載るようにする。
#[cfg(feature = "observability")]
pub fn init_tracing(config: TracingConfig) {
    use tracing_subscriber::{Layer as _, layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    let fmt_layer = match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(false)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer().with_target(false).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(tracing_error::ErrorLayer::default())
        .init();

    tracing::debug!(
        service = %config.service_name,
        log_format = ?config.log_format,
        "トレーシングを初期化しました"
    );
}

/// `TraceLayer::make_span_with` 用のリクエストスパン
///
/// `SetRequestIdLayer` の内側で使い、付与済みの `x-request-id` を記録する。
#[cfg(feature = "observability")]
pub fn make_request_span<B>(request: &http::Request<B>) -> tracing::Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
    )
}

/// UUID v7 の Request ID を発行する
#[cfg(feature = "observability")]
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuidV7;

#[cfg(feature = "observability")]
impl tower_http::request_id::MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(
        &mut self,
        _request: &http::Request<B>,
    ) -> Option<tower_http::request_id::RequestId> {
        http::HeaderValue::try_from(uuid::Uuid::now_v7().to_string())
            .ok()
            .map(tower_http::request_id::RequestId::new)
    }
}
