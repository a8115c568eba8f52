//! # SorryMail API サーバー
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `DATABASE_URL` | **Yes** | PostgreSQL 接続 URL |
//! | `ADMIN_TOKEN` | **Yes** | 管理 API のトークン |
//! | `OPENAI_API_KEY` | **Yes** | OpenAI API キー |
//! | `OPENAI_MODEL` | No | 生成モデル（デフォルト: `gpt-4o-mini`） |
//! | `OPENAI_BASE_URL` | No | OpenAI 互換エンドポイント |
//! | `FROM_EMAIL` | **Yes** | 送信元アドレス |
//! | `DELIVERY_BACKEND` | No | `resend` / `smtp` / `noop`（デフォルト: `resend`） |
//! | `RESEND_API_KEY` | resend 時 | Resend API キー |
//! | `SMTP_HOST` / `SMTP_PORT` | No | smtp 時の接続先（デフォルト: `localhost:1025`） |
//! | `HOST` / `PORT` | No | バインドアドレス（デフォルト: `0.0.0.0:3000`） |
//! | `LOG_FORMAT` | No | `json` / `pretty` |
//!
//! ## 起動方法
//!
//! ```bash
//! # 開発環境（Mailpit へ配送）
//! DELIVERY_BACKEND=smtp cargo run -p sorrymail-api
//! ```

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context as _;
use sorrymail_api::{
    app_builder::build_app,
    config::{AppConfig, DeliveryConfig},
    handler::ReadinessState,
    usecase::{AdminUseCaseImpl, ApologyUseCaseImpl},
};
use sorrymail_domain::clock::SystemClock;
use sorrymail_infra::{
    db,
    generation::{ApologyGenerator, OpenAiApologyGenerator},
    notification::{
        NoopNotificationSender,
        NotificationSender,
        ResendNotificationSender,
        SmtpNotificationSender,
    },
    repository::{ApologyRepository, PostgresApologyRepository},
};
use sorrymail_shared::observability::{TracingConfig, init_tracing};
use tokio::net::TcpListener;

/// API サーバーのエントリーポイント
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    // トレーシング初期化
    let tracing_config = TracingConfig::from_env("sorrymail-api");
    init_tracing(tracing_config);
    let _tracing_guard = tracing::info_span!("app", service = "sorrymail-api").entered();

    // 設定読み込み（不正な設定ではバインド前に終了する）
    let config = AppConfig::from_env().context("設定の読み込みに失敗しました")?;

    tracing::info!(
        delivery_backend = %config.delivery.backend(),
        openai_model = %config.openai_model,
        "SorryMail API サーバーを起動します: {}:{}",
        config.host,
        config.port
    );

    // データベース接続プールを作成
    let pool = db::create_pool(config.database_url.expose())
        .await
        .context("データベース接続に失敗しました")?;
    tracing::info!("データベースに接続しました");

    db::run_migrations(&pool)
        .await
        .context("マイグレーションの実行に失敗しました")?;
    tracing::info!("マイグレーションを適用しました");

    // Readiness Check 用 State（pool が move される前に clone）
    let readiness_state = Arc::new(ReadinessState { pool: pool.clone() });

    // 依存コンポーネントを初期化
    let repository: Arc<dyn ApologyRepository> = Arc::new(PostgresApologyRepository::new(pool));
    let generator: Arc<dyn ApologyGenerator> = Arc::new(
        OpenAiApologyGenerator::new(
            config.openai_api_key.expose(),
            config.openai_model.clone(),
            config.openai_base_url.as_deref(),
        )
        .context("文章生成クライアントの初期化に失敗しました")?,
    );
    let sender = build_notification_sender(&config)?;

    let apology_usecase = ApologyUseCaseImpl::new(
        repository.clone(),
        generator,
        sender,
        Arc::new(SystemClock),
    );
    let admin_usecase = AdminUseCaseImpl::new(repository, config.admin_token.expose());

    let app = build_app(
        Arc::new(apology_usecase),
        Arc::new(admin_usecase),
        readiness_state,
    );

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("アドレスのパースに失敗しました")?;

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("SorryMail API サーバーが起動しました: {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// 設定に応じた配送バックエンドを構築する
fn build_notification_sender(config: &AppConfig) -> anyhow::Result<Arc<dyn NotificationSender>> {
    let sender: Arc<dyn NotificationSender> = match &config.delivery {
        DeliveryConfig::Resend { api_key } => Arc::new(
            ResendNotificationSender::new(api_key.expose(), config.from_email.as_str())
                .context("Resend クライアントの初期化に失敗しました")?,
        ),
        DeliveryConfig::Smtp { host, port } => Arc::new(
            SmtpNotificationSender::new(host, *port, &config.from_email)
                .context("SMTP クライアントの初期化に失敗しました")?,
        ),
        DeliveryConfig::Noop => {
            tracing::warn!("DELIVERY_BACKEND=noop: メールは送信されません");
            Arc::new(NoopNotificationSender)
        }
    };
    Ok(sender)
}
