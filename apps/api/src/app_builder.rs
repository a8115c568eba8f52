//! # アプリケーション構築
//!
//! State の組み立てとルーター構築を担当する。
//! `main.rs` はインフラ初期化とサーバー起動に集中する。

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use sorrymail_shared::{
    canonical_log::CanonicalLogLineLayer,
    observability::{MakeRequestUuidV7, make_request_span},
};
use tower_http::{
    cors::CorsLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{
    handler::{
        AdminState,
        ApologyState,
        ReadinessState,
        fallback,
        get_apology,
        health_check,
        list_apologies,
        readiness_check,
        send_apology,
    },
    usecase::{AdminUseCase, ApologyUseCase},
};

/// ルーターを構築する
///
/// ユースケースは構築済みのものを受け取る。テストではモックを注入した
/// ユースケースを渡す。
pub fn build_app(
    apology_usecase: Arc<dyn ApologyUseCase>,
    admin_usecase: Arc<dyn AdminUseCase>,
    readiness_state: Arc<ReadinessState>,
) -> Router {
    let apology_state = Arc::new(ApologyState {
        usecase: apology_usecase,
    });
    let admin_state = Arc::new(AdminState {
        usecase: admin_usecase,
    });

    Router::new()
        .route("/health", get(health_check))
        .merge(
            Router::new()
                .route("/health/ready", get(readiness_check))
                .with_state(readiness_state),
        )
        .merge(
            Router::new()
                .route("/api/send", post(send_apology))
                .with_state(apology_state),
        )
        .merge(
            Router::new()
                .route("/api/all", get(list_apologies))
                .route("/api/{id}", get(get_apology))
                .with_state(admin_state),
        )
        .fallback(fallback)
        .layer(CorsLayer::permissive())
        // Request ID レイヤー（下に書いたものが外側）
        // 1. SetRequestIdLayer（最外）: UUID v7 を生成（またはクライアント提供値を使用）
        // 2. TraceLayer: スパンに request_id を含める
        // 3. CanonicalLogLineLayer: リクエスト完了時に 1 行サマリログを出力（スパン内）
        // 4. PropagateRequestIdLayer: レスポンスヘッダーに X-Request-Id をコピー
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(CanonicalLogLineLayer)
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
}
