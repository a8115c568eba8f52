//! # API サーバー設定
//!
//! 環境変数から SorryMail API サーバーの設定を読み込む。
//!
//! 必須値の欠落や不正な値は [`ConfigError`] として返し、`main` は
//! サーバーをバインドする前に終了する。

use std::{env, fmt, str::FromStr};

use sorrymail_infra::generation::DEFAULT_OPENAI_MODEL;
use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_SMTP_HOST: &str = "localhost";
const DEFAULT_SMTP_PORT: u16 = 1025;

/// 設定読み込みエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// 必須の環境変数が未設定または空
    #[error("{0} が設定されていません")]
    Missing(&'static str),

    /// 値の形式が不正
    #[error("{var} の値が不正です: {value}")]
    Invalid { var: &'static str, value: String },
}

/// ログや Debug 出力に値を出さない文字列
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// メール配送バックエンドの種別（`DELIVERY_BACKEND`）
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DeliveryBackend {
    Resend,
    Smtp,
    Noop,
}

/// バックエンドごとの配送設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryConfig {
    Resend { api_key: Secret },
    Smtp { host: String, port: u16 },
    Noop,
}

impl DeliveryConfig {
    pub fn backend(&self) -> DeliveryBackend {
        match self {
            Self::Resend { .. } => DeliveryBackend::Resend,
            Self::Smtp { .. } => DeliveryBackend::Smtp,
            Self::Noop => DeliveryBackend::Noop,
        }
    }
}

/// API サーバーの設定
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// バインドアドレス
    pub host:            String,
    /// ポート番号
    pub port:            u16,
    /// データベース接続 URL
    pub database_url:    Secret,
    /// 管理 API のトークン
    pub admin_token:     Secret,
    pub openai_api_key:  Secret,
    pub openai_model:    String,
    /// OpenAI 互換エンドポイントを使う場合のベース URL
    pub openai_base_url: Option<String>,
    /// 送信元アドレス
    pub from_email:      String,
    pub delivery:        DeliveryConfig,
}

impl AppConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 任意の参照関数から設定を読み込む
    ///
    /// テストでプロセスの環境変数を書き換えずに済むよう分離している。
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = Vars(&lookup);

        let delivery = match vars.parse_or("DELIVERY_BACKEND", DeliveryBackend::Resend)? {
            DeliveryBackend::Resend => DeliveryConfig::Resend {
                api_key: Secret::new(vars.required("RESEND_API_KEY")?),
            },
            DeliveryBackend::Smtp => DeliveryConfig::Smtp {
                host: vars
                    .optional("SMTP_HOST")
                    .unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
                port: vars.parse_or("SMTP_PORT", DEFAULT_SMTP_PORT)?,
            },
            DeliveryBackend::Noop => DeliveryConfig::Noop,
        };

        Ok(Self {
            host: vars
                .optional("HOST")
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: vars.parse_or("PORT", DEFAULT_PORT)?,
            database_url: Secret::new(vars.required("DATABASE_URL")?),
            admin_token: Secret::new(vars.required("ADMIN_TOKEN")?),
            openai_api_key: Secret::new(vars.required("OPENAI_API_KEY")?),
            openai_model: vars
                .optional("OPENAI_MODEL")
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            openai_base_url: vars.optional("OPENAI_BASE_URL"),
            from_email: vars.required("FROM_EMAIL")?,
            delivery,
        })
    }
}

struct Vars<'a, F>(&'a F);

impl<F: Fn(&str) -> Option<String>> Vars<'_, F> {
    /// 空白のみの値は未設定として扱う
    fn optional(&self, name: &str) -> Option<String> {
        (self.0)(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn required(&self, name: &'static str) -> Result<String, ConfigError> {
        self.optional(name).ok_or(ConfigError::Missing(name))
    }

    fn parse_or<T: FromStr>(&self, name: &'static str, default: T) -> Result<T, ConfigError> {
        match self.optional(name) {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::Invalid { var: name, value }),
            None => Ok(default),
        }
    }
}
