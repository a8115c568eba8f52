//! OpenAI 実装
//!
//! async-openai の Chat Completions API を呼び出す。
//!
//! async-openai は既定で 429 を指数バックオフで再試行するが、このクライアントは
//! 最初の失敗をそのまま [`GenerationError::Provider`] として返す。

use std::time::Duration;

use async_openai::{
    Client,
    config::OpenAIConfig,
    error::OpenAIError,
    types::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs},
};
use async_trait::async_trait;
use sorrymail_domain::generation::{GenerationError, GenerationRequest};

use super::{ApologyGenerator, build_prompt, normalize_generated_text};

/// デフォルトのモデル
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

const TEMPERATURE: f32 = 0.8;

/// HTTP リクエストのタイムアウト
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// 再試行しないバックオフ設定（経過時間の上限 0）
fn no_retry() -> backoff::ExponentialBackoff {
    backoff::ExponentialBackoffBuilder::new()
        .with_max_elapsed_time(Some(Duration::ZERO))
        .build()
}

/// API キーをログ用にマスクする（先頭 7 文字 + `***` + 末尾 4 文字）
fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 11 {
        return "***".to_string();
    }
    let head: String = chars[..7].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}***{tail}")
}

/// OpenAI による謝罪文生成
#[derive(Clone)]
pub struct OpenAiApologyGenerator {
    client: Client<OpenAIConfig>,
    model:  String,
}

impl OpenAiApologyGenerator {
    /// # 引数
    ///
    /// - `base_url`: 互換エンドポイントやプロキシを使う場合に指定
    pub fn new(
        api_key: &str,
        model: impl Into<String>,
        base_url: Option<&str>,
    ) -> Result<Self, GenerationError> {
        let mut config = OpenAIConfig::new().with_api_key(api_key);
        if let Some(base_url) = base_url {
            config = config.with_api_base(base_url);
        }

        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GenerationError::Provider(format!("HTTP クライアント構築失敗: {e}")))?;

        let model = model.into();
        tracing::info!(
            model = %model,
            api_key = %mask_api_key(api_key),
            "OpenAI クライアントを初期化"
        );

        Ok(Self {
            client: Client::with_config(config)
                .with_http_client(http_client)
                .with_backoff(no_retry()),
            model,
        })
    }
}

fn provider_error(e: OpenAIError) -> GenerationError {
    GenerationError::Provider(e.to_string())
}

#[async_trait]
impl ApologyGenerator for OpenAiApologyGenerator {
    #[tracing::instrument(skip_all, level = "debug", fields(model = %self.model))]
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let prompt = build_prompt(request);

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![
                ChatCompletionRequestUserMessageArgs::default()
                    .content(prompt)
                    .build()
                    .map_err(provider_error)?
                    .into(),
            ])
            .temperature(TEMPERATURE)
            .build()
            .map_err(provider_error)?;

        let response = self
            .client
            .chat()
            .create(chat_request)
            .await
            .map_err(provider_error)?;

        if let Some(usage) = &response.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "OpenAI 使用トークン"
            );
        }

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_deref());

        normalize_generated_text(content)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use sorrymail_domain::apology::{SenderName, Tone};
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::{TcpListener, TcpStream},
    };

    use super::*;

    /// 固定のステータスと JSON を返す OpenAI 互換サーバー
    struct StubProvider {
        base_url: String,
        hits:     Arc<AtomicUsize>,
    }

    impl StubProvider {
        async fn spawn(status: u16, body: impl Into<String>) -> Self {
            let body = body.into();
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            let hits = Arc::new(AtomicUsize::new(0));
            let counter = Arc::clone(&hits);

            tokio::spawn(async move {
                while let Ok((mut socket, _)) = listener.accept().await {
                    counter.fetch_add(1, Ordering::SeqCst);
                    read_request(&mut socket).await;
                    let response = format!(
                        "HTTP/1.1 {status} Stub\r\ncontent-type: application/json\r\n\
                         content-length: {}\r\nconnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                }
            });

            Self {
                base_url: format!("http://{addr}/v1"),
                hits,
            }
        }

        fn hits(&self) -> usize {
            self.hits.load(Ordering::SeqCst)
        }
    }

    /// ヘッダーと Content-Length 分の本文を読み切る
    async fn read_request(socket: &mut TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap_or(0);
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);

            let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
                continue;
            };
            let headers = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
            let content_length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + content_length {
                return;
            }
        }
    }

    fn request() -> GenerationRequest {
        GenerationRequest {
            sender_name:  SenderName::new("taro").unwrap(),
            tone:         Tone::new("sincere").unwrap(),
            user_message: None,
        }
    }

    async fn generate_with(base_url: &str) -> Result<String, GenerationError> {
        let generator =
            OpenAiApologyGenerator::new("sk-test", DEFAULT_OPENAI_MODEL, Some(base_url)).unwrap();
        tokio::time::timeout(Duration::from_secs(10), generator.generate(&request()))
            .await
            .expect("generate は再試行せずに完了すること")
    }

    fn completion(choices: &str) -> String {
        format!(
            r#"{{"id":"chatcmpl-1","object":"chat.completion","created":1700000000,"model":"gpt-4o-mini","choices":{choices},"usage":{{"prompt_tokens":10,"completion_tokens":2,"total_tokens":12}}}}"#
        )
    }

    #[rstest]
    #[case("short", "***")]
    #[case("sk-12345678", "***")]
    #[case("sk-proj-abcdefghijklmnop", "sk-proj***mnop")]
    fn test_api_keyのマスク(#[case] key: &str, #[case] expected: &str) {
        assert_eq!(mask_api_key(key), expected);
    }

    #[test]
    fn トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<OpenAiApologyGenerator>();
    }

    #[test]
    fn test_base_url指定でも構築できる() {
        let result = OpenAiApologyGenerator::new(
            "sk-test",
            DEFAULT_OPENAI_MODEL,
            Some("http://localhost:4010/v1"),
        );

        assert!(result.is_ok());
    }

    #[rstest]
    #[case::rate_limited(
        429,
        r#"{"error":{"message":"rate limited","type":"requests","param":null,"code":null}}"#
    )]
    #[case::unauthorized(
        401,
        r#"{"error":{"message":"invalid api key","type":"invalid_request_error","param":null,"code":"invalid_api_key"}}"#
    )]
    #[tokio::test]
    async fn test_エラー応答は再試行せずproviderエラーになる(
        #[case] status: u16,
        #[case] body: &'static str,
    ) {
        let stub = StubProvider::spawn(status, body).await;

        let result = generate_with(&stub.base_url).await;

        assert!(matches!(result, Err(GenerationError::Provider(_))), "{result:?}");
        assert_eq!(stub.hits(), 1);
    }

    #[tokio::test]
    async fn test_接続できない場合はproviderエラー() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = generate_with(&format!("http://{addr}/v1")).await;

        assert!(matches!(result, Err(GenerationError::Provider(_))), "{result:?}");
    }

    #[tokio::test]
    async fn test_choicesが空の応答はempty_response() {
        let stub = StubProvider::spawn(200, completion("[]")).await;

        let result = generate_with(&stub.base_url).await;

        assert!(matches!(result, Err(GenerationError::EmptyResponse)), "{result:?}");
    }

    #[tokio::test]
    async fn test_応答本文は空白除去と小文字化される() {
        let choices = r#"[{"index":0,"message":{"role":"assistant","content":"  Sorry\n","refusal":null},"finish_reason":"stop","logprobs":null}]"#;
        let stub = StubProvider::spawn(200, completion(choices)).await;

        let result = generate_with(&stub.base_url).await;

        assert_eq!(result.unwrap(), "sorry");
        assert_eq!(stub.hits(), 1);
    }
}
