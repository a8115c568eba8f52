//! # 謝罪文の生成
//!
//! 文章生成プロバイダの呼び出しを `ApologyGenerator` trait で抽象化する。
//! プロンプトは [`build_prompt`] で決定的に組み立て、応答は
//! [`normalize_generated_text`] で前後の空白除去と小文字化を行う。

mod openai;

use async_trait::async_trait;
pub use openai::{DEFAULT_OPENAI_MODEL, OpenAiApologyGenerator};
use sorrymail_domain::{
    apology::UserMessage,
    generation::{GenerationError, GenerationRequest},
};

/// 補足メッセージがない場合にプロンプトへ埋め込む文言
pub const NO_CONTEXT_PLACEHOLDER: &str = "no additional context provided.";

/// 謝罪文生成トレイト
#[async_trait]
pub trait ApologyGenerator: Send + Sync {
    /// 謝罪文を生成する
    ///
    /// 返す本文は前後の空白が除去され、すべて小文字。
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

/// 生成プロバイダに渡すプロンプトを組み立てる
pub fn build_prompt(request: &GenerationRequest) -> String {
    let context = request
        .user_message
        .as_ref()
        .map_or(NO_CONTEXT_PLACEHOLDER, UserMessage::as_str);

    format!(
        "you are writing a personal apology email on behalf of {sender}.

tone: {tone}

context (optional):
{context}

rules:
- write everything in lowercase
- keep it under 100 words
- the tone must be clearly felt within the first two lines
- be emotionally honest, not dramatic
- no guilt-tripping, no manipulation
- no unrealistic promises
- end gently, without pressure

write only the email body.
do not include a subject.
do not include explanations.
",
        sender = request.sender_name.as_str(),
        tone = request.tone.as_str(),
    )
}

/// プロバイダの応答本文を正規化する
///
/// 空白のみ、または本文なしの場合は [`GenerationError::EmptyResponse`]。
pub fn normalize_generated_text(raw: Option<&str>) -> Result<String, GenerationError> {
    let text = raw.map(str::trim).unwrap_or_default();
    if text.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    Ok(text.to_lowercase())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use sorrymail_domain::apology::{SenderName, Tone, UserMessage};

    use super::*;

    fn request(message: Option<&str>) -> GenerationRequest {
        GenerationRequest {
            sender_name:  SenderName::new("amogh").unwrap(),
            tone:         Tone::new("sincere").unwrap(),
            user_message: message.map(|m| UserMessage::new(m).unwrap()),
        }
    }

    #[test]
    fn test_プロンプトにトーンと補足と送信者名が含まれる() {
        let prompt = build_prompt(&request(Some("i missed your recital")));

        assert!(prompt.contains("on behalf of amogh."));
        assert!(prompt.contains("tone: sincere"));
        assert!(prompt.contains("context (optional):\ni missed your recital\n"));
        assert!(prompt.contains("- keep it under 100 words"));
        assert!(prompt.contains("do not include a subject."));
    }

    #[test]
    fn test_補足がない場合はプレースホルダを埋め込む() {
        let prompt = build_prompt(&request(None));

        assert!(prompt.contains("context (optional):\nno additional context provided.\n"));
    }

    #[test]
    fn test_プロンプトは決定的() {
        assert_eq!(build_prompt(&request(None)), build_prompt(&request(None)));
    }

    #[rstest]
    #[case("  I'm Sorry.\n", "i'm sorry.")]
    #[case("HEY\n\nSorry", "hey\n\nsorry")]
    #[case("already lowercase", "already lowercase")]
    fn test_応答は空白除去と小文字化される(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_generated_text(Some(raw)).unwrap(), expected);
    }

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    #[case(Some("  \n\t "))]
    fn test_空の応答はempty_response(#[case] raw: Option<&str>) {
        assert!(matches!(
            normalize_generated_text(raw),
            Err(GenerationError::EmptyResponse)
        ));
    }
}
