/// UUID v7 ベースの ID 型を定義する宣言型マクロ
///
/// 生成されるもの:
/// - `Uuid` をラップする Newtype 構造体
/// - `new()`（UUID v7 を採番）/ `from_uuid()` / `as_uuid()`
/// - `parse_str()`: 文字列表現からの復元（不正な形式は `None`）
/// - `Default`（`new()` に委譲）と `Display`
///
/// ```rust
/// use sorrymail_domain::apology::ApologyId;
///
/// let id = ApologyId::new();
/// let restored = ApologyId::parse_str(&id.to_string()).unwrap();
/// assert_eq!(id, restored);
/// assert!(ApologyId::parse_str("not-a-uuid").is_none());
/// ```
macro_rules! define_uuid_id {
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident;
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash,
            serde::Serialize, serde::Deserialize,
            derive_more::Display,
        )]
        #[display("{_0}")]
        $vis struct $Name(uuid::Uuid);

        impl $Name {
            /// UUID v7 で新しい ID を採番する
            pub fn new() -> Self {
                Self(uuid::Uuid::now_v7())
            }

            pub fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &uuid::Uuid {
                &self.0
            }

            /// 文字列から ID を復元する
            ///
            /// UUID として解釈できない場合は `None`。
            pub fn parse_str(value: &str) -> Option<Self> {
                uuid::Uuid::parse_str(value).ok().map(Self)
            }
        }

        impl Default for $Name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

/// 検証付き String Newtype を定義する宣言型マクロ
///
/// - `label`: エラーメッセージ中のフィールド名（API の JSON キーに合わせる）
/// - `max_length`: 最大文字数（`chars().count()`）
/// - `pii: true`: `Debug` を `[REDACTED]` にマスクし、`Display` を生成しない
///
/// ```rust
/// use sorrymail_domain::apology::{RecipientEmail, Tone};
///
/// let tone = Tone::new("  sincere ").unwrap();
/// assert_eq!(tone.as_str(), "sincere");
///
/// let email = RecipientEmail::new("x@example.com").unwrap();
/// assert!(format!("{email:?}").contains("[REDACTED]"));
/// ```
macro_rules! define_validated_string {
    (@methods $Name:ident, $label:expr, $max_length:expr) => {
        impl $Name {
            /// 前後の空白を除去してから検証する
            pub fn new(value: impl Into<String>) -> Result<Self, $crate::DomainError> {
                let trimmed = value.into().trim().to_owned();
                match trimmed.chars().count() {
                    0 => Err($crate::DomainError::Validation(format!("{} は必須です", $label))),
                    n if n > $max_length => Err($crate::DomainError::Validation(format!(
                        "{} は {} 文字以内で入力してください",
                        $label, $max_length
                    ))),
                    _ => Ok(Self(trimmed)),
                }
            }

            /// JSON の欠落フィールド（`None`）は空文字列と同じ扱い
            pub fn from_optional(value: Option<String>) -> Result<Self, $crate::DomainError> {
                Self::new(value.unwrap_or_default())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }
    };
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident {
            label: $label:expr,
            max_length: $max_length:expr,
            pii: true $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
        $vis struct $Name(String);

        impl std::fmt::Debug for $Name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}([REDACTED])", stringify!($Name))
            }
        }

        define_validated_string!(@methods $Name, $label, $max_length);
    };
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident {
            label: $label:expr,
            max_length: $max_length:expr $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
        $vis struct $Name(String);

        impl std::fmt::Display for $Name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        define_validated_string!(@methods $Name, $label, $max_length);
    };
}
