//! # リポジトリ実装
//!
//! 永続化の具体実装。ユースケース層はトレイト経由で利用し、テストではモックに差し替える。

pub mod apology_repository;

pub use apology_repository::{ApologyRepository, PostgresApologyRepository};
