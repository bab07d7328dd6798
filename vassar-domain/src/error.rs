//! 领域层统一错误定义
//!
//! 聚焦人员登记的唯一性冲突、值校验、关系引用与存储后端等最小必要集合，
//! 便于在各实现层统一转换为 `DomainError`。
//!
use thiserror::Error;

/// 统一错误类型（基础库最小必要集）
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DomainError {
    // --- 登记规则 ---
    #[error("duplicate record: {key}")]
    DuplicateRecord { key: String },
    #[error("ambiguous match: name={name}, candidates={candidates:?}")]
    AmbiguousMatch {
        name: String,
        candidates: Vec<String>,
    },
    #[error("reference not found: {id}")]
    ReferenceNotFound { id: String },
    #[error("spouse conflict: person={person} already has spouse={spouse}")]
    SpouseConflict { person: String, spouse: String },

    // --- 值校验/状态 ---
    #[error("invalid value: {reason}")]
    InvalidValue { reason: String },
    #[error("invalid state: {reason}")]
    InvalidState { reason: String },
    #[error("parse error: {reason}")]
    Parse { reason: String },
    #[error("serialization error: {source}")]
    Serde {
        #[from]
        source: serde_json::Error,
    },

    // --- 仓储/持久化 ---
    #[error("repository error: {reason}")]
    Repository { reason: String },
    #[error("database error: {reason}")]
    Database { reason: String },

    // --- 未实现的能力 ---
    #[error("not implemented: {operation}")]
    NotImplemented { operation: &'static str },
}

/// 统一 Result 类型别名
pub type DomainResult<T> = Result<T, DomainError>;

// ---- Cross-crate conversions for infrastructure convenience ----
// 允许在基础设施层直接使用 `?` 将 neo4rs/uuid/chrono 等错误转换为 DomainError

#[cfg(feature = "infra-neo4j")]
impl From<neo4rs::Error> for DomainError {
    fn from(err: neo4rs::Error) -> Self {
        DomainError::Database {
            reason: err.to_string(),
        }
    }
}

#[cfg(feature = "infra-neo4j")]
impl From<neo4rs::DeError> for DomainError {
    fn from(err: neo4rs::DeError) -> Self {
        DomainError::Parse {
            reason: err.to_string(),
        }
    }
}

impl From<uuid::Error> for DomainError {
    fn from(err: uuid::Error) -> Self {
        DomainError::Parse {
            reason: err.to_string(),
        }
    }
}

impl From<chrono::ParseError> for DomainError {
    fn from(err: chrono::ParseError) -> Self {
        DomainError::Parse {
            reason: err.to_string(),
        }
    }
}
