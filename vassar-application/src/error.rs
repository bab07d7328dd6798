use vassar_domain::error::DomainError;

#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("domain: {0}")]
    Domain(#[from] DomainError),

    #[error("not implemented: {0}")]
    NotImplemented(&'static str),

    #[error("handler not found: {0}")]
    HandlerNotFound(&'static str),

    #[error("handler already registered: command={command}")]
    AlreadyRegisteredCommand { command: &'static str },

    #[error("handler already registered: query={query}")]
    AlreadyRegisteredQuery { query: &'static str },

    #[error("type mismatch: expected={expected}, found={found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

impl AppError {
    /// 将领域层的"未实现"提升为应用层的独立分类，其余原样包装
    pub fn from_domain(err: DomainError) -> Self {
        match err {
            DomainError::NotImplemented { operation } => AppError::NotImplemented(operation),
            other => AppError::Domain(other),
        }
    }
}
