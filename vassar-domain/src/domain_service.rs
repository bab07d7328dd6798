//! 领域服务（Domain Service）
//!
//! 不属于单个实体的领域规则（例如跨记录的唯一性检查）以服务的形式提供，
//! 输入、输出与错误类型由实现方声明。
//!
use async_trait::async_trait;

#[async_trait]
pub trait DomainService: Send + Sync {
    type Input;
    type Output;
    type Error;

    async fn execute(&self, input: Self::Input) -> Result<Self::Output, Self::Error>;
}
