//! 人员登记用例
//!
//! 命令：[`LoadPerson`]、[`RelatePeople`]、[`DeleteAllPeople`]；
//! 查询：[`FindPersonByName`]、[`GetGraphData`]、[`GetGenealogyTree`]。
//! 全部由 [`PersonUseCases`] 处理，通过 [`register_person_handlers`] 装配到总线。
//!
mod commands;
mod dto;
mod input;
mod queries;

pub use commands::*;
pub use dto::*;
pub use input::*;
pub use queries::*;

use crate::error::AppError;
use crate::{InMemoryCommandBus, InMemoryQueryBus};
use std::sync::Arc;
use vassar_domain::persist::PersonRepository;
use vassar_domain::registry::PersonRegistry;

/// 人员用例处理器（同时实现各命令与查询的 Handler）
pub struct PersonUseCases<R> {
    registry: PersonRegistry<R>,
}

impl<R: PersonRepository> PersonUseCases<R> {
    pub fn new(registry: PersonRegistry<R>) -> Self {
        Self { registry }
    }
}

/// 将人员用例注册到内存总线
pub fn register_person_handlers<R>(
    commands: &InMemoryCommandBus,
    queries: &InMemoryQueryBus,
    registry: PersonRegistry<R>,
) -> Result<(), AppError>
where
    R: PersonRepository + 'static,
{
    let handlers = Arc::new(PersonUseCases::new(registry));
    commands.register::<LoadPerson, _>(handlers.clone())?;
    commands.register::<RelatePeople, _>(handlers.clone())?;
    commands.register::<DeleteAllPeople, _>(handlers.clone())?;
    queries.register::<FindPersonByName, _>(handlers.clone())?;
    queries.register::<GetGraphData, _>(handlers.clone())?;
    queries.register::<GetGenealogyTree, _>(handlers)?;
    Ok(())
}
