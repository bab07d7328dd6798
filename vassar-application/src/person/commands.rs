use super::{PersonDto, PersonInput, PersonRef, PersonUseCases};
use crate::command::Command;
use crate::command_handler::CommandHandler;
use crate::context::AppContext;
use crate::error::AppError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;
use vassar_domain::entity::Entity;
use vassar_domain::persist::PersonRepository;
use vassar_domain::relationship::{Relationship, RelationshipKind};

/// 登记一位人员，返回登记后的详情
#[derive(Debug, Clone)]
pub struct LoadPerson {
    pub person: PersonInput,
}

impl Command for LoadPerson {
    const NAME: &'static str = "LoadPerson";
    type Output = PersonDto;
}

/// 在两位已登记的人员之间建立关系
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelatePeople {
    pub kind: RelationshipKind,
    pub from: PersonRef,
    pub to: PersonRef,
}

impl Command for RelatePeople {
    const NAME: &'static str = "RelatePeople";
    type Output = ();
}

/// 清空全部人员与关系
#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteAllPeople;

impl Command for DeleteAllPeople {
    const NAME: &'static str = "DeleteAllPeople";
    type Output = ();
}

#[async_trait]
impl<R: PersonRepository + 'static> CommandHandler<LoadPerson> for PersonUseCases<R> {
    async fn handle(&self, ctx: &AppContext, cmd: LoadPerson) -> Result<PersonDto, AppError> {
        let person = cmd.person.resolve(&self.registry).await?;
        let stored = self.registry.load(person).await?;
        info!(
            person_id = %stored.id(),
            correlation_id = ?ctx.correlation_id,
            "load person handled"
        );
        Ok(PersonDto::assemble(&self.registry, &stored).await?)
    }
}

#[async_trait]
impl<R: PersonRepository + 'static> CommandHandler<RelatePeople> for PersonUseCases<R> {
    async fn handle(&self, _ctx: &AppContext, cmd: RelatePeople) -> Result<(), AppError> {
        let from = cmd.from.resolve(&self.registry).await?;
        let to = cmd.to.resolve(&self.registry).await?;
        self.registry
            .relate(Relationship::from_kind(cmd.kind, from, to))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl<R: PersonRepository + 'static> CommandHandler<DeleteAllPeople> for PersonUseCases<R> {
    async fn handle(&self, ctx: &AppContext, _cmd: DeleteAllPeople) -> Result<(), AppError> {
        self.registry.delete_all().await?;
        info!(actor_id = ?ctx.actor_id, "registry reset");
        Ok(())
    }
}
