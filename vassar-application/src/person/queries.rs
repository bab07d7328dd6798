use super::{GraphDto, PersonDto, PersonUseCases};
use crate::context::AppContext;
use crate::error::AppError;
use crate::query::Query;
use crate::query_handler::QueryHandler;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use vassar_domain::persist::PersonRepository;
use vassar_domain::value_object::Postnomial;

/// 按姓名查找；`postnomial` 为空或 `NONE` 时只比较名与姓
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindPersonByName {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub postnomial: Option<Postnomial>,
}

impl Query for FindPersonByName {
    const NAME: &'static str = "FindPersonByName";
    type Dto = Option<PersonDto>;
}

/// 全部节点与连线（扁平列表）
#[derive(Debug, Clone, Copy, Default)]
pub struct GetGraphData;

impl Query for GetGraphData {
    const NAME: &'static str = "GetGraphData";
    type Dto = GraphDto;
}

/// 家谱树（尚未提供，固定返回 `NotImplemented`）
#[derive(Debug, Clone, Copy, Default)]
pub struct GetGenealogyTree;

impl Query for GetGenealogyTree {
    const NAME: &'static str = "GetGenealogyTree";
    type Dto = GraphDto;
}

#[async_trait]
impl<R: PersonRepository + 'static> QueryHandler<FindPersonByName> for PersonUseCases<R> {
    async fn handle(
        &self,
        _ctx: &AppContext,
        q: FindPersonByName,
    ) -> Result<Option<PersonDto>, AppError> {
        let found = self
            .registry
            .find_by_name(&q.first_name, &q.last_name, q.postnomial)
            .await?;
        match found {
            Some(person) => Ok(Some(PersonDto::assemble(&self.registry, &person).await?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl<R: PersonRepository + 'static> QueryHandler<GetGraphData> for PersonUseCases<R> {
    async fn handle(&self, _ctx: &AppContext, _q: GetGraphData) -> Result<GraphDto, AppError> {
        Ok(self.registry.graph().await?.into())
    }
}

#[async_trait]
impl<R: PersonRepository + 'static> QueryHandler<GetGenealogyTree> for PersonUseCases<R> {
    async fn handle(&self, _ctx: &AppContext, _q: GetGenealogyTree) -> Result<GraphDto, AppError> {
        let tree = self
            .registry
            .get_genealogy_tree()
            .await
            .map_err(AppError::from_domain)?;
        Ok(tree.into())
    }
}
