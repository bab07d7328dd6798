//! 人员登记服务（PersonRegistry）
//!
//! 在仓储之上提供登记规则：
//! - `load`：按 (名, 姓, 出生日期) 去重，只插入、不覆盖；
//! - `find_by_name`：后缀为空或 `NONE` 时按名与姓查找，否则连同后缀一起匹配；
//! - `relate`：两阶段装配的第二阶段，在已登记的人员之间补充关系边；
//! - `get_genealogy_tree`：尚未提供的能力，固定返回 `NotImplemented`。
//!
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain_service::DomainService;
use crate::entity::{Entity, PersonId};
use crate::error::{DomainError, DomainResult};
use crate::persist::PersonRepository;
use crate::person::{NewPerson, Person};
use crate::relationship::Relationship;
use crate::value_object::{PersonKey, PersonName, Postnomial};

/// 节点与边的扁平快照，供可视化使用（不做遍历）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphSnapshot {
    pub people: Vec<Person>,
    pub edges: Vec<Relationship>,
}

/// 人员登记服务
pub struct PersonRegistry<R> {
    repo: Arc<R>,
}

impl<R> Clone for PersonRegistry<R> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
        }
    }
}

impl<R: PersonRepository> PersonRegistry<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// 登记一个新人员
    ///
    /// 相同 (名, 姓, 出生日期) 已存在时返回 `DuplicateRecord`，不产生写入。
    /// 预检只用于尽早失败并记录日志，最终的唯一性由仓储在写入时保证。
    pub async fn load(&self, person: NewPerson) -> DomainResult<Person> {
        let key = person.key();
        if self.repo.find_by_key(&key).await?.is_some() {
            warn!(%key, "person already registered");
            return Err(DomainError::DuplicateRecord {
                key: key.to_string(),
            });
        }

        match self.repo.insert(person).await {
            Ok(stored) => {
                info!(person_id = %stored.id(), %key, "person registered");
                Ok(stored)
            }
            Err(err @ DomainError::DuplicateRecord { .. }) => {
                warn!(%key, "person registered concurrently");
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// 按姓名查找人员；无匹配返回 `Ok(None)`，多条匹配返回 `AmbiguousMatch`
    pub async fn find_by_name(
        &self,
        first_name: &str,
        last_name: &str,
        postnomial: Option<Postnomial>,
    ) -> DomainResult<Option<Person>> {
        let postnomial = Postnomial::normalize(postnomial);
        let mut matches = self
            .repo
            .find_by_name(first_name, last_name, postnomial)
            .await?;

        match matches.len() {
            0 => {
                debug!(first_name, last_name, ?postnomial, "no person matched");
                Ok(None)
            }
            1 => Ok(matches.pop()),
            _ => Err(DomainError::AmbiguousMatch {
                name: PersonName::new(first_name, last_name, postnomial).to_string(),
                candidates: matches
                    .iter()
                    .map(|p| format!("{} {}", p.postnomial(), p.birthdate()))
                    .collect(),
            }),
        }
    }

    /// 按唯一键 (名, 姓, 出生日期) 精确查找
    pub async fn find_by_key(&self, key: &PersonKey) -> DomainResult<Option<Person>> {
        self.repo.find_by_key(key).await
    }

    pub async fn get(&self, id: PersonId) -> DomainResult<Option<Person>> {
        self.repo.get(id).await
    }

    /// 在两个已登记的人员之间建立关系（等价的边已存在时视为成功）
    pub async fn relate(&self, relationship: Relationship) -> DomainResult<()> {
        relationship.validate()?;
        self.repo.relate(relationship).await?;
        let (from, to) = relationship.endpoints();
        debug!(%from, %to, kind = %relationship.kind(), "relationship recorded");
        Ok(())
    }

    /// 删除全部人员与关系
    pub async fn delete_all(&self) -> DomainResult<()> {
        self.repo.delete_all().await?;
        info!("person registry cleared");
        Ok(())
    }

    /// 家谱树：尚未提供
    pub async fn get_genealogy_tree(&self) -> DomainResult<GraphSnapshot> {
        Err(DomainError::NotImplemented {
            operation: "get_genealogy_tree",
        })
    }

    pub async fn graph(&self) -> DomainResult<GraphSnapshot> {
        Ok(GraphSnapshot {
            people: self.repo.all().await?,
            edges: self.repo.edges().await?,
        })
    }

    pub async fn count(&self) -> DomainResult<usize> {
        self.repo.count().await
    }
}

#[async_trait]
impl<R: PersonRepository + 'static> DomainService for PersonRegistry<R> {
    type Input = NewPerson;
    type Output = Person;
    type Error = DomainError;

    async fn execute(&self, input: Self::Input) -> Result<Self::Output, Self::Error> {
        self.load(input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::InMemoryPersonRepository;
    use crate::value_object::Gender;
    use chrono::NaiveDate;

    fn registry() -> PersonRegistry<InMemoryPersonRepository> {
        PersonRegistry::new(Arc::new(InMemoryPersonRepository::new()))
    }

    fn benjamin(postnomial: Postnomial, born: NaiveDate) -> NewPerson {
        NewPerson::builder()
            .first_name("Benjamin")
            .last_name("Harrison")
            .postnomial(postnomial)
            .birthdate(born)
            .gender(Gender::Male)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn ambiguous_name_lists_candidates() {
        let reg = registry();
        reg.load(benjamin(Postnomial::IV, NaiveDate::from_ymd_opt(1693, 9, 11).unwrap()))
            .await
            .unwrap();
        reg.load(benjamin(Postnomial::V, NaiveDate::from_ymd_opt(1726, 4, 5).unwrap()))
            .await
            .unwrap();

        match reg.find_by_name("Benjamin", "Harrison", None).await.unwrap_err() {
            DomainError::AmbiguousMatch { name, candidates } => {
                assert_eq!(name, "Benjamin Harrison");
                assert_eq!(candidates, vec!["IV 1693-09-11", "V 1726-04-05"]);
            }
            other => panic!("unexpected {other:?}"),
        }

        let v = reg
            .find_by_name("Benjamin", "Harrison", Some(Postnomial::V))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(v.postnomial(), Postnomial::V);
    }

    #[tokio::test]
    async fn genealogy_tree_is_not_implemented() {
        let err = registry().get_genealogy_tree().await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::NotImplemented {
                operation: "get_genealogy_tree"
            }
        ));
    }

    #[tokio::test]
    async fn domain_service_execute_loads() {
        let reg = registry();
        let born = NaiveDate::from_ymd_opt(1693, 9, 11).unwrap();
        let stored = reg.execute(benjamin(Postnomial::IV, born)).await.unwrap();
        assert_eq!(reg.count().await.unwrap(), 1);
        assert_eq!(reg.get(*stored.id()).await.unwrap(), Some(stored));
    }
}
