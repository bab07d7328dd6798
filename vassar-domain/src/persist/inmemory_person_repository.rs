//! 基于内存的图存储实现
//!
//! 以"节点表 + 边表"的方式保存：节点按标识存放，边是只引用标识的独立记录。
//! 唯一性检查、引用校验与写入在同一把写锁内完成。
//!
use crate::entity::PersonId;
use crate::error::{DomainError, DomainResult};
use crate::persist::PersonRepository;
use crate::person::{NewPerson, Person, PersonProfile};
use crate::relationship::{Kinship, Relationship};
use crate::value_object::{PersonKey, Postnomial};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
struct GraphState {
    nodes: HashMap<PersonId, PersonProfile>,
    // 写入顺序，保证 all()/find_by_name() 的结果稳定
    order: Vec<PersonId>,
    by_key: HashMap<PersonKey, PersonId>,
    edges: Vec<Relationship>,
}

impl GraphState {
    fn ensure_exists(&self, id: PersonId) -> DomainResult<()> {
        if self.nodes.contains_key(&id) {
            Ok(())
        } else {
            Err(DomainError::ReferenceNotFound { id: id.to_string() })
        }
    }

    fn kinship(&self, id: PersonId, pending: &[Relationship]) -> Kinship {
        Kinship::derive(id, self.edges.iter().chain(pending.iter()))
    }

    fn person(&self, id: PersonId) -> Option<Person> {
        self.nodes
            .get(&id)
            .map(|profile| Person::new(id, profile.clone(), self.kinship(id, &[])))
    }

    /// 逐条校验候选边，返回需要真正写入的边（已存在的等价边被跳过）
    fn accept(&self, candidates: Vec<Relationship>) -> DomainResult<Vec<Relationship>> {
        let mut accepted = Vec::with_capacity(candidates.len());
        for rel in candidates {
            rel.validate()?;
            let (from, to) = rel.endpoints();
            let from_kin = self.kinship(from, &accepted);
            let to_kin = self.kinship(to, &accepted);
            if rel.check(&from_kin, &to_kin)? {
                accepted.push(rel);
            }
        }
        Ok(accepted)
    }
}

/// 内存图存储（默认实现，适用于嵌入式运行与测试）
#[derive(Debug, Default)]
pub struct InMemoryPersonRepository {
    state: RwLock<GraphState>,
}

impl InMemoryPersonRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PersonRepository for InMemoryPersonRepository {
    async fn insert(&self, person: NewPerson) -> DomainResult<Person> {
        let key = person.key();
        let mut state = self.state.write().await;

        if state.by_key.contains_key(&key) {
            return Err(DomainError::DuplicateRecord {
                key: key.to_string(),
            });
        }
        for referent in person.references() {
            state.ensure_exists(referent)?;
        }

        let id = PersonId::generate();
        let accepted = state.accept(person.relationships(id))?;

        state.nodes.insert(id, person.into_profile());
        state.order.push(id);
        state.by_key.insert(key, id);
        let edge_count = accepted.len();
        state.edges.extend(accepted);
        debug!(person_id = %id, edges = edge_count, "person node stored");

        state.person(id).ok_or_else(|| DomainError::Repository {
            reason: format!("stored person {id} vanished"),
        })
    }

    async fn get(&self, id: PersonId) -> DomainResult<Option<Person>> {
        Ok(self.state.read().await.person(id))
    }

    async fn find_by_key(&self, key: &PersonKey) -> DomainResult<Option<Person>> {
        let state = self.state.read().await;
        Ok(state.by_key.get(key).and_then(|id| state.person(*id)))
    }

    async fn find_by_name(
        &self,
        first_name: &str,
        last_name: &str,
        postnomial: Option<Postnomial>,
    ) -> DomainResult<Vec<Person>> {
        let state = self.state.read().await;
        Ok(state
            .order
            .iter()
            .filter(|id| {
                state
                    .nodes
                    .get(*id)
                    .is_some_and(|p| p.matches_name(first_name, last_name, postnomial))
            })
            .filter_map(|id| state.person(*id))
            .collect())
    }

    async fn relate(&self, relationship: Relationship) -> DomainResult<()> {
        let mut state = self.state.write().await;
        let (from, to) = relationship.endpoints();
        state.ensure_exists(from)?;
        state.ensure_exists(to)?;

        let accepted = state.accept(vec![relationship])?;
        if accepted.is_empty() {
            debug!(%from, %to, kind = %relationship.kind(), "relationship already present");
        }
        state.edges.extend(accepted);
        Ok(())
    }

    async fn all(&self) -> DomainResult<Vec<Person>> {
        let state = self.state.read().await;
        Ok(state
            .order
            .iter()
            .filter_map(|id| state.person(*id))
            .collect())
    }

    async fn edges(&self) -> DomainResult<Vec<Relationship>> {
        Ok(self.state.read().await.edges.clone())
    }

    async fn count(&self) -> DomainResult<usize> {
        Ok(self.state.read().await.nodes.len())
    }

    async fn delete_all(&self) -> DomainResult<()> {
        let mut state = self.state.write().await;
        let removed = state.nodes.len();
        *state = GraphState::default();
        debug!(removed, "graph cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use crate::value_object::Gender;
    use chrono::NaiveDate;
    use std::sync::Arc;
    use tokio::task::JoinSet;

    fn person(first: &str, last: &str, born: &str) -> NewPerson {
        NewPerson::builder()
            .first_name(first)
            .last_name(last)
            .birthdate(born.parse::<NaiveDate>().unwrap())
            .gender(Gender::Male)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn insert_assigns_identity_and_indexes_key() {
        let repo = InMemoryPersonRepository::new();
        let stored = repo
            .insert(person("Oliver", "Harrison", "1816-01-01"))
            .await
            .unwrap();

        let by_id = repo.get(*stored.id()).await.unwrap().unwrap();
        assert_eq!(by_id, stored);

        let by_key = repo.find_by_key(&stored.key()).await.unwrap().unwrap();
        assert_eq!(by_key.id(), stored.id());
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn duplicate_key_is_rejected_without_write() {
        let repo = InMemoryPersonRepository::new();
        repo.insert(person("Oliver", "Harrison", "1816-01-01"))
            .await
            .unwrap();

        let err = repo
            .insert(person("Oliver", "Harrison", "1816-01-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::DuplicateRecord { .. }));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn unknown_reference_is_rejected_without_write() {
        let repo = InMemoryPersonRepository::new();
        let ghost = PersonId::generate();
        let orphan = NewPerson::builder()
            .first_name("Mary Ann")
            .last_name("Harrison")
            .birthdate(NaiveDate::from_ymd_opt(1838, 1, 1).unwrap())
            .gender(Gender::Female)
            .parents(vec![ghost])
            .build()
            .unwrap();

        match repo.insert(orphan).await.unwrap_err() {
            DomainError::ReferenceNotFound { id } => assert_eq!(id, ghost.to_string()),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(repo.count().await.unwrap(), 0);
        assert!(repo.edges().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn embedded_edges_are_visible_from_both_ends() {
        let repo = InMemoryPersonRepository::new();
        let wh = repo
            .insert(person("William Henry", "Harrison", "1773-02-09"))
            .await
            .unwrap();
        let dilsia = repo
            .insert(person("Dilsia", "Unknown", "1800-01-01"))
            .await
            .unwrap();
        let oliver = NewPerson::builder()
            .first_name("Oliver")
            .last_name("Harrison")
            .birthdate(NaiveDate::from_ymd_opt(1816, 1, 1).unwrap())
            .gender(Gender::Male)
            .parents(vec![*wh.id(), *dilsia.id()])
            .build()
            .unwrap();
        let oliver = repo.insert(oliver).await.unwrap();

        assert_eq!(oliver.parents(), &[*wh.id(), *dilsia.id()]);
        let wh = repo.get(*wh.id()).await.unwrap().unwrap();
        assert_eq!(wh.children(), &[*oliver.id()]);
    }

    #[tokio::test]
    async fn relate_is_idempotent_and_checks_referents() {
        let repo = InMemoryPersonRepository::new();
        let a = repo
            .insert(person("Benjamin", "Harrison", "1726-04-05"))
            .await
            .unwrap();
        let b = repo
            .insert(person("Elizabeth", "Bassett", "1730-01-01"))
            .await
            .unwrap();

        repo.relate(Relationship::spouse(*a.id(), *b.id()))
            .await
            .unwrap();
        repo.relate(Relationship::spouse(*b.id(), *a.id()))
            .await
            .unwrap();
        assert_eq!(repo.edges().await.unwrap().len(), 1);

        let err = repo
            .relate(Relationship::parent_of(*a.id(), PersonId::generate()))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ReferenceNotFound { .. }));
    }

    #[tokio::test]
    async fn find_by_name_keeps_insertion_order() {
        let repo = InMemoryPersonRepository::new();
        repo.insert(person("Benjamin", "Harrison", "1693-09-11"))
            .await
            .unwrap();
        repo.insert(person("Benjamin", "Harrison", "1726-04-05"))
            .await
            .unwrap();

        let found = repo
            .find_by_name("Benjamin", "Harrison", None)
            .await
            .unwrap();
        let years: Vec<_> = found.iter().map(|p| p.birthdate().to_string()).collect();
        assert_eq!(years, vec!["1693-09-11", "1726-04-05"]);
    }

    #[tokio::test]
    async fn delete_all_resets_graph() {
        let repo = InMemoryPersonRepository::new();
        repo.insert(person("Margaret", "Wills", "1818-01-01"))
            .await
            .unwrap();
        repo.delete_all().await.unwrap();

        assert_eq!(repo.count().await.unwrap(), 0);
        assert!(repo.all().await.unwrap().is_empty());
        // 清空后同一键可以重新写入
        repo.insert(person("Margaret", "Wills", "1818-01-01"))
            .await
            .unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_duplicate_inserts_admit_exactly_one() {
        let repo = Arc::new(InMemoryPersonRepository::new());
        let mut set = JoinSet::new();
        for _ in 0..32 {
            let repo = repo.clone();
            set.spawn(async move {
                repo.insert(person("Dilsia", "Unknown", "1800-01-01")).await
            });
        }

        let mut ok = 0;
        let mut duplicates = 0;
        while let Some(res) = set.join_next().await {
            match res.unwrap() {
                Ok(_) => ok += 1,
                Err(DomainError::DuplicateRecord { .. }) => duplicates += 1,
                Err(other) => panic!("unexpected {other:?}"),
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(duplicates, 31);
        assert_eq!(repo.count().await.unwrap(), 1);
    }
}
