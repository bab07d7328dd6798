//! 人员仓储端口
//!
//! 图存储需要提供的最小能力：按复合键查询节点、写入节点与有向关系边、整体清空。
//!
use crate::entity::PersonId;
use crate::error::DomainResult;
use crate::person::{NewPerson, Person};
use crate::relationship::Relationship;
use crate::value_object::{PersonKey, Postnomial};
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait PersonRepository: Send + Sync {
    /// 写入新节点及其携带的关系边，由存储分配标识
    ///
    /// 实现必须保证：
    /// - 相同 [`PersonKey`] 已存在时返回 `DuplicateRecord`，且不产生任何写入；
    /// - 关系引用的人员不存在时返回 `ReferenceNotFound`，且不产生任何写入；
    /// - 重复键检查与写入对并发调用方表现为一个整体。
    async fn insert(&self, person: NewPerson) -> DomainResult<Person>;

    async fn get(&self, id: PersonId) -> DomainResult<Option<Person>>;

    async fn find_by_key(&self, key: &PersonKey) -> DomainResult<Option<Person>>;

    /// 按姓名查找；`postnomial` 为 `None` 时只比较名与姓，按写入顺序返回全部匹配
    async fn find_by_name(
        &self,
        first_name: &str,
        last_name: &str,
        postnomial: Option<Postnomial>,
    ) -> DomainResult<Vec<Person>>;

    /// 在两个已存在的人员之间建立关系边（已存在的等价边视为成功）
    async fn relate(&self, relationship: Relationship) -> DomainResult<()>;

    /// 全部节点，按写入顺序
    async fn all(&self) -> DomainResult<Vec<Person>>;

    /// 全部关系边，按建立顺序
    async fn edges(&self) -> DomainResult<Vec<Relationship>>;

    async fn count(&self) -> DomainResult<usize>;

    /// 删除全部节点与边（仅用于环境重置）
    async fn delete_all(&self) -> DomainResult<()>;
}

#[async_trait]
impl<T> PersonRepository for Arc<T>
where
    T: PersonRepository + ?Sized,
{
    async fn insert(&self, person: NewPerson) -> DomainResult<Person> {
        (**self).insert(person).await
    }

    async fn get(&self, id: PersonId) -> DomainResult<Option<Person>> {
        (**self).get(id).await
    }

    async fn find_by_key(&self, key: &PersonKey) -> DomainResult<Option<Person>> {
        (**self).find_by_key(key).await
    }

    async fn find_by_name(
        &self,
        first_name: &str,
        last_name: &str,
        postnomial: Option<Postnomial>,
    ) -> DomainResult<Vec<Person>> {
        (**self).find_by_name(first_name, last_name, postnomial).await
    }

    async fn relate(&self, relationship: Relationship) -> DomainResult<()> {
        (**self).relate(relationship).await
    }

    async fn all(&self) -> DomainResult<Vec<Person>> {
        (**self).all().await
    }

    async fn edges(&self) -> DomainResult<Vec<Relationship>> {
        (**self).edges().await
    }

    async fn count(&self) -> DomainResult<usize> {
        (**self).count().await
    }

    async fn delete_all(&self) -> DomainResult<()> {
        (**self).delete_all().await
    }
}
