//! 持久化（persist）
//!
//! 人员仓储端口 [`PersonRepository`] 及其实现：
//! - [`InMemoryPersonRepository`]：进程内图存储，默认后端；
//! - `Neo4jPersonRepository`：Neo4j 图数据库后端（需启用 `infra-neo4j` 特性）。
//!
mod inmemory_person_repository;
#[cfg(feature = "infra-neo4j")]
mod neo4j_person_repository;
mod person_repository;

pub use inmemory_person_repository::*;
#[cfg(feature = "infra-neo4j")]
pub use neo4j_person_repository::*;
pub use person_repository::*;
