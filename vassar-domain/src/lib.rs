//! 家谱人员登记的领域层（vassar-domain）
//!
//! 以图的方式建模人员与亲属关系：
//! - 人员节点（`person`）与标识（`entity`），字段校验集中在值对象（`value_object`）；
//! - 关系边（`relationship`）：`PARENT_OF` 有向、`SPOUSE` 对称，只以标识互相引用；
//! - 仓储端口与实现（`persist`）：内存图存储，以及可选的 Neo4j 后端；
//! - 登记服务（`registry`）：唯一性规则、按姓名查找与两阶段关系装配。
//!
//! 典型用法：
//! 1. 选择仓储实现并包装为 `Arc`；
//! 2. 以 `PersonRegistry::new` 构建登记服务；
//! 3. 先 `load` 全部人员，再用 `relate` 补充彼此之间的关系。
//!
pub mod domain_service;
pub mod entity;
pub mod error;
pub mod persist;
pub mod person;
pub mod registry;
pub mod relationship;
pub mod value_object;
