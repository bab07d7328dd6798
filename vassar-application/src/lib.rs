//! 家谱人员登记的应用层（vassar-application）
//!
//! 以 CQRS 组织用例：命令/查询及其处理器、进程内总线、应用上下文与 DTO。
//! 具体用例见 [`person`]。
//!
pub mod command;
pub mod command_bus;
pub mod command_handler;
pub mod context;
pub mod dto;
pub mod error;
pub mod inmemory_command_bus;
pub mod inmemory_query_bus;
pub mod person;
pub mod query;
pub mod query_bus;
pub mod query_handler;

pub use inmemory_command_bus::InMemoryCommandBus;
pub use inmemory_query_bus::InMemoryQueryBus;
