//! 家谱人员登记的 HTTP 适配层
//!
//! 将配置的人员存储接入应用层总线，并通过 axum 路由对外提供。

pub mod config;
pub mod error;
pub mod routes;
pub mod seed;
pub mod server;
pub mod state;

pub use config::Config;
pub use routes::router;
pub use state::AppState;
