//! 处理器共享状态：接到同一登记服务上的命令与查询总线

use crate::config::{Backend, StoreConfig};
use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use vassar_application::error::AppError;
use vassar_application::person::register_person_handlers;
use vassar_application::{InMemoryCommandBus, InMemoryQueryBus};
use vassar_domain::persist::{InMemoryPersonRepository, PersonRepository};
use vassar_domain::registry::PersonRegistry;

#[derive(Clone)]
pub struct AppState {
    pub commands: Arc<InMemoryCommandBus>,
    pub queries: Arc<InMemoryQueryBus>,
}

impl AppState {
    pub fn new<R>(repo: Arc<R>) -> Result<Self, AppError>
    where
        R: PersonRepository + 'static,
    {
        let commands = InMemoryCommandBus::new();
        let queries = InMemoryQueryBus::new();
        register_person_handlers(&commands, &queries, PersonRegistry::new(repo))?;
        Ok(Self {
            commands: Arc::new(commands),
            queries: Arc::new(queries),
        })
    }

    pub fn in_memory() -> Result<Self, AppError> {
        Self::new(Arc::new(InMemoryPersonRepository::new()))
    }

    /// 按配置的存储后端构建状态
    pub async fn connect(store: &StoreConfig) -> Result<Self> {
        match store.backend {
            Backend::Memory => {
                info!("using in-memory person store");
                Ok(Self::in_memory()?)
            }
            Backend::Neo4j => connect_neo4j(store).await,
        }
    }
}

#[cfg(feature = "neo4j")]
async fn connect_neo4j(store: &StoreConfig) -> Result<AppState> {
    use anyhow::Context;
    use vassar_domain::persist::Neo4jPersonRepository;

    let password = store.password.as_deref().unwrap_or_default();
    let repo = Neo4jPersonRepository::connect(&store.uri, &store.user, password)
        .with_context(|| format!("Failed to connect to neo4j at {}", store.uri))?;
    repo.ensure_schema()
        .await
        .context("Failed to create neo4j constraints")?;
    info!(uri = %store.uri, "using neo4j person store");
    Ok(AppState::new(Arc::new(repo))?)
}

#[cfg(not(feature = "neo4j"))]
async fn connect_neo4j(_store: &StoreConfig) -> Result<AppState> {
    anyhow::bail!("neo4j backend requested but vassar-api was built without the `neo4j` feature")
}
