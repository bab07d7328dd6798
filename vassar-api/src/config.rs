//! 服务配置：TOML 文件加环境变量覆盖

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_FILE: &str = "vassar.toml";
const CONFIG_ENV: &str = "VASSAR_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub seed: SeedConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    /// 浏览器静态资源目录，挂载在 `/public` 下
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
            static_dir: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Memory,
    Neo4j,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: Backend,
    pub uri: String,
    pub user: String,
    pub password: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Memory,
            uri: "bolt://localhost:7687".to_string(),
            user: "neo4j".to_string(),
            password: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedConfig {
    /// 启动时清空存储并载入 Harrison 家族样例数据
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// 默认 `EnvFilter` 指令；设置了 `RUST_LOG` 时以其为准
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl Config {
    /// 加载生效的配置
    ///
    /// 查找顺序：`explicit`，`$VASSAR_CONFIG`，存在时的 `./vassar.toml`，最后是默认值。
    /// 环境变量覆盖最后应用。
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => std::env::var_os(CONFIG_ENV)
                .map(PathBuf::from)
                .or_else(|| {
                    let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                    fallback.exists().then_some(fallback)
                }),
        };

        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env_from(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// 应用 `NEO4J_URI`、`NEO4J_USER`、`NEO4J_PASSWORD` 与 `VASSAR_BIND`
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(uri) = lookup("NEO4J_URI") {
            self.store.uri = uri;
        }
        if let Some(user) = lookup("NEO4J_USER") {
            self.store.user = user;
        }
        if let Some(password) = lookup("NEO4J_PASSWORD") {
            self.store.password = Some(password);
        }
        if let Some(bind) = lookup("VASSAR_BIND") {
            self.server.bind = bind;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.store.backend == Backend::Neo4j && self.store.password.is_none() {
            bail!("store.password (or NEO4J_PASSWORD) is required for the neo4j backend");
        }
        Ok(())
    }

    /// 可安全打印的副本，密码已遮蔽
    pub fn masked(&self) -> Self {
        let mut copy = self.clone();
        if copy.store.password.is_some() {
            copy.store.password = Some("********".to_string());
        }
        copy
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
