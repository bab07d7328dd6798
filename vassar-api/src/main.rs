use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use vassar_api::config::Config;
use vassar_api::server::{init_tracing, serve};
use vassar_api::{AppState, seed};
use vassar_application::context::AppContext;

#[derive(Parser)]
#[command(name = "vassar-api")]
#[command(about = "Genealogy person registry service")]
#[command(version)]
struct Cli {
    /// TOML 配置文件路径
    #[arg(long, global = true, env = "VASSAR_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// 运行 HTTP 服务（默认）
    Serve {
        /// 监听地址，覆盖 `server.bind`
        #[arg(long)]
        bind: Option<String>,

        /// 启动服务前清空存储并载入 Harrison 样例数据
        #[arg(long)]
        seed: bool,
    },
    /// 清空配置的存储并载入 Harrison 样例数据
    Seed,
    /// 打印生效的配置（密码已遮蔽）
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;
    init_tracing(&config.log.filter);

    let command = cli.command.unwrap_or(Commands::Serve {
        bind: None,
        seed: false,
    });

    match command {
        Commands::Serve { bind, seed } => {
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            if seed {
                config.seed.enabled = true;
            }
            serve(config).await
        }
        Commands::Seed => {
            let state = AppState::connect(&config.store).await?;
            let ctx = AppContext::builder().actor_id("cli-seed").build();
            let summary = seed::load_fixture(&state, &ctx).await?;
            println!(
                "Loaded {} people and {} relationships",
                summary.people, summary.relationships
            );
            Ok(())
        }
        Commands::Config => {
            print!("{}", config.masked().to_toml_string()?);
            Ok(())
        }
    }
}
