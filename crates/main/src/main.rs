//! 主应用程序入口
//!
//! 加载配置、初始化日志、装配存储与服务，然后启动 Axum Web API 服务。

use std::sync::Arc;

use application::{
    Clock, MessageLedger, MessageLedgerDependencies, PresenceRegistry,
    PresenceRegistryDependencies, SystemClock,
};
use config::AppConfig;
use infrastructure::{builder::InfrastructureConfig, Infrastructure};
use tracing_subscriber::EnvFilter;
use web_api::{router, AppState};

fn main() -> anyhow::Result<()> {
    // 本地时区须在运行时创建工作线程之前读取
    let clock = SystemClock::local();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(clock))
}

async fn run(clock: SystemClock) -> anyhow::Result<()> {
    let config = AppConfig::load()?;

    // 初始化日志：RUST_LOG 优先，否则使用配置中的过滤规则
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log.filter))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!(config = %config.sanitize(), "configuration loaded");

    let infrastructure = Infrastructure::connect(InfrastructureConfig::from(&config)).await?;
    tracing::info!(backend = ?infrastructure.backend(), "storage initialised");

    let clock: Arc<dyn Clock> = Arc::new(clock);
    let registry = Arc::new(PresenceRegistry::new(PresenceRegistryDependencies {
        participant_repository: infrastructure.participant_repository.clone(),
        clock: clock.clone(),
    }));
    let ledger = Arc::new(MessageLedger::new(MessageLedgerDependencies {
        message_repository: infrastructure.message_repository.clone(),
        presence: registry.clone(),
        clock,
    }));

    let app = router(AppState::new(registry, ledger), &config.server);
    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;

    tracing::info!("聊天服务启动在 http://{}", address);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    infrastructure.close().await;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
