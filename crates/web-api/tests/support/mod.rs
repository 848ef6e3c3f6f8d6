#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use application::{
    Clock, MemoryStore, MessageLedger, MessageLedgerDependencies, PresenceRegistry,
    PresenceRegistryDependencies, SystemClock,
};
use axum::Router;
use config::AppConfig;
use domain::{MessageRepository, ParticipantRepository};
use tokio::{net::TcpListener, sync::oneshot, time::sleep};
use web_api::{router, AppState};

pub struct TestApp {
    pub router: Router,
    pub store: MemoryStore,
}

/// 基于内存存储装配完整的路由。
pub fn setup_test_app() -> TestApp {
    let store = MemoryStore::new();
    let router = build_router(Arc::new(store.clone()), Arc::new(store.clone()));
    TestApp { router, store }
}

pub fn build_router(
    participants: Arc<dyn ParticipantRepository>,
    messages: Arc<dyn MessageRepository>,
) -> Router {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock::default());
    let registry = Arc::new(PresenceRegistry::new(PresenceRegistryDependencies {
        participant_repository: participants,
        clock: clock.clone(),
    }));
    let ledger = Arc::new(MessageLedger::new(MessageLedgerDependencies {
        message_repository: messages,
        presence: registry.clone(),
        clock,
    }));

    router(AppState::new(registry, ledger), &AppConfig::default().server)
}

pub struct RunningServer {
    pub base_url: String,
    pub store: MemoryStore,
    shutdown: Option<oneshot::Sender<()>>,
}

impl RunningServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for RunningServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// 在临时端口上启动服务。
pub async fn spawn_server() -> RunningServer {
    let app = setup_test_app();
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        axum::serve(listener, app.router.into_make_service())
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .ok();
    });

    // 等待服务器启动
    sleep(Duration::from_millis(50)).await;

    RunningServer {
        base_url: format!("http://{addr}"),
        store: app.store,
        shutdown: Some(shutdown_tx),
    }
}
