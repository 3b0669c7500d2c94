use std::sync::Arc;

use tokio::net::TcpListener;

use rolodex::config::Config;
use rolodex::server::routes::build_router;
use rolodex::server::AppState;
use rolodex::startup::ensure_index;
use rolodex::store::PersonStore;

/// Start a test server over the in-memory store backend on an ephemeral
/// port, returning its base URL. Each call gets an isolated store.
pub async fn start_test_server() -> String {
    let mut config = Config::default();
    config.store.backend = "memory".into();

    let store = PersonStore::connect(&config.store).await.unwrap();
    ensure_index(&store).await.unwrap();

    let state = AppState {
        store,
        config: Arc::new(config),
    };
    let app = build_router(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}
