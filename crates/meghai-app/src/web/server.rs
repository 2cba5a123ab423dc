use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};

use meghai_api::GeminiClient;
use meghai_core::{AnswerProvider, ConversationState};

use crate::cli::Cli;
use crate::logging::ConversationLogger;
use crate::web::routes::{self, AppState};

/// Serve the single-page web presentation over the shared conversation
/// core. One session per server process; it is discarded on shutdown.
pub async fn run_web_mode(cli: &Cli, client: GeminiClient, bind_addr: SocketAddr) -> Result<()> {
    let logger = if cli.no_log {
        None
    } else {
        match ConversationLogger::new(&std::env::current_dir()?, &cli.model).await {
            Ok(l) => Some(l),
            Err(e) => {
                eprintln!("Logging disabled: {}", e);
                None
            }
        }
    };

    let provider: Arc<dyn AnswerProvider> = Arc::new(client);
    let state = AppState {
        session: Arc::new(Mutex::new(ConversationState::new())),
        provider,
        logger: Arc::new(Mutex::new(logger)),
    };

    // CORS open for development; the API endpoints need nothing stateful
    // from the browser.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::create_router(state).layer(cors);

    println!("🌐 MeghAI web surface on http://{}", bind_addr);
    println!("   API endpoints: /api/ask, /api/history");

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
