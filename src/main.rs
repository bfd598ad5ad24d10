use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use mmgh_server::auth::jwt;
use mmgh_server::config::{self, Config};
use mmgh_server::db;
use mmgh_server::mailer::LogMailer;
use mmgh_server::push::registry::ConnectionRegistry;
use mmgh_server::routes;
use mmgh_server::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    if config.generate_config {
        println!("{}", config::generate_config_template());
        return Ok(());
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("mmgh_server=info,tower_http=warn"));
    if config.json_logs {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let db = db::init_db(&config.data_dir)?;
    let jwt_secret = jwt::load_or_generate_jwt_secret(&config.data_dir)?;

    let state = AppState {
        db,
        jwt_secret,
        registry: Arc::new(ConnectionRegistry::new()),
        mailer: Arc::new(LogMailer::new(config.email_from.clone())),
        admin_email: config.admin_email.clone(),
        app_url: config.app_url.clone(),
    };

    let app = routes::build_router(state);

    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
