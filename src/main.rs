use family_todo::application::{family_member_service::FamilyMemberServiceImpl, todo_service::TodoServiceImpl};
use family_todo::config::ServerConfig;
use family_todo::http::routing::{self, family_members, todos};
use family_todo::infrastructure::sqlite_repo::SqliteRepository;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = ServerConfig::from_env()?;
    let repo = SqliteRepository::connect(&config.database_url).await?;
    repo.init().await?;
    if config.seed_defaults {
        repo.seed_defaults().await?;
    }

    let todos_router = todos::router(todos::AppState { service: TodoServiceImpl::new(repo.clone()) });
    let members_router = family_members::router(family_members::AppState { service: FamilyMemberServiceImpl::new(repo.clone(), repo) });
    let router = routing::app(todos_router, members_router);

    let addr = config.bind_addr;
    tracing::info!(%addr, database_url = %config.database_url, "listening");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal::ctrl_c;
    let _ = ctrl_c().await;
    tracing::info!("shutdown");
}
