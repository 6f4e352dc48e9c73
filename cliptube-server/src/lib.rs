use std::{
    env,
    net::{Ipv6Addr, SocketAddr},
    sync::Arc,
};

use axum::{response::IntoResponse, routing::get};
use cliptube_core::{Cliptube, DatabaseError, HttpMediaHost, PgDatabase, TokenConfig};
use log::{info, warn};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use url::Url;

mod auth;
mod comments;
mod context;
mod dashboard;
mod docs;
mod errors;
mod likes;
mod logging;
mod playlists;
mod schemas;
mod serialized;
mod subscriptions;
mod tweets;
mod users;
mod videos;

use context::ServerContext;
use serialized::Envelope;

pub use logging::init_logger;

/// The default port the server will listen on.
pub const DEFAULT_PORT: u16 = 9100;

pub type Router = axum::Router<ServerContext>;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("{0} must be set")]
    MissingVariable(&'static str),
    #[error("Invalid {name}: {reason}")]
    InvalidVariable {
        name: &'static str,
        reason: String,
    },
    #[error("Could not initialize database: {0}")]
    Database(#[from] DatabaseError),
    #[error("Could not bind to address: {0}")]
    Io(#[from] std::io::Error),
}

impl StartupError {
    pub fn hint(&self) -> String {
        match self {
            Self::MissingVariable(_) | Self::InvalidVariable { .. } => {
                "Check the environment the server is started with.".to_string()
            }
            Self::Database(_) => {
                "Make sure the Postgres instance is reachable at DATABASE_URL, then try again."
                    .to_string()
            }
            Self::Io(_) => "Another process may already be using the port.".to_string(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/healthcheck",
    tag = "system",
    responses(
        (status = 200, description = "The server is up")
    )
)]
async fn healthcheck() -> impl IntoResponse {
    Envelope::ok("OK", "Everything is fine")
}

/// Starts the cliptube server
pub async fn run_server() -> Result<(), StartupError> {
    let port = match env::var("CLIPTUBE_SERVER_PORT") {
        Ok(raw) => raw
            .parse::<u16>()
            .map_err(|e| StartupError::InvalidVariable {
                name: "CLIPTUBE_SERVER_PORT",
                reason: e.to_string(),
            })?,
        Err(_) => DEFAULT_PORT,
    };

    let database_url =
        env::var("DATABASE_URL").map_err(|_| StartupError::MissingVariable("DATABASE_URL"))?;

    let media_url = env::var("CLIPTUBE_MEDIA_URL")
        .map_err(|_| StartupError::MissingVariable("CLIPTUBE_MEDIA_URL"))
        .and_then(|raw| {
            Url::parse(&raw).map_err(|e| StartupError::InvalidVariable {
                name: "CLIPTUBE_MEDIA_URL",
                reason: e.to_string(),
            })
        })?;

    let media_key = env::var("CLIPTUBE_MEDIA_API_KEY").unwrap_or_default();

    let tokens = match env::var("CLIPTUBE_TOKEN_SECRET") {
        Ok(secret) => TokenConfig {
            secret,
            ..Default::default()
        },
        Err(_) => {
            warn!("CLIPTUBE_TOKEN_SECRET is not set, access tokens won't survive a restart");
            TokenConfig::default()
        }
    };

    info!("Connecting to database...");
    let database = PgDatabase::new(&database_url).await?;
    database.migrate().await?;

    let media = HttpMediaHost::new(media_url, media_key);

    let context = ServerContext {
        app: Arc::new(Cliptube::new(database, media, tokens)),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let version_one_router = Router::new()
        .nest("/users", users::router())
        .nest("/videos", videos::router())
        .nest("/likes", likes::router())
        .nest("/subscriptions", subscriptions::router())
        .nest("/playlists", playlists::router())
        .nest("/tweets", tweets::router())
        .nest("/comments", comments::router())
        .nest("/dashboard", dashboard::router())
        .route("/healthcheck", get(healthcheck));

    let root_router = Router::new()
        .nest("/api/v1", version_one_router)
        .route("/docs/openapi.json", get(docs::docs))
        .layer(cors)
        .with_state(context);

    let addr: SocketAddr = (Ipv6Addr::UNSPECIFIED, port).into();
    let listener = TcpListener::bind(&addr).await?;

    info!("Listening on port {port}");

    axum::serve(listener, root_router.into_make_service()).await?;

    Ok(())
}
