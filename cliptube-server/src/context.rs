use std::{convert::Infallible, sync::Arc};

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use cliptube_core::{Cliptube, HttpMediaHost, PgDatabase};

/// The concrete composition the server runs against
pub type App = Cliptube<PgDatabase, HttpMediaHost>;

#[derive(Clone, FromRef)]
pub struct ServerContext {
    pub app: Arc<App>,
}

#[async_trait]
impl FromRequestParts<ServerContext> for ServerContext {
    type Rejection = Infallible;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &ServerContext,
    ) -> Result<Self, Self::Rejection> {
        Ok(state.clone())
    }
}
