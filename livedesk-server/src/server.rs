// livedesk-server/src/server.rs

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

use livedesk_common::models::{ActionInvocation, OutboundView, WidgetEvent};
use livedesk_core::Error;

use crate::context::ServerContext;

pub fn router(ctx: Arc<ServerContext>) -> Router {
    Router::new()
        .route("/webhook/actions", post(handle_action))
        .route("/webhook/widget", post(handle_widget))
        .route("/health", get(health))
        .with_state(ctx)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

pub async fn serve(addr: SocketAddr, ctx: Arc<ServerContext>) -> Result<(), Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Webhook server listening on http://{}", addr);

    axum::serve(listener, router(ctx))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Ctrl-C received; shutting down.");
        })
        .await?;
    Ok(())
}

/// Returns the view that was delivered, or `null` when nothing was sent.
async fn handle_action(
    State(ctx): State<Arc<ServerContext>>,
    Json(invocation): Json<ActionInvocation>,
) -> Json<Option<OutboundView>> {
    Json(ctx.admin_actions.handle(&invocation).await)
}

async fn handle_widget(
    State(ctx): State<Arc<ServerContext>>,
    Json(event): Json<WidgetEvent>,
) -> StatusCode {
    ctx.widget_events.handle(event).await;
    StatusCode::NO_CONTENT
}

async fn health() -> &'static str {
    "ok"
}
