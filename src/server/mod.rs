mod handlers;

use std::net::SocketAddr;

use axum::{
    extract::Extension,
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, patch, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::api::DynAPI;
use crate::auth::User;
use crate::error::{unexpected_error, Error};
use crate::server::handlers::{
    bids, bookings, conversations, health, listings, notifications, support, trucks,
};

/// Resolves the caller from the identity headers and makes it available to
/// every handler as `Extension<User>`.
async fn identify<B>(mut req: Request<B>, next: Next<B>) -> Result<Response, Error> {
    let user = User::from_headers(req.headers())?;
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

pub fn router(api: DynAPI) -> Router {
    Router::new()
        .route("/health", get(health::check))
        .route("/listings", post(listings::create).get(listings::list))
        .route("/listings/mine", get(listings::mine))
        .route(
            "/listings/:id",
            get(listings::find)
                .put(listings::update)
                .delete(listings::delete),
        )
        .route("/listings/:id/status", patch(listings::update_status))
        .route("/listings/:id/bids", get(bids::list_for_listing))
        .route("/bids", post(bids::create).get(bids::list))
        .route("/bids/mine", get(bids::mine))
        .route("/bids/statistics", get(bids::statistics))
        .route(
            "/bids/:id",
            get(bids::find).put(bids::update).delete(bids::delete),
        )
        .route("/bids/:id/respond", post(bids::respond))
        .route("/bids/:id/withdraw", patch(bids::withdraw))
        .route("/notifications", get(notifications::list))
        .route("/notifications/read-all", patch(notifications::read_all))
        .route("/notifications/:id/read", patch(notifications::read))
        .route("/trucks", post(trucks::create).get(trucks::list))
        .route("/trucks/mine", get(trucks::mine))
        .route("/trucks/available", get(trucks::available))
        .route(
            "/trucks/:id",
            get(trucks::find).put(trucks::update).delete(trucks::delete),
        )
        .route("/bookings", post(bookings::create).get(bookings::list))
        .route("/bookings/mine", get(bookings::mine))
        .route("/bookings/truck-bookings", get(bookings::truck_bookings))
        .route("/bookings/statistics", get(bookings::statistics))
        .route(
            "/bookings/:id",
            get(bookings::find)
                .put(bookings::update)
                .delete(bookings::cancel),
        )
        .route("/bookings/:id/status", patch(bookings::update_status))
        .route(
            "/conversations",
            get(conversations::list).post(conversations::start),
        )
        .route(
            "/conversations/:id/messages",
            get(conversations::messages).post(conversations::send),
        )
        .route("/conversations/:id/read", patch(conversations::read))
        .route("/faqs", get(support::list_faqs).post(support::create_faq))
        .route(
            "/articles",
            get(support::list_articles).post(support::create_article),
        )
        .route(
            "/services",
            get(support::list_services).post(support::create_service),
        )
        .layer(Extension(api))
        .layer(middleware::from_fn(identify))
        .layer(TraceLayer::new_for_http())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = ?err, "failed to listen for shutdown signal");
    }

    tracing::info!("shutting down");
}

pub async fn serve(api: DynAPI, addr: SocketAddr) -> Result<(), Error> {
    let app = router(api);

    tracing::info!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "server error");
            unexpected_error()
        })
}
