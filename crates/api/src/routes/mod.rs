//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness
//! GET  /health/ready                    - Readiness (database reachable)
//!
//! # Auth (rate limited)
//! POST /api/auth/register               - Create account, returns token
//! POST /api/auth/login                  - Password sign-in
//! POST /api/auth/google                 - Google ID token sign-in
//! GET  /api/auth/me                     - Current user
//!
//! # Catalog
//! GET  /api/products                    - Filtered, paged listing
//! GET  /api/products/{id}               - Product detail
//! POST /api/products                    - Create (admin)
//! PUT  /api/products/{id}               - Partial update (admin)
//! DELETE /api/products/{id}             - Delete (admin)
//! PATCH /api/products/{id}/stock        - Set stock level (admin)
//! GET  /api/fabrics, /api/fabrics/{id}  - Fabrics; POST (admin)
//! GET  /api/categories, /api/categories/{slug} - Categories; POST (admin)
//!
//! # Cart (user token or x-guest-id)
//! GET  /api/cart                        - Cart view
//! DELETE /api/cart                      - Clear active lines
//! POST /api/cart/items                  - Add line
//! PUT  /api/cart/items/{itemId}         - Set quantity
//! DELETE /api/cart/items/{itemId}       - Remove line
//! POST /api/cart/items/{itemId}/save-for-later
//! POST /api/cart/saved/{itemId}/move-to-cart
//! DELETE /api/cart/saved/{itemId}
//! POST /api/cart/merge                  - Fold a guest cart into the user's
//!
//! # Account (requires auth)
//! /api/orders, /api/addresses, /api/users, /api/wishlist
//!
//! # Payment
//! GET  /api/payment/key                 - Public gateway key id
//! POST /api/payment/create-order        - Gateway order for the cart total
//! POST /api/payment/verify              - Verify signature, place paid order
//! ```

pub mod addresses;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod fabrics;
pub mod orders;
pub mod payment;
pub mod products;
pub mod users;
pub mod wishlist;

use std::str::FromStr;
use std::time::Duration;

use axum::{
    Router,
    extract::State,
    http::{HeaderName, HeaderValue, Method, StatusCode, header},
    middleware::from_fn,
    routing::{delete, get, patch, post, put},
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::config::ApiConfig;
use crate::error::AppError;
use crate::middleware::{GUEST_ID_HEADER, api_rate_limiter, auth_rate_limiter, request_id_middleware};
use crate::state::AppState;

/// Parse a path id. Malformed ids are reported as a missing `what`.
pub(crate) fn parse_id<T: FromStr>(raw: &str, what: &str) -> Result<T, AppError> {
    raw.parse()
        .map_err(|_| AppError::NotFound(format!("{what} not found")))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/google", post(auth::google))
        .route("/me", get(auth::me))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::destroy),
        )
        .route("/{id}/stock", patch(products::update_stock))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/items", post(cart::add))
        .route("/items/{item_id}", put(cart::update).delete(cart::remove))
        .route("/items/{item_id}/save-for-later", post(cart::save_for_later))
        .route("/saved/{item_id}/move-to-cart", post(cart::move_to_cart))
        .route("/saved/{item_id}", delete(cart::remove_saved))
        .route("/merge", post(cart::merge))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index).post(orders::create))
        .route("/{id}", get(orders::show))
        .route("/{id}/cancel", put(orders::cancel))
        .route("/{id}/status", put(orders::update_status))
}

/// Create the address book routes router.
pub fn address_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(addresses::index).post(addresses::create))
        .route(
            "/{id}",
            get(addresses::show)
                .put(addresses::update)
                .delete(addresses::destroy),
        )
        .route("/{id}/default", put(addresses::set_default))
}

/// Create the user profile routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(users::profile).put(users::update_profile))
        .route("/orders", get(orders::index))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::index))
        .route("/{product_id}", post(wishlist::add).delete(wishlist::remove))
}

/// Create the payment routes router.
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/key", get(payment::key))
        .route("/create-order", post(payment::create_order))
        .route("/verify", post(payment::verify))
}

/// Create the fabric routes router.
pub fn fabric_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(fabrics::index).post(fabrics::create))
        .route("/{id}", get(fabrics::show))
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::index).post(categories::create))
        .route("/{slug}", get(categories::show))
}

/// Every `/api` route, rate limited when `config.rate_limit` is set.
pub fn api_routes(config: &ApiConfig) -> Router<AppState> {
    let mut auth = auth_routes();
    if config.rate_limit {
        auth = auth.layer(auth_rate_limiter());
    }

    let api = Router::new()
        .nest("/auth", auth)
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .nest("/orders", order_routes())
        .nest("/addresses", address_routes())
        .nest("/users", user_routes())
        .nest("/wishlist", wishlist_routes())
        .nest("/payment", payment_routes())
        .nest("/fabrics", fabric_routes())
        .nest("/categories", category_routes());

    if config.rate_limit {
        api.layer(api_rate_limiter())
    } else {
        api
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static(GUEST_ID_HEADER),
        ])
        .allow_credentials(true)
        .max_age(Duration::from_secs(600))
}

/// Build the complete application: routes, middleware and state.
pub fn app(state: AppState) -> Router {
    let api = api_routes(state.config());
    let cors = cors_layer(&state.config().cors_origins);

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api", api)
        .fallback(not_found)
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .layer(cors)
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

async fn not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}
