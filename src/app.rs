use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::{auth, handlers, AppState};

pub fn build_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/refresh", post(handlers::auth::refresh))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::rate_limit::rate_limit_auth,
        ));

    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz))
        .merge(auth_routes);

    let protected_routes = Router::new()
        .route("/api/me", get(handlers::auth::me))
        .route("/api/auth/logout", post(handlers::auth::logout))
        // Moods
        .route(
            "/api/moods",
            post(handlers::moods::record_mood).get(handlers::moods::list_moods),
        )
        .route("/api/moods/latest", get(handlers::moods::latest_mood))
        .route("/api/moods/counts", get(handlers::moods::mood_counts))
        .route("/api/moods/series", get(handlers::moods::mood_series))
        // Sleep
        .route(
            "/api/sleep",
            post(handlers::sleep::record_sleep).get(handlers::sleep::list_sleep),
        )
        .route("/api/sleep/latest", get(handlers::sleep::latest_sleep))
        .route("/api/sleep/series", get(handlers::sleep::sleep_series))
        // Garden
        .route("/api/garden", get(handlers::garden::get_garden))
        .route("/api/garden/actions", post(handlers::garden::garden_action))
        .route("/api/dashboard", get(handlers::dashboard::get_dashboard))
        // Relaxation
        .route(
            "/api/relaxation/exercises",
            get(handlers::relaxation::list_exercises),
        )
        .route(
            "/api/relaxation/breathing",
            get(handlers::relaxation::breathing),
        )
        .route(
            "/api/relaxation/affirmation",
            post(handlers::relaxation::affirmation),
        )
        .route("/api/resources", get(handlers::resources::list_resources))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::require_auth,
        ));

    let cors = cors_layer(&state.config);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = std::iter::once(&config.frontend_url)
        .chain(config.cors_extra_origins.iter())
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(hv) => Some(hv),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
}
