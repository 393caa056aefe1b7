use axum::{
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{days, trips};
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/health", get(health))
        // Trip resources
        .merge(trip_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn trip_routes() -> Router<AppState> {
    Router::new()
        .route("/trips", post(trips::create_trip))
        .route(
            "/trips/:trip_id",
            get(trips::get_trip)
                .patch(trips::update_trip)
                .delete(trips::delete_trip),
        )
        .route(
            "/trips/:trip_id/days",
            post(days::create_day).get(days::list_days),
        )
        .route(
            "/trips/:trip_id/days/:day_id",
            axum::routing::patch(days::update_day).delete(days::delete_day),
        )
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
