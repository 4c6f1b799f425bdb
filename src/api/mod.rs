//! HTTP API for the cat farm.

mod cats;
mod error;
mod input;

use axum::{
    routing::{get, post},
    Router,
};
use catfarm_core::Database;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

pub fn create_router(db: Database) -> Router {
    Router::new()
        .route("/cats", get(cats::list_cats).post(cats::create_cat))
        .route(
            "/cats/{cat_id}",
            get(cats::get_cat)
                .put(cats::update_cat)
                .delete(cats::delete_cat),
        )
        .route("/cats/{cat_id}/feed", post(cats::feed_cat))
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}
