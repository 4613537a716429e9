use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, add_book, add_member, borrow_book, cancel_reservation, get_book,
    list_available_books, list_borrowed_books, remove_book, reserve_book, return_book,
};

/// Creates the API router with all catalog and reservation endpoints
///
/// Catalog endpoints:
/// - POST /books, GET /books, GET /books/:id, DELETE /books/:id
/// - POST /members, GET /members/:id/books
///
/// Reservation endpoints (member_id in the JSON body):
/// - POST /books/:id/reserve
/// - POST /books/:id/borrow
/// - POST /books/:id/return
/// - POST /books/:id/cancel-reservation
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        // Catalog
        .route("/books", post(add_book).get(list_available_books))
        .route("/books/:id", get(get_book).delete(remove_book))
        .route("/members", post(add_member))
        .route("/members/:id/books", get(list_borrowed_books))
        // Reservations and borrowing
        .route("/books/:id/reserve", post(reserve_book))
        .route("/books/:id/borrow", post(borrow_book))
        .route("/books/:id/return", post(return_book))
        .route("/books/:id/cancel-reservation", post(cancel_reservation))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
