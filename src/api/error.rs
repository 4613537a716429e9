use crate::application::LibraryApplicationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーをラップし、HTTPレスポンスへのマッピングを提供する。
#[derive(Debug)]
pub struct ApiError(LibraryApplicationError);

impl From<LibraryApplicationError> for ApiError {
    fn from(err: LibraryApplicationError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self.0 {
            // 404 Not Found - リクエストされた書籍が存在しない
            LibraryApplicationError::BookNotFound => {
                (StatusCode::NOT_FOUND, "BOOK_NOT_FOUND", "Book not found")
            }

            // 409 Conflict - 他の予約・貸出と競合
            LibraryApplicationError::AlreadyReserved => (
                StatusCode::CONFLICT,
                "ALREADY_RESERVED",
                "Book is already reserved",
            ),
            LibraryApplicationError::BookNotAvailable => (
                StatusCode::CONFLICT,
                "BOOK_NOT_AVAILABLE",
                "Book is not available",
            ),
            LibraryApplicationError::ReservedByAnotherMember => (
                StatusCode::CONFLICT,
                "RESERVED_BY_ANOTHER_MEMBER",
                "Book is reserved by another member",
            ),

            // 422 Unprocessable Entity - ビジネスルール違反
            LibraryApplicationError::MemberNotFound => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "MEMBER_NOT_FOUND",
                "Member not found",
            ),
            LibraryApplicationError::NotBorrowed => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "NOT_BORROWED",
                "Book is not borrowed by this member",
            ),
            LibraryApplicationError::NotReserved => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "NOT_RESERVED",
                "Book is not reserved",
            ),

            // 503 Service Unavailable - 予約ワーカーが受け付けられない
            LibraryApplicationError::QueueClosed => {
                tracing::warn!("Reservation rejected: queue is closed");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "RESERVATION_QUEUE_CLOSED",
                    "Reservations are not being accepted",
                )
            }
            LibraryApplicationError::NoReply => {
                tracing::error!("Reservation worker terminated without replying");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "RESERVATION_WORKER_UNAVAILABLE",
                    "Reservation could not be processed",
                )
            }

            // 500 Internal Server Error - システム障害
            // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
            LibraryApplicationError::CatalogUnavailable(ref e) => {
                tracing::error!("Catalog store error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CATALOG_UNAVAILABLE",
                    "Catalog store error",
                )
            }
            LibraryApplicationError::NotificationError(ref e) => {
                tracing::error!("Notification service error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "NOTIFICATION_ERROR",
                    "Notification service error",
                )
            }
        };

        let body = Json(ErrorResponse::new(error_type, message));
        (status, body).into_response()
    }
}
