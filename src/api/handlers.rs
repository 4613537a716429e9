use crate::application::LibraryApplicationError;
use crate::application::catalog::{
    ServiceDependencies, add_book as execute_add_book, add_member as execute_add_member,
    borrow_book as execute_borrow_book, cancel_reservation as execute_cancel_reservation,
    get_book as execute_get_book, list_available_books as execute_list_available_books,
    list_borrowed_books as execute_list_borrowed_books, remove_book as execute_remove_book,
    reserve_book as execute_reserve_book, return_book as execute_return_book,
};
use crate::domain::commands::{BorrowBook, CancelReservation, ReserveBook, ReturnBook};
use crate::domain::{BookId, MemberId};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::{
    error::ApiError,
    types::{
        AddBookRequest, AddMemberRequest, BookResponse, ErrorResponse, MemberActionRequest,
        MemberResponse, ReservationResponse,
    },
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
}

// ============================================================================
// Command handlers (POST / DELETE)
// ============================================================================

/// POST /books - 書籍を登録
pub async fn add_book(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddBookRequest>,
) -> Result<(StatusCode, Json<BookResponse>), ApiError> {
    let book = execute_add_book(&state.service_deps, req.to_command()).await?;
    Ok((StatusCode::CREATED, Json(BookResponse::from(book))))
}

/// DELETE /books/:id - 書籍を削除
pub async fn remove_book(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<u64>,
) -> Result<Json<BookResponse>, ApiError> {
    let removed = execute_remove_book(&state.service_deps, BookId::new(book_id)).await?;
    Ok(Json(BookResponse::from(removed)))
}

/// POST /members - 会員を登録
pub async fn add_member(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddMemberRequest>,
) -> Result<(StatusCode, Json<MemberResponse>), ApiError> {
    let member = execute_add_member(&state.service_deps, req.to_command()).await?;
    Ok((StatusCode::CREATED, Json(MemberResponse::from(member))))
}

/// POST /books/:id/reserve - 書籍を予約
///
/// 予約キューを経由してワーカーが処理し、結果が出るまで待つ。
///
/// 強制されるビジネスルール:
/// - 書籍・会員が存在すること
/// - 書籍が予約中でないこと（409 ALREADY_RESERVED）
/// - 書籍が貸出中でないこと（409 BOOK_NOT_AVAILABLE）
/// - 保持期間内に貸出（確定）されない予約は自動的に解除される
pub async fn reserve_book(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<u64>,
    Json(req): Json<MemberActionRequest>,
) -> Result<Json<ReservationResponse>, ApiError> {
    let cmd = ReserveBook {
        book_id: BookId::new(book_id),
        member_id: req.member_id(),
    };

    execute_reserve_book(&state.service_deps, cmd).await?;

    let response = ReservationResponse {
        book_id: cmd.book_id.value(),
        member_id: cmd.member_id.value(),
        hold_secs: state.service_deps.expiry_scheduler.hold_duration().as_secs(),
    };

    Ok(Json(response))
}

/// POST /books/:id/borrow - 書籍を貸出（本人の予約の確定を含む）
pub async fn borrow_book(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<u64>,
    Json(req): Json<MemberActionRequest>,
) -> Result<Json<BookResponse>, ApiError> {
    let cmd = BorrowBook {
        book_id: BookId::new(book_id),
        member_id: req.member_id(),
    };

    execute_borrow_book(&state.service_deps, cmd).await?;

    // 更新された書籍を取得して返す
    let book = execute_get_book(&state.service_deps, cmd.book_id).await?;
    Ok(Json(BookResponse::from(book)))
}

/// POST /books/:id/return - 書籍を返却
pub async fn return_book(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<u64>,
    Json(req): Json<MemberActionRequest>,
) -> Result<Json<BookResponse>, ApiError> {
    let cmd = ReturnBook {
        book_id: BookId::new(book_id),
        member_id: req.member_id(),
    };

    execute_return_book(&state.service_deps, cmd).await?;

    let book = execute_get_book(&state.service_deps, cmd.book_id).await?;
    Ok(Json(BookResponse::from(book)))
}

/// POST /books/:id/cancel-reservation - 予約を取り消す
pub async fn cancel_reservation(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<u64>,
    Json(req): Json<MemberActionRequest>,
) -> Result<Json<BookResponse>, ApiError> {
    let cmd = CancelReservation {
        book_id: BookId::new(book_id),
        member_id: req.member_id(),
    };

    execute_cancel_reservation(&state.service_deps, cmd).await?;

    let book = execute_get_book(&state.service_deps, cmd.book_id).await?;
    Ok(Json(BookResponse::from(book)))
}

// ============================================================================
// Query handlers (GET)
// ============================================================================

/// GET /books - 貸出可能な書籍の一覧
pub async fn list_available_books(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BookResponse>>, QueryError> {
    let books = execute_list_available_books(&state.service_deps).await?;
    Ok(Json(books.into_iter().map(BookResponse::from).collect()))
}

/// GET /books/:id - 書籍をIDで取得
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<u64>,
) -> Result<Json<BookResponse>, QueryError> {
    let book = execute_get_book(&state.service_deps, BookId::new(book_id)).await?;
    Ok(Json(BookResponse::from(book)))
}

/// GET /members/:id/books - 会員が借りている書籍の一覧
pub async fn list_borrowed_books(
    State(state): State<Arc<AppState>>,
    Path(member_id): Path<u64>,
) -> Result<Json<Vec<BookResponse>>, QueryError> {
    let books = execute_list_borrowed_books(&state.service_deps, MemberId::new(member_id)).await?;
    Ok(Json(books.into_iter().map(BookResponse::from).collect()))
}

// ============================================================================
// Error types
// ============================================================================

/// クエリハンドラー用のエラー型
#[derive(Debug)]
pub enum QueryError {
    NotFound(String),
    InternalError(String),
}

impl From<LibraryApplicationError> for QueryError {
    fn from(err: LibraryApplicationError) -> Self {
        match err {
            LibraryApplicationError::BookNotFound => QueryError::NotFound("Book not found".into()),
            LibraryApplicationError::MemberNotFound => {
                QueryError::NotFound("Member not found".into())
            }
            other => QueryError::InternalError(other.to_string()),
        }
    }
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            QueryError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            QueryError::InternalError(msg) => {
                // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
                tracing::error!("Internal error in query handler: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An unexpected error occurred".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse::new(error_type, message));
        (status, body).into_response()
    }
}
