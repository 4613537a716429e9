use crate::domain::{
    BorrowBookError, CancelReservationError, RemoveBookError, ReserveBookError, ReturnBookError,
};
use thiserror::Error;

/// アプリケーション層のエラー
///
/// 業務上のエラー（呼び出し側が回復可能）と、
/// 予約キュー・ワーカー・ストアの障害を区別する。
#[derive(Debug, Error)]
pub enum LibraryApplicationError {
    /// 書籍が存在しない
    #[error("Book not found")]
    BookNotFound,

    /// 会員が存在しない
    #[error("Member not found")]
    MemberNotFound,

    /// 既に予約されている
    #[error("Book is already reserved")]
    AlreadyReserved,

    /// 貸出中などで利用不可
    #[error("Book is not available")]
    BookNotAvailable,

    /// この会員に貸し出されていない
    #[error("Book is not borrowed by this member")]
    NotBorrowed,

    /// 予約中ではない
    #[error("Book is not reserved")]
    NotReserved,

    /// 他の会員の予約
    #[error("Book is reserved by another member")]
    ReservedByAnotherMember,

    /// 予約キューが閉じている（シャットダウン中、またはワーカー未起動）
    #[error("Reservation queue is closed")]
    QueueClosed,

    /// ワーカーが応答せずに終了した
    #[error("Reservation worker terminated without replying")]
    NoReply,

    /// カタログストアの障害
    #[error("Catalog store unavailable")]
    CatalogUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// 通知サービスの障害
    #[error("Notification service error")]
    NotificationError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, LibraryApplicationError>;

impl From<ReserveBookError> for LibraryApplicationError {
    fn from(err: ReserveBookError) -> Self {
        match err {
            ReserveBookError::BookNotFound => Self::BookNotFound,
            ReserveBookError::MemberNotFound => Self::MemberNotFound,
            ReserveBookError::AlreadyReserved => Self::AlreadyReserved,
            ReserveBookError::NotAvailable => Self::BookNotAvailable,
        }
    }
}

impl From<BorrowBookError> for LibraryApplicationError {
    fn from(err: BorrowBookError) -> Self {
        match err {
            BorrowBookError::BookNotFound => Self::BookNotFound,
            BorrowBookError::MemberNotFound => Self::MemberNotFound,
            BorrowBookError::NotAvailable => Self::BookNotAvailable,
        }
    }
}

impl From<ReturnBookError> for LibraryApplicationError {
    fn from(err: ReturnBookError) -> Self {
        match err {
            ReturnBookError::BookNotFound => Self::BookNotFound,
            ReturnBookError::MemberNotFound => Self::MemberNotFound,
            ReturnBookError::NotBorrowed => Self::NotBorrowed,
        }
    }
}

impl From<CancelReservationError> for LibraryApplicationError {
    fn from(err: CancelReservationError) -> Self {
        match err {
            CancelReservationError::BookNotFound => Self::BookNotFound,
            CancelReservationError::NotReserved => Self::NotReserved,
            CancelReservationError::ReservedByAnotherMember => Self::ReservedByAnotherMember,
        }
    }
}

impl From<RemoveBookError> for LibraryApplicationError {
    fn from(err: RemoveBookError) -> Self {
        match err {
            RemoveBookError::BookNotFound => Self::BookNotFound,
        }
    }
}
