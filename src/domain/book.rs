use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    BookBorrowed, BookId, BookReserved, BookReturned, BookStatus, BorrowBookError,
    CancelReservationError, MemberId, ReservationCancelled, ReservationExpired, ReservationId,
    ReserveBookError, ReturnBookError,
};

/// Book集約 - カタログ上の1冊の書籍
///
/// 不変条件：
/// - `holder`は`status`がAvailableのときNone、それ以外のときSome
/// - `reservation`は`status`がReservedのときのみSome
/// - 状態の変更はカタログストアの排他ロック内でのみ行われる
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    // 識別子
    pub book_id: BookId,

    // 書誌情報（並行性には無関係）
    pub title: String,
    pub author: String,

    // 予約・貸出の責務
    pub status: BookStatus,
    /// 予約中または貸出中の会員
    pub holder: Option<MemberId>,
    /// 成立中の予約
    pub reservation: Option<ReservationId>,

    // 監査情報
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// 貸出可能な状態で新規作成する
    pub fn new(
        book_id: BookId,
        title: impl Into<String>,
        author: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            book_id,
            title: title.into(),
            author: author.into(),
            status: BookStatus::Available,
            holder: None,
            reservation: None,
            created_at,
            updated_at: created_at,
        }
    }

    fn transition(
        &self,
        status: BookStatus,
        holder: Option<MemberId>,
        reservation: Option<ReservationId>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            status,
            holder,
            reservation,
            updated_at: at,
            ..self.clone()
        }
    }
}

/// 純粋関数：書籍を予約する
///
/// ビジネスルール：
/// - 予約中の書籍は予約不可（AlreadyReserved）
/// - 貸出可能な書籍のみ予約可能
/// - それ以外（貸出中）は予約不可（NotAvailable）
///
/// 会員の存在確認と予約IDの採番は呼び出し側（カタログストア）がロック内で行う。
/// 副作用なし。新しいBookとイベントを返す。
pub fn reserve(
    book: &Book,
    member_id: MemberId,
    reservation_id: ReservationId,
    reserved_at: DateTime<Utc>,
) -> Result<(Book, BookReserved), ReserveBookError> {
    match book.status {
        BookStatus::Reserved => Err(ReserveBookError::AlreadyReserved),
        BookStatus::Available => {
            let reserved = book.transition(
                BookStatus::Reserved,
                Some(member_id),
                Some(reservation_id),
                reserved_at,
            );
            let event = BookReserved {
                book_id: book.book_id,
                member_id,
                reservation_id,
                reserved_at,
            };
            Ok((reserved, event))
        }
        BookStatus::CheckedOut => Err(ReserveBookError::NotAvailable),
    }
}

/// 純粋関数：書籍を貸し出す
///
/// ビジネスルール：
/// - 貸出可能な書籍はそのまま貸出
/// - 予約中の書籍は、予約した本人への貸出のみ可能（予約の確定）
/// - 他の会員が予約中、または貸出中の書籍は貸出不可
pub fn borrow(
    book: &Book,
    member_id: MemberId,
    borrowed_at: DateTime<Utc>,
) -> Result<(Book, BookBorrowed), BorrowBookError> {
    let confirmed_reservation = match book.status {
        BookStatus::Available => None,
        BookStatus::Reserved if book.holder == Some(member_id) => book.reservation,
        BookStatus::Reserved | BookStatus::CheckedOut => {
            return Err(BorrowBookError::NotAvailable);
        }
    };

    let borrowed = book.transition(BookStatus::CheckedOut, Some(member_id), None, borrowed_at);
    let event = BookBorrowed {
        book_id: book.book_id,
        member_id,
        borrowed_at,
        confirmed_reservation,
    };

    Ok((borrowed, event))
}

/// 純粋関数：書籍を返却する
///
/// ビジネスルール：貸出中かつ借りている本人のみ返却可能
pub fn return_to_shelf(
    book: &Book,
    member_id: MemberId,
    returned_at: DateTime<Utc>,
) -> Result<(Book, BookReturned), ReturnBookError> {
    if book.status != BookStatus::CheckedOut || book.holder != Some(member_id) {
        return Err(ReturnBookError::NotBorrowed);
    }

    let returned = book.transition(BookStatus::Available, None, None, returned_at);
    let event = BookReturned {
        book_id: book.book_id,
        member_id,
        returned_at,
    };

    Ok((returned, event))
}

/// 純粋関数：予約を取り消す
pub fn cancel_reservation(
    book: &Book,
    member_id: MemberId,
    cancelled_at: DateTime<Utc>,
) -> Result<(Book, ReservationCancelled), CancelReservationError> {
    let (BookStatus::Reserved, Some(reservation_id)) = (book.status, book.reservation) else {
        return Err(CancelReservationError::NotReserved);
    };
    if book.holder != Some(member_id) {
        return Err(CancelReservationError::ReservedByAnotherMember);
    }

    let cancelled = book.transition(BookStatus::Available, None, None, cancelled_at);
    let event = ReservationCancelled {
        book_id: book.book_id,
        member_id,
        reservation_id,
        cancelled_at,
    };

    Ok((cancelled, event))
}

/// 純粋関数：予約の保持期間切れ
///
/// 指定した予約がまだ成立中の場合のみAvailableに戻す。
/// 既に確定・取消・期限切れ済みの場合や、別の予約に置き換わっている場合はNone（何もしない）。
/// 何度呼んでも結果は同じ（冪等）。
pub fn expire_reservation(
    book: &Book,
    reservation_id: ReservationId,
    expired_at: DateTime<Utc>,
) -> Option<(Book, ReservationExpired)> {
    if book.status != BookStatus::Reserved || book.reservation != Some(reservation_id) {
        return None;
    }
    let member_id = book.holder?;

    let expired = book.transition(BookStatus::Available, None, None, expired_at);
    let event = ReservationExpired {
        book_id: book.book_id,
        member_id,
        reservation_id,
        expired_at,
    };

    Some((expired, event))
}
