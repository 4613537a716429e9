use crate::application::reservation::{ExpiryScheduler, ReservationDesk};
use crate::application::{LibraryApplicationError, Result};
use crate::config::ReservationConfig;
use crate::domain::{
    BookBorrowed, BookId, BookReturned, MemberId, ReservationCancelled, book::Book, commands::*,
    member::Member,
};
use crate::ports::*;
use std::sync::Arc;

/// サービスの依存関係
///
/// 関数型の原則に従い、データ構造として定義。
/// 振る舞いは持たず、各操作関数に引数として渡す。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub catalog_store: Arc<dyn CatalogStore>,
    pub expiry_scheduler: Arc<ExpiryScheduler>,
    pub reservation_desk: Arc<ReservationDesk>,
}

impl ServiceDependencies {
    /// カタログストアと通知サービスから予約サブシステム一式を組み立てる
    ///
    /// ワーカーは起動しない。`reservation_desk.start_workers`を別途呼ぶこと。
    pub fn new(
        config: &ReservationConfig,
        catalog_store: Arc<dyn CatalogStore>,
        notification_service: Arc<dyn NotificationService>,
    ) -> Self {
        let expiry_scheduler = Arc::new(ExpiryScheduler::new(
            Arc::clone(&catalog_store),
            notification_service,
            config.hold_duration,
        ));
        let reservation_desk = Arc::new(ReservationDesk::new(
            config.queue_capacity,
            Arc::clone(&catalog_store),
            Arc::clone(&expiry_scheduler),
        ));

        Self {
            catalog_store,
            expiry_scheduler,
            reservation_desk,
        }
    }
}

/// 書籍を登録する
pub async fn add_book(deps: &ServiceDependencies, cmd: AddBook) -> Result<Book> {
    let book = deps
        .catalog_store
        .add_book(cmd)
        .await
        .map_err(LibraryApplicationError::CatalogUnavailable)?;

    tracing::info!(book_id = %book.book_id, title = %book.title, "Book added");
    Ok(book)
}

/// 書籍を削除する
///
/// 予約中だった場合、その予約の期限切れタイマーも止める。
pub async fn remove_book(deps: &ServiceDependencies, book_id: BookId) -> Result<Book> {
    let removed = deps
        .catalog_store
        .remove_book(book_id)
        .await
        .map_err(LibraryApplicationError::CatalogUnavailable)??;

    if let Some(reservation_id) = removed.reservation {
        deps.expiry_scheduler.cancel(book_id, reservation_id);
    }
    tracing::info!(%book_id, "Book removed");
    Ok(removed)
}

/// 会員を登録する
pub async fn add_member(deps: &ServiceDependencies, cmd: AddMember) -> Result<Member> {
    let member = deps
        .catalog_store
        .add_member(cmd)
        .await
        .map_err(LibraryApplicationError::CatalogUnavailable)?;

    tracing::info!(member_id = %member.member_id, "Member added");
    Ok(member)
}

/// 書籍を予約する
///
/// 予約キューを経由してワーカーが処理する。
/// 同じ書籍への同時予約は、ちょうど1件だけが成功し、残りはAlreadyReservedになる。
pub async fn reserve_book(deps: &ServiceDependencies, cmd: ReserveBook) -> Result<()> {
    deps.reservation_desk
        .submit_reservation(cmd.book_id, cmd.member_id)
        .await
}

/// 書籍を貸し出す
///
/// 本人の予約を確定した場合は、その予約の期限切れタイマーを止める。
/// ロック解放後に別の会員の予約が割り込んでいても、そちらのタイマーには触れない。
pub async fn borrow_book(deps: &ServiceDependencies, cmd: BorrowBook) -> Result<BookBorrowed> {
    let event = deps
        .catalog_store
        .borrow_book(cmd.book_id, cmd.member_id)
        .await
        .map_err(LibraryApplicationError::CatalogUnavailable)??;

    if let Some(reservation_id) = event.confirmed_reservation {
        deps.expiry_scheduler.cancel(cmd.book_id, reservation_id);
    }
    tracing::info!(
        book_id = %event.book_id,
        member_id = %event.member_id,
        was_reserved = event.was_reserved(),
        "Book borrowed"
    );
    Ok(event)
}

/// 書籍を返却する
pub async fn return_book(deps: &ServiceDependencies, cmd: ReturnBook) -> Result<BookReturned> {
    let event = deps
        .catalog_store
        .return_book(cmd.book_id, cmd.member_id)
        .await
        .map_err(LibraryApplicationError::CatalogUnavailable)??;

    tracing::info!(book_id = %event.book_id, member_id = %event.member_id, "Book returned");
    Ok(event)
}

/// 予約を取り消す
///
/// 取り消した予約の期限切れタイマーだけを止める。
pub async fn cancel_reservation(
    deps: &ServiceDependencies,
    cmd: CancelReservation,
) -> Result<ReservationCancelled> {
    let event = deps
        .catalog_store
        .cancel_reservation(cmd.book_id, cmd.member_id)
        .await
        .map_err(LibraryApplicationError::CatalogUnavailable)??;

    deps.expiry_scheduler.cancel(cmd.book_id, event.reservation_id);
    tracing::info!(book_id = %event.book_id, member_id = %event.member_id, "Reservation cancelled");
    Ok(event)
}

/// IDで書籍を取得する
pub async fn get_book(deps: &ServiceDependencies, book_id: BookId) -> Result<Book> {
    deps.catalog_store
        .get_book(book_id)
        .await
        .map_err(LibraryApplicationError::CatalogUnavailable)?
        .ok_or(LibraryApplicationError::BookNotFound)
}

/// 貸出可能な書籍の一覧
pub async fn list_available_books(deps: &ServiceDependencies) -> Result<Vec<Book>> {
    deps.catalog_store
        .list_available_books()
        .await
        .map_err(LibraryApplicationError::CatalogUnavailable)
}

/// 会員が借りている書籍の一覧
///
/// 会員が存在しない場合はMemberNotFound。
pub async fn list_borrowed_books(
    deps: &ServiceDependencies,
    member_id: MemberId,
) -> Result<Vec<Book>> {
    let member = deps
        .catalog_store
        .get_member(member_id)
        .await
        .map_err(LibraryApplicationError::CatalogUnavailable)?;
    if member.is_none() {
        return Err(LibraryApplicationError::MemberNotFound);
    }

    deps.catalog_store
        .list_borrowed_books(member_id)
        .await
        .map_err(LibraryApplicationError::CatalogUnavailable)
}
