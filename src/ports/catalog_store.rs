use crate::domain::{
    BookBorrowed, BookId, BookReserved, BookReturned, BorrowBookError, CancelReservationError,
    MemberId, RemoveBookError, ReservationCancelled, ReservationExpired, ReservationId,
    ReserveBookError, ReturnBookError,
    book::Book,
    commands::{AddBook, AddMember},
    member::Member,
};
use async_trait::async_trait;

/// インフラ障害（ロックの破損など）を表すエラー
///
/// ビジネスルール違反は内側の`Result`で返す。
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// カタログストアポート
///
/// 書籍と会員の可変状態を所有する。
/// すべての操作は単一の排他ロックの内側で実行され、
/// 1つの操作の検証と状態遷移は他のすべての操作に対して不可分である。
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// 書籍を登録する（IDはストアが採番）
    async fn add_book(&self, cmd: AddBook) -> Result<Book>;

    /// 書籍を削除する
    async fn remove_book(&self, book_id: BookId)
    -> Result<std::result::Result<Book, RemoveBookError>>;

    /// 会員を登録する（IDはストアが採番）
    async fn add_member(&self, cmd: AddMember) -> Result<Member>;

    /// 予約トランザクション
    ///
    /// ロック内で 書籍の存在 → 会員の存在 → 書籍の状態 の順に検証し、
    /// 成功時のみAvailable → Reservedに遷移する。
    async fn reserve_book(
        &self,
        book_id: BookId,
        member_id: MemberId,
    ) -> Result<std::result::Result<BookReserved, ReserveBookError>>;

    /// 書籍を貸し出す（予約の確定を含む）
    async fn borrow_book(
        &self,
        book_id: BookId,
        member_id: MemberId,
    ) -> Result<std::result::Result<BookBorrowed, BorrowBookError>>;

    /// 書籍を返却する
    async fn return_book(
        &self,
        book_id: BookId,
        member_id: MemberId,
    ) -> Result<std::result::Result<BookReturned, ReturnBookError>>;

    /// 予約を取り消す
    async fn cancel_reservation(
        &self,
        book_id: BookId,
        member_id: MemberId,
    ) -> Result<std::result::Result<ReservationCancelled, CancelReservationError>>;

    /// 予約の保持期間切れ
    ///
    /// ロック内で現在の状態を再確認し、`reservation_id`の予約がまだ成立中の場合のみ
    /// Availableに戻す。それ以外はNone（何もしない）。
    async fn expire_reservation(
        &self,
        book_id: BookId,
        reservation_id: ReservationId,
    ) -> Result<Option<ReservationExpired>>;

    /// IDで書籍を取得する
    async fn get_book(&self, book_id: BookId) -> Result<Option<Book>>;

    /// IDで会員を取得する
    async fn get_member(&self, member_id: MemberId) -> Result<Option<Member>>;

    /// 貸出可能な書籍の一覧（ID順）
    async fn list_available_books(&self) -> Result<Vec<Book>>;

    /// 会員が借りている書籍の一覧
    ///
    /// 会員が存在しない場合は空。
    async fn list_borrowed_books(&self, member_id: MemberId) -> Result<Vec<Book>>;
}
