use crate::domain::{
    BookBorrowed, BookId, BookReserved, BookReturned, BookStatus, BorrowBookError,
    CancelReservationError, MemberId, RemoveBookError, ReservationCancelled, ReservationExpired,
    ReservationId, ReserveBookError, ReturnBookError,
    book::{self, Book},
    commands::{AddBook, AddMember},
    member::Member,
};
use crate::ports::catalog_store::{CatalogStore as CatalogStoreTrait, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

/// カタログのロックが破損している（ロック保持中にパニックが発生した）
#[derive(Debug, thiserror::Error)]
#[error("catalog lock poisoned: a previous operation panicked while holding it")]
pub struct CatalogLockPoisoned;

/// ロックで保護されたカタログの状態
///
/// このモジュールの外からは見えない。
/// `CatalogStore::lock`を経由しない限り触れないため、
/// 「すべての変更はロック内」が構造的に保証される。
#[derive(Debug, Default)]
struct CatalogState {
    books: BTreeMap<BookId, Book>,
    members: HashMap<MemberId, Member>,
    last_book_id: u64,
    last_member_id: u64,
    last_reservation_id: u64,
}

impl CatalogState {
    fn lookup_book(&self, book_id: BookId) -> Option<&Book> {
        self.books.get(&book_id)
    }

    fn lookup_member(&self, member_id: MemberId) -> Option<&Member> {
        self.members.get(&member_id)
    }

    /// 遷移後の書籍を書き戻す
    fn put_book(&mut self, book: Book) {
        self.books.insert(book.book_id, book);
    }

    fn put_member(&mut self, member: Member) {
        self.members.insert(member.member_id, member);
    }

    /// 会員の貸出リストを更新する（会員が消えていれば何もしない）
    fn update_member(&mut self, member_id: MemberId, f: impl FnOnce(Member) -> Member) {
        if let Some(member) = self.members.remove(&member_id) {
            self.put_member(f(member));
        }
    }
}

/// インメモリのカタログストア
///
/// 書籍と会員のマップ全体を1つの`Mutex`で保護する。
/// 書籍ごとのロックは使わない（スループットより単純さとデッドロック回避を優先）。
/// ガードはスコープを抜けると必ず解放される。
#[derive(Debug, Default)]
pub struct CatalogStore {
    state: Mutex<CatalogState>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::result::Result<MutexGuard<'_, CatalogState>, CatalogLockPoisoned> {
        self.state.lock().map_err(|_| {
            tracing::error!("Catalog lock is poisoned");
            CatalogLockPoisoned
        })
    }
}

#[async_trait]
impl CatalogStoreTrait for CatalogStore {
    async fn add_book(&self, cmd: AddBook) -> Result<Book> {
        let mut state = self.lock()?;
        state.last_book_id += 1;
        let book = Book::new(
            BookId::new(state.last_book_id),
            cmd.title,
            cmd.author,
            Utc::now(),
        );
        state.put_book(book.clone());
        Ok(book)
    }

    async fn remove_book(
        &self,
        book_id: BookId,
    ) -> Result<std::result::Result<Book, RemoveBookError>> {
        let mut state = self.lock()?;
        let Some(removed) = state.books.remove(&book_id) else {
            return Ok(Err(RemoveBookError::BookNotFound));
        };
        if let (BookStatus::CheckedOut, Some(holder)) = (removed.status, removed.holder) {
            state.update_member(holder, |m| m.without_borrowed(book_id));
        }
        Ok(Ok(removed))
    }

    async fn add_member(&self, cmd: AddMember) -> Result<Member> {
        let mut state = self.lock()?;
        state.last_member_id += 1;
        let member = Member::new(MemberId::new(state.last_member_id), cmd.name, Utc::now());
        state.put_member(member.clone());
        Ok(member)
    }

    async fn reserve_book(
        &self,
        book_id: BookId,
        member_id: MemberId,
    ) -> Result<std::result::Result<BookReserved, ReserveBookError>> {
        let mut state = self.lock()?;

        // 1. 書籍の存在確認
        let Some(current) = state.lookup_book(book_id) else {
            return Ok(Err(ReserveBookError::BookNotFound));
        };

        // 2. 会員の存在確認
        if state.lookup_member(member_id).is_none() {
            return Ok(Err(ReserveBookError::MemberNotFound));
        }

        // 3. 状態の確認と遷移（予約IDは成立した予約にのみ採番する）
        let reservation_id = ReservationId::new(state.last_reservation_id + 1);
        let (reserved, event) = match book::reserve(current, member_id, reservation_id, Utc::now())
        {
            Ok(result) => result,
            Err(e) => return Ok(Err(e)),
        };
        state.last_reservation_id = reservation_id.value();
        state.put_book(reserved);

        Ok(Ok(event))
    }

    async fn borrow_book(
        &self,
        book_id: BookId,
        member_id: MemberId,
    ) -> Result<std::result::Result<BookBorrowed, BorrowBookError>> {
        let mut state = self.lock()?;

        let Some(current) = state.lookup_book(book_id) else {
            return Ok(Err(BorrowBookError::BookNotFound));
        };
        if state.lookup_member(member_id).is_none() {
            return Ok(Err(BorrowBookError::MemberNotFound));
        }

        let (borrowed, event) = match book::borrow(current, member_id, Utc::now()) {
            Ok(result) => result,
            Err(e) => return Ok(Err(e)),
        };
        state.put_book(borrowed);
        state.update_member(member_id, |m| m.with_borrowed(book_id));

        Ok(Ok(event))
    }

    async fn return_book(
        &self,
        book_id: BookId,
        member_id: MemberId,
    ) -> Result<std::result::Result<BookReturned, ReturnBookError>> {
        let mut state = self.lock()?;

        let Some(current) = state.lookup_book(book_id) else {
            return Ok(Err(ReturnBookError::BookNotFound));
        };
        if state.lookup_member(member_id).is_none() {
            return Ok(Err(ReturnBookError::MemberNotFound));
        }

        let (returned, event) = match book::return_to_shelf(current, member_id, Utc::now()) {
            Ok(result) => result,
            Err(e) => return Ok(Err(e)),
        };
        state.put_book(returned);
        state.update_member(member_id, |m| m.without_borrowed(book_id));

        Ok(Ok(event))
    }

    async fn cancel_reservation(
        &self,
        book_id: BookId,
        member_id: MemberId,
    ) -> Result<std::result::Result<ReservationCancelled, CancelReservationError>> {
        let mut state = self.lock()?;

        let Some(current) = state.lookup_book(book_id) else {
            return Ok(Err(CancelReservationError::BookNotFound));
        };

        let (cancelled, event) = match book::cancel_reservation(current, member_id, Utc::now()) {
            Ok(result) => result,
            Err(e) => return Ok(Err(e)),
        };
        state.put_book(cancelled);

        Ok(Ok(event))
    }

    async fn expire_reservation(
        &self,
        book_id: BookId,
        reservation_id: ReservationId,
    ) -> Result<Option<ReservationExpired>> {
        let mut state = self.lock()?;

        // 期限切れまでの間に削除・確定・取消・再予約されている可能性があるため再取得する
        let Some(current) = state.lookup_book(book_id) else {
            return Ok(None);
        };
        let Some((expired, event)) = book::expire_reservation(current, reservation_id, Utc::now())
        else {
            return Ok(None);
        };
        state.put_book(expired);

        Ok(Some(event))
    }

    async fn get_book(&self, book_id: BookId) -> Result<Option<Book>> {
        let state = self.lock()?;
        Ok(state.lookup_book(book_id).cloned())
    }

    async fn get_member(&self, member_id: MemberId) -> Result<Option<Member>> {
        let state = self.lock()?;
        Ok(state.lookup_member(member_id).cloned())
    }

    async fn list_available_books(&self) -> Result<Vec<Book>> {
        let state = self.lock()?;
        Ok(state
            .books
            .values()
            .filter(|b| b.status.is_available())
            .cloned()
            .collect())
    }

    async fn list_borrowed_books(&self, member_id: MemberId) -> Result<Vec<Book>> {
        let state = self.lock()?;
        let Some(member) = state.lookup_member(member_id) else {
            return Ok(Vec::new());
        };
        Ok(member
            .borrowed_books
            .iter()
            .filter_map(|id| state.lookup_book(*id))
            .cloned()
            .collect())
    }
}
