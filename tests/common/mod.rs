#![allow(dead_code)]

use async_trait::async_trait;
use rusty_library_reservation::adapters::memory::CatalogStore as InMemoryCatalogStore;
use rusty_library_reservation::adapters::mock::NotificationService as MockNotificationService;
use rusty_library_reservation::application::catalog::{ServiceDependencies, add_book, add_member};
use rusty_library_reservation::config::ReservationConfig;
use rusty_library_reservation::domain::{
    book::Book,
    commands::{AddBook, AddMember},
    member::Member,
    *,
};
use rusty_library_reservation::ports::catalog_store::{CatalogStore, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{Barrier, Semaphore};

/// テスト用の予約サブシステム一式
pub struct TestLibrary {
    pub deps: ServiceDependencies,
    pub store: Arc<dyn CatalogStore>,
    pub notifications: Arc<MockNotificationService>,
}

/// インメモリストアとモック通知で組み立てる（ワーカーは未起動）
pub fn build_library(worker_count: usize, hold_duration: Duration) -> TestLibrary {
    build_library_with_store(
        worker_count,
        hold_duration,
        Arc::new(InMemoryCatalogStore::new()),
    )
}

pub fn build_library_with_store(
    worker_count: usize,
    hold_duration: Duration,
    store: Arc<dyn CatalogStore>,
) -> TestLibrary {
    let config = ReservationConfig {
        worker_count,
        queue_capacity: 100,
        hold_duration,
    };
    let notifications = Arc::new(MockNotificationService::new());
    let deps = ServiceDependencies::new(&config, Arc::clone(&store), notifications.clone());

    TestLibrary {
        deps,
        store,
        notifications,
    }
}

pub async fn register_book(deps: &ServiceDependencies, title: &str) -> Book {
    add_book(
        deps,
        AddBook {
            title: title.to_string(),
            author: "Test Author".to_string(),
        },
    )
    .await
    .unwrap()
}

pub async fn register_member(deps: &ServiceDependencies, name: &str) -> Member {
    add_member(
        deps,
        AddMember {
            name: name.to_string(),
        },
    )
    .await
    .unwrap()
}

/// 書籍に成立中の予約ID
pub async fn current_reservation(deps: &ServiceDependencies, book_id: BookId) -> ReservationId {
    let book = deps.catalog_store.get_book(book_id).await.unwrap().unwrap();
    book.reservation.expect("book should be reserved")
}

/// 予約トランザクションに割り込めるカタログストア
///
/// - `gate`: 予約トランザクションの前に全員がそろうまで待たせる
///   （同時に何個のワーカーが処理中かを確かめるため）
/// - `fail_reservations`: 予約トランザクションをストア障害として失敗させる
/// - `cancel_release`: 予約の取消をロック解放後に止めておき、
///   `release_cancellations`が呼ばれるまで呼び出し側に返さない
///
/// それ以外の操作はインメモリストアに委譲する。
pub struct InstrumentedCatalogStore {
    inner: InMemoryCatalogStore,
    gate: Option<Arc<Barrier>>,
    fail_reservations: bool,
    reserve_calls: AtomicUsize,
    cancel_release: Option<Semaphore>,
    held_cancellations: AtomicUsize,
}

impl InstrumentedCatalogStore {
    fn plain() -> Self {
        Self {
            inner: InMemoryCatalogStore::new(),
            gate: None,
            fail_reservations: false,
            reserve_calls: AtomicUsize::new(0),
            cancel_release: None,
            held_cancellations: AtomicUsize::new(0),
        }
    }

    pub fn gated(parties: usize) -> Self {
        Self {
            gate: Some(Arc::new(Barrier::new(parties))),
            ..Self::plain()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_reservations: true,
            ..Self::plain()
        }
    }

    pub fn holding_cancellations() -> Self {
        Self {
            cancel_release: Some(Semaphore::new(0)),
            ..Self::plain()
        }
    }

    pub fn reserve_calls(&self) -> usize {
        self.reserve_calls.load(Ordering::SeqCst)
    }

    /// ストア上は取消済みで、呼び出し側へ返すのを止めている取消の数
    pub fn held_cancellations(&self) -> usize {
        self.held_cancellations.load(Ordering::SeqCst)
    }

    pub fn release_cancellations(&self) {
        if let Some(release) = &self.cancel_release {
            release.add_permits(self.held_cancellations());
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("simulated catalog outage")]
pub struct SimulatedOutage;

#[async_trait]
impl CatalogStore for InstrumentedCatalogStore {
    async fn add_book(&self, cmd: AddBook) -> Result<Book> {
        self.inner.add_book(cmd).await
    }

    async fn remove_book(
        &self,
        book_id: BookId,
    ) -> Result<std::result::Result<Book, RemoveBookError>> {
        self.inner.remove_book(book_id).await
    }

    async fn add_member(&self, cmd: AddMember) -> Result<Member> {
        self.inner.add_member(cmd).await
    }

    async fn reserve_book(
        &self,
        book_id: BookId,
        member_id: MemberId,
    ) -> Result<std::result::Result<BookReserved, ReserveBookError>> {
        self.reserve_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.wait().await;
        }
        if self.fail_reservations {
            return Err(SimulatedOutage.into());
        }
        self.inner.reserve_book(book_id, member_id).await
    }

    async fn borrow_book(
        &self,
        book_id: BookId,
        member_id: MemberId,
    ) -> Result<std::result::Result<BookBorrowed, BorrowBookError>> {
        self.inner.borrow_book(book_id, member_id).await
    }

    async fn return_book(
        &self,
        book_id: BookId,
        member_id: MemberId,
    ) -> Result<std::result::Result<BookReturned, ReturnBookError>> {
        self.inner.return_book(book_id, member_id).await
    }

    async fn cancel_reservation(
        &self,
        book_id: BookId,
        member_id: MemberId,
    ) -> Result<std::result::Result<ReservationCancelled, CancelReservationError>> {
        let cancelled = self.inner.cancel_reservation(book_id, member_id).await;
        if let Some(release) = &self.cancel_release {
            self.held_cancellations.fetch_add(1, Ordering::SeqCst);
            release.acquire().await?.forget();
        }
        cancelled
    }

    async fn expire_reservation(
        &self,
        book_id: BookId,
        reservation_id: ReservationId,
    ) -> Result<Option<ReservationExpired>> {
        self.inner.expire_reservation(book_id, reservation_id).await
    }

    async fn get_book(&self, book_id: BookId) -> Result<Option<Book>> {
        self.inner.get_book(book_id).await
    }

    async fn get_member(&self, member_id: MemberId) -> Result<Option<Member>> {
        self.inner.get_member(member_id).await
    }

    async fn list_available_books(&self) -> Result<Vec<Book>> {
        self.inner.list_available_books().await
    }

    async fn list_borrowed_books(&self, member_id: MemberId) -> Result<Vec<Book>> {
        self.inner.list_borrowed_books(member_id).await
    }
}
