use crate::application::{LibraryApplicationError, Result};
use crate::domain::{BookId, MemberId};
use crate::ports::CatalogStore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::expiry_scheduler::ExpiryScheduler;
use super::queue::ReservationQueue;
use super::request::ReservationRequest;
use super::worker_pool::{WorkerPool, WorkerStats};

/// 予約窓口
///
/// 呼び出し側からは同期的な`submit_reservation`に見えるが、
/// 内部ではキューに積んで自分専用の応答チャネルを待つ。
/// 応答にタイムアウトはない（ワーカーが生きている限り必ず応答が来る）。
pub struct ReservationDesk {
    queue: Arc<ReservationQueue>,
    store: Arc<dyn CatalogStore>,
    scheduler: Arc<ExpiryScheduler>,
    pool: Mutex<Option<WorkerPool>>,
    stats: Arc<WorkerStats>,
    started: AtomicBool,
}

impl ReservationDesk {
    pub fn new(
        queue_capacity: usize,
        store: Arc<dyn CatalogStore>,
        scheduler: Arc<ExpiryScheduler>,
    ) -> Self {
        Self {
            queue: Arc::new(ReservationQueue::new(queue_capacity)),
            store,
            scheduler,
            pool: Mutex::new(None),
            stats: Arc::new(WorkerStats::default()),
            started: AtomicBool::new(false),
        }
    }

    fn pool(&self) -> MutexGuard<'_, Option<WorkerPool>> {
        self.pool.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// ワーカーを起動する（1つの窓口につき1回だけ）
    ///
    /// 2回目以降の呼び出しは何もせず`false`を返す。
    pub fn start_workers(&self, count: usize) -> bool {
        if self.started.swap(true, Ordering::SeqCst) {
            tracing::warn!("Reservation workers already started, ignoring start request");
            return false;
        }

        let pool = WorkerPool::start(
            count,
            Arc::clone(&self.queue),
            Arc::clone(&self.store),
            Arc::clone(&self.scheduler),
            Arc::clone(&self.stats),
        );
        *self.pool() = Some(pool);
        true
    }

    /// 起動したワーカー数
    pub fn worker_count(&self) -> usize {
        self.pool().as_ref().map_or(0, WorkerPool::size)
    }

    /// 現在稼働中のワーカー数
    pub fn live_workers(&self) -> usize {
        self.stats.live()
    }

    /// シャットダウン以外で終了したワーカー数
    pub fn failed_workers(&self) -> usize {
        self.stats.failed()
    }

    /// 予約を依頼し、結果を待つ
    ///
    /// 結果は業務エラー（BookNotFound, MemberNotFound, AlreadyReserved, BookNotAvailable）、
    /// またはキュー・ワーカー・ストアの障害（QueueClosed, NoReply, CatalogUnavailable）。
    pub async fn submit_reservation(&self, book_id: BookId, member_id: MemberId) -> Result<()> {
        let (request, reply) = ReservationRequest::new(book_id, member_id);

        self.queue
            .enqueue(request)
            .await
            .map_err(|_| LibraryApplicationError::QueueClosed)?;

        reply.await.map_err(|_| LibraryApplicationError::NoReply)?
    }

    /// 新規の受付を止め、キューに残った予約を処理し終えてからワーカーを停止する
    ///
    /// 待機中の期限切れタイマーも止める。
    pub async fn shutdown(&self) {
        let pool = self.pool().take();
        match pool {
            Some(pool) => pool.shutdown().await,
            None => self.queue.close(),
        }

        self.scheduler.cancel_all();
    }
}

impl std::fmt::Debug for ReservationDesk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReservationDesk")
            .field("queue_capacity", &self.queue.capacity())
            .field("pool", &*self.pool())
            .field("failed_workers", &self.failed_workers())
            .finish()
    }
}
