use crate::application::LibraryApplicationError;
use crate::ports::CatalogStore;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::task::JoinHandle;

use super::expiry_scheduler::ExpiryScheduler;
use super::queue::ReservationQueue;

/// ワーカーの稼働状況
///
/// プールより長く生きるよう、窓口が所有してプールに渡す。
#[derive(Debug, Default)]
pub struct WorkerStats {
    live: AtomicUsize,
    failed: AtomicUsize,
}

impl WorkerStats {
    /// 現在稼働中のワーカー数
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// シャットダウン以外で終了したワーカー数
    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }
}

/// 稼働中ワーカーの数え上げ
///
/// ワーカーのタスクに所有され、タスクが終了（正常終了・パニック・中止）すると
/// 必ずDropされる。シャットダウン以外での終了はエラーとして記録し、
/// 最後のワーカーが消えた場合は残りのリクエストを応答なしで打ち切る。
struct LiveWorker {
    worker_id: usize,
    stats: Arc<WorkerStats>,
    shutting_down: Arc<AtomicBool>,
    queue: Arc<ReservationQueue>,
}

impl LiveWorker {
    fn register(
        worker_id: usize,
        stats: &Arc<WorkerStats>,
        shutting_down: &Arc<AtomicBool>,
        queue: &Arc<ReservationQueue>,
    ) -> Self {
        stats.live.fetch_add(1, Ordering::SeqCst);
        Self {
            worker_id,
            stats: Arc::clone(stats),
            shutting_down: Arc::clone(shutting_down),
            queue: Arc::clone(queue),
        }
    }
}

impl Drop for LiveWorker {
    fn drop(&mut self) {
        let remaining = self.stats.live.fetch_sub(1, Ordering::SeqCst) - 1;

        if self.shutting_down.load(Ordering::SeqCst) {
            tracing::debug!(worker_id = self.worker_id, "Reservation worker stopped");
            return;
        }

        self.stats.failed.fetch_add(1, Ordering::SeqCst);

        tracing::error!(
            worker_id = self.worker_id,
            remaining_workers = remaining,
            "Reservation worker exited unexpectedly"
        );

        if remaining == 0 {
            let abandoned = self.queue.abandon_pending().unwrap_or(0);
            tracing::error!(
                abandoned_requests = abandoned,
                "No reservation workers left, reservation queue closed"
            );
        }
    }
}

/// 予約ワーカープール
///
/// 起動時に指定数ちょうどのワーカーを起動する。
/// 各ワーカーはキューから取り出す → 予約トランザクション → 応答 を繰り返す。
/// 業務エラーはそのまま応答してループを続ける。
/// ストア障害だけはワーカーにとって致命的とし、応答したうえで終了する。
pub struct WorkerPool {
    queue: Arc<ReservationQueue>,
    handles: Vec<JoinHandle<()>>,
    stats: Arc<WorkerStats>,
    shutting_down: Arc<AtomicBool>,
}

impl WorkerPool {
    /// `count`個のワーカーを起動する
    pub fn start(
        count: usize,
        queue: Arc<ReservationQueue>,
        store: Arc<dyn CatalogStore>,
        scheduler: Arc<ExpiryScheduler>,
        stats: Arc<WorkerStats>,
    ) -> Self {
        let shutting_down = Arc::new(AtomicBool::new(false));

        let handles = (0..count)
            .map(|worker_id| {
                let guard = LiveWorker::register(worker_id, &stats, &shutting_down, &queue);
                tokio::spawn(run_worker(
                    guard,
                    Arc::clone(&queue),
                    Arc::clone(&store),
                    Arc::clone(&scheduler),
                ))
            })
            .collect::<Vec<_>>();

        tracing::info!("Started {} reservation workers", handles.len());

        Self {
            queue,
            handles,
            stats,
            shutting_down,
        }
    }

    /// 起動したワーカー数
    pub fn size(&self) -> usize {
        self.handles.len()
    }

    /// 現在稼働中のワーカー数
    pub fn live_workers(&self) -> usize {
        self.stats.live()
    }

    /// キューを閉じ、残りのリクエストを処理し終えたワーカーをすべて待つ
    ///
    /// シャットダウン中の印は、キューを閉じるより先に付ける。
    pub async fn shutdown(self) {
        self.shutting_down.store(true, Ordering::SeqCst);
        self.queue.close();

        tracing::info!(
            "Waiting for {} reservation workers to drain the queue...",
            self.handles.len()
        );

        for handle in self.handles {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Reservation worker did not shut down cleanly");
            }
        }

        tracing::info!("Reservation workers shut down");
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("size", &self.size())
            .field("live_workers", &self.live_workers())
            .finish()
    }
}

async fn run_worker(
    guard: LiveWorker,
    queue: Arc<ReservationQueue>,
    store: Arc<dyn CatalogStore>,
    scheduler: Arc<ExpiryScheduler>,
) {
    let worker_id = guard.worker_id;
    tracing::debug!(worker_id, "Reservation worker started");

    while let Some(request) = queue.dequeue().await {
        let book_id = request.book_id();
        let member_id = request.member_id();

        let outcome = match store.reserve_book(book_id, member_id).await {
            Ok(Ok(event)) => {
                // 応答より先に期限切れを予約しておく
                scheduler.schedule(book_id, event.reservation_id);
                tracing::debug!(
                    worker_id,
                    %book_id,
                    %member_id,
                    reservation_id = %event.reservation_id,
                    "Book reserved"
                );
                Ok(())
            }
            Ok(Err(rejected)) => {
                tracing::debug!(worker_id, %book_id, %member_id, reason = ?rejected, "Reservation rejected");
                Err(rejected.into())
            }
            Err(e) => {
                tracing::error!(
                    worker_id,
                    %book_id,
                    error = %e,
                    "Catalog store failed during reservation, stopping worker"
                );
                request.respond(Err(LibraryApplicationError::CatalogUnavailable(e)));
                return;
            }
        };

        if !request.respond(outcome) {
            tracing::debug!(worker_id, %book_id, "Caller stopped waiting for the reservation reply");
        }
    }

    drop(guard);
}
