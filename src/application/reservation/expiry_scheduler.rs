use crate::application::{LibraryApplicationError, Result};
use crate::domain::{BookId, ReservationExpired, ReservationId};
use crate::ports::{CatalogStore, NotificationService};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::AbortHandle;

/// 書籍ごとに1つの待機中タイマー
#[derive(Debug)]
struct PendingExpiry {
    reservation_id: ReservationId,
    handle: AbortHandle,
}

/// 予約の期限切れスケジューラ
///
/// 予約が成功するたびに`schedule`で保持期間のタイマーを1つ起動する。
/// タイマーは書籍ごとに1つで、どの予約のためのものかを予約IDで覚えておく。
/// 保持期間が過ぎると、カタログストアのロック内で状態を再確認し、
/// その予約がまだ成立中の場合のみAvailableに戻して通知する。
///
/// 予約の成立・取消・確定とタイマー操作の間にはロックが解放されるため、
/// 他の会員の予約が割り込んでいることがある。そのため：
/// - `schedule`は、より新しい予約のタイマーを古い予約で置き換えない
/// - `cancel`は、指定した予約のタイマーのときだけ止める
/// - `fire`は、指定した予約が成立中のときだけ解放する（冪等）
pub struct ExpiryScheduler {
    store: Arc<dyn CatalogStore>,
    notification_service: Arc<dyn NotificationService>,
    hold_duration: Duration,
    timers: Mutex<HashMap<BookId, PendingExpiry>>,
}

impl ExpiryScheduler {
    pub fn new(
        store: Arc<dyn CatalogStore>,
        notification_service: Arc<dyn NotificationService>,
        hold_duration: Duration,
    ) -> Self {
        Self {
            store,
            notification_service,
            hold_duration,
            timers: Mutex::new(HashMap::new()),
        }
    }

    pub fn hold_duration(&self) -> Duration {
        self.hold_duration
    }

    /// タイマー表はAbortHandleの出し入れのみなので、破損したロックもそのまま使える
    fn timers(&self) -> MutexGuard<'_, HashMap<BookId, PendingExpiry>> {
        self.timers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 保持期間後の期限切れ処理を予約する
    ///
    /// 同じ書籍に待機中のタイマーがあれば、新しいタイマーで置き換える（古い方は中止）。
    /// 待機中のタイマーの方が新しい予約のものなら何もしない。
    pub fn schedule(self: &Arc<Self>, book_id: BookId, reservation_id: ReservationId) {
        // タスクが自分の登録を消す前に登録が済むよう、表をロックしたまま起動する
        let mut timers = self.timers();
        if timers
            .get(&book_id)
            .is_some_and(|p| p.reservation_id > reservation_id)
        {
            tracing::debug!(
                %book_id,
                %reservation_id,
                "Newer reservation already has an expiry timer, schedule skipped"
            );
            return;
        }

        let scheduler = Arc::clone(self);
        let task = tokio::spawn(async move {
            tokio::time::sleep(scheduler.hold_duration).await;
            scheduler.forget(book_id, reservation_id);
            if let Err(e) = scheduler.fire(book_id, reservation_id).await {
                tracing::error!(%book_id, %reservation_id, error = %e, "Reservation expiry failed");
            }
        });

        let pending = PendingExpiry {
            reservation_id,
            handle: task.abort_handle(),
        };
        if let Some(previous) = timers.insert(book_id, pending) {
            previous.handle.abort();
        }

        tracing::debug!(
            %book_id,
            %reservation_id,
            hold_ms = self.hold_duration.as_millis() as u64,
            "Reservation expiry scheduled"
        );
    }

    /// 指定した予約の待機中タイマーを止める
    ///
    /// 止めた場合は`true`。別の予約のタイマーには触れない。
    pub fn cancel(&self, book_id: BookId, reservation_id: ReservationId) -> bool {
        let mut timers = self.timers();
        if !timers
            .get(&book_id)
            .is_some_and(|p| p.reservation_id == reservation_id)
        {
            return false;
        }
        let Some(pending) = timers.remove(&book_id) else {
            return false;
        };
        pending.handle.abort();
        tracing::debug!(%book_id, %reservation_id, "Reservation expiry cancelled");
        true
    }

    /// すべての待機中タイマーを止める（シャットダウン時）
    pub fn cancel_all(&self) {
        for (_, pending) in self.timers().drain() {
            pending.handle.abort();
        }
    }

    /// 待機中のタイマー数
    pub fn pending(&self) -> usize {
        self.timers().len()
    }

    fn forget(&self, book_id: BookId, reservation_id: ReservationId) {
        let mut timers = self.timers();
        if timers
            .get(&book_id)
            .is_some_and(|p| p.reservation_id == reservation_id)
        {
            timers.remove(&book_id);
        }
    }

    /// 期限切れ処理を実行する
    ///
    /// 指定した予約がまだ成立中の場合のみAvailableに戻し、通知してイベントを返す。
    /// それ以外（確定・取消・期限切れ済み・削除済み・別の予約）は何もせず`None`。
    pub async fn fire(
        &self,
        book_id: BookId,
        reservation_id: ReservationId,
    ) -> Result<Option<ReservationExpired>> {
        let expired = self
            .store
            .expire_reservation(book_id, reservation_id)
            .await
            .map_err(LibraryApplicationError::CatalogUnavailable)?;

        let Some(event) = expired else {
            tracing::debug!(%book_id, %reservation_id, "Reservation no longer pending, expiry skipped");
            return Ok(None);
        };

        tracing::info!(
            book_id = %event.book_id,
            member_id = %event.member_id,
            "Reservation expired, book is available again"
        );

        self.notification_service
            .send_reservation_expired(&event)
            .await
            .map_err(LibraryApplicationError::NotificationError)?;

        Ok(Some(event))
    }
}

impl std::fmt::Debug for ExpiryScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpiryScheduler")
            .field("hold_duration", &self.hold_duration)
            .field("pending", &self.pending())
            .finish()
    }
}
