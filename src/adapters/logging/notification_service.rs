use crate::domain::ReservationExpired;
use crate::ports::notification_service::{NotificationService as NotificationServiceTrait, Result};
use async_trait::async_trait;

/// ログ出力による通知サービス
///
/// メールなどの配信手段を持たない構成で使用する。
/// 通知内容は`tracing`のinfoレベルで出力される。
#[derive(Debug, Default)]
pub struct NotificationService;

impl NotificationService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationServiceTrait for NotificationService {
    async fn send_reservation_expired(&self, event: &ReservationExpired) -> Result<()> {
        tracing::info!(
            book_id = %event.book_id,
            member_id = %event.member_id,
            reservation_id = %event.reservation_id,
            expired_at = %event.expired_at,
            "[AUTO-CANCEL] Reservation for book {} expired",
            event.book_id
        );
        Ok(())
    }
}
