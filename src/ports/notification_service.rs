use crate::domain::ReservationExpired;
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 通知サービスポート
///
/// 会員への通知配信メカニズムを抽象化する。
#[async_trait]
pub trait NotificationService: Send + Sync {
    /// 予約の期限切れを通知する
    ///
    /// 期限切れスケジューラが予約をAvailableに戻したときに呼ばれる。
    async fn send_reservation_expired(&self, event: &ReservationExpired) -> Result<()>;
}
