use crate::domain::ReservationExpired;
use crate::ports::notification_service::{NotificationService as NotificationServiceTrait, Result};
use async_trait::async_trait;
use std::sync::Mutex;

/// Mock implementation of NotificationService
///
/// Does not deliver anything.
/// Records every expiry notification so tests can assert on them.
pub struct NotificationService {
    expired: Mutex<Vec<ReservationExpired>>,
}

impl NotificationService {
    pub fn new() -> Self {
        Self {
            expired: Mutex::new(Vec::new()),
        }
    }

    /// Expiry notifications sent so far, in order
    pub fn expired_notifications(&self) -> Vec<ReservationExpired> {
        self.expired.lock().unwrap().clone()
    }
}

impl Default for NotificationService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationServiceTrait for NotificationService {
    /// Record the expiry notification
    async fn send_reservation_expired(&self, event: &ReservationExpired) -> Result<()> {
        self.expired.lock().unwrap().push(event.clone());
        Ok(())
    }
}
