use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BookId, MemberId, ReservationId};

/// イベント：書籍が予約された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookReserved {
    pub book_id: BookId,
    pub member_id: MemberId,
    pub reservation_id: ReservationId,
    pub reserved_at: DateTime<Utc>,
}

/// イベント：書籍が貸出された（予約の確定を含む）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookBorrowed {
    pub book_id: BookId,
    pub member_id: MemberId,
    pub borrowed_at: DateTime<Utc>,
    /// 本人の予約を確定した場合、その予約
    pub confirmed_reservation: Option<ReservationId>,
}

impl BookBorrowed {
    pub fn was_reserved(&self) -> bool {
        self.confirmed_reservation.is_some()
    }
}

/// イベント：書籍が返却された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookReturned {
    pub book_id: BookId,
    pub member_id: MemberId,
    pub returned_at: DateTime<Utc>,
}

/// イベント：会員が予約を取り消した
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationCancelled {
    pub book_id: BookId,
    pub member_id: MemberId,
    pub reservation_id: ReservationId,
    pub cancelled_at: DateTime<Utc>,
}

/// イベント：確定されないまま予約の保持期間が過ぎた
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationExpired {
    pub book_id: BookId,
    pub member_id: MemberId,
    pub reservation_id: ReservationId,
    pub expired_at: DateTime<Utc>,
}
