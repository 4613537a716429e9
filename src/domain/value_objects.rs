use serde::{Deserialize, Serialize};

/// 書籍ID - カタログ内で書籍を一意に識別する
///
/// カタログストアが登録順に1から採番する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(u64);

impl BookId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for BookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 会員ID - 予約・貸出を行う会員への参照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(u64);

impl MemberId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for MemberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 予約ID - 1回の予約（Available → Reserved）を識別する
///
/// カタログストアが予約の成立順に1から採番する。再利用されないため、
/// 同じ書籍に対する古い予約と新しい予約を区別できる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReservationId(u64);

impl ReservationId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ReservationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 書籍の状態
///
/// 状態遷移（これ以外の遷移は不正）：
/// - Available → Reserved（予約）
/// - Reserved → Available（期限切れ・取消）
/// - Reserved → CheckedOut（予約の確定）
/// - CheckedOut → Available（返却）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookStatus {
    /// 貸出可能
    Available,
    /// 予約中（未確定）
    Reserved,
    /// 貸出中
    CheckedOut,
}

impl BookStatus {
    /// 文字列表現を取得する
    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Available => "available",
            BookStatus::Reserved => "reserved",
            BookStatus::CheckedOut => "checked_out",
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, BookStatus::Available)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_id_value() {
        let id = BookId::new(42);
        assert_eq!(id.value(), 42);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn test_member_id_equality() {
        assert_eq!(MemberId::new(1), MemberId::new(1));
        assert_ne!(MemberId::new(1), MemberId::new(2));
    }

    #[test]
    fn test_book_status_as_str() {
        assert_eq!(BookStatus::Available.as_str(), "available");
        assert_eq!(BookStatus::Reserved.as_str(), "reserved");
        assert_eq!(BookStatus::CheckedOut.as_str(), "checked_out");
        assert!(BookStatus::Available.is_available());
        assert!(!BookStatus::Reserved.is_available());
    }

    // 予約IDは成立順に比較できる
    #[test]
    fn test_reservation_id_ordering() {
        assert!(ReservationId::new(1) < ReservationId::new(2));
        assert_eq!(ReservationId::new(3).to_string(), "3");
    }

    // IDはJSON上で素の数値として表現される
    #[test]
    fn test_ids_serialize_transparently() {
        let json = serde_json::to_string(&BookId::new(7)).unwrap();
        assert_eq!(json, "7");
        let id: MemberId = serde_json::from_str("3").unwrap();
        assert_eq!(id, MemberId::new(3));
    }
}
