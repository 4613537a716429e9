/// 予約のエラー
///
/// 予約トランザクションの検証順（書籍 → 会員 → 状態）に対応する。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReserveBookError {
    /// 書籍が存在しない
    BookNotFound,
    /// 会員が存在しない
    MemberNotFound,
    /// 既に予約されている
    AlreadyReserved,
    /// 貸出中などで予約不可
    NotAvailable,
}

/// 貸出のエラー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorrowBookError {
    /// 書籍が存在しない
    BookNotFound,
    /// 会員が存在しない
    MemberNotFound,
    /// 貸出中、または他の会員が予約中
    NotAvailable,
}

/// 返却のエラー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnBookError {
    /// 書籍が存在しない
    BookNotFound,
    /// 会員が存在しない
    MemberNotFound,
    /// この会員に貸し出されていない
    NotBorrowed,
}

/// 予約取消のエラー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReservationError {
    /// 書籍が存在しない
    BookNotFound,
    /// 予約中ではない
    NotReserved,
    /// 他の会員の予約
    ReservedByAnotherMember,
}

/// 書籍削除のエラー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveBookError {
    /// 書籍が存在しない
    BookNotFound,
}
