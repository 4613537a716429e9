use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BookId, MemberId};

/// 会員
///
/// 予約トランザクションでは存在確認のみ行い、変更しない。
/// 貸出・返却時に`borrowed_books`が更新される。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub member_id: MemberId,
    pub name: String,
    pub borrowed_books: Vec<BookId>,
    pub created_at: DateTime<Utc>,
}

impl Member {
    pub fn new(member_id: MemberId, name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            member_id,
            name: name.into(),
            borrowed_books: Vec::new(),
            created_at,
        }
    }

    /// 貸出中の書籍を追加する
    pub fn with_borrowed(mut self, book_id: BookId) -> Self {
        if !self.borrowed_books.contains(&book_id) {
            self.borrowed_books.push(book_id);
        }
        self
    }

    /// 貸出中の書籍から取り除く
    pub fn without_borrowed(mut self, book_id: BookId) -> Self {
        self.borrowed_books.retain(|id| *id != book_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_borrowed_is_not_duplicated() {
        let member = Member::new(MemberId::new(1), "Baka", Utc::now())
            .with_borrowed(BookId::new(1))
            .with_borrowed(BookId::new(1));
        assert_eq!(member.borrowed_books, vec![BookId::new(1)]);
    }

    #[test]
    fn test_without_borrowed_keeps_order() {
        let member = Member::new(MemberId::new(1), "Baka", Utc::now())
            .with_borrowed(BookId::new(1))
            .with_borrowed(BookId::new(2))
            .with_borrowed(BookId::new(3))
            .without_borrowed(BookId::new(2));
        assert_eq!(member.borrowed_books, vec![BookId::new(1), BookId::new(3)]);
    }
}
