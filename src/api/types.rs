use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{BookId, MemberId, book::Book, commands::*, member::Member};

/// 書籍登録リクエスト（POST /books）
#[derive(Debug, Serialize, Deserialize)]
pub struct AddBookRequest {
    pub title: String,
    pub author: String,
}

impl AddBookRequest {
    pub fn to_command(&self) -> AddBook {
        AddBook {
            title: self.title.clone(),
            author: self.author.clone(),
        }
    }
}

/// 会員登録リクエスト（POST /members）
#[derive(Debug, Serialize, Deserialize)]
pub struct AddMemberRequest {
    pub name: String,
}

impl AddMemberRequest {
    pub fn to_command(&self) -> AddMember {
        AddMember {
            name: self.name.clone(),
        }
    }
}

/// 会員による書籍操作のリクエスト
///
/// POST /books/:id/reserve, /borrow, /return, /cancel-reservation で共通。
#[derive(Debug, Serialize, Deserialize)]
pub struct MemberActionRequest {
    pub member_id: u64,
}

impl MemberActionRequest {
    pub fn member_id(&self) -> MemberId {
        MemberId::new(self.member_id)
    }
}

/// 書籍レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct BookResponse {
    pub book_id: u64,
    pub title: String,
    pub author: String,
    pub status: String,
    pub holder: Option<u64>,
    /// 予約中の場合のみ
    pub reservation_id: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            book_id: book.book_id.value(),
            title: book.title,
            author: book.author,
            status: book.status.as_str().to_string(),
            holder: book.holder.map(|m| m.value()),
            reservation_id: book.reservation.map(|r| r.value()),
            created_at: book.created_at,
            updated_at: book.updated_at,
        }
    }
}

/// 会員レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct MemberResponse {
    pub member_id: u64,
    pub name: String,
    pub borrowed_books: Vec<u64>,
    pub created_at: DateTime<Utc>,
}

impl From<Member> for MemberResponse {
    fn from(member: Member) -> Self {
        Self {
            member_id: member.member_id.value(),
            name: member.name,
            borrowed_books: member.borrowed_books.iter().map(BookId::value).collect(),
            created_at: member.created_at,
        }
    }
}

/// 予約レスポンス（POST /books/:id/reserve）
#[derive(Debug, Serialize, Deserialize)]
pub struct ReservationResponse {
    pub book_id: u64,
    pub member_id: u64,
    /// 確定（貸出）しないまま、この秒数が過ぎると予約は自動的に解除される
    pub hold_secs: u64,
}

/// エラーレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}
