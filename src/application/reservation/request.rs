use crate::application::Result;
use crate::domain::{BookId, MemberId};
use tokio::sync::oneshot;

/// 予約1件の結果
///
/// 成功時はペイロードなし。失敗時は業務エラー、またはストア障害。
pub type ReservationOutcome = Result<()>;

/// 予約リクエスト
///
/// 呼び出し側が作成し、ちょうど1つのワーカーがちょうど1回消費する。
/// 応答チャネルは`oneshot`で、`respond`が`self`を消費するため
/// 二重応答は型で防がれる。再利用されない。
#[derive(Debug)]
pub struct ReservationRequest {
    book_id: BookId,
    member_id: MemberId,
    reply: oneshot::Sender<ReservationOutcome>,
}

impl ReservationRequest {
    /// リクエストと、その応答を待つための受信側を作る
    pub fn new(
        book_id: BookId,
        member_id: MemberId,
    ) -> (Self, oneshot::Receiver<ReservationOutcome>) {
        let (reply, receiver) = oneshot::channel();
        let request = Self {
            book_id,
            member_id,
            reply,
        };
        (request, receiver)
    }

    pub fn book_id(&self) -> BookId {
        self.book_id
    }

    pub fn member_id(&self) -> MemberId {
        self.member_id
    }

    /// 結果を呼び出し側に返す
    ///
    /// 呼び出し側が既に待つのをやめていた場合は`false`。
    pub fn respond(self, outcome: ReservationOutcome) -> bool {
        self.reply.send(outcome).is_ok()
    }
}
