use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;

use super::request::ReservationRequest;

/// 予約キュー
///
/// 容量付きのFIFOチャネル。送信側（呼び出し側）は複数、受信側はワーカー全員。
///
/// - `enqueue`: 満杯なら空きが出るまで待つ（失敗させずに背圧をかける）
/// - `dequeue`: リクエストが来るまで待つ。閉じられて空になったら`None`
/// - `close`: 新規の受付を止める。既にキューにあるリクエストは処理される
///
/// ワーカーは受信側を`tokio::sync::Mutex`越しに共有する。
/// このMutexは待ち順に公平なので、取り出し順はキューの順序のまま。
#[derive(Debug)]
pub struct ReservationQueue {
    sender: Mutex<Option<mpsc::Sender<ReservationRequest>>>,
    receiver: tokio::sync::Mutex<mpsc::Receiver<ReservationRequest>>,
    capacity: usize,
}

impl ReservationQueue {
    /// # Panics
    /// `capacity`が0の場合（設定の検証で事前に弾かれる）
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity);
        Self {
            sender: Mutex::new(Some(sender)),
            receiver: tokio::sync::Mutex::new(receiver),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 送信側の状態は`Option`の入れ替えのみなので、破損したロックもそのまま使える
    fn sender(&self) -> MutexGuard<'_, Option<mpsc::Sender<ReservationRequest>>> {
        self.sender.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// リクエストを追加する
    ///
    /// キューが閉じている場合はリクエストをそのまま返す。
    pub async fn enqueue(&self, request: ReservationRequest) -> Result<(), ReservationRequest> {
        let sender = self.sender().clone();
        let Some(sender) = sender else {
            return Err(request);
        };
        sender.send(request).await.map_err(|e| e.0)
    }

    /// 次のリクエストを取り出す
    pub async fn dequeue(&self) -> Option<ReservationRequest> {
        let mut receiver = self.receiver.lock().await;
        receiver.recv().await
    }

    /// 新規の受付を止める（冪等）
    ///
    /// 送信中の呼び出しが終わり、残りが取り出されると`dequeue`は`None`を返す。
    pub fn close(&self) {
        self.sender().take();
    }

    pub fn is_closed(&self) -> bool {
        self.sender().is_none()
    }

    /// キューを閉じ、残っているリクエストを応答せずに破棄する
    ///
    /// 処理するワーカーが1つも残っていない場合にのみ使う。
    /// 破棄されたリクエストの呼び出し側は応答チャネルの切断で終了を知る。
    /// 受信側を他が使用中の場合は何もせず`None`。
    pub fn abandon_pending(&self) -> Option<usize> {
        self.close();
        let mut receiver = self.receiver.try_lock().ok()?;
        receiver.close();
        let mut abandoned = 0;
        while let Ok(request) = receiver.try_recv() {
            drop(request);
            abandoned += 1;
        }
        Some(abandoned)
    }
}
