//! 検証リクエストの順序管理
//!
//! ファイル読み込みは中断できないため、ファイルを素早く差し替えると
//! 古い検証結果が後から届くことがある。選択ごとに単調増加のチケットを発行し、
//! 最新でないチケットの結果は破棄する。

use std::cell::Cell;

/// 1回のファイル選択に対応するチケット
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// シングルスレッド（UIイベントループ）用のシーケンサ
#[derive(Debug, Default)]
pub struct ValidationSequencer {
    latest: Cell<u64>,
}

impl ValidationSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 新しい選択を開始（以前のチケットはすべて古くなる）
    pub fn begin(&self) -> Ticket {
        let next = self.latest.get() + 1;
        self.latest.set(next);
        Ticket(next)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.latest.get()
    }

    /// 最新チケットの結果のみ通す
    pub fn settle<T>(&self, ticket: Ticket, result: T) -> Option<T> {
        if self.is_current(ticket) {
            Some(result)
        } else {
            tracing::debug!(
                ticket = ticket.0,
                latest = self.latest.get(),
                "discarding stale validation result"
            );
            None
        }
    }
}
