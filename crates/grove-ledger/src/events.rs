// crates/grove-ledger/src/events.rs
//
// Append-only audit log. Every committed ledger mutation records one event per
// state change; rejected operations record nothing.

use chrono::Utc;

use grove_core::event::{LedgerEvent, LedgerEventKind};

pub struct EventLog {
    events: Vec<LedgerEvent>,
    /// Sequence number of the first retained event.
    base_seq: u64,
}

impl EventLog {
    pub fn new() -> Self {
        Self::resume(0)
    }

    /// Start an empty log whose next event gets sequence number `next_seq`.
    /// Used after restoring from a snapshot; earlier events live in the store.
    pub fn resume(next_seq: u64) -> Self {
        Self {
            events: Vec::new(),
            base_seq: next_seq,
        }
    }

    pub fn record(&mut self, kind: LedgerEventKind) -> &LedgerEvent {
        let seq = self.next_seq();
        log_event(seq, &kind);
        self.events.push(LedgerEvent {
            seq,
            at: Utc::now(),
            kind,
        });
        &self.events[self.events.len() - 1]
    }

    pub fn record_all(&mut self, kinds: impl IntoIterator<Item = LedgerEventKind>) {
        for kind in kinds {
            self.record(kind);
        }
    }

    pub fn next_seq(&self) -> u64 {
        self.base_seq + self.events.len() as u64
    }

    /// Events retained in memory.
    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    /// Retained events with `seq >= from`.
    pub fn since(&self, from: u64) -> &[LedgerEvent] {
        let start = self.events.partition_point(|e| e.seq < from);
        &self.events[start..]
    }

    /// Sequence number of the oldest event still held in memory, or of the
    /// next event if none are held.
    pub fn first_retained_seq(&self) -> u64 {
        self.base_seq
    }

    /// Drop retained events with `seq < seq`. Numbering is unaffected.
    pub fn discard_before(&mut self, seq: u64) {
        let cut = self.events.partition_point(|e| e.seq < seq);
        self.events.drain(..cut);
        self.base_seq += cut as u64;
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

fn log_event(seq: u64, kind: &LedgerEventKind) {
    match kind {
        LedgerEventKind::Rewarded {
            recipient,
            amount,
            reason,
        } => tracing::info!(seq, %recipient, amount, %reason, "Rewarded"),
        LedgerEventKind::Redeemed {
            account,
            amount,
            reason,
        } => tracing::info!(seq, %account, amount, %reason, "Redeemed"),
        LedgerEventKind::AuthorizationChanged { principal, change } => {
            tracing::info!(seq, %principal, ?change, "AuthorizationChanged")
        }
        LedgerEventKind::PlatformApproval { account, amount } => {
            tracing::info!(seq, %account, amount, "PlatformApproval")
        }
        LedgerEventKind::TreeAdopted {
            recipient,
            token_id,
            tree_id,
        } => tracing::info!(seq, %recipient, token_id, tree_id, "TreeAdopted"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grove_core::identity::Principal;

    fn approval(amount: u64) -> LedgerEventKind {
        LedgerEventKind::PlatformApproval {
            account: Principal::from_handle("u"),
            amount,
        }
    }

    #[test]
    fn test_sequence_numbers() {
        let mut log = EventLog::new();
        assert_eq!(log.record(approval(1)).seq, 0);
        assert_eq!(log.record(approval(2)).seq, 1);
        assert_eq!(log.next_seq(), 2);
    }

    #[test]
    fn test_since() {
        let mut log = EventLog::new();
        log.record_all([approval(1), approval(2), approval(3)]);
        let tail = log.since(1);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].seq, 1);
        assert!(log.since(10).is_empty());
    }

    #[test]
    fn test_discard_before_keeps_numbering() {
        let mut log = EventLog::new();
        log.record_all([approval(1), approval(2), approval(3)]);
        log.discard_before(2);
        assert_eq!(log.events().len(), 1);
        assert_eq!(log.first_retained_seq(), 2);
        assert_eq!(log.next_seq(), 3);
        assert_eq!(log.record(approval(4)).seq, 3);

        log.discard_before(10);
        assert!(log.events().is_empty());
        assert_eq!(log.first_retained_seq(), 4);
        assert_eq!(log.next_seq(), 4);
    }

    #[test]
    fn test_resume_continues_numbering() {
        let mut log = EventLog::resume(7);
        assert_eq!(log.record(approval(1)).seq, 7);
        assert_eq!(log.since(0).len(), 1);
    }
}
