use std::collections::HashMap;

use hydrant_shared::models::Hydrant;

/// Client-side copy of the record list plus the bookkeeping needed for
/// optimistic moves.
///
/// All transitions are plain methods on a value so the rollback and
/// stale-response behavior is testable without a DOM; the page component
/// holds one of these in a signal and calls into it.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct HydrantList {
    records: Vec<Hydrant>,
    /// Per-record mutation sequence number. Bumped on every `begin_move`;
    /// a ticket whose number no longer matches is stale and its response
    /// must not touch the list.
    move_seqs: HashMap<i64, u64>,
}

/// Handed out by [`HydrantList::begin_move`]; carries everything needed to
/// settle the move once the server answers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveTicket {
    pub id: i64,
    seq: u64,
    prior: (f64, f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Server confirmed the optimistic coordinate; snapshot discarded.
    Committed,
    /// Server rejected or the request failed; pre-move coordinate restored.
    RolledBack,
    /// A newer move superseded this ticket while it was in flight; the
    /// response was discarded without touching the list.
    Stale,
}

impl HydrantList {
    pub fn records(&self) -> &[Hydrant] {
        &self.records
    }

    pub fn get(&self, id: i64) -> Option<&Hydrant> {
        self.records.iter().find(|h| h.id == id)
    }

    /// Replace the whole list from a fetched snapshot (initial load).
    pub fn replace_all(&mut self, records: Vec<Hydrant>) {
        self.records = records;
        self.move_seqs.clear();
    }

    /// Prepend a server-confirmed record (Add is never optimistic: the
    /// server assigns id and image paths).
    pub fn prepend(&mut self, record: Hydrant) {
        self.records.insert(0, record);
    }

    /// Apply a move optimistically and return the ticket used to settle it.
    /// Returns `None` for an unknown id.
    pub fn begin_move(&mut self, id: i64, x: f64, y: f64) -> Option<MoveTicket> {
        let record = self.records.iter_mut().find(|h| h.id == id)?;
        let prior = (record.x_coord, record.y_coord);
        record.x_coord = x;
        record.y_coord = y;

        let seq = self.move_seqs.entry(id).or_insert(0);
        *seq += 1;
        Some(MoveTicket { id, seq: *seq, prior })
    }

    /// Settle an in-flight move. `succeeded` is whether the server
    /// confirmed it.
    pub fn finish_move(&mut self, ticket: &MoveTicket, succeeded: bool) -> MoveOutcome {
        let current = self.move_seqs.get(&ticket.id).copied().unwrap_or(0);
        if current != ticket.seq {
            return MoveOutcome::Stale;
        }
        if succeeded {
            return MoveOutcome::Committed;
        }
        if let Some(record) = self.records.iter_mut().find(|h| h.id == ticket.id) {
            record.x_coord = ticket.prior.0;
            record.y_coord = ticket.prior.1;
        }
        MoveOutcome::RolledBack
    }

    /// Remove a record after a server-confirmed delete. Returns whether it
    /// was present.
    pub fn remove(&mut self, id: i64) -> bool {
        let before = self.records.len();
        self.records.retain(|h| h.id != id);
        self.move_seqs.remove(&id);
        self.records.len() != before
    }
}
