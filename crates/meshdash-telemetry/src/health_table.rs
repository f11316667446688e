//! Peer health table: probe results ordered by latency.
//!
//! Rows are kept sorted at all times. An upsert only moves the touched row,
//! and reports the move as a [`Placement`] so a rendering surface can mirror
//! the table with the same minimal edits.
//!
//! # Ordering
//!
//! Rows compare by their displayed latency text using numeric collation
//! (`"9" < "10" < "100"`). A row without latency is greater than every row
//! with one. Equal rows keep their relative order: a row is inserted after
//! all rows that compare equal to it.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::Serialize;

use crate::collate::numeric_collate;
use crate::model::PeerProbeResult;

/// One row of the health table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeerHealthRow {
    pub peer: String,
    pub ping: Option<f64>,
    pub country_short: Option<String>,
    pub error: Option<String>,
    /// Whether `peer` is in the latest connected-peers snapshot.
    pub connected: bool,
}

impl PeerHealthRow {
    fn new(probe: PeerProbeResult, connected: bool) -> Self {
        Self {
            peer: probe.peer,
            ping: probe.ping,
            country_short: probe.country_short,
            error: probe.error,
            connected,
        }
    }

    fn update(&mut self, probe: PeerProbeResult, connected: bool) {
        self.ping = probe.ping;
        self.country_short = probe.country_short;
        self.error = probe.error;
        self.connected = connected;
    }

    /// Latency as displayed: whole milliseconds, or empty when absent.
    pub fn latency_text(&self) -> String {
        match self.ping {
            Some(ms) if ms.is_finite() => format!("{}", ms.round() as i64),
            _ => String::new(),
        }
    }

    /// Rows without a latency render dimmed.
    pub fn is_reachable(&self) -> bool {
        !self.latency_text().is_empty()
    }
}

/// Order two latency texts. Empty text is the maximal sentinel.
pub fn compare_latency_text(a: &str, b: &str) -> Ordering {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => numeric_collate(a, b),
    }
}

fn compare_rows(a: &PeerHealthRow, b: &PeerHealthRow) -> Ordering {
    compare_latency_text(&a.latency_text(), &b.latency_text())
}

/// How an upsert changed the row order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// New row inserted at `at`.
    Inserted { at: usize },
    /// Existing row updated without moving.
    Unchanged { at: usize },
    /// Existing row removed from `from` and reinserted so it ends up at `to`.
    Moved { from: usize, to: usize },
}

impl Placement {
    /// Final index of the row.
    pub fn index(&self) -> usize {
        match *self {
            Placement::Inserted { at } | Placement::Unchanged { at } => at,
            Placement::Moved { to, .. } => to,
        }
    }
}

/// Latency-ordered table of probed peers.
#[derive(Debug, Default)]
pub struct PeerHealthTable {
    rows: Vec<PeerHealthRow>,
    connected: HashSet<String>,
}

impl PeerHealthTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or update the row for `probe.peer` and move it into place.
    pub fn upsert(&mut self, probe: PeerProbeResult) -> Placement {
        let connected = self.connected.contains(&probe.peer);
        match self.position(&probe.peer) {
            None => {
                let row = PeerHealthRow::new(probe, connected);
                let at = self.insertion_point(&row);
                self.rows.insert(at, row);
                Placement::Inserted { at }
            }
            Some(from) => {
                self.rows[from].update(probe, connected);
                if self.is_in_place(from) {
                    return Placement::Unchanged { at: from };
                }
                let row = self.rows.remove(from);
                let to = self.insertion_point(&row);
                self.rows.insert(to, row);
                Placement::Moved { from, to }
            }
        }
    }

    /// Replace the connected set and refresh every row's flag.
    ///
    /// Returns the indices of rows whose flag changed.
    pub fn mark_connected(&mut self, peers: &HashSet<String>) -> Vec<usize> {
        self.connected = peers.clone();
        let mut changed = Vec::new();
        for (i, row) in self.rows.iter_mut().enumerate() {
            let connected = self.connected.contains(&row.peer);
            if row.connected != connected {
                row.connected = connected;
                changed.push(i);
            }
        }
        changed
    }

    /// Full stable sort. Rows are always kept sorted, so this never moves
    /// anything on a table built through [`upsert`](Self::upsert).
    pub fn sort(&mut self) {
        self.rows.sort_by(compare_rows);
    }

    pub fn rows(&self) -> &[PeerHealthRow] {
        &self.rows
    }

    pub fn get(&self, peer: &str) -> Option<&PeerHealthRow> {
        self.rows.iter().find(|r| r.peer == peer)
    }

    pub fn position(&self, peer: &str) -> Option<usize> {
        self.rows.iter().position(|r| r.peer == peer)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Drop all rows and the connected set.
    pub fn clear(&mut self) {
        self.rows.clear();
        self.connected.clear();
    }

    /// First index whose row compares greater than `row`.
    fn insertion_point(&self, row: &PeerHealthRow) -> usize {
        let key = row.latency_text();
        self.rows
            .partition_point(|r| compare_latency_text(&r.latency_text(), &key) != Ordering::Greater)
    }

    fn is_in_place(&self, i: usize) -> bool {
        let row = &self.rows[i];
        let after_prev = i == 0 || compare_rows(&self.rows[i - 1], row) != Ordering::Greater;
        let before_next =
            i + 1 >= self.rows.len() || compare_rows(row, &self.rows[i + 1]) != Ordering::Greater;
        after_prev && before_next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn order(table: &PeerHealthTable) -> Vec<&str> {
        table.rows().iter().map(|r| r.peer.as_str()).collect()
    }

    #[test]
    fn latency_total_order() {
        let mut table = PeerHealthTable::new();
        table.upsert(PeerProbeResult::pending("absent"));
        table.upsert(PeerProbeResult::with_ping("p100", 100.0));
        table.upsert(PeerProbeResult::with_ping("p9", 9.0));
        table.upsert(PeerProbeResult::with_ping("p10", 10.0));
        assert_eq!(order(&table), ["p9", "p10", "p100", "absent"]);
    }

    #[test]
    fn absent_latency_is_greater_than_any_value() {
        assert_eq!(compare_latency_text("", "999999"), Ordering::Greater);
        assert_eq!(compare_latency_text("0", ""), Ordering::Less);
        assert_eq!(compare_latency_text("", ""), Ordering::Equal);
    }

    #[test]
    fn ties_keep_arrival_order() {
        let mut table = PeerHealthTable::new();
        table.upsert(PeerProbeResult::with_ping("a", 20.0));
        table.upsert(PeerProbeResult::with_ping("b", 20.0));
        table.upsert(PeerProbeResult::with_ping("c", 20.0));
        assert_eq!(order(&table), ["a", "b", "c"]);
    }

    #[test]
    fn reupsert_in_place_is_noop() {
        let mut table = PeerHealthTable::new();
        table.upsert(PeerProbeResult::with_ping("a", 20.0));
        table.upsert(PeerProbeResult::with_ping("b", 20.0));
        let placement = table.upsert(PeerProbeResult::with_ping("a", 20.0));
        assert_eq!(placement, Placement::Unchanged { at: 0 });
        assert_eq!(order(&table), ["a", "b"]);
    }

    #[test]
    fn update_moves_single_row() {
        let mut table = PeerHealthTable::new();
        table.upsert(PeerProbeResult::pending("a"));
        table.upsert(PeerProbeResult::with_ping("b", 30.0));
        table.upsert(PeerProbeResult::with_ping("c", 40.0));
        assert_eq!(order(&table), ["b", "c", "a"]);

        let placement = table.upsert(PeerProbeResult::with_ping("a", 35.0));
        assert_eq!(placement, Placement::Moved { from: 2, to: 1 });
        assert_eq!(order(&table), ["b", "a", "c"]);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn rows_are_never_duplicated() {
        let mut table = PeerHealthTable::new();
        for ping in [5.0, 50.0, 500.0] {
            table.upsert(PeerProbeResult::with_ping("a", ping));
        }
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("a").unwrap().latency_text(), "500");
    }

    #[test]
    fn latency_text_rounds_whole_ms() {
        let mut table = PeerHealthTable::new();
        table.upsert(PeerProbeResult::with_ping("a", 12.6));
        let row = table.get("a").unwrap();
        assert_eq!(row.latency_text(), "13");
        assert!(row.is_reachable());
    }

    #[test]
    fn connected_flag_follows_snapshot() {
        let mut table = PeerHealthTable::new();
        table.upsert(PeerProbeResult::with_ping("a", 1.0));
        table.upsert(PeerProbeResult::with_ping("b", 2.0));

        let set: HashSet<String> = ["b".to_string()].into_iter().collect();
        assert_eq!(table.mark_connected(&set), vec![1]);
        assert!(!table.get("a").unwrap().connected);
        assert!(table.get("b").unwrap().connected);

        // New rows pick up the current set
        table.upsert(PeerProbeResult::pending("b"));
        assert!(table.get("b").unwrap().connected);

        assert_eq!(table.mark_connected(&HashSet::new()), vec![1]);
        assert!(!table.get("b").unwrap().connected);
    }

    fn probe_strategy() -> impl Strategy<Value = (u8, Option<u16>)> {
        (0u8..12, prop::option::of(0u16..2000))
    }

    proptest! {
        #[test]
        fn upserts_keep_table_sorted(probes in prop::collection::vec(probe_strategy(), 0..60)) {
            let mut table = PeerHealthTable::new();
            for (id, ping) in probes {
                let mut probe = PeerProbeResult::pending(format!("peer{id}"));
                probe.ping = ping.map(f64::from);
                table.upsert(probe);
            }

            let before: Vec<String> = table.rows().iter().map(|r| r.peer.clone()).collect();
            table.sort();
            let once: Vec<String> = table.rows().iter().map(|r| r.peer.clone()).collect();
            table.sort();
            let twice: Vec<String> = table.rows().iter().map(|r| r.peer.clone()).collect();

            prop_assert_eq!(&before, &once);
            prop_assert_eq!(&once, &twice);

            let unique: HashSet<&String> = before.iter().collect();
            prop_assert_eq!(unique.len(), before.len());
        }

        #[test]
        fn reupsert_leaves_other_rows(
            pings in prop::collection::vec(prop::option::of(0u16..500), 1..30),
            pick in 0usize..30,
        ) {
            let mut table = PeerHealthTable::new();
            for (i, ping) in pings.iter().enumerate() {
                let mut probe = PeerProbeResult::pending(format!("peer{i}"));
                probe.ping = ping.map(f64::from);
                table.upsert(probe);
            }
            let row = table.rows()[pick % table.len()].clone();
            let before: Vec<String> = table.rows().iter().map(|r| r.peer.clone()).collect();

            let mut probe = PeerProbeResult::pending(row.peer.clone());
            probe.ping = row.ping;
            let placement = table.upsert(probe);

            let after: Vec<String> = table.rows().iter().map(|r| r.peer.clone()).collect();
            prop_assert!(
                matches!(placement, Placement::Unchanged { .. }),
                "placement {:?}",
                placement
            );
            prop_assert_eq!(before, after);
        }
    }
}
