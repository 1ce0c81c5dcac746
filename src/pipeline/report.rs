//! Summary of one completed run

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableCounts {
    pub inserted: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub elements_visited: usize,
    /// Per table name
    pub tables: BTreeMap<&'static str, TableCounts>,
    /// Failures recorded in the audit log instead of ending the run
    pub absorbed_failures: usize,
    /// Types abandoned under the skip policy
    pub skipped_types: Vec<String>,
}

impl RunReport {
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            elements_visited: 0,
            tables: BTreeMap::new(),
            absorbed_failures: 0,
            skipped_types: Vec::new(),
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn record_insert(&mut self, table: &'static str) {
        self.tables.entry(table).or_default().inserted += 1;
    }

    pub fn record_skip(&mut self, table: &'static str) {
        self.tables.entry(table).or_default().skipped += 1;
    }

    pub fn inserted(&self, table: &str) -> usize {
        self.tables.get(table).map_or(0, |c| c.inserted)
    }

    pub fn skipped(&self, table: &str) -> usize {
        self.tables.get(table).map_or(0, |c| c.skipped)
    }

    pub fn total_inserted(&self) -> usize {
        self.tables.values().map(|c| c.inserted).sum()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "visited {} elements, inserted {} rows, absorbed {} failures",
            self.elements_visited,
            self.total_inserted(),
            self.absorbed_failures
        )?;
        for (table, counts) in &self.tables {
            writeln!(f, "  {:<24} {:>6} inserted {:>6} unchanged", table, counts.inserted, counts.skipped)?;
        }
        if !self.skipped_types.is_empty() {
            writeln!(f, "  skipped types: {}", self.skipped_types.join(", "))?;
        }
        Ok(())
    }
}
