//! Audit log for failures the harvester recovers from
//!
//! Enrichment and per-element failures do not stop a run. They are recorded
//! here with the component and operation that failed, then the run moves on.

use std::sync::Mutex;

/// One recovered failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    /// Pipeline stage, e.g. `enrich` or `traverse`
    pub component: String,
    /// What was being attempted, e.g. `associated_tags`
    pub operation: String,
    /// Short error class from the error's `kind()`
    pub error_kind: String,
    pub message: String,
}

impl AuditEntry {
    pub fn new(
        component: impl Into<String>,
        operation: impl Into<String>,
        error_kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            component: component.into(),
            operation: operation.into(),
            error_kind: error_kind.into(),
            message: message.into(),
        }
    }
}

/// Destination for recovered failures
pub trait AuditLog: Send + Sync {
    fn record(&self, entry: AuditEntry);
}

/// Emits every entry as a `tracing` warning
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditLog;

impl AuditLog for TracingAuditLog {
    fn record(&self, entry: AuditEntry) {
        tracing::warn!(
            component = %entry.component,
            operation = %entry.operation,
            error_kind = %entry.error_kind,
            "{}",
            entry.message
        );
    }
}

/// Keeps entries in memory
#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    entries: Mutex<Vec<AuditEntry>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditLog for MemoryAuditLog {
    fn record(&self, entry: AuditEntry) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_log_keeps_entries_in_order() {
        let log = MemoryAuditLog::new();
        assert!(log.is_empty());
        log.record(AuditEntry::new("enrich", "associated_tags", "unavailable", "first"));
        log.record(AuditEntry::new("traverse", "descend", "database", "second"));
        let entries = log.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].operation, "associated_tags");
        assert_eq!(entries[1].message, "second");
    }

    #[test]
    fn tracing_log_accepts_entries() {
        TracingAuditLog.record(AuditEntry::new("enrich", "certification", "database", "ignored"));
    }
}
