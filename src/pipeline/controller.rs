//! Run control: schema, transaction, harvest, commit or roll back

use super::error::{SyncError, SyncResult};
use super::harvest::Harvest;
use super::registry::TypeRegistry;
use super::report::RunReport;
use crate::audit::AuditLog;
use crate::config::{ConfigError, SyncConfig};
use crate::sink::{RelationalSink, ALL_TABLES};
use crate::storage::MetadataStore;
use std::sync::{Arc, Mutex, TryLockError};

/// Drives complete, all-or-nothing synchronization runs
///
/// One controller owns one sink transaction at a time. A second `refresh`
/// while one is in flight fails with [`SyncError::RunInProgress`].
pub struct SyncController {
    store: Arc<dyn MetadataStore>,
    sink: Arc<dyn RelationalSink>,
    audit: Arc<dyn AuditLog>,
    config: SyncConfig,
    registry: TypeRegistry,
    run_lock: Mutex<()>,
}

impl SyncController {
    pub fn new(
        store: Arc<dyn MetadataStore>,
        sink: Arc<dyn RelationalSink>,
        audit: Arc<dyn AuditLog>,
        config: SyncConfig,
    ) -> SyncResult<Self> {
        Self::with_registry(store, sink, audit, config, TypeRegistry::standard())
    }

    /// Like [`SyncController::new`], with extra type aliases registered
    pub fn with_registry(
        store: Arc<dyn MetadataStore>,
        sink: Arc<dyn RelationalSink>,
        audit: Arc<dyn AuditLog>,
        config: SyncConfig,
        registry: TypeRegistry,
    ) -> SyncResult<Self> {
        config.validate()?;
        if let Some(unknown) = config.element_types.iter().find(|t| !registry.is_known(t)) {
            return Err(ConfigError::Invalid {
                field: "element_types",
                message: format!("no projection registered for type {unknown}"),
            }
            .into());
        }

        Ok(Self {
            store,
            sink,
            audit,
            config,
            registry,
            run_lock: Mutex::new(()),
        })
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Synchronize every configured element type in one sink transaction
    pub fn refresh(&self) -> SyncResult<RunReport> {
        let _guard = match self.run_lock.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => return Err(SyncError::RunInProgress),
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
        };

        let span = tracing::info_span!("refresh");
        let _enter = span.enter();

        self.sink.ensure_schema(ALL_TABLES).map_err(|err| {
            tracing::error!(error = %err, "schema setup failed");
            SyncError::Schema(err)
        })?;
        self.sink.begin().map_err(|source| SyncError::Transaction {
            operation: "begin",
            source,
        })?;

        let mut report = RunReport::start();
        let outcome = Harvest {
            store: self.store.as_ref(),
            sink: self.sink.as_ref(),
            audit: self.audit.as_ref(),
            config: &self.config,
            registry: &self.registry,
            report: &mut report,
        }
        .run()
        .and_then(|()| {
            self.sink.commit().map_err(|source| SyncError::Transaction {
                operation: "commit",
                source,
            })
        });

        match outcome {
            Ok(()) => {
                report.finish();
                tracing::info!(
                    elements = report.elements_visited,
                    inserted = report.total_inserted(),
                    absorbed = report.absorbed_failures,
                    "refresh committed"
                );
                Ok(report)
            }
            Err(err) => {
                tracing::error!(error = %err, kind = err.kind(), "refresh failed, rolling back");
                match self.sink.rollback() {
                    Ok(()) => Err(err),
                    Err(rollback) => Err(SyncError::RollbackFailed {
                        original: Box::new(err),
                        rollback,
                    }),
                }
            }
        }
    }
}
