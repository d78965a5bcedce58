//! Background audit writer
//!
//! Drains the channel behind every `AuditHandle` and stores events in
//! batches. Stops when all handles are dropped.

use std::sync::Arc;

use kernel::audit::AuditEvent;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::application::config::ComplianceConfig;
use crate::domain::entities::AuditLog;
use crate::domain::repository::AuditRepository;

pub fn spawn_audit_writer<R>(
    repo: Arc<R>,
    rx: mpsc::Receiver<AuditEvent>,
    config: ComplianceConfig,
) -> JoinHandle<()>
where
    R: AuditRepository + Send + Sync + 'static,
{
    tokio::spawn(run_audit_writer(repo, rx, config))
}

pub async fn run_audit_writer<R>(repo: Arc<R>, mut rx: mpsc::Receiver<AuditEvent>, config: ComplianceConfig)
where
    R: AuditRepository + Sync,
{
    let batch_size = config.audit_batch_size.max(1);
    let mut events = Vec::with_capacity(batch_size);
    let mut written: u64 = 0;

    tracing::info!(batch_size, "Audit writer started");
    while rx.recv_many(&mut events, batch_size).await > 0 {
        let batch: Vec<AuditLog> = events.drain(..).map(AuditLog::from).collect();
        if write_with_retry(&*repo, &batch, &config).await {
            written += batch.len() as u64;
        }
    }
    tracing::info!(written, "Audit writer stopped");
}

async fn write_with_retry<R>(repo: &R, batch: &[AuditLog], config: &ComplianceConfig) -> bool
where
    R: AuditRepository + Sync,
{
    let mut attempt = 0;
    loop {
        match repo.insert_batch(batch).await {
            Ok(()) => return true,
            Err(e) if attempt < config.audit_max_retries => {
                attempt += 1;
                tracing::warn!(error = %e, attempt, size = batch.len(), "Audit batch failed, retrying");
                tokio::time::sleep(config.audit_retry_delay).await;
            }
            Err(e) => {
                tracing::error!(error = %e, size = batch.len(), "Audit batch dropped");
                return false;
            }
        }
    }
}
