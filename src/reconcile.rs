use std::sync::Arc;

use log::info;
use thiserror::Error;

use crate::provider::{DomainRecord, ProviderError, RecordFilter, RecordsApi};
use crate::suffix::{DomainSplitter, HostnameError};

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error(transparent)]
    Hostname(#[from] HostnameError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// What has to happen to bring a hostname's A record in line with an address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// Registrable domain the record lives under.
    pub domain: String,
    /// The existing record, or a not-yet-created one when `record.id == 0`.
    pub record: DomainRecord,
    pub changed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Update,
    NoChange,
}

impl Reconciliation {
    pub fn action(&self) -> Action {
        match (self.changed, self.record.exists()) {
            (false, _) => Action::NoChange,
            (true, false) => Action::Create,
            (true, true) => Action::Update,
        }
    }
}

pub struct Reconciler {
    api: Arc<dyn RecordsApi>,
    splitter: Arc<dyn DomainSplitter>,
    ttl: u32,
}

impl Reconciler {
    /// `ttl` applies to records this reconciler creates.
    pub fn new(api: Arc<dyn RecordsApi>, splitter: Arc<dyn DomainSplitter>, ttl: u32) -> Self {
        Self { api, splitter, ttl }
    }

    /// Compares the A record of `hostname` with `ip` without writing anything.
    ///
    /// Only the first record the provider returns is considered.
    pub async fn reconcile(&self, hostname: &str, ip: &str) -> Result<Reconciliation, UpdateError> {
        let (domain, label) = self.splitter.split_registrable_domain(hostname)?;

        let records = self
            .api
            .list_records(&domain, Some(&RecordFilter::a(&label)))
            .await?;

        let Some(existing) = records.into_iter().next() else {
            info!("Record not found: {}", hostname);
            let record = DomainRecord {
                record_type: "A".to_string(),
                name: label,
                data: ip.to_string(),
                ttl: self.ttl,
                ..Default::default()
            };
            return Ok(Reconciliation {
                domain,
                record,
                changed: true,
            });
        };

        let changed = existing.data != ip;
        Ok(Reconciliation {
            domain,
            record: existing,
            changed,
        })
    }

    /// Performs the create or update a reconciliation calls for.
    ///
    /// Returns `Ok(None)` when nothing had to be written.
    pub async fn apply(
        &self,
        reconciliation: Reconciliation,
        ip: &str,
    ) -> Result<Option<DomainRecord>, ProviderError> {
        let action = reconciliation.action();
        let Reconciliation { domain, mut record, .. } = reconciliation;

        match action {
            Action::NoChange => Ok(None),
            Action::Create => {
                info!("Creating record {} in {} with IP {}", record.name, domain, ip);
                self.api.create_record(&domain, &record).await.map(Some)
            }
            Action::Update => {
                info!(
                    "Updating record {} ({}) in {} from {} to {}",
                    record.name, record.id, domain, record.data, ip
                );
                record.data = ip.to_string();
                self.api.update_record(&domain, &record).await.map(Some)
            }
        }
    }
}
