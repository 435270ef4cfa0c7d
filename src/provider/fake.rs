//! In-memory `RecordsApi` for tests.

use std::sync::Mutex;

use async_trait::async_trait;

use super::{DomainRecord, ProviderError, RecordFilter, RecordsApi};

#[derive(Default)]
pub struct FakeRecordsApi {
    records: Mutex<Vec<(String, DomainRecord)>>,
    calls: Mutex<Vec<String>>,
    fail_list: Option<u16>,
    fail_writes: Option<u16>,
    next_id: Mutex<u64>,
}

impl FakeRecordsApi {
    pub fn new() -> Self {
        Self {
            next_id: Mutex::new(100),
            ..Default::default()
        }
    }

    pub fn with_record(self, domain: &str, record: DomainRecord) -> Self {
        self.records.lock().unwrap().push((domain.to_string(), record));
        self
    }

    /// Listing answers with this HTTP status instead of records.
    pub fn failing_list(mut self, status: u16) -> Self {
        self.fail_list = Some(status);
        self
    }

    /// Create and update answer with this HTTP status.
    pub fn failing_writes(mut self, status: u16) -> Self {
        self.fail_writes = Some(status);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| !c.starts_with("list"))
            .collect()
    }

    pub fn records(&self, domain: &str) -> Vec<DomainRecord> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|(d, _)| d == domain)
            .map(|(_, r)| r.clone())
            .collect()
    }

    fn status_error(status: u16) -> ProviderError {
        ProviderError::Api {
            status,
            status_line: format!("{} Fake Failure", status),
        }
    }
}

#[async_trait]
impl RecordsApi for FakeRecordsApi {
    async fn list_records(
        &self,
        domain: &str,
        filter: Option<&RecordFilter>,
    ) -> Result<Vec<DomainRecord>, ProviderError> {
        self.calls.lock().unwrap().push(match filter {
            Some(f) => format!("list {} {} {}", domain, f.record_type, f.name),
            None => format!("list {}", domain),
        });
        if let Some(status) = self.fail_list {
            return Err(Self::status_error(status));
        }

        Ok(self
            .records(domain)
            .into_iter()
            .filter(|r| filter.map_or(true, |f| r.record_type == f.record_type && r.name == f.name))
            .collect())
    }

    async fn create_record(
        &self,
        domain: &str,
        record: &DomainRecord,
    ) -> Result<DomainRecord, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("create {} {} {}", domain, record.name, record.data));
        if let Some(status) = self.fail_writes {
            return Err(Self::status_error(status));
        }

        let mut created = record.clone();
        {
            let mut next_id = self.next_id.lock().unwrap();
            *next_id += 1;
            created.id = *next_id;
        }
        self.records
            .lock()
            .unwrap()
            .push((domain.to_string(), created.clone()));
        Ok(created)
    }

    async fn update_record(
        &self,
        domain: &str,
        record: &DomainRecord,
    ) -> Result<DomainRecord, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("update {} {} {}", domain, record.id, record.data));
        if let Some(status) = self.fail_writes {
            return Err(Self::status_error(status));
        }

        let mut records = self.records.lock().unwrap();
        match records
            .iter_mut()
            .find(|(d, r)| d == domain && r.id == record.id)
        {
            Some((_, existing)) => {
                *existing = record.clone();
                Ok(record.clone())
            }
            None => Err(Self::status_error(404)),
        }
    }
}
