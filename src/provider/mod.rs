pub mod digitalocean;

#[cfg(test)]
pub mod fake;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// A DNS resource record as the provider stores it.
///
/// `id == 0` means the record does not exist yet and has to be created;
/// any other id refers to a record that is updated in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainRecord {
    #[serde(default, skip_serializing)]
    pub id: u64,
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub data: String,
    pub ttl: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<u32>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub tag: String,
}

impl DomainRecord {
    pub fn exists(&self) -> bool {
        self.id != 0
    }
}

// The API sends `"tag": null` for every record type that has no tag.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Narrows a record listing to one type and name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFilter {
    pub record_type: String,
    /// Label relative to the domain, `@` for the apex.
    pub name: String,
}

impl RecordFilter {
    pub fn a(name: &str) -> Self {
        Self {
            record_type: "A".to_string(),
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("domain records request failed: {0}")]
    Request(String),
    #[error("domain records {method} failed: {detail}")]
    Transport { method: String, detail: String },
    #[error("non-OK status code returned [ {status} ]; {status_line}")]
    Api { status: u16, status_line: String },
    #[error("decoding JSON response failed: {0}")]
    Decode(String),
}

/// Domain-records operations of a DNS provider.
///
/// Every call is a single attempt; failures surface to the caller as-is.
#[async_trait]
pub trait RecordsApi: Send + Sync {
    /// Lists the records of `domain`, all of them when `filter` is `None`.
    async fn list_records(
        &self,
        domain: &str,
        filter: Option<&RecordFilter>,
    ) -> Result<Vec<DomainRecord>, ProviderError>;

    /// Creates `record` and returns it with the provider-assigned id.
    async fn create_record(
        &self,
        domain: &str,
        record: &DomainRecord,
    ) -> Result<DomainRecord, ProviderError>;

    /// Overwrites the existing record `record.id`.
    async fn update_record(
        &self,
        domain: &str,
        record: &DomainRecord,
    ) -> Result<DomainRecord, ProviderError>;
}
