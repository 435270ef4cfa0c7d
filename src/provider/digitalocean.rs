use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{DomainRecord, ProviderError, RecordFilter, RecordsApi};

pub const DIGITALOCEAN_API_BASE: &str = "https://api.digitalocean.com/v2";

pub struct DigitalOceanClient {
    client: Client,
    api_base: String,
    api_token: String,
}

impl DigitalOceanClient {
    /// `timeout` of `None` leaves requests unbounded.
    pub fn new(api_base: &str, api_token: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder().user_agent(concat!("do-ddns/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_token: api_token.to_string(),
        })
    }

    fn records_url(&self, domain: &str) -> String {
        format!("{}/domains/{}/records", self.api_base, domain)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: &str,
        request: RequestBuilder,
    ) -> Result<T, ProviderError> {
        let request = request
            .bearer_auth(&self.api_token)
            .build()
            .map_err(|e| ProviderError::Request(e.to_string()))?;
        debug!("{} {}", method, request.url());

        let transport = |e: reqwest::Error| ProviderError::Transport {
            method: method.to_string(),
            detail: e.to_string(),
        };

        let response = self.client.execute(request).await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Api {
                status: status.as_u16(),
                status_line: status.to_string(),
            });
        }

        let body = response.text().await.map_err(transport)?;
        serde_json::from_str(&body).map_err(|e| ProviderError::Decode(e.to_string()))
    }
}

/// The API filters by fully qualified name, not by label.
fn qualified_name(domain: &str, name: &str) -> String {
    if name.is_empty() || name == "@" {
        domain.to_string()
    } else {
        format!("{}.{}", name, domain)
    }
}

#[async_trait]
impl RecordsApi for DigitalOceanClient {
    async fn list_records(
        &self,
        domain: &str,
        filter: Option<&RecordFilter>,
    ) -> Result<Vec<DomainRecord>, ProviderError> {
        let mut request = self.client.get(self.records_url(domain));
        if let Some(filter) = filter {
            request = request.query(&[
                ("type", filter.record_type.clone()),
                ("name", qualified_name(domain, &filter.name)),
            ]);
        }

        let response: DomainRecordsResponse = self.send("GET", request).await?;
        Ok(response.domain_records)
    }

    async fn create_record(
        &self,
        domain: &str,
        record: &DomainRecord,
    ) -> Result<DomainRecord, ProviderError> {
        let request = self.client.post(self.records_url(domain)).json(record);

        let response: DomainRecordResponse = self.send("POST", request).await?;
        Ok(response.domain_record)
    }

    async fn update_record(
        &self,
        domain: &str,
        record: &DomainRecord,
    ) -> Result<DomainRecord, ProviderError> {
        let url = format!("{}/{}", self.records_url(domain), record.id);
        let request = self.client.put(url).json(record);

        let response: DomainRecordResponse = self.send("PUT", request).await?;
        Ok(response.domain_record)
    }
}

// DigitalOcean API envelopes

#[derive(Debug, Deserialize)]
struct DomainRecordsResponse {
    domain_records: Vec<DomainRecord>,
}

#[derive(Debug, Deserialize)]
struct DomainRecordResponse {
    domain_record: DomainRecord,
}
