//! UniProtKB REST client

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

use super::models::UniProtEntry;
use super::{extract, is_valid_accession, LookupError, OrganismInfo, ProteinLookup, ProteinRecord, Result};

pub const DEFAULT_UNIPROT_BASE_URL: &str = "https://rest.uniprot.org";
pub const DEFAULT_UNIPROT_TIMEOUT_SECS: u64 = 30;

/// Fetches entries from `{base_url}/uniprotkb/{accession}.json`
#[derive(Clone)]
pub struct UniProtClient {
    client: Client,
    base_url: String,
}

impl UniProtClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("xlink-atlas/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn entry_url(&self, accession: &str) -> String {
        format!("{}/uniprotkb/{}.json", self.base_url, accession)
    }

    /// Fetch and decode one entry.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_entry(&self, accession: &str) -> Result<UniProtEntry> {
        let accession = accession.trim();
        if !is_valid_accession(accession) {
            return Err(LookupError::InvalidAccession(accession.to_string()));
        }

        let response = self
            .client
            .get(self.entry_url(accession))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => return Err(LookupError::NotFound(accession.to_string())),
            status if !status.is_success() => {
                return Err(LookupError::Status {
                    accession: accession.to_string(),
                    status: status.as_u16(),
                })
            }
            _ => {}
        }

        let body = response.bytes().await?;
        debug!(bytes = body.len(), "Fetched entry");

        serde_json::from_slice(&body).map_err(|e| LookupError::Decode {
            accession: accession.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl ProteinLookup for UniProtClient {
    async fn fetch_protein_record(&self, accession: &str) -> Result<ProteinRecord> {
        let entry = self.fetch_entry(accession).await?;
        Ok(extract::protein_record(accession.trim(), &entry))
    }

    async fn fetch_organism_for_accession(&self, accession: &str) -> Result<OrganismInfo> {
        let entry = self.fetch_entry(accession).await?;
        extract::organism_info(&entry)
            .ok_or_else(|| LookupError::MissingOrganism(accession.trim().to_string()))
    }
}
