//! Copies new transactions to an external spreadsheet endpoint.
//!
//! Sync is best-effort: each batch is posted once, in the background, and a
//! failure is only logged. The local database stays the source of truth.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize, Serializer};
use time::Date;
use tokio::task::JoinHandle;

use crate::{Kind, TransactionRow};

/// A transaction flattened with the names of its category, subcategory and user.
///
/// The endpoint receives a JSON array of these records. The keys and the kind
/// names are Spanish because the spreadsheet receiver reads them that way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncRecord {
    /// When the transaction happened, e.g. "2024-01-15".
    #[serde(rename = "fecha")]
    pub date: Date,
    /// Whether money was earned or spent, sent as "Ingreso" or "Gasto".
    #[serde(rename = "tipo", serialize_with = "serialize_kind")]
    pub kind: Kind,
    /// The amount of money spent or earned.
    #[serde(rename = "monto")]
    pub amount: f64,
    /// The description of the transaction, empty if there is none.
    #[serde(rename = "descripcion")]
    pub description: String,
    /// The name of the subcategory.
    #[serde(rename = "subcategoria")]
    pub subcategory: String,
    /// The name of the category.
    #[serde(rename = "categoria")]
    pub category: String,
    /// The name of the user that recorded the transaction.
    #[serde(rename = "usuario")]
    pub user: String,
}

fn serialize_kind<S: Serializer>(kind: &Kind, serializer: S) -> Result<S::Ok, S::Error> {
    let name = match kind {
        Kind::Income => "Ingreso",
        Kind::Expense => "Gasto",
    };

    serializer.serialize_str(name)
}

impl From<TransactionRow> for SyncRecord {
    fn from(row: TransactionRow) -> Self {
        Self {
            date: row.date,
            kind: row.kind,
            amount: row.amount,
            description: row.description.unwrap_or_default(),
            category: row.category,
            subcategory: row.subcategory,
            user: row.user,
        }
    }
}

/// The ways that sending records to the sync endpoint can fail.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The request could not be sent or timed out.
    #[error("could not reach the sync endpoint: {0}")]
    Request(#[from] reqwest::Error),

    /// The endpoint answered with something other than 200 OK.
    #[error("the sync endpoint responded with {status}: {body}")]
    Status {
        /// The HTTP status code of the response.
        status: u16,
        /// The response body, for debugging.
        body: String,
    },
}

/// A client for the spreadsheet endpoint that receives new transactions.
#[derive(Debug, Clone)]
pub struct SheetSync {
    client: Client,
    url: String,
}

impl SheetSync {
    /// Create a client that posts to `url`, giving up on a request after `timeout`.
    ///
    /// # Errors
    /// Returns [SyncError::Request] if the HTTP client cannot be built.
    pub fn new(url: &str, timeout: Duration) -> Result<Self, SyncError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            url: url.to_owned(),
        })
    }

    /// The URL that records are posted to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Post `records` as a JSON array, succeeding only on a 200 OK response.
    ///
    /// # Errors
    /// Returns [SyncError::Request] on transport failures and timeouts, or
    /// [SyncError::Status] if the endpoint answers with any other status.
    pub async fn send(&self, records: &[SyncRecord]) -> Result<(), SyncError> {
        let response = self.client.post(&self.url).json(records).send().await?;
        let status = response.status();

        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();

            return Err(SyncError::Status {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(count = records.len(), url = %self.url, "sent records to sync endpoint");

        Ok(())
    }

    /// Send `records` on a background task without waiting for the result.
    ///
    /// Failures are logged and the records are not retried.
    pub fn notify(&self, records: Vec<SyncRecord>) -> JoinHandle<()> {
        let sync = self.clone();

        tokio::spawn(async move {
            if let Err(error) = sync.send(&records).await {
                tracing::error!(count = records.len(), "could not sync transactions: {error}");
            }
        })
    }
}
