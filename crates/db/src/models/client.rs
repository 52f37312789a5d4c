//! Client entity model and DTOs.

use serde::{Deserialize, Serialize};
use studio_core::types::{DbId, Timestamp};

/// A client row from the `clients` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: DbId,
    pub name: String,
    /// Unique (case-insensitive).
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new client.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClient {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub notes: Option<String>,
}

/// DTO for updating an existing client. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClient {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub notes: Option<String>,
}

impl UpdateClient {
    pub fn apply_to(&self, client: &mut Client) {
        if let Some(name) = &self.name {
            client.name = name.clone();
        }
        if let Some(email) = &self.email {
            client.email = email.clone();
        }
        if let Some(phone) = &self.phone {
            client.phone = Some(phone.clone());
        }
        if let Some(company) = &self.company {
            client.company = Some(company.clone());
        }
        if let Some(notes) = &self.notes {
            client.notes = Some(notes.clone());
        }
    }
}

/// One element of a client batch update.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientBatchItem {
    pub id: DbId,
    #[serde(flatten)]
    pub changes: UpdateClient,
}
