//! Entity types for the two resource lists.
//!
//! Wire field names are camelCase. Clients may send extra fields; those are
//! kept through the flattened `extra` map rather than dropped on rewrite.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::repository::{RepoError, Resource};
use crate::store::KvStore;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Apartment {
    pub id: String,
    pub name: String,
    pub location: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[async_trait]
impl Resource for Apartment {
    const LIST_KEY: &'static str = "apartments";
    const NAME: &'static str = "Apartment";

    fn id(&self) -> &str {
        &self.id
    }
}

/// A tenancy record. `apartmentName`, `location`, and `price` are copies
/// taken from the referenced apartment at write time; there is no foreign
/// key, so they go stale silently if the apartment is renamed or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: String,
    pub apartment_name: String,
    #[serde(default)]
    pub location: String,
    pub price: f64,
    #[serde(default)]
    pub tenant_names: Vec<String>,
    #[serde(default)]
    pub electricity_submeter: Option<String>,
    #[serde(default)]
    pub water_submeter: Option<String>,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[async_trait]
impl Resource for Tenant {
    const LIST_KEY: &'static str = "tenants";
    const NAME: &'static str = "Tenant";

    fn id(&self) -> &str {
        &self.id
    }

    /// Resolve `apartmentName` against the current apartment list and copy
    /// the apartment's `location` and `price` into the payload. Runs on both
    /// create and update, so every write refreshes the denormalized copies.
    /// No match means nothing is written.
    async fn prepare(store: &dyn KvStore, payload: &mut Map<String, Value>) -> Result<(), RepoError> {
        let name = payload
            .get("apartmentName")
            .and_then(Value::as_str)
            .ok_or_else(|| RepoError::Validation("apartmentName is required".into()))?;

        let apartments: Vec<Apartment> = match store.get(Apartment::LIST_KEY).await? {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_default(),
            None => Vec::new(),
        };

        let apartment = apartments
            .iter()
            .find(|apt| apt.name == name)
            .ok_or_else(|| RepoError::Validation("Apartment not found".into()))?;

        payload.insert("location".into(), Value::String(apartment.location.clone()));
        payload.insert("price".into(), json!(apartment.price));
        Ok(())
    }
}
