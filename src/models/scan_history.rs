use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::disease::Disease;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ScanHistory {
    pub id: String,
    pub user_id: String,
    pub disease_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A history record with its disease resolved at read time. `disease` is
/// `null` once the catalog entry has been deleted.
#[derive(Debug, Clone, Serialize)]
pub struct ScanHistoryResponse {
    pub id: String,
    pub user_id: String,
    pub disease_id: String,
    pub disease: Option<Disease>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ScanHistoryResponse {
    pub fn new(record: ScanHistory, disease: Option<Disease>) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id,
            disease_id: record.disease_id,
            disease,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ScanHistoryListResponse {
    pub scan_histories: Vec<ScanHistoryResponse>,
    pub total: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateScanHistoryRequest {
    #[serde(default)]
    pub disease_id: String,
}
