use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A catalog entry. `class_name` is the classifier label and the public lookup key.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Disease {
    pub id: String,
    pub name: String,
    pub class_name: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub disease_type: String,
    pub description: String,
    pub solution: String,
    #[sqlx(json)]
    pub image_link: Vec<String>,
    pub plant_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateDiseaseRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub class_name: String,
    #[serde(default, rename = "type")]
    pub disease_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub solution: String,
    #[serde(default)]
    pub image_link: Vec<String>,
    #[serde(default)]
    pub plant_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDiseaseRequest {
    pub name: Option<String>,
    pub class_name: Option<String>,
    #[serde(rename = "type")]
    pub disease_type: Option<String>,
    pub description: Option<String>,
    pub solution: Option<String>,
    pub image_link: Option<Vec<String>>,
    pub plant_name: Option<String>,
}

impl UpdateDiseaseRequest {
    pub fn apply_to(self, d: &mut Disease) {
        if let Some(v) = self.name {
            d.name = v;
        }
        if let Some(v) = self.class_name {
            d.class_name = v;
        }
        if let Some(v) = self.disease_type {
            d.disease_type = v;
        }
        if let Some(v) = self.description {
            d.description = v;
        }
        if let Some(v) = self.solution {
            d.solution = v;
        }
        if let Some(v) = self.image_link {
            d.image_link = v;
        }
        if let Some(v) = self.plant_name {
            d.plant_name = v;
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DiseaseListResponse {
    pub diseases: Vec<Disease>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub pages: i64,
}

#[derive(Debug, Serialize)]
pub struct DiseaseCollection {
    pub diseases: Vec<Disease>,
    pub total: i64,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ImportRowError {
    pub row: usize,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct ImportReport {
    pub total_rows: usize,
    pub success_count: usize,
    pub error_count: usize,
    pub errors: Vec<ImportRowError>,
    pub created_diseases: Vec<Disease>,
}
