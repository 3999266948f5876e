use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{apply_patch, double_option};

/// A calendar entry. Activities are shared across accounts and carry no owner.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Activity {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub activity_type: String,
    pub description: Option<String>,
    pub description2: Option<String>,
    pub description3: Option<String>,
    pub time_start: Option<DateTime<Utc>>,
    pub time_end: Option<DateTime<Utc>>,
    /// All-day marker.
    pub day: Option<bool>,
    pub money: Option<f64>,
    pub is_repeat: Option<String>,
    pub repeat: Option<String>,
    pub end_repeat_day: Option<DateTime<Utc>>,
    pub alert_time: Option<String>,
    pub object: Option<String>,
    pub amount: Option<i64>,
    pub unit: Option<String>,
    pub purpose: Option<String>,
    pub target_person: Option<String>,
    pub source_person: Option<String>,
    pub attached_link: Option<String>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateActivityRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default, rename = "type")]
    pub activity_type: String,
    pub description: Option<String>,
    pub description2: Option<String>,
    pub description3: Option<String>,
    pub time_start: Option<DateTime<Utc>>,
    pub time_end: Option<DateTime<Utc>>,
    pub day: Option<bool>,
    pub money: Option<f64>,
    pub is_repeat: Option<String>,
    pub repeat: Option<String>,
    pub end_repeat_day: Option<DateTime<Utc>>,
    pub alert_time: Option<String>,
    pub object: Option<String>,
    pub amount: Option<i64>,
    pub unit: Option<String>,
    pub purpose: Option<String>,
    pub target_person: Option<String>,
    pub source_person: Option<String>,
    pub attached_link: Option<String>,
    pub note: Option<String>,
}

impl CreateActivityRequest {
    pub fn into_activity(self, id: String, now: DateTime<Utc>) -> Activity {
        Activity {
            id,
            title: self.title,
            activity_type: self.activity_type,
            description: self.description,
            description2: self.description2,
            description3: self.description3,
            time_start: self.time_start,
            time_end: self.time_end,
            day: self.day,
            money: self.money,
            is_repeat: self.is_repeat,
            repeat: self.repeat,
            end_repeat_day: self.end_repeat_day,
            alert_time: self.alert_time,
            object: self.object,
            amount: self.amount,
            unit: self.unit,
            purpose: self.purpose,
            target_person: self.target_person,
            source_person: self.source_person,
            attached_link: self.attached_link,
            note: self.note,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update. For nullable columns an explicit `null` clears the value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateActivityRequest {
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub activity_type: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub description2: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub description3: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub time_start: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "double_option")]
    pub time_end: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "double_option")]
    pub day: Option<Option<bool>>,
    #[serde(default, deserialize_with = "double_option")]
    pub money: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub is_repeat: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub repeat: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub end_repeat_day: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "double_option")]
    pub alert_time: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub object: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub amount: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub unit: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub purpose: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub target_person: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub source_person: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub attached_link: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub note: Option<Option<String>>,
}

impl UpdateActivityRequest {
    pub fn apply_to(self, a: &mut Activity) {
        if let Some(v) = self.title {
            a.title = v;
        }
        if let Some(v) = self.activity_type {
            a.activity_type = v;
        }
        apply_patch(&mut a.description, self.description);
        apply_patch(&mut a.description2, self.description2);
        apply_patch(&mut a.description3, self.description3);
        apply_patch(&mut a.time_start, self.time_start);
        apply_patch(&mut a.time_end, self.time_end);
        apply_patch(&mut a.day, self.day);
        apply_patch(&mut a.money, self.money);
        apply_patch(&mut a.is_repeat, self.is_repeat);
        apply_patch(&mut a.repeat, self.repeat);
        apply_patch(&mut a.end_repeat_day, self.end_repeat_day);
        apply_patch(&mut a.alert_time, self.alert_time);
        apply_patch(&mut a.object, self.object);
        apply_patch(&mut a.amount, self.amount);
        apply_patch(&mut a.unit, self.unit);
        apply_patch(&mut a.purpose, self.purpose);
        apply_patch(&mut a.target_person, self.target_person);
        apply_patch(&mut a.source_person, self.source_person);
        apply_patch(&mut a.attached_link, self.attached_link);
        apply_patch(&mut a.note, self.note);
    }
}

#[derive(Debug, Serialize)]
pub struct ActivityListResponse {
    pub activities: Vec<Activity>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

#[derive(Debug, Serialize)]
pub struct ActivityCollection {
    pub activities: Vec<Activity>,
    pub total: i64,
    pub count: usize,
}

/// Compact row for the single-day view.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ActivityDayItem {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub activity_type: String,
    pub time_start: Option<DateTime<Utc>>,
    pub time_end: Option<DateTime<Utc>>,
    pub day: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ActivityDayResponse {
    pub date: String,
    pub activities: Vec<ActivityDayItem>,
    pub count: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct DayQuery {
    pub date: Option<String>,
}

/// Raw values so that parse failures map to 400 with a specific message.
#[derive(Debug, Default, Deserialize)]
pub struct CalendarQuery {
    pub year: Option<String>,
    pub month: Option<String>,
}
