//! Request validation. Every check runs before the store is touched; the first
//! failing rule is reported as a 400.

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, Utc};
use regex::Regex;

use crate::db::{MAX_TS_YEAR, MIN_TS_YEAR};
use crate::error::AppError;
use crate::models::activity::{CreateActivityRequest, UpdateActivityRequest};
use crate::models::comment::CreateCommentRequest;
use crate::models::disease::{CreateDiseaseRequest, UpdateDiseaseRequest};
use crate::models::post::{CreatePostRequest, UpdatePostRequest};
use crate::models::user::{RegisterRequest, UpdateProfileRequest, UserRole};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9._%+\-]+@[a-z0-9.\-]+\.[a-z]{2,}$").expect("EMAIL_RE: invalid regex pattern")
});
static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("USERNAME_RE: invalid regex pattern"));

pub const DISEASE_MAX_IMAGES: usize = 20;
pub const POST_MAX_IMAGES: usize = 5;
pub const POST_MAX_TAGS: usize = 5;
pub const IMAGE_LINK_MAX_LEN: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::BadRequest(err.0)
    }
}

type Checked = Result<(), ValidationError>;

fn fail(msg: impl Into<String>) -> Checked {
    Err(ValidationError(msg.into()))
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn required(label: &str, value: &str, max: usize) -> Checked {
    if value.trim().is_empty() {
        return fail(format!("{} is required", label));
    }
    max_len(label, value, max)
}

fn max_len(label: &str, value: &str, max: usize) -> Checked {
    if char_len(value) > max {
        return fail(format!("{} must be less than {} characters", label, max));
    }
    Ok(())
}

fn opt_max_len(label: &str, value: Option<&str>, max: usize) -> Checked {
    value.map_or(Ok(()), |v| max_len(label, v, max))
}

/// Patch semantics: present but blank is an error, absent is fine.
fn not_blank_if_present(label: &str, value: Option<&str>, max: usize) -> Checked {
    match value {
        Some(v) if v.trim().is_empty() => fail(format!("{} cannot be empty", label)),
        Some(v) => max_len(label, v, max),
        None => Ok(()),
    }
}

fn links(label: &str, values: &[String], max_items: usize) -> Checked {
    if values.len() > max_items {
        return fail(format!("{} array cannot have more than {} items", label, max_items));
    }
    if values.iter().any(|l| char_len(l) > IMAGE_LINK_MAX_LEN) {
        return fail(format!("each {} must be less than {} characters", label, IMAGE_LINK_MAX_LEN));
    }
    Ok(())
}

pub fn email(value: &str) -> Checked {
    let value = value.trim();
    if value.is_empty() {
        return fail("email is required");
    }
    if !EMAIL_RE.is_match(&value.to_lowercase()) {
        return fail("invalid email format");
    }
    Ok(())
}

pub fn username(value: &str) -> Checked {
    let value = value.trim();
    if value.is_empty() {
        return fail("username is required");
    }
    let len = char_len(value);
    if len < 3 {
        return fail("username must be at least 3 characters long");
    }
    if len > 50 {
        return fail("username must be less than 50 characters");
    }
    if !USERNAME_RE.is_match(value) {
        return fail("username can only contain letters, numbers, and underscores");
    }
    Ok(())
}

pub fn password(value: &str) -> Checked {
    if value.is_empty() {
        return fail("password is required");
    }
    let len = char_len(value);
    if len < 6 {
        return fail("password must be at least 6 characters long");
    }
    if len > 100 {
        return fail("password must be less than 100 characters");
    }
    Ok(())
}

fn full_name(value: &str) -> Checked {
    required("full name", value, 100)
}

/// Returns the requested role (default `user`).
pub fn register(req: &RegisterRequest) -> Result<UserRole, ValidationError> {
    email(&req.email)?;
    username(&req.username)?;
    password(&req.password)?;
    full_name(&req.full_name)?;
    match req.role.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
        None => Ok(UserRole::User),
        Some(raw) => UserRole::parse(raw)
            .ok_or_else(|| ValidationError("role must be either 'user' or 'admin'".to_string())),
    }
}

pub fn update_profile(req: &UpdateProfileRequest) -> Checked {
    if let Some(name) = req.username.as_deref() {
        username(name)?;
    }
    if let Some(name) = req.full_name.as_deref() {
        full_name(name)?;
    }
    opt_max_len("avatar", req.avatar.as_deref(), IMAGE_LINK_MAX_LEN)
}

pub fn create_disease(req: &CreateDiseaseRequest) -> Checked {
    required("disease name", &req.name, 255)?;
    required("class name", &req.class_name, 255)?;
    required("disease type", &req.disease_type, 100)?;
    max_len("description", &req.description, 5000)?;
    max_len("solution", &req.solution, 5000)?;
    links("image link", &req.image_link, DISEASE_MAX_IMAGES)?;
    max_len("plant name", &req.plant_name, 255)
}

pub fn update_disease(req: &UpdateDiseaseRequest) -> Checked {
    not_blank_if_present("disease name", req.name.as_deref(), 255)?;
    not_blank_if_present("class name", req.class_name.as_deref(), 255)?;
    not_blank_if_present("disease type", req.disease_type.as_deref(), 100)?;
    opt_max_len("description", req.description.as_deref(), 5000)?;
    opt_max_len("solution", req.solution.as_deref(), 5000)?;
    if let Some(l) = req.image_link.as_deref() {
        links("image link", l, DISEASE_MAX_IMAGES)?;
    }
    opt_max_len("plant name", req.plant_name.as_deref(), 255)
}

struct ActivityFields<'a> {
    description: Option<&'a str>,
    description2: Option<&'a str>,
    description3: Option<&'a str>,
    is_repeat: Option<&'a str>,
    repeat: Option<&'a str>,
    alert_time: Option<&'a str>,
    object: Option<&'a str>,
    unit: Option<&'a str>,
    purpose: Option<&'a str>,
    target_person: Option<&'a str>,
    source_person: Option<&'a str>,
    attached_link: Option<&'a str>,
    note: Option<&'a str>,
    money: Option<f64>,
    amount: Option<i64>,
}

fn activity_fields(f: &ActivityFields<'_>) -> Checked {
    opt_max_len("description", f.description, 1000)?;
    opt_max_len("description2", f.description2, 1000)?;
    opt_max_len("description3", f.description3, 1000)?;
    opt_max_len("is_repeat", f.is_repeat, 50)?;
    opt_max_len("repeat", f.repeat, 50)?;
    opt_max_len("alert_time", f.alert_time, 50)?;
    opt_max_len("object", f.object, 255)?;
    opt_max_len("unit", f.unit, 50)?;
    opt_max_len("purpose", f.purpose, 1000)?;
    opt_max_len("target_person", f.target_person, 255)?;
    opt_max_len("source_person", f.source_person, 255)?;
    opt_max_len("attached_link", f.attached_link, 1000)?;
    opt_max_len("note", f.note, 1000)?;
    if f.money.is_some_and(|m| m < 0.0 || !m.is_finite()) {
        return fail("money must be non-negative");
    }
    if f.amount.is_some_and(|a| a < 0) {
        return fail("amount must be non-negative");
    }
    Ok(())
}

/// Timestamps outside four-digit years would break the sortable column layout.
fn storable_time(label: &str, value: Option<DateTime<Utc>>) -> Checked {
    if value.is_some_and(|t| !(MIN_TS_YEAR..=MAX_TS_YEAR).contains(&t.year())) {
        return fail(format!("{} must fall between years {} and {}", label, MIN_TS_YEAR, MAX_TS_YEAR));
    }
    Ok(())
}

pub fn create_activity(req: &CreateActivityRequest) -> Checked {
    required("title", &req.title, 255)?;
    required("type", &req.activity_type, 255)?;
    activity_fields(&ActivityFields {
        description: req.description.as_deref(),
        description2: req.description2.as_deref(),
        description3: req.description3.as_deref(),
        is_repeat: req.is_repeat.as_deref(),
        repeat: req.repeat.as_deref(),
        alert_time: req.alert_time.as_deref(),
        object: req.object.as_deref(),
        unit: req.unit.as_deref(),
        purpose: req.purpose.as_deref(),
        target_person: req.target_person.as_deref(),
        source_person: req.source_person.as_deref(),
        attached_link: req.attached_link.as_deref(),
        note: req.note.as_deref(),
        money: req.money,
        amount: req.amount,
    })?;
    storable_time("time_start", req.time_start)?;
    storable_time("time_end", req.time_end)?;
    storable_time("end_repeat_day", req.end_repeat_day)?;
    time_range(req.time_start, req.time_end)
}

/// Field rules only; the time range is checked against the merged row.
pub fn update_activity(req: &UpdateActivityRequest) -> Checked {
    fn inner<T: AsRef<str>>(v: &Option<Option<T>>) -> Option<&str> {
        v.as_ref().and_then(|o| o.as_ref()).map(AsRef::as_ref)
    }
    not_blank_if_present("title", req.title.as_deref(), 255)?;
    not_blank_if_present("type", req.activity_type.as_deref(), 255)?;
    activity_fields(&ActivityFields {
        description: inner(&req.description),
        description2: inner(&req.description2),
        description3: inner(&req.description3),
        is_repeat: inner(&req.is_repeat),
        repeat: inner(&req.repeat),
        alert_time: inner(&req.alert_time),
        object: inner(&req.object),
        unit: inner(&req.unit),
        purpose: inner(&req.purpose),
        target_person: inner(&req.target_person),
        source_person: inner(&req.source_person),
        attached_link: inner(&req.attached_link),
        note: inner(&req.note),
        money: req.money.flatten(),
        amount: req.amount.flatten(),
    })?;
    storable_time("time_start", req.time_start.flatten())?;
    storable_time("time_end", req.time_end.flatten())?;
    storable_time("end_repeat_day", req.end_repeat_day.flatten())
}

pub fn time_range(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Checked {
    if let (Some(s), Some(e)) = (start, end) {
        if e < s {
            return fail("time_end must not be before time_start");
        }
    }
    Ok(())
}

pub fn create_post(req: &CreatePostRequest) -> Checked {
    required("post content", &req.content, 5000)?;
    links("image link", &req.image_link, POST_MAX_IMAGES)?;
    tags(&req.tags)
}

pub fn update_post(req: &UpdatePostRequest) -> Checked {
    not_blank_if_present("post content", req.content.as_deref(), 5000)?;
    if let Some(l) = req.image_link.as_deref() {
        links("image link", l, POST_MAX_IMAGES)?;
    }
    if let Some(t) = req.tags.as_deref() {
        tags(t)?;
    }
    Ok(())
}

fn tags(values: &[String]) -> Checked {
    if values.len() > POST_MAX_TAGS {
        return fail(format!("tags array cannot have more than {} items", POST_MAX_TAGS));
    }
    Ok(())
}

pub fn create_comment(req: &CreateCommentRequest) -> Checked {
    required("content", &req.content, 2000)
}

pub fn uuid(label: &str, value: &str) -> Result<uuid::Uuid, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError(format!("{} is required", label)));
    }
    uuid::Uuid::parse_str(value).map_err(|_| ValidationError(format!("{} must be a valid UUID", label)))
}
