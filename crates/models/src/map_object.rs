use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::geometry::Shape;

pub const MAX_DESCRIPTION_CHARS: usize = 4096;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Pending,
    Approved,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Status::Pending => "pending",
            Status::Approved => "approved",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Zone,
    Transport,
    Road,
}

/// A persisted map annotation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapObject {
    pub id: u64,
    #[serde(flatten)]
    pub shape: Shape,
    // files written by the first backend keep the category under `type`
    #[serde(default, alias = "type", skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub status: Status,
    pub created_at: DateTime<Utc>,
}

/// Submission payload. Server-owned fields (`id`, `status`, `createdAt`) are ignored if sent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMapObject {
    #[serde(flatten)]
    pub shape: Shape,
    // older clients send the category as `type`
    #[serde(default, alias = "type", skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl NewMapObject {
    pub fn new(shape: Shape) -> Self {
        Self { shape, category: None, description: String::new(), color: None }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        self.shape.validate()?;
        validate_description(&self.description)?;
        if let Some(color) = &self.color {
            validate_color(color)?;
        }
        Ok(())
    }

    /// Build the stored record; status always starts as pending.
    pub fn into_record(self, id: u64, created_at: DateTime<Utc>) -> MapObject {
        MapObject {
            id,
            shape: self.shape,
            category: self.category,
            description: self.description,
            color: self.color,
            status: Status::Pending,
            created_at,
        }
    }
}

/// Partial update; only the fields present are merged into the record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapObjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl MapObjectPatch {
    pub fn status(status: Status) -> Self {
        Self { status: Some(status), ..Default::default() }
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.description.is_none() && self.category.is_none() && self.color.is_none()
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.is_empty() {
            return Err(ModelError::invalid("no updatable fields given"));
        }
        if let Some(d) = &self.description {
            validate_description(d)?;
        }
        if let Some(c) = &self.color {
            validate_color(c)?;
        }
        Ok(())
    }

    pub fn apply(self, record: &mut MapObject) {
        if let Some(s) = self.status { record.status = s; }
        if let Some(d) = self.description { record.description = d; }
        if let Some(c) = self.category { record.category = Some(c); }
        if let Some(c) = self.color { record.color = Some(c); }
    }
}

fn validate_description(d: &str) -> Result<(), ModelError> {
    if d.chars().count() > MAX_DESCRIPTION_CHARS {
        return Err(ModelError::invalid(format!("description longer than {MAX_DESCRIPTION_CHARS} characters")));
    }
    Ok(())
}

fn validate_color(c: &str) -> Result<(), ModelError> {
    if c.trim().is_empty() {
        return Err(ModelError::invalid("color must not be blank"));
    }
    Ok(())
}
