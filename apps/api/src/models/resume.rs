//! Resume document model — the canonical shape persisted to the platform KV
//! store, plus the partial draft shape owned by the builder wizard.
//!
//! Wire format is camelCase JSON so documents written by earlier deployments
//! keep loading. A draft is a superset-friendly version of the document:
//! identity and timestamps are optional until `initialize`, and every
//! collection defaults to empty.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResumeStyle {
    #[default]
    Modern,
    Classic,
    Minimal,
}

impl ResumeStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            ResumeStyle::Modern => "modern",
            ResumeStyle::Classic => "classic",
            ResumeStyle::Minimal => "minimal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageLevel {
    Native,
    Fluent,
    Intermediate,
    Basic,
}

/// Employment period. `end = None` means "present, ongoing". An empty
/// end string is normalized to `None` at the deserialization boundary so
/// the two spellings never coexist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub end: Option<String>,
}

impl Period {
    pub fn new(start: impl Into<String>, end: Option<String>) -> Self {
        Period {
            start: start.into(),
            end: end.filter(|e| !e.is_empty()),
        }
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

/// Checks the `YYYY-MM` period format used by the wizard date fields.
pub fn is_year_month(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 7 || bytes[4] != b'-' {
        return false;
    }
    if !bytes[..4].iter().all(u8::is_ascii_digit) || !bytes[5..].iter().all(u8::is_ascii_digit) {
        return false;
    }
    matches!(value[5..].parse::<u8>(), Ok(m) if (1..=12).contains(&m))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub id: Uuid,
    pub company: String,
    pub position: String,
    pub period: Period,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub description_raw: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    pub id: Uuid,
    pub name: String,
    pub level: LanguageLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub id: Uuid,
    pub name: String,
    pub position: String,
    pub contact: String,
}

/// A finalized resume document. The KV store is the system of record for
/// these; the in-memory draft stops being authoritative once one is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeData {
    pub id: Uuid,
    #[serde(default)]
    pub full_name: String,
    pub title: String,
    #[serde(default)]
    pub about: String,
    #[serde(default)]
    pub about_raw: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub linkedin: String,
    #[serde(default)]
    pub telegram: String,
    #[serde(default)]
    pub experiences: Vec<Experience>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub languages: Vec<Language>,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    #[serde(default)]
    pub style: ResumeStyle,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ResumeData {
    pub fn storage_key(&self) -> String {
        storage_key(self.id)
    }

    /// Display name for card surfaces. A document saved before the name
    /// field existed falls back to its title.
    pub fn display_name(&self) -> &str {
        if self.full_name.is_empty() {
            &self.title
        } else {
            &self.full_name
        }
    }
}

pub fn storage_key(id: Uuid) -> String {
    format!("resume:{id}")
}

/// The wizard's in-progress document. Identity and timestamps stay absent
/// until `initialize_resume` assigns them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftResume {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub about: String,
    #[serde(default)]
    pub about_raw: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub linkedin: String,
    #[serde(default)]
    pub telegram: String,
    #[serde(default)]
    pub experiences: Vec<Experience>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub languages: Vec<Language>,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    #[serde(default)]
    pub style: ResumeStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl DraftResume {
    /// Hydration coercion: a stored document replaces the draft wholesale,
    /// with every field passed through the defaulting rules.
    pub fn from_document(doc: &ResumeData) -> Self {
        DraftResume {
            id: Some(doc.id),
            full_name: doc.full_name.clone(),
            title: doc.title.clone(),
            about: doc.about.clone(),
            about_raw: doc.about_raw.clone(),
            location: doc.location.clone(),
            email: doc.email.clone(),
            phone: doc.phone.clone(),
            linkedin: doc.linkedin.clone(),
            telegram: doc.telegram.clone(),
            experiences: doc.experiences.clone(),
            skills: doc.skills.clone(),
            languages: doc.languages.clone(),
            recommendations: doc.recommendations.clone(),
            style: doc.style,
            created_at: Some(doc.created_at),
            updated_at: Some(doc.updated_at),
        }
    }

    /// Coerces the draft to a complete document without refreshing
    /// timestamps. Missing identity and timestamps fall back to `now`.
    pub fn to_document(&self, now: DateTime<Utc>) -> ResumeData {
        ResumeData {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            full_name: self.full_name.clone(),
            title: self.title.clone(),
            about: self.about.clone(),
            about_raw: self.about_raw.clone(),
            location: self.location.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            linkedin: self.linkedin.clone(),
            telegram: self.telegram.clone(),
            experiences: self.experiences.clone(),
            skills: self.skills.clone(),
            languages: self.languages.clone(),
            recommendations: self.recommendations.clone(),
            style: self.style,
            created_at: self.created_at.unwrap_or(now),
            updated_at: self.updated_at.unwrap_or(now),
        }
    }

    /// Finalize coercion: complete document with `updated_at` refreshed.
    pub fn finalize(&self, now: DateTime<Utc>) -> ResumeData {
        let mut doc = self.to_document(now);
        doc.updated_at = now;
        doc
    }
}
