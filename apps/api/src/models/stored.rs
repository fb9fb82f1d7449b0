//! Stored record shapes for the `resume:<id>` KV namespace.
//!
//! Two record kinds live under the same prefix: resumes built with the
//! wizard, and uploaded resumes that went through the critique flow. New
//! writes carry an explicit `kind` discriminant; reads fall back to
//! structural discrimination so records persisted before the tag existed
//! keep loading.

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::models::resume::ResumeData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TipKind {
    Good,
    Improve,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tip {
    #[serde(rename = "type")]
    pub kind: TipKind,
    pub tip: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryFeedback {
    pub score: u32,
    pub tips: Vec<Tip>,
}

/// The ATS critique shape the AI collaborator is instructed to return:
/// an overall score plus five scored categories with tips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub overall_score: u32,
    #[serde(rename = "ATS")]
    pub ats: CategoryFeedback,
    pub tone_and_style: CategoryFeedback,
    pub content: CategoryFeedback,
    pub structure: CategoryFeedback,
    pub skills: CategoryFeedback,
}

/// Record for an uploaded resume that was (or is being) critiqued.
/// `feedback` stays `None` between record creation and critique completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzedResume {
    pub id: Uuid,
    pub resume_path: String,
    pub image_path: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub job_description: String,
    #[serde(default, deserialize_with = "feedback_or_empty")]
    pub feedback: Option<Feedback>,
}

/// Legacy records wrote `feedback: ""` before the critique finished.
fn feedback_or_empty<'de, D>(deserializer: D) -> Result<Option<Feedback>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::String(s) if s.is_empty() => Ok(None),
        other => serde_json::from_value(other)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoredResume {
    Built(ResumeData),
    Analyzed(AnalyzedResume),
}

impl StoredResume {
    pub fn id(&self) -> Uuid {
        match self {
            StoredResume::Built(doc) => doc.id,
            StoredResume::Analyzed(rec) => rec.id,
        }
    }

    /// Parses a stored value. Tagged records parse directly; untagged
    /// records are discriminated structurally (critique records carry
    /// `feedback` + `imagePath`, builder records carry `title` + `about`).
    /// Returns `None` for values that match neither shape; listing skips
    /// those per record instead of failing the whole list.
    pub fn parse(raw: &str) -> Option<StoredResume> {
        if let Ok(record) = serde_json::from_str::<StoredResume>(raw) {
            return Some(record);
        }

        let value: serde_json::Value = serde_json::from_str(raw).ok()?;
        let obj = value.as_object()?;
        if obj.contains_key("feedback") && obj.contains_key("imagePath") {
            serde_json::from_value(value).ok().map(StoredResume::Analyzed)
        } else if obj.contains_key("title") && obj.contains_key("about") {
            serde_json::from_value(value).ok().map(StoredResume::Built)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn built_doc() -> ResumeData {
        let now = Utc::now();
        ResumeData {
            id: Uuid::new_v4(),
            full_name: String::new(),
            title: "Designer".to_string(),
            about: "About text".to_string(),
            about_raw: String::new(),
            location: String::new(),
            email: String::new(),
            phone: String::new(),
            linkedin: String::new(),
            telegram: String::new(),
            experiences: vec![],
            skills: vec![],
            languages: vec![],
            recommendations: vec![],
            style: Default::default(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_tagged_round_trip() {
        let record = StoredResume::Built(built_doc());
        let raw = serde_json::to_string(&record).unwrap();
        assert!(raw.contains("\"kind\":\"built\""));
        assert_eq!(StoredResume::parse(&raw).unwrap(), record);
    }

    #[test]
    fn test_structural_fallback_for_untagged_built_record() {
        let doc = built_doc();
        let raw = serde_json::to_string(&doc).unwrap();
        match StoredResume::parse(&raw) {
            Some(StoredResume::Built(parsed)) => assert_eq!(parsed.id, doc.id),
            other => panic!("expected built record, got {other:?}"),
        }
    }

    #[test]
    fn test_structural_fallback_for_untagged_analyzed_record() {
        let raw = serde_json::json!({
            "id": Uuid::new_v4(),
            "resumePath": "/blobs/a.pdf",
            "imagePath": "/blobs/a.png",
            "companyName": "Acme",
            "jobTitle": "Engineer",
            "jobDescription": "Build things",
            "feedback": "",
        })
        .to_string();
        match StoredResume::parse(&raw) {
            Some(StoredResume::Analyzed(rec)) => assert_eq!(rec.feedback, None),
            other => panic!("expected analyzed record, got {other:?}"),
        }
    }

    #[test]
    fn test_unrecognized_record_is_skipped() {
        assert_eq!(StoredResume::parse("{\"foo\": 1}"), None);
        assert_eq!(StoredResume::parse("not json"), None);
    }

    #[test]
    fn test_feedback_shape_parses() {
        let raw = serde_json::json!({
            "overallScore": 78,
            "ATS": {"score": 80, "tips": [{"type": "good", "tip": "Clean layout"}]},
            "toneAndStyle": {"score": 70, "tips": [{"type": "improve", "tip": "Vary verbs", "explanation": "Repetitive openings"}]},
            "content": {"score": 75, "tips": []},
            "structure": {"score": 82, "tips": []},
            "skills": {"score": 77, "tips": []},
        });
        let feedback: Feedback = serde_json::from_value(raw).unwrap();
        assert_eq!(feedback.overall_score, 78);
        assert_eq!(feedback.ats.tips[0].kind, TipKind::Good);
        assert_eq!(feedback.tone_and_style.tips[0].explanation.as_deref(), Some("Repetitive openings"));
    }
}
