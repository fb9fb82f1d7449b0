//! Wizard steps and the caller-side validation gates.
//!
//! The store itself never validates; each step's handler decides whether
//! the draft may advance. The experience gate only fires when the
//! in-progress form actually holds data, so an untouched form never
//! blocks navigation.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::models::resume::{is_year_month, DraftResume, Period};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum WizardStep {
    #[default]
    TitleContact,
    About,
    Experience,
    Skills,
    Languages,
    Recommendations,
}

impl WizardStep {
    pub const FIRST: WizardStep = WizardStep::TitleContact;
    pub const LAST: WizardStep = WizardStep::Recommendations;

    pub fn number(self) -> u8 {
        match self {
            WizardStep::TitleContact => 1,
            WizardStep::About => 2,
            WizardStep::Experience => 3,
            WizardStep::Skills => 4,
            WizardStep::Languages => 5,
            WizardStep::Recommendations => 6,
        }
    }

    pub fn from_number(number: u8) -> Option<WizardStep> {
        match number {
            1 => Some(WizardStep::TitleContact),
            2 => Some(WizardStep::About),
            3 => Some(WizardStep::Experience),
            4 => Some(WizardStep::Skills),
            5 => Some(WizardStep::Languages),
            6 => Some(WizardStep::Recommendations),
            _ => None,
        }
    }

    /// One step forward; a no-op at the last step.
    pub fn next(self) -> WizardStep {
        WizardStep::from_number(self.number() + 1).unwrap_or(self)
    }

    /// One step back; a no-op at the first step.
    pub fn prev(self) -> WizardStep {
        match self.number().checked_sub(1) {
            Some(n) => WizardStep::from_number(n).unwrap_or(self),
            None => self,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WizardStep::TitleContact => "Title & contact",
            WizardStep::About => "About",
            WizardStep::Experience => "Experience",
            WizardStep::Skills => "Skills",
            WizardStep::Languages => "Languages",
            WizardStep::Recommendations => "Recommendations",
        }
    }
}

// Persisted as the bare step number. Out-of-range numbers from older or
// hand-edited drafts fall back to step 1 instead of poisoning the load.
impl Serialize for WizardStep {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.number())
    }
}

impl<'de> Deserialize<'de> for WizardStep {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let number = u8::deserialize(deserializer)?;
        Ok(WizardStep::from_number(number).unwrap_or(WizardStep::FIRST))
    }
}

/// Gate for leaving the first step: name, title, email, and phone are
/// required before the draft may advance.
pub fn validate_contact(draft: &DraftResume) -> Result<(), String> {
    if draft.full_name.trim().is_empty() {
        return Err("Full name is required".to_string());
    }
    if draft.title.trim().is_empty() {
        return Err("Resume title is required".to_string());
    }
    if draft.email.trim().is_empty() {
        return Err("Email is required".to_string());
    }
    if draft.phone.trim().is_empty() {
        return Err("Phone is required".to_string());
    }
    Ok(())
}

/// The in-progress experience entry as the step's form holds it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExperienceForm {
    pub company: String,
    pub position: String,
    pub start_date: String,
    pub end_date: String,
    pub is_present: bool,
    pub description_raw: String,
    pub generated_description: String,
    pub editing_id: Option<Uuid>,
}

/// A validated form, ready to commit into the draft.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperienceCommit {
    pub editing_id: Option<Uuid>,
    pub company: String,
    pub position: String,
    pub period: Period,
    pub description: String,
    pub description_raw: String,
}

impl ExperienceForm {
    /// Whether the form holds anything worth committing. Editing an
    /// existing entry always counts as pending.
    pub fn has_pending_data(&self) -> bool {
        !self.company.trim().is_empty()
            || !self.position.trim().is_empty()
            || !self.start_date.is_empty()
            || !self.end_date.is_empty()
            || !self.description_raw.trim().is_empty()
            || !self.generated_description.is_empty()
            || self.editing_id.is_some()
    }

    /// Validates the form for commit. `Ok(None)` means the form was
    /// untouched and there is nothing to commit.
    pub fn into_commit(self) -> Result<Option<ExperienceCommit>, String> {
        if !self.has_pending_data() {
            return Ok(None);
        }

        if self.company.trim().is_empty() || self.position.trim().is_empty() || self.start_date.is_empty() {
            return Err("Fill in the required fields before continuing".to_string());
        }
        if !is_year_month(&self.start_date) {
            return Err("Start date must be in YYYY-MM format".to_string());
        }
        if !self.is_present {
            if self.end_date.is_empty() {
                return Err("Provide an end date or mark the position as current".to_string());
            }
            if !is_year_month(&self.end_date) {
                return Err("End date must be in YYYY-MM format".to_string());
            }
        }

        let description_raw = self.description_raw.trim().to_string();
        let description = if self.generated_description.is_empty() {
            description_raw.clone()
        } else {
            self.generated_description.clone()
        };

        Ok(Some(ExperienceCommit {
            editing_id: self.editing_id,
            company: self.company.trim().to_string(),
            position: self.position.trim().to_string(),
            period: Period::new(
                self.start_date,
                if self.is_present { None } else { Some(self.end_date) },
            ),
            description,
            description_raw,
        }))
    }
}

/// Recommendation form gate: every field is required.
pub fn validate_recommendation(name: &str, position: &str, contact: &str) -> Result<(), String> {
    if name.trim().is_empty() || position.trim().is_empty() || contact.trim().is_empty() {
        return Err("Fill in all recommendation fields".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_bounds_are_no_ops() {
        assert_eq!(WizardStep::FIRST.prev(), WizardStep::FIRST);
        assert_eq!(WizardStep::LAST.next(), WizardStep::LAST);
        assert_eq!(WizardStep::About.next(), WizardStep::Experience);
        assert_eq!(WizardStep::About.prev(), WizardStep::TitleContact);
    }

    #[test]
    fn test_step_serializes_as_number() {
        assert_eq!(serde_json::to_string(&WizardStep::Skills).unwrap(), "4");
        let step: WizardStep = serde_json::from_str("6").unwrap();
        assert_eq!(step, WizardStep::Recommendations);
    }

    #[test]
    fn test_out_of_range_step_falls_back_to_first() {
        let step: WizardStep = serde_json::from_str("42").unwrap();
        assert_eq!(step, WizardStep::FIRST);
        let step: WizardStep = serde_json::from_str("0").unwrap();
        assert_eq!(step, WizardStep::FIRST);
    }

    #[test]
    fn test_validate_contact_requires_all_four() {
        let mut draft = DraftResume {
            full_name: "Jane".to_string(),
            title: "Dev".to_string(),
            email: "a@b.com".to_string(),
            phone: "+1".to_string(),
            ..Default::default()
        };
        assert!(validate_contact(&draft).is_ok());

        draft.email.clear();
        assert!(validate_contact(&draft).is_err());
    }

    #[test]
    fn test_untouched_form_commits_nothing() {
        let form = ExperienceForm::default();
        assert!(!form.has_pending_data());
        assert_eq!(form.into_commit().unwrap(), None);
    }

    #[test]
    fn test_partial_form_blocks_commit() {
        let form = ExperienceForm {
            company: "Acme".to_string(),
            ..Default::default()
        };
        assert!(form.has_pending_data());
        assert!(form.into_commit().is_err());
    }

    #[test]
    fn test_missing_end_date_requires_present_flag() {
        let mut form = ExperienceForm {
            company: "Acme".to_string(),
            position: "Engineer".to_string(),
            start_date: "2021-03".to_string(),
            ..Default::default()
        };
        assert!(form.clone().into_commit().is_err());

        form.is_present = true;
        let commit = form.into_commit().unwrap().unwrap();
        assert_eq!(commit.period, Period::new("2021-03", None));
    }

    #[test]
    fn test_generated_description_wins_over_raw() {
        let form = ExperienceForm {
            company: "Acme".to_string(),
            position: "Engineer".to_string(),
            start_date: "2021-03".to_string(),
            end_date: "2022-01".to_string(),
            description_raw: "  raw notes  ".to_string(),
            generated_description: "Polished bullet".to_string(),
            ..Default::default()
        };
        let commit = form.into_commit().unwrap().unwrap();
        assert_eq!(commit.description, "Polished bullet");
        assert_eq!(commit.description_raw, "raw notes");
        assert_eq!(commit.period.end.as_deref(), Some("2022-01"));
    }

    #[test]
    fn test_bad_date_format_rejected() {
        let form = ExperienceForm {
            company: "Acme".to_string(),
            position: "Engineer".to_string(),
            start_date: "March 2021".to_string(),
            is_present: true,
            ..Default::default()
        };
        assert!(form.into_commit().is_err());
    }
}
