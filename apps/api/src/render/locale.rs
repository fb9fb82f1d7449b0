//! Label tables for rendered documents. The display language follows the
//! document's own content, not the UI.

use crate::ai::language::{detect_language, SupportedLanguage};
use crate::models::resume::{LanguageLevel, ResumeData};

pub struct Labels {
    language: SupportedLanguage,
    pub present: &'static str,
    pub experience: &'static str,
    pub skills: &'static str,
    pub languages: &'static str,
    pub recommendations: &'static str,
}

impl Labels {
    pub fn level(&self, level: LanguageLevel) -> &'static str {
        match (self.language, level) {
            (SupportedLanguage::Ru, LanguageLevel::Native) => "Родной",
            (SupportedLanguage::Ru, LanguageLevel::Fluent) => "Свободно",
            (SupportedLanguage::Ru, LanguageLevel::Intermediate) => "Средний",
            (SupportedLanguage::Ru, LanguageLevel::Basic) => "Базовый",
            (SupportedLanguage::En, LanguageLevel::Native) => "Native",
            (SupportedLanguage::En, LanguageLevel::Fluent) => "Fluent",
            (SupportedLanguage::En, LanguageLevel::Intermediate) => "Intermediate",
            (SupportedLanguage::En, LanguageLevel::Basic) => "Basic",
        }
    }
}

const RU: Labels = Labels {
    language: SupportedLanguage::Ru,
    present: "По настоящее время",
    experience: "Опыт работы",
    skills: "Навыки",
    languages: "Языки",
    recommendations: "Рекомендации",
};

const EN: Labels = Labels {
    language: SupportedLanguage::En,
    present: "Present",
    experience: "Experience",
    skills: "Skills",
    languages: "Languages",
    recommendations: "Recommendations",
};

pub fn labels_for(language: SupportedLanguage) -> &'static Labels {
    match language {
        SupportedLanguage::Ru => &RU,
        SupportedLanguage::En => &EN,
    }
}

/// Detects the document language from its free-text fields.
pub fn document_language(resume: &ResumeData) -> SupportedLanguage {
    let mut texts: Vec<&str> = vec![&resume.full_name, &resume.title, &resume.about];
    for exp in &resume.experiences {
        texts.push(&exp.position);
        texts.push(&exp.description);
    }
    detect_language(texts)
}

/// Formats a `YYYY-MM` period date as `MM/YYYY`; anything else passes
/// through unchanged.
pub fn format_period_date(date: &str) -> String {
    match date.split_once('-') {
        Some((year, month)) if !year.is_empty() && !month.is_empty() => format!("{month}/{year}"),
        _ => date.to_string(),
    }
}

/// Suggested language names offered by the wizard's language step.
pub const COMMON_LANGUAGES: &[&str] = &[
    "Русский",
    "Английский",
    "Таджикский",
    "Немецкий",
    "Французский",
    "Испанский",
    "Итальянский",
    "Китайский",
    "Японский",
    "Корейский",
    "Арабский",
    "Турецкий",
    "Узбекский",
    "Казахский",
    "Украинский",
    "Польский",
    "Португальский",
    "Хинди",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_period_date() {
        assert_eq!(format_period_date("2023-04"), "04/2023");
        assert_eq!(format_period_date("1999-12"), "12/1999");
        assert_eq!(format_period_date("garbage"), "garbage");
    }

    #[test]
    fn test_level_labels() {
        let labels = labels_for(SupportedLanguage::En);
        assert_eq!(labels.level(LanguageLevel::Fluent), "Fluent");
        let labels = labels_for(SupportedLanguage::Ru);
        assert_eq!(labels.level(LanguageLevel::Native), "Родной");
    }
}
