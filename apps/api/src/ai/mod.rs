//! AI-assisted text generation for the builder wizard: about text,
//! experience bullets, and suggested skills.
//!
//! The collaborator returns unstructured text. Bullet and skill responses
//! are asked for as JSON arrays but parsed defensively: fenced output is
//! stripped first, JSON is attempted, and line/comma heuristics recover
//! what they can before the raw text is returned as a single item.

pub mod language;
pub mod prompts;

use thiserror::Error;
use tracing::warn;

use crate::platform::{AiClient, ChatOptions, PlatformError, CHAT_MODEL};
use language::detect_language;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("AI service error: {0}")]
    Platform(#[from] PlatformError),

    #[error("AI returned an empty response")]
    Empty,
}

/// Strips ```json ... ``` or ``` ... ``` fences and trims the result.
pub fn clean_response(text: &str) -> String {
    let text = text.trim();
    let stripped = if let Some(rest) = text.strip_prefix("```json") {
        rest.trim_start()
            .strip_suffix("```")
            .map(str::trim)
            .unwrap_or_else(|| rest.trim_start())
    } else if let Some(rest) = text.strip_prefix("```") {
        rest.trim_start()
            .strip_suffix("```")
            .map(str::trim)
            .unwrap_or_else(|| rest.trim_start())
    } else {
        text
    };
    stripped.trim().to_string()
}

fn json_string_array(text: &str) -> Option<Vec<String>> {
    let values: Vec<serde_json::Value> = serde_json::from_str(text).ok()?;
    Some(
        values
            .into_iter()
            .map(|v| match v {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            })
            .collect(),
    )
}

/// Parses an experience-description response into bullet points.
///
/// Order of attempts: JSON array → lines starting with `-` (marker
/// stripped) → the whole cleaned text as a single bullet.
pub fn parse_bullet_response(text: &str) -> Vec<String> {
    let cleaned = clean_response(text);

    if let Some(bullets) = json_string_array(&cleaned) {
        return bullets;
    }

    let dashed: Vec<String> = cleaned
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with('-'))
        .map(|line| line.trim_start_matches('-').trim_start().to_string())
        .filter(|line| !line.is_empty())
        .collect();
    if !dashed.is_empty() {
        return dashed;
    }

    vec![cleaned]
}

/// Parses a suggested-skills response. Falls back to splitting on commas
/// and newlines, trimming stray quotes and dashes.
pub fn parse_skill_response(text: &str) -> Vec<String> {
    let cleaned = clean_response(text);

    if let Some(skills) = json_string_array(&cleaned) {
        return skills
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }

    cleaned
        .split(['\n', ','])
        .map(|part| part.trim().trim_matches(['"', '\'', '-']).trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

async fn chat_text(ai: &dyn AiClient, prompt: &str) -> Result<String, GenerationError> {
    let response = ai.chat(prompt, &ChatOptions::with_model(CHAT_MODEL)).await?;
    let text = response.text().to_string();
    if text.trim().is_empty() {
        warn!("AI chat returned empty content");
        return Err(GenerationError::Empty);
    }
    Ok(text)
}

/// Generates the finalized "About" section from the user's raw notes.
pub async fn generate_about_text(
    ai: &dyn AiClient,
    raw_text: &str,
    profession: &str,
) -> Result<String, GenerationError> {
    let lang = detect_language([raw_text, profession]);
    let prompt = prompts::about_prompt(raw_text, profession, lang);
    let text = chat_text(ai, &prompt).await?;
    Ok(clean_response(&text))
}

/// Generates bullet points for one experience entry.
pub async fn generate_experience_description(
    ai: &dyn AiClient,
    raw_description: &str,
    company: &str,
    position: &str,
    profession: &str,
) -> Result<Vec<String>, GenerationError> {
    let lang = detect_language([raw_description, company, position, profession]);
    let prompt =
        prompts::experience_description_prompt(raw_description, company, position, profession, lang);
    let text = chat_text(ai, &prompt).await?;
    Ok(parse_bullet_response(&text))
}

/// Suggests skills for the target profession.
pub async fn generate_suggested_skills(
    ai: &dyn AiClient,
    profession: &str,
) -> Result<Vec<String>, GenerationError> {
    let lang = detect_language([profession]);
    let prompt = prompts::suggested_skills_prompt(profession, lang);
    let text = chat_text(ai, &prompt).await?;
    Ok(parse_skill_response(&text))
}
