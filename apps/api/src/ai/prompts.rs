//! Prompt builders for the AI collaborator.

use crate::ai::language::{language_instruction, SupportedLanguage};

pub fn about_prompt(raw_text: &str, profession: &str, language: SupportedLanguage) -> String {
    format!(
        r#"You are an expert resume writer. Your task is to create a professional "About" section for a resume.

The user's profession/target position is: {profession}

The user has provided the following raw information about themselves:
{raw_text}

Based on this information, create a professional, concise, and compelling "About" section for their resume. The text should:
- Be 3-4 sentences long
- Highlight key strengths and experience relevant to {profession}
- Use professional language and a confident tone
- Be ATS-friendly (avoid excessive formatting characters)
- Focus on achievements and value proposition

{instruction}

Return ONLY the generated text, without any additional comments, explanations, or markdown formatting."#,
        instruction = language_instruction(language),
    )
}

pub fn experience_description_prompt(
    raw_description: &str,
    company: &str,
    position: &str,
    profession: &str,
    language: SupportedLanguage,
) -> String {
    format!(
        r#"You are an expert resume writer. Your task is to create a professional job description for a resume entry.

The user's target profession is: {profession}
Company: {company}
Position: {position}

The user has provided the following raw information about their work:
{raw_description}

Based on this information, create a professional job description with 3-5 bullet points. Each bullet point should:
- Start with a strong action verb
- Be specific and quantifiable when possible
- Highlight achievements and impact
- Be relevant to {profession}
- Be ATS-friendly

{instruction}

Format the response as a JSON array of strings, where each string is a bullet point. Example format:
["Achieved X by doing Y", "Led team of Z to accomplish W", "Improved metrics by X%"]

Return ONLY the JSON array, without any additional text, comments, or markdown formatting."#,
        instruction = language_instruction(language),
    )
}

pub fn suggested_skills_prompt(profession: &str, language: SupportedLanguage) -> String {
    format!(
        r#"You are an expert career advisor. Your task is to suggest relevant skills for a resume.

The target profession is: {profession}

Based on this profession, suggest 10-15 relevant skills that would be important for this role. Include:
- Technical skills specific to the profession
- Soft skills that are valuable
- Tools and technologies commonly used

{instruction}

Return the skills as a JSON array of strings. Example format:
["Skill 1", "Skill 2", "Skill 3"]

Return ONLY the JSON array, without any additional text, comments, or markdown formatting."#,
        instruction = language_instruction(language),
    )
}

/// Instructions for the ATS critique call. The response contract is pinned
/// to the exact JSON shape `models::stored::Feedback` deserializes.
pub fn feedback_instructions(job_title: &str, job_description: &str) -> String {
    format!(
        r#"You are an expert in ATS (Applicant Tracking Systems) and resume review.
Analyze the attached resume and rate it honestly. Low scores are acceptable when deserved.

Target job title: {job_title}
Job description:
{job_description}

If a job description is provided, weigh the analysis against it.

Respond ONLY with a JSON object of this exact shape, using integer scores from 0 to 100
and 3-4 tips per category:
{{
  "overallScore": number,
  "ATS": {{"score": number, "tips": [{{"type": "good" | "improve", "tip": string}}]}},
  "toneAndStyle": {{"score": number, "tips": [{{"type": "good" | "improve", "tip": string, "explanation": string}}]}},
  "content": {{"score": number, "tips": [{{"type": "good" | "improve", "tip": string, "explanation": string}}]}},
  "structure": {{"score": number, "tips": [{{"type": "good" | "improve", "tip": string, "explanation": string}}]}},
  "skills": {{"score": number, "tips": [{{"type": "good" | "improve", "tip": string, "explanation": string}}]}}
}}

Return the JSON object without any backticks, comments, or surrounding text."#,
    )
}
