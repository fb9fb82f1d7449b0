//! Wizard HTTP handlers. Thin: validation gates from `steps`, mutation
//! through the store, AI generation bracketed by the in-flight flag.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ai;
use crate::builder::steps::{
    validate_contact, validate_recommendation, ExperienceCommit, ExperienceForm, WizardStep,
};
use crate::builder::store::{BuilderStore, ExperiencePatch, PersonalInfo};
use crate::errors::AppError;
use crate::models::resume::{storage_key, DraftResume, LanguageLevel, ResumeStyle};
use crate::models::stored::StoredResume;
use crate::state::AppState;

#[derive(Serialize)]
pub struct WizardStateView {
    pub current_step: u8,
    pub step_label: &'static str,
    pub resume_data: DraftResume,
    pub is_generating: bool,
    pub generation_error: Option<String>,
    pub editing_existing: bool,
}

#[derive(Serialize)]
pub struct StepView {
    pub current_step: u8,
    pub step_label: &'static str,
}

fn step_view(step: WizardStep) -> StepView {
    StepView {
        current_step: step.number(),
        step_label: step.label(),
    }
}

/// GET /api/v1/wizard
pub async fn handle_get_state(State(state): State<AppState>) -> Json<WizardStateView> {
    let snapshot = state.builder.snapshot();
    Json(WizardStateView {
        current_step: snapshot.current_step.number(),
        step_label: snapshot.current_step.label(),
        resume_data: snapshot.resume,
        is_generating: snapshot.is_generating,
        generation_error: snapshot.generation_error,
        editing_existing: snapshot.editing_existing,
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdvancePayload {
    pub experience_form: Option<ExperienceForm>,
}

fn commit_experience_form(
    store: &BuilderStore,
    form: ExperienceForm,
) -> Result<Option<Uuid>, AppError> {
    let Some(commit) = form.into_commit().map_err(AppError::Validation)? else {
        return Ok(None);
    };
    match commit.editing_id {
        Some(id) => {
            let ExperienceCommit {
                company,
                position,
                period,
                description,
                description_raw,
                ..
            } = commit;
            let patch = ExperiencePatch {
                company: Some(company),
                position: Some(position),
                period: Some(period),
                description: Some(description),
                description_raw: Some(description_raw),
            };
            if !store.update_experience(id, patch) {
                return Err(AppError::NotFound(format!("Experience {id} not found")));
            }
            Ok(Some(id))
        }
        None => Ok(Some(store.add_experience(&commit))),
    }
}

/// POST /api/v1/wizard/next
///
/// Applies the current step's gate before advancing.
pub async fn handle_next(
    State(state): State<AppState>,
    payload: Option<Json<AdvancePayload>>,
) -> Result<Json<StepView>, AppError> {
    let store = &state.builder;
    match store.current_step() {
        WizardStep::TitleContact => {
            validate_contact(&store.snapshot().resume).map_err(AppError::Validation)?;
        }
        WizardStep::Experience => {
            // Commit the in-progress form if it holds anything; an
            // untouched form never blocks navigation.
            if let Some(Json(payload)) = payload {
                if let Some(form) = payload.experience_form {
                    commit_experience_form(store, form)?;
                }
            }
        }
        _ => {}
    }
    Ok(Json(step_view(store.next_step())))
}

/// POST /api/v1/wizard/prev
pub async fn handle_prev(State(state): State<AppState>) -> Json<StepView> {
    Json(step_view(state.builder.prev_step()))
}

#[derive(Deserialize)]
pub struct GotoPayload {
    pub step: u8,
}

/// POST /api/v1/wizard/goto (edit mode only)
pub async fn handle_goto(
    State(state): State<AppState>,
    Json(payload): Json<GotoPayload>,
) -> Result<Json<StepView>, AppError> {
    let step = WizardStep::from_number(payload.step)
        .ok_or_else(|| AppError::Validation(format!("No such step: {}", payload.step)))?;
    let step = state.builder.go_to_step(step).map_err(AppError::Validation)?;
    Ok(Json(step_view(step)))
}

#[derive(Deserialize)]
pub struct TitlePayload {
    pub title: String,
}

/// PUT /api/v1/wizard/title
pub async fn handle_set_title(
    State(state): State<AppState>,
    Json(payload): Json<TitlePayload>,
) -> Result<(), AppError> {
    let title = payload.title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("Resume title is required".to_string()));
    }
    state.builder.set_title(title);
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AboutPayload {
    pub about: Option<String>,
    pub about_raw: Option<String>,
}

/// PUT /api/v1/wizard/about
pub async fn handle_set_about(State(state): State<AppState>, Json(payload): Json<AboutPayload>) {
    if let Some(about) = payload.about {
        state.builder.set_about(&about);
    }
    if let Some(about_raw) = payload.about_raw {
        state.builder.set_about_raw(&about_raw);
    }
}

/// PUT /api/v1/wizard/personal-info
pub async fn handle_set_personal_info(
    State(state): State<AppState>,
    Json(info): Json<PersonalInfo>,
) {
    state.builder.set_personal_info(info);
}

/// POST /api/v1/wizard/experience
///
/// Commits the step form, adding or editing in place via `editingId`.
pub async fn handle_commit_experience(
    State(state): State<AppState>,
    Json(form): Json<ExperienceForm>,
) -> Result<Json<serde_json::Value>, AppError> {
    match commit_experience_form(&state.builder, form)? {
        Some(id) => Ok(Json(serde_json::json!({"id": id}))),
        None => Err(AppError::Validation("The experience form is empty".to_string())),
    }
}

/// DELETE /api/v1/wizard/experience/:id
pub async fn handle_remove_experience(State(state): State<AppState>, Path(id): Path<Uuid>) {
    state.builder.remove_experience(id);
}

#[derive(Deserialize)]
pub struct SkillPayload {
    pub skill: String,
}

/// POST /api/v1/wizard/skills
///
/// Comma-separated input adds each trimmed skill; duplicates are
/// silently skipped.
pub async fn handle_add_skills(
    State(state): State<AppState>,
    Json(payload): Json<SkillPayload>,
) -> Json<serde_json::Value> {
    let added: Vec<String> = payload
        .skill
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter(|s| state.builder.add_skill(s))
        .map(String::from)
        .collect();
    Json(serde_json::json!({"added": added}))
}

/// DELETE /api/v1/wizard/skills
pub async fn handle_remove_skill(State(state): State<AppState>, Json(payload): Json<SkillPayload>) {
    state.builder.remove_skill(payload.skill.trim());
}

/// GET /api/v1/wizard/languages/suggestions
pub async fn handle_language_suggestions() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "languages": crate::render::locale::COMMON_LANGUAGES,
        "levels": ["native", "fluent", "intermediate", "basic"],
    }))
}

#[derive(Deserialize)]
pub struct LanguagePayload {
    pub name: String,
    pub level: LanguageLevel,
}

/// POST /api/v1/wizard/languages
pub async fn handle_add_language(
    State(state): State<AppState>,
    Json(payload): Json<LanguagePayload>,
) -> Result<Json<serde_json::Value>, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("Pick or enter a language".to_string()));
    }
    match state.builder.add_language(&payload.name, payload.level) {
        Some(id) => Ok(Json(serde_json::json!({"id": id}))),
        None => Err(AppError::Validation("This language is already added".to_string())),
    }
}

/// DELETE /api/v1/wizard/languages/:id
pub async fn handle_remove_language(State(state): State<AppState>, Path(id): Path<Uuid>) {
    state.builder.remove_language(id);
}

#[derive(Deserialize)]
pub struct RecommendationPayload {
    pub name: String,
    pub position: String,
    pub contact: String,
}

/// POST /api/v1/wizard/recommendations
pub async fn handle_add_recommendation(
    State(state): State<AppState>,
    Json(payload): Json<RecommendationPayload>,
) -> Result<Json<serde_json::Value>, AppError> {
    validate_recommendation(&payload.name, &payload.position, &payload.contact)
        .map_err(AppError::Validation)?;
    let id = state
        .builder
        .add_recommendation(&payload.name, &payload.position, &payload.contact);
    Ok(Json(serde_json::json!({"id": id})))
}

/// DELETE /api/v1/wizard/recommendations/:id
pub async fn handle_remove_recommendation(State(state): State<AppState>, Path(id): Path<Uuid>) {
    state.builder.remove_recommendation(id);
}

#[derive(Deserialize)]
pub struct StylePayload {
    pub style: ResumeStyle,
}

/// PUT /api/v1/wizard/style
pub async fn handle_set_style(State(state): State<AppState>, Json(payload): Json<StylePayload>) {
    state.builder.set_style(payload.style);
}

/// POST /api/v1/wizard/reset
pub async fn handle_reset(State(state): State<AppState>) {
    state.builder.reset().await;
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct InitializePayload {
    pub id: Option<Uuid>,
}

/// POST /api/v1/wizard/initialize
pub async fn handle_initialize(
    State(state): State<AppState>,
    payload: Option<Json<InitializePayload>>,
) -> Json<DraftResume> {
    let id = payload.and_then(|Json(p)| p.id);
    state.builder.initialize_resume(id);
    Json(state.builder.snapshot().resume)
}

/// POST /api/v1/wizard/hydrate/:id
///
/// Loads a stored builder resume into the wizard for editing.
pub async fn handle_hydrate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WizardStateView>, AppError> {
    let raw = state
        .kv
        .get(&storage_key(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;

    match StoredResume::parse(&raw) {
        Some(StoredResume::Built(doc)) => {
            state.builder.hydrate_resume(&doc);
            Ok(handle_get_state(State(state)).await)
        }
        Some(StoredResume::Analyzed(_)) => Err(AppError::Validation(
            "Uploaded resumes cannot be opened in the builder".to_string(),
        )),
        None => Err(AppError::Internal(anyhow::anyhow!(
            "Stored resume {id} is unreadable"
        ))),
    }
}

/// POST /api/v1/wizard/finish
///
/// Coerces the draft to a complete document and hard-saves it as the
/// system of record.
pub async fn handle_finish(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let snapshot = state.builder.snapshot();
    if snapshot.resume.title.trim().is_empty() {
        return Err(AppError::Validation("Fill in the resume title".to_string()));
    }

    let doc = state.builder.finalize();
    let key = doc.storage_key();
    let record = StoredResume::Built(doc.clone());
    let payload = serde_json::to_string(&record)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize resume: {e}")))?;
    state.kv.set(&key, &payload).await?;

    Ok(Json(serde_json::json!({"id": doc.id})))
}

// ── AI generation ───────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateAboutPayload {
    pub raw_text: Option<String>,
}

/// POST /api/v1/wizard/generate/about
pub async fn handle_generate_about(
    State(state): State<AppState>,
    payload: Option<Json<GenerateAboutPayload>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let snapshot = state.builder.snapshot();
    if snapshot.resume.title.trim().is_empty() {
        return Err(AppError::Validation("Set the resume title first".to_string()));
    }
    let raw = payload
        .and_then(|Json(p)| p.raw_text)
        .unwrap_or_else(|| snapshot.resume.about_raw.clone());
    if raw.trim().is_empty() {
        return Err(AppError::Validation(
            "Describe yourself before generating".to_string(),
        ));
    }

    state.builder.set_about_raw(&raw);
    state.builder.set_generating(true);
    let result = ai::generate_about_text(state.ai.as_ref(), &raw, &snapshot.resume.title).await;
    state.builder.set_generating(false);

    match result {
        Ok(about) => {
            state.builder.set_about(&about);
            state.builder.set_generation_error(None);
            Ok(Json(serde_json::json!({"about": about})))
        }
        Err(e) => {
            state.builder.set_generation_error(Some(e.to_string()));
            Err(e.into())
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateExperiencePayload {
    pub raw_description: String,
    pub company: String,
    pub position: String,
}

/// POST /api/v1/wizard/generate/experience
pub async fn handle_generate_experience(
    State(state): State<AppState>,
    Json(payload): Json<GenerateExperiencePayload>,
) -> Result<Json<serde_json::Value>, AppError> {
    let snapshot = state.builder.snapshot();
    if payload.raw_description.trim().is_empty() {
        return Err(AppError::Validation(
            "Describe what you did before generating".to_string(),
        ));
    }
    if payload.company.trim().is_empty() || payload.position.trim().is_empty() {
        return Err(AppError::Validation(
            "Fill in the company and position first".to_string(),
        ));
    }
    if snapshot.resume.title.trim().is_empty() {
        return Err(AppError::Validation("Set the resume title first".to_string()));
    }

    state.builder.set_generating(true);
    let result = ai::generate_experience_description(
        state.ai.as_ref(),
        &payload.raw_description,
        &payload.company,
        &payload.position,
        &snapshot.resume.title,
    )
    .await;
    state.builder.set_generating(false);

    match result {
        Ok(bullets) => {
            state.builder.set_generation_error(None);
            // Bullets join into the entry's description text.
            let description = bullets.join("\n");
            Ok(Json(serde_json::json!({
                "bullets": bullets,
                "description": description,
            })))
        }
        Err(e) => {
            state.builder.set_generation_error(Some(e.to_string()));
            Err(e.into())
        }
    }
}

/// POST /api/v1/wizard/generate/skills
pub async fn handle_generate_skills(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let snapshot = state.builder.snapshot();
    if snapshot.resume.title.trim().is_empty() {
        return Err(AppError::Validation("Set the resume title first".to_string()));
    }

    state.builder.set_generating(true);
    let result = ai::generate_suggested_skills(state.ai.as_ref(), &snapshot.resume.title).await;
    state.builder.set_generating(false);

    match result {
        Ok(skills) => {
            state.builder.set_generation_error(None);
            Ok(Json(serde_json::json!({"skills": skills})))
        }
        Err(e) => {
            state.builder.set_generation_error(Some(e.to_string()));
            Err(e.into())
        }
    }
}
