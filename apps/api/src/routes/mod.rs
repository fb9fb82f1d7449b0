pub mod analyze;
pub mod export;
pub mod health;
pub mod resumes;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::builder::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Stored resumes
        .route("/api/v1/resumes", get(resumes::handle_list))
        .route("/api/v1/resumes/analyze", post(analyze::handle_analyze))
        .route(
            "/api/v1/resumes/:id",
            get(resumes::handle_get).delete(resumes::handle_delete),
        )
        .route("/api/v1/resumes/:id/preview", get(resumes::handle_preview))
        .route("/api/v1/blobs", get(resumes::handle_blob))
        .route("/api/v1/resumes/:id/export", post(export::handle_export_pdf))
        .route("/api/v1/resumes/:id/evaluate", post(export::handle_evaluate))
        // Builder wizard
        .route("/api/v1/wizard", get(handlers::handle_get_state))
        .route("/api/v1/wizard/next", post(handlers::handle_next))
        .route("/api/v1/wizard/prev", post(handlers::handle_prev))
        .route("/api/v1/wizard/goto", post(handlers::handle_goto))
        .route("/api/v1/wizard/title", put(handlers::handle_set_title))
        .route("/api/v1/wizard/about", put(handlers::handle_set_about))
        .route(
            "/api/v1/wizard/personal-info",
            put(handlers::handle_set_personal_info),
        )
        .route(
            "/api/v1/wizard/experience",
            post(handlers::handle_commit_experience),
        )
        .route(
            "/api/v1/wizard/experience/:id",
            delete(handlers::handle_remove_experience),
        )
        .route(
            "/api/v1/wizard/skills",
            post(handlers::handle_add_skills).delete(handlers::handle_remove_skill),
        )
        .route("/api/v1/wizard/languages", post(handlers::handle_add_language))
        .route(
            "/api/v1/wizard/languages/suggestions",
            get(handlers::handle_language_suggestions),
        )
        .route(
            "/api/v1/wizard/languages/:id",
            delete(handlers::handle_remove_language),
        )
        .route(
            "/api/v1/wizard/recommendations",
            post(handlers::handle_add_recommendation),
        )
        .route(
            "/api/v1/wizard/recommendations/:id",
            delete(handlers::handle_remove_recommendation),
        )
        .route("/api/v1/wizard/style", put(handlers::handle_set_style))
        .route("/api/v1/wizard/reset", post(handlers::handle_reset))
        .route("/api/v1/wizard/initialize", post(handlers::handle_initialize))
        .route("/api/v1/wizard/hydrate/:id", post(handlers::handle_hydrate))
        .route("/api/v1/wizard/finish", post(handlers::handle_finish))
        // AI generation
        .route(
            "/api/v1/wizard/generate/about",
            post(handlers::handle_generate_about),
        )
        .route(
            "/api/v1/wizard/generate/experience",
            post(handlers::handle_generate_experience),
        )
        .route(
            "/api/v1/wizard/generate/skills",
            post(handlers::handle_generate_skills),
        )
        .with_state(state)
}
