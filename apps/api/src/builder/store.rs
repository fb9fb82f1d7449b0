//! The wizard state machine. Owns the in-progress draft, the current
//! step, and the generation-in-flight flags, and triggers a debounced
//! durable write after every draft or step mutation.
//!
//! The store itself stays permissive; step gates live with the callers
//! (`steps`) so edit mode can relax them without touching this code.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::Utc;
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use crate::builder::persist::{DebouncedSaver, DraftStore, PersistedDraft};
use crate::builder::steps::{ExperienceCommit, WizardStep};
use crate::models::resume::{
    DraftResume, Experience, Language, LanguageLevel, Period, Recommendation, ResumeData,
    ResumeStyle,
};

#[derive(Debug, Clone, Default)]
pub struct BuilderState {
    pub current_step: WizardStep,
    pub resume: DraftResume,
    pub is_generating: bool,
    pub generation_error: Option<String>,
    /// Set by hydration; unlocks direct step navigation.
    pub editing_existing: bool,
}

/// Bulk-merge payload for the contact fields; absent fields are left
/// untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfo {
    pub full_name: Option<String>,
    pub location: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub linkedin: Option<String>,
    pub telegram: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExperiencePatch {
    pub company: Option<String>,
    pub position: Option<String>,
    pub period: Option<Period>,
    pub description: Option<String>,
    pub description_raw: Option<String>,
}

pub struct BuilderStore {
    state: RwLock<BuilderState>,
    saver: DebouncedSaver,
}

impl BuilderStore {
    /// Loads prior state from the draft store; unreadable or absent
    /// records fall back to empty defaults without surfacing an error.
    pub async fn open(store: Arc<dyn DraftStore>, debounce: Duration) -> Self {
        let initial = match store.load().await {
            Ok(Some(payload)) => match serde_json::from_str::<PersistedDraft>(&payload) {
                Ok(persisted) => BuilderState {
                    current_step: persisted.current_step,
                    resume: persisted.resume_data,
                    ..Default::default()
                },
                Err(e) => {
                    warn!("Ignoring unreadable persisted draft: {e}");
                    BuilderState::default()
                }
            },
            Ok(None) => BuilderState::default(),
            Err(e) => {
                warn!("Failed to load persisted draft: {e}");
                BuilderState::default()
            }
        };

        BuilderStore {
            state: RwLock::new(initial),
            saver: DebouncedSaver::new(store, debounce),
        }
    }

    pub fn snapshot(&self) -> BuilderState {
        self.state.read().expect("state lock").clone()
    }

    /// Runs a mutation and schedules a debounced write of the resulting
    /// `{current_step, resume_data}` snapshot. Ephemeral flags never
    /// reach storage.
    fn mutate_and_persist<R>(&self, mutate: impl FnOnce(&mut BuilderState) -> R) -> R {
        let (result, persisted) = {
            let mut state = self.state.write().expect("state lock");
            let result = mutate(&mut state);
            (
                result,
                PersistedDraft {
                    current_step: state.current_step,
                    resume_data: state.resume.clone(),
                },
            )
        };
        match serde_json::to_string(&persisted) {
            Ok(payload) => self.saver.schedule(payload),
            Err(e) => warn!("Failed to serialize draft snapshot: {e}"),
        }
        result
    }

    // ── Navigation ──────────────────────────────────────────────────────

    pub fn current_step(&self) -> WizardStep {
        self.state.read().expect("state lock").current_step
    }

    /// Moves one step forward; a no-op at the last step.
    pub fn next_step(&self) -> WizardStep {
        if self.current_step() == WizardStep::LAST {
            return WizardStep::LAST;
        }
        self.mutate_and_persist(|state| {
            state.current_step = state.current_step.next();
            state.current_step
        })
    }

    /// Moves one step back; a no-op at the first step.
    pub fn prev_step(&self) -> WizardStep {
        if self.current_step() == WizardStep::FIRST {
            return WizardStep::FIRST;
        }
        self.mutate_and_persist(|state| {
            state.current_step = state.current_step.prev();
            state.current_step
        })
    }

    /// Jumps to an arbitrary step. Only allowed while editing an existing
    /// document; the first-time create flow stays strictly linear.
    pub fn go_to_step(&self, step: WizardStep) -> Result<WizardStep, String> {
        if !self.state.read().expect("state lock").editing_existing {
            return Err("Direct step navigation is only available when editing an existing resume".to_string());
        }
        Ok(self.mutate_and_persist(|state| {
            state.current_step = step;
            state.current_step
        }))
    }

    // ── Draft mutators ──────────────────────────────────────────────────

    pub fn set_title(&self, title: &str) {
        self.mutate_and_persist(|state| state.resume.title = title.to_string());
    }

    pub fn set_about(&self, about: &str) {
        self.mutate_and_persist(|state| state.resume.about = about.to_string());
    }

    pub fn set_about_raw(&self, about_raw: &str) {
        self.mutate_and_persist(|state| state.resume.about_raw = about_raw.to_string());
    }

    pub fn set_personal_info(&self, info: PersonalInfo) {
        self.mutate_and_persist(|state| {
            let resume = &mut state.resume;
            if let Some(full_name) = info.full_name {
                resume.full_name = full_name;
            }
            if let Some(location) = info.location {
                resume.location = location;
            }
            if let Some(email) = info.email {
                resume.email = email;
            }
            if let Some(phone) = info.phone {
                resume.phone = phone;
            }
            if let Some(linkedin) = info.linkedin {
                resume.linkedin = linkedin;
            }
            if let Some(telegram) = info.telegram {
                resume.telegram = telegram;
            }
        });
    }

    pub fn add_experience(&self, commit: &ExperienceCommit) -> Uuid {
        let id = Uuid::new_v4();
        self.mutate_and_persist(|state| {
            state.resume.experiences.push(Experience {
                id,
                company: commit.company.clone(),
                position: commit.position.clone(),
                period: commit.period.clone(),
                description: commit.description.clone(),
                description_raw: commit.description_raw.clone(),
            });
        });
        id
    }

    /// Merges fields into the matching entry; a no-op when the id is
    /// absent.
    pub fn update_experience(&self, id: Uuid, patch: ExperiencePatch) -> bool {
        let exists = self
            .state
            .read()
            .expect("state lock")
            .resume
            .experiences
            .iter()
            .any(|e| e.id == id);
        if !exists {
            return false;
        }
        self.mutate_and_persist(|state| {
            if let Some(exp) = state.resume.experiences.iter_mut().find(|e| e.id == id) {
                if let Some(company) = patch.company {
                    exp.company = company;
                }
                if let Some(position) = patch.position {
                    exp.position = position;
                }
                if let Some(period) = patch.period {
                    exp.period = period;
                }
                if let Some(description) = patch.description {
                    exp.description = description;
                }
                if let Some(description_raw) = patch.description_raw {
                    exp.description_raw = description_raw;
                }
            }
        });
        true
    }

    pub fn remove_experience(&self, id: Uuid) {
        self.mutate_and_persist(|state| state.resume.experiences.retain(|e| e.id != id));
    }

    /// Trims and appends. Returns false (leaving the list untouched) for
    /// empty input or an exact-match duplicate.
    pub fn add_skill(&self, skill: &str) -> bool {
        let trimmed = skill.trim();
        if trimmed.is_empty() {
            return false;
        }
        {
            let state = self.state.read().expect("state lock");
            if state.resume.skills.iter().any(|s| s == trimmed) {
                return false;
            }
        }
        self.mutate_and_persist(|state| state.resume.skills.push(trimmed.to_string()));
        true
    }

    pub fn remove_skill(&self, skill: &str) {
        self.mutate_and_persist(|state| state.resume.skills.retain(|s| s != skill));
    }

    /// Appends a language. Names are unique (case-sensitive) within a
    /// document; duplicates are rejected at add time.
    pub fn add_language(&self, name: &str, level: LanguageLevel) -> Option<Uuid> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        {
            let state = self.state.read().expect("state lock");
            if state.resume.languages.iter().any(|l| l.name == name) {
                return None;
            }
        }
        let id = Uuid::new_v4();
        self.mutate_and_persist(|state| {
            state.resume.languages.push(Language {
                id,
                name: name.to_string(),
                level,
            });
        });
        Some(id)
    }

    pub fn remove_language(&self, id: Uuid) {
        self.mutate_and_persist(|state| state.resume.languages.retain(|l| l.id != id));
    }

    pub fn add_recommendation(&self, name: &str, position: &str, contact: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.mutate_and_persist(|state| {
            state.resume.recommendations.push(Recommendation {
                id,
                name: name.trim().to_string(),
                position: position.trim().to_string(),
                contact: contact.trim().to_string(),
            });
        });
        id
    }

    pub fn remove_recommendation(&self, id: Uuid) {
        self.mutate_and_persist(|state| state.resume.recommendations.retain(|r| r.id != id));
    }

    pub fn set_style(&self, style: ResumeStyle) {
        self.mutate_and_persist(|state| state.resume.style = style);
    }

    // ── Ephemeral flags (never persisted) ───────────────────────────────

    pub fn set_generating(&self, is_generating: bool) {
        self.state.write().expect("state lock").is_generating = is_generating;
    }

    pub fn set_generation_error(&self, error: Option<String>) {
        self.state.write().expect("state lock").generation_error = error;
    }

    pub fn is_generating(&self) -> bool {
        self.state.read().expect("state lock").is_generating
    }

    // ── Lifecycle ───────────────────────────────────────────────────────

    /// Assigns identity and timestamps, once. Calling again without a
    /// reset leaves the existing id and created_at untouched, so a
    /// remount never clobbers an in-progress draft.
    pub fn initialize_resume(&self, id: Option<Uuid>) {
        if self.state.read().expect("state lock").resume.id.is_some() {
            return;
        }
        let now = Utc::now();
        self.mutate_and_persist(|state| {
            state.resume.id = Some(id.unwrap_or_else(Uuid::new_v4));
            state.resume.created_at = Some(now);
            state.resume.updated_at = Some(now);
        });
    }

    /// Replaces the whole draft with a stored document (coerced through
    /// the defaulting rules), returns to step 1, clears ephemeral flags,
    /// and unlocks direct navigation.
    pub fn hydrate_resume(&self, doc: &ResumeData) {
        self.mutate_and_persist(|state| {
            state.current_step = WizardStep::FIRST;
            state.resume = DraftResume::from_document(doc);
            state.is_generating = false;
            state.generation_error = None;
            state.editing_existing = true;
        });
    }

    /// Restores empty defaults and removes the durable record. The clear
    /// is synchronous so a reload cannot resurrect the cleared draft.
    pub async fn reset(&self) {
        {
            let mut state = self.state.write().expect("state lock");
            *state = BuilderState::default();
        }
        self.saver.cancel_and_clear().await;
    }

    /// Coerces the draft to a complete document with `updated_at`
    /// refreshed. Validation (title present, etc.) is the caller's job.
    pub fn finalize(&self) -> ResumeData {
        self.state.read().expect("state lock").resume.finalize(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct MemoryDraftStore {
        record: Mutex<Option<String>>,
    }

    impl MemoryDraftStore {
        fn new() -> Arc<Self> {
            Arc::new(MemoryDraftStore {
                record: Mutex::new(None),
            })
        }

        fn stored(&self) -> Option<String> {
            self.record.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DraftStore for MemoryDraftStore {
        async fn load(&self) -> anyhow::Result<Option<String>> {
            Ok(self.record.lock().unwrap().clone())
        }

        async fn save(&self, payload: &str) -> anyhow::Result<()> {
            *self.record.lock().unwrap() = Some(payload.to_string());
            Ok(())
        }

        async fn clear(&self) -> anyhow::Result<()> {
            *self.record.lock().unwrap() = None;
            Ok(())
        }
    }

    async fn open_store() -> (Arc<MemoryDraftStore>, BuilderStore) {
        let backing = MemoryDraftStore::new();
        let store = BuilderStore::open(backing.clone(), Duration::from_millis(10)).await;
        (backing, store)
    }

    fn commit(company: &str) -> ExperienceCommit {
        ExperienceCommit {
            editing_id: None,
            company: company.to_string(),
            position: "Engineer".to_string(),
            period: Period::new("2021-03", Some("2022-01".to_string())),
            description: "Did work".to_string(),
            description_raw: "work".to_string(),
        }
    }

    #[tokio::test]
    async fn test_step_bounds() {
        let (_, store) = open_store().await;
        assert_eq!(store.prev_step(), WizardStep::FIRST);
        for _ in 0..10 {
            store.next_step();
        }
        assert_eq!(store.current_step(), WizardStep::LAST);
        assert_eq!(store.next_step(), WizardStep::LAST);
    }

    #[tokio::test]
    async fn test_skill_dedup_invariant() {
        let (_, store) = open_store().await;
        assert!(store.add_skill("  React "));
        assert!(store.add_skill("TypeScript"));
        assert!(!store.add_skill("React"));
        assert!(!store.add_skill("   "));
        // case-sensitive: different case is a different skill
        assert!(store.add_skill("react"));

        let skills = store.snapshot().resume.skills;
        assert_eq!(skills, vec!["React", "TypeScript", "react"]);
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let (_, store) = open_store().await;
        store.initialize_resume(None);
        let first = store.snapshot().resume;
        let (id, created_at) = (first.id.unwrap(), first.created_at.unwrap());

        store.initialize_resume(Some(Uuid::new_v4()));
        let second = store.snapshot().resume;
        assert_eq!(second.id.unwrap(), id);
        assert_eq!(second.created_at.unwrap(), created_at);
    }

    #[tokio::test]
    async fn test_language_name_unique_at_add_time() {
        let (_, store) = open_store().await;
        assert!(store.add_language("English", LanguageLevel::Fluent).is_some());
        assert!(store.add_language("English", LanguageLevel::Basic).is_none());
        assert!(store.add_language("Русский", LanguageLevel::Native).is_some());
        assert_eq!(store.snapshot().resume.languages.len(), 2);
    }

    #[tokio::test]
    async fn test_update_experience_missing_id_is_noop() {
        let (_, store) = open_store().await;
        let id = store.add_experience(&commit("Acme"));
        assert!(!store.update_experience(Uuid::new_v4(), ExperiencePatch::default()));
        assert!(store.update_experience(
            id,
            ExperiencePatch {
                position: Some("Senior Engineer".to_string()),
                ..Default::default()
            }
        ));
        let resume = store.snapshot().resume;
        assert_eq!(resume.experiences[0].position, "Senior Engineer");
        assert_eq!(resume.experiences[0].company, "Acme");
    }

    #[tokio::test]
    async fn test_hydrate_round_trips_document() {
        let (_, store) = open_store().await;
        let now = Utc::now();
        let doc = ResumeData {
            id: Uuid::new_v4(),
            full_name: "Jane".to_string(),
            title: "Dev".to_string(),
            about: "About".to_string(),
            about_raw: "raw".to_string(),
            location: "Tashkent".to_string(),
            email: "a@b.com".to_string(),
            phone: "+1".to_string(),
            linkedin: String::new(),
            telegram: "@jane".to_string(),
            experiences: vec![],
            skills: vec!["React".to_string()],
            languages: vec![],
            recommendations: vec![],
            style: ResumeStyle::Minimal,
            created_at: now,
            updated_at: now,
        };

        store.next_step();
        store.set_generating(true);
        store.hydrate_resume(&doc);

        let state = store.snapshot();
        assert_eq!(state.current_step, WizardStep::FIRST);
        assert!(!state.is_generating);
        assert!(state.editing_existing);
        assert_eq!(state.resume.to_document(Utc::now()), doc);
    }

    #[tokio::test]
    async fn test_direct_navigation_requires_edit_mode() {
        let (_, store) = open_store().await;
        assert!(store.go_to_step(WizardStep::Skills).is_err());

        let doc = {
            let now = Utc::now();
            ResumeData {
                id: Uuid::new_v4(),
                full_name: String::new(),
                title: "Dev".to_string(),
                about: String::new(),
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
                style: ResumeStyle::Modern,
                created_at: now,
                updated_at: now,
            }
        };
        store.hydrate_resume(&doc);
        assert_eq!(store.go_to_step(WizardStep::Skills).unwrap(), WizardStep::Skills);
    }

    #[tokio::test]
    async fn test_persisted_snapshot_reflects_latest_mutation() {
        let (backing, store) = open_store().await;
        store.set_title("First");
        store.set_title("Second");

        tokio::time::sleep(Duration::from_millis(60)).await;

        let stored = backing.stored().expect("draft persisted");
        let persisted: PersistedDraft = serde_json::from_str(&stored).unwrap();
        assert_eq!(persisted.resume_data.title, "Second");
        // ephemeral flags never reach storage
        assert!(!stored.contains("isGenerating"));
        assert!(!stored.contains("generationError"));
    }

    #[tokio::test]
    async fn test_reset_clears_storage_synchronously() {
        let (backing, store) = open_store().await;
        store.set_title("Keep me");
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(backing.stored().is_some());

        store.reset().await;
        assert_eq!(backing.stored(), None);
        assert_eq!(store.snapshot().resume, DraftResume::default());
        assert_eq!(store.current_step(), WizardStep::FIRST);
    }

    #[tokio::test]
    async fn test_open_recovers_from_corrupt_record() {
        let backing = MemoryDraftStore::new();
        *backing.record.lock().unwrap() = Some("{not json".to_string());
        let store = BuilderStore::open(backing, Duration::from_millis(10)).await;
        assert_eq!(store.current_step(), WizardStep::FIRST);
        assert_eq!(store.snapshot().resume, DraftResume::default());
    }

    #[tokio::test]
    async fn test_open_restores_prior_state() {
        let backing = MemoryDraftStore::new();
        {
            let store = BuilderStore::open(backing.clone(), Duration::from_millis(10)).await;
            store.set_title("Persisted title");
            store.next_step();
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        let store = BuilderStore::open(backing, Duration::from_millis(10)).await;
        assert_eq!(store.snapshot().resume.title, "Persisted title");
        assert_eq!(store.current_step(), WizardStep::About);
    }
}
