//! Application state: the scenario store handle, prompts, base template, and draft providers.
//!
//! The store is opened once in `main` and injected here; nothing else creates
//! connections. Draft providers are optional and built from the environment.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::config::{Prompts, TutorConfig};
use crate::domain::Stages;
use crate::draft::Drafters;
use crate::gemini::Gemini;
use crate::openai::OpenAI;
use crate::store::ScenarioStore;
use crate::template::default_stage_template;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ScenarioStore>,
    pub drafters: Drafters,
    pub prompts: Prompts,
    /// Base template that new scenarios are scaled from.
    pub template: Stages,
}

impl AppState {
    pub fn new(store: Arc<dyn ScenarioStore>, drafters: Drafters, prompts: Prompts) -> Self {
        Self { store, drafters, prompts, template: default_stage_template() }
    }

    /// Build state around an opened store: prompts from config, providers from env.
    #[instrument(level = "info", skip_all, fields(storage = store.backend()))]
    pub fn from_config(store: Arc<dyn ScenarioStore>, cfg: &TutorConfig) -> Self {
        let openai = OpenAI::from_env();
        if let Some(oa) = &openai {
            info!(target: "debate_tutor", base_url = %oa.base_url, model = %oa.model, "OpenAI drafting enabled.");
        } else {
            info!(target: "debate_tutor", "OpenAI drafting disabled (no OPENAI_API_KEY).");
        }

        let gemini = Gemini::from_env();
        if gemini.is_some() {
            info!(target: "debate_tutor", "Gemini drafting enabled.");
        } else {
            info!(target: "debate_tutor", "Gemini drafting disabled (no GEMINI_API_KEY / GOOGLE_AI_API_KEY).");
        }

        let drafters = Drafters {
            openai: openai.map(|c| Arc::new(c) as _),
            gemini: gemini.map(|c| Arc::new(c) as _),
            preferred: cfg.draft.resolve_provider(),
        };
        if drafters.is_empty() {
            warn!(target: "debate_tutor", "No draft provider configured; POST /api/v1/drafts will answer 503.");
        }

        Self::new(store, drafters, cfg.prompts.clone())
    }

    /// Names of the configured draft providers, for health output.
    pub fn draft_providers(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.drafters.openai.is_some() {
            out.push("openai");
        }
        if self.drafters.gemini.is_some() {
            out.push("gemini");
        }
        out
    }
}
