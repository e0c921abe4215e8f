//! The generation orchestrator.
//!
//! Ties the pipeline together: script decomposition, rule normalization,
//! prompt compilation, reference preparation, backend calls and panel
//! persistence. Batch generation launches every shot together and writes
//! each outcome into its own slot; one shot's failure never touches its
//! siblings. Only analysis failures abort an operation outright.

use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use reqwest::Client;
use tracing::{info, warn};
use uuid::Uuid;

use cineboard_genai::{ImageBackend, ScriptDirector};
use cineboard_media::{HeadHint, ReferencePreprocessor};
use cineboard_models::{
    BatchPhase, Character, CharacterId, CharacterView, GenerationRequest, PanelState,
    RenderSettings, ShotDescriptor, ShotId, ShotOutcome, StylePreset,
};
use cineboard_prompt::{compile, compile_repaint, normalize_shot_type, normalize_shots, resolve, SceneContext};
use cineboard_storage::{shot_key, BlobStore};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::roster::CharacterRoster;

/// Repaint influence when the resolved view is from behind: the model may
/// redraw details the reference never showed.
const REPAINT_BACK_STRENGTH: f32 = 0.95;
const REPAINT_BACK_REF_STRENGTH: f32 = 1.0;

/// Repaint influence for front and side views: preserve framing and pose.
const REPAINT_STRENGTH: f32 = 0.55;
const REPAINT_REF_STRENGTH: f32 = 0.95;

/// Influence of a character reference on first generation: hold identity
/// close while the composition stays free.
const CHARACTER_STRENGTH: f32 = 0.55;
const CHARACTER_REF_STRENGTH: f32 = 0.95;

const PANEL_CONTENT_TYPE: &str = "image/png";

pub struct Orchestrator {
    director: Arc<dyn ScriptDirector>,
    backend: Arc<dyn ImageBackend>,
    store: Arc<dyn BlobStore>,
    preprocessor: ReferencePreprocessor,
    http: Client,
    config: EngineConfig,
}

impl Orchestrator {
    pub fn new(
        director: Arc<dyn ScriptDirector>,
        backend: Arc<dyn ImageBackend>,
        store: Arc<dyn BlobStore>,
        config: EngineConfig,
    ) -> Self {
        Self {
            director,
            backend,
            store,
            preprocessor: ReferencePreprocessor::new(),
            http: Client::new(),
            config,
        }
    }

    /// Decomposes a script into shots and populates the panel. Any
    /// director failure blocks the whole operation; nothing is generated
    /// from a script that did not decompose.
    pub async fn analyze(&self, script: &str, panel: &mut PanelState) -> EngineResult<()> {
        let panels = self
            .director
            .decompose(script)
            .await
            .map_err(|e| EngineError::Analysis(e.to_string()))?;

        let shots: Vec<ShotDescriptor> = panels
            .into_iter()
            .map(|p| {
                let mut shot = ShotDescriptor::new(Uuid::new_v4().to_string(), p.description);
                shot.prompt = p.visual_prompt;
                shot.shot_type = normalize_shot_type(&p.shot_type);
                shot
            })
            .collect();

        let shots = normalize_shots(shots);
        info!(shot_count = shots.len(), "script decomposed into shots");
        panel.populate(shots);
        Ok(())
    }

    /// Builds the generation request for one shot.
    async fn build_request(
        &self,
        shot: &ShotDescriptor,
        character: Option<&Character>,
        settings: &RenderSettings,
    ) -> GenerationRequest {
        let style = StylePreset::builtin_or_default(&settings.style_id);
        let resolved = resolve(character, &shot.description, settings.draft);
        let ctx = SceneContext {
            scene: settings.scene.clone(),
            atmosphere: settings.atmosphere.clone(),
            draft: settings.draft,
        };
        let compiled = compile(shot, &style, &resolved, &ctx);

        let request = GenerationRequest::new(
            &self.config.model,
            compiled.positive,
            compiled.negative,
            settings.aspect_ratio.output_size(),
        );

        if let Some(reference_url) = &resolved.reference_url {
            let hint = character
                .and_then(|c| c.head_center)
                .map(|center_y| HeadHint { center_y });
            let reference = self
                .preprocessor
                .prepare(reference_url, shot.shot_type, hint, settings.draft)
                .await
                // The backend accepts remote URLs; a reference that failed
                // local preparation is still better than none
                .unwrap_or_else(|| reference_url.clone());
            return request.with_reference(reference, CHARACTER_STRENGTH, CHARACTER_REF_STRENGTH);
        }

        request
    }

    /// Generates one image and persists it, returning the public URL.
    async fn generate_and_persist(
        &self,
        shot_id: &ShotId,
        request: &GenerationRequest,
        settings: &RenderSettings,
    ) -> EngineResult<String> {
        let remote_url = self.backend.generate(request).await?;

        let bytes = self
            .http
            .get(&remote_url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        let key = shot_key(&settings.project_id, shot_id.as_str(), Utc::now().timestamp_millis())?;
        self.store.put(&key, bytes.to_vec(), PANEL_CONTENT_TYPE).await?;
        Ok(self.store.public_url(&key))
    }

    /// Runs the full per-shot pipeline, converting every failure into a
    /// recorded outcome.
    async fn run_shot(
        &self,
        shot: &ShotDescriptor,
        character: Option<&Character>,
        settings: &RenderSettings,
    ) -> ShotOutcome {
        let request = self.build_request(shot, character, settings).await;
        match self.generate_and_persist(&shot.id, &request, settings).await {
            Ok(url) => ShotOutcome::Success { url },
            Err(e) => {
                warn!(shot = %shot.id, error = %e, "shot generation failed");
                ShotOutcome::failure(e.to_string())
            }
        }
    }

    fn record_outcome(panel: &mut PanelState, id: &ShotId, outcome: ShotOutcome) {
        if let Some(slot) = panel.get_mut(id) {
            match outcome {
                ShotOutcome::Success { url } => slot.complete(url),
                ShotOutcome::Failure { message } => slot.fail(message),
            }
        }
    }

    /// Generates every shot in the panel concurrently. The panel always
    /// reaches `Done`; individual failures stay in their own slots.
    pub async fn generate_all(
        &self,
        panel: &mut PanelState,
        roster: &CharacterRoster,
        settings: &RenderSettings,
    ) -> EngineResult<()> {
        panel.phase = BatchPhase::Generating;
        for shot in panel.iter_mut() {
            shot.begin_generation();
        }

        let snapshots: Vec<ShotDescriptor> = panel.shots().to_vec();
        info!(shot_count = snapshots.len(), project = settings.project_id.as_str(), "starting batch generation");

        let futures: Vec<_> = snapshots
            .iter()
            .map(|shot| {
                let character = roster.effective_for(shot, settings);
                async move { (shot.id.clone(), self.run_shot(shot, character, settings).await) }
            })
            .collect();

        let outcomes = join_all(futures).await;

        let mut succeeded = 0usize;
        for (id, outcome) in outcomes {
            if outcome.is_success() {
                succeeded += 1;
            }
            Self::record_outcome(panel, &id, outcome);
        }

        panel.phase = BatchPhase::Done;
        info!(succeeded, total = panel.len(), "batch generation settled");
        Ok(())
    }

    /// Re-runs the pipeline for a single shot.
    pub async fn regenerate_one(
        &self,
        panel: &mut PanelState,
        shot_id: &ShotId,
        roster: &CharacterRoster,
        settings: &RenderSettings,
    ) -> EngineResult<()> {
        let snapshot = {
            let shot = panel
                .get_mut(shot_id)
                .ok_or_else(|| EngineError::UnknownShot(shot_id.clone()))?;
            shot.begin_generation();
            shot.clone()
        };

        let character = roster.effective_for(&snapshot, settings);
        let outcome = self.run_shot(&snapshot, character, settings).await;
        Self::record_outcome(panel, shot_id, outcome);
        Ok(())
    }

    /// Repaints an existing panel image under a new instruction, keeping
    /// its composition. The current image becomes the reference; how much
    /// the model may deviate depends on the resolved character view.
    pub async fn repaint(
        &self,
        panel: &mut PanelState,
        shot_id: &ShotId,
        character_id: Option<&CharacterId>,
        new_prompt: &str,
        roster: &CharacterRoster,
        settings: &RenderSettings,
    ) -> EngineResult<()> {
        let character = match character_id {
            Some(id) => Some(
                roster
                    .get(id)
                    .ok_or_else(|| EngineError::UnknownCharacter(id.clone()))?,
            ),
            None => None,
        };

        let (source_url, shot_type) = {
            let shot = panel
                .get_mut(shot_id)
                .ok_or_else(|| EngineError::UnknownShot(shot_id.clone()))?;
            let source_url = shot
                .image_url
                .clone()
                .ok_or_else(|| EngineError::MissingImage(shot_id.clone()))?;
            shot.begin_generation();
            shot.edit_prompt(new_prompt);
            (source_url, shot.shot_type)
        };

        let resolved = resolve(character, new_prompt, settings.draft);
        let (strength, ref_strength) = if resolved.view == CharacterView::Back {
            (REPAINT_BACK_STRENGTH, REPAINT_BACK_REF_STRENGTH)
        } else {
            (REPAINT_STRENGTH, REPAINT_REF_STRENGTH)
        };

        let compiled = compile_repaint(character, new_prompt, settings.draft);
        let reference = self
            .preprocessor
            .prepare(&source_url, shot_type, None, settings.draft)
            .await
            .unwrap_or(source_url);

        let request = GenerationRequest::new(
            &self.config.model,
            compiled.positive,
            compiled.negative,
            settings.aspect_ratio.output_size(),
        )
        .with_reference(reference, strength, ref_strength);

        let outcome = match self.generate_and_persist(shot_id, &request, settings).await {
            Ok(url) => ShotOutcome::Success { url },
            Err(e) => {
                warn!(shot = %shot_id, error = %e, "repaint failed");
                ShotOutcome::failure(e.to_string())
            }
        };
        Self::record_outcome(panel, shot_id, outcome);
        Ok(())
    }
}
