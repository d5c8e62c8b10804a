//! Entry point: run a preroll plan against an encoding engine.

use std::sync::Arc;

use prerollforge_av::EncodingEngine;
use prerollforge_common::{Error, ProResProfile, Result};
use tokio::sync::Mutex;

use crate::artifact::{suggested_file_name, OutputArtifact};
use crate::params::PrerollParameters;
use crate::progress::ProgressSender;
use crate::sequencer::{EngineStep, FontResource, Plan, PlanOptions, RequestTag};

/// Caller options for one generation.
#[derive(Debug)]
pub struct GenerateOptions {
    /// Font for text overlays. Without one the engine's default font is used.
    pub font: Option<FontResource>,
    pub include_audio: bool,
    pub profile: ProResProfile,
    pub progress: Arc<ProgressSender>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            font: None,
            include_audio: true,
            profile: ProResProfile::default(),
            progress: Arc::new(ProgressSender::noop()),
        }
    }
}

impl GenerateOptions {
    pub fn with_font(mut self, font: FontResource) -> Self {
        self.font = Some(font);
        self
    }

    pub fn with_audio(mut self, include_audio: bool) -> Self {
        self.include_audio = include_audio;
        self
    }

    pub fn with_profile(mut self, profile: ProResProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_progress(mut self, progress: ProgressSender) -> Self {
        self.progress = Arc::new(progress);
        self
    }

    /// Plan options borrowed from these options.
    pub fn plan_options(&self) -> PlanOptions<'_> {
        PlanOptions {
            font: self.font.as_ref(),
            include_audio: self.include_audio,
            profile: self.profile,
        }
    }
}

/// Generate one preroll.
///
/// Steps run strictly in order; the first failure aborts the run with
/// [`Error::OperationFailed`]. Working files are removed afterwards whether
/// the run succeeded or not.
///
/// # Errors
///
/// - [`Error::EngineNotReady`] before any engine call when the engine is not
///   initialized.
/// - [`Error::OperationFailed`] when a step fails.
/// - [`Error::ArtifactRetrieval`] when the final file cannot be read back.
pub async fn generate_preroll(
    engine: &dyn EncodingEngine,
    params: &PrerollParameters,
    options: &GenerateOptions,
) -> Result<OutputArtifact> {
    if !engine.is_ready() {
        return Err(Error::EngineNotReady);
    }

    let plan = Plan::build(params, &options.plan_options(), RequestTag::new());
    plan.check_dependencies()?;
    tracing::info!(
        "Generating preroll {} ({} steps, engine {})",
        plan.tag,
        plan.steps.len(),
        engine.name()
    );

    let result = run_plan(engine, &plan, &options.progress).await;
    cleanup(engine, &plan).await;

    let bytes = result?;
    let name = suggested_file_name(&params.film_title, chrono::Local::now().naive_local());
    Ok(OutputArtifact::new(bytes, name))
}

async fn run_plan(
    engine: &dyn EncodingEngine,
    plan: &Plan,
    progress: &ProgressSender,
) -> Result<bytes::Bytes> {
    let total = plan.steps.len() + 1;
    for (i, step) in plan.steps.iter().enumerate() {
        let label = step.label();
        tracing::debug!("Starting: {label}");
        let outcome = match step {
            EngineStep::WriteInput { name, data } => engine.write_input_file(name, data).await,
            EngineStep::Run(op) => engine.run_operation(&op.to_args()).await,
        };
        if let Err(e) = outcome {
            tracing::error!("Step failed: {label}: {e}");
            return Err(Error::operation_failed(label, e.to_string()));
        }
        progress.step_done(i + 1, total, &label);
    }

    let bytes = engine
        .read_output_file(&plan.output_name)
        .await
        .map_err(|e| {
            tracing::error!("Cannot read {}: {e}", plan.output_name);
            Error::ArtifactRetrieval {
                name: plan.output_name.clone(),
            }
        })?;
    progress.step_done(total, total, "retrieve");
    Ok(bytes)
}

async fn cleanup(engine: &dyn EncodingEngine, plan: &Plan) {
    for name in plan.cleanup_names() {
        if let Err(e) = engine.remove_file(name).await {
            tracing::warn!("Failed to remove {name}: {e}");
        }
    }
}

/// Shares one engine between callers, letting one generation run at a time.
pub struct PrerollGenerator {
    engine: Arc<dyn EncodingEngine>,
    gate: Mutex<()>,
}

impl PrerollGenerator {
    pub fn new(engine: Arc<dyn EncodingEngine>) -> Self {
        Self {
            engine,
            gate: Mutex::new(()),
        }
    }

    pub fn engine(&self) -> &Arc<dyn EncodingEngine> {
        &self.engine
    }

    /// Initialize the engine if it is not ready yet.
    pub async fn initialize(&self) -> Result<()> {
        let _guard = self.gate.lock().await;
        if !self.engine.is_ready() {
            self.engine.initialize().await?;
        }
        Ok(())
    }

    /// Run [`generate_preroll`] once any generation already in flight on this
    /// engine has finished.
    pub async fn generate(
        &self,
        params: &PrerollParameters,
        options: &GenerateOptions,
    ) -> Result<OutputArtifact> {
        let _guard = self.gate.lock().await;
        generate_preroll(self.engine.as_ref(), params, options).await
    }
}

impl std::fmt::Debug for PrerollGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrerollGenerator")
            .field("engine", &self.engine.name())
            .finish_non_exhaustive()
    }
}
