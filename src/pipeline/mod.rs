//! Website generation pipeline.
//!
//! One run goes through `Enhancing → Classifying → GeneratingContent →
//! Sanitizing → Deploying → Done`. Everything after the pacing delay runs as
//! a single spawned task raced against the deployment deadline. When the
//! deadline wins the task's cancellation token fires and the task is
//! aborted, so a late deployment never completes behind the caller's back
//! and the abandoned task emits no further progress.

pub mod deploy;
pub mod html;
pub mod links;
pub mod sanitize;

use crate::{
    classify::classify,
    config::{DeployConfig, PipelineConfig},
    enhance::generate_website_brief,
    error::{GenError, Result},
    logger,
    models::{
        CharacterProfile, DeployCredentials, PageSet, PipelineRun, PipelineStage, ProgressUpdate,
        HOME_PAGE,
    },
    providers::ModelAccess,
};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;

pub use deploy::{Deployer, GithubPagesDeployer};
pub use html::generate_html;
pub use links::detect_links;
pub use sanitize::sanitize_html;

pub const DEPLOYING_MESSAGE: &str =
    "Website is being deployed to GitHub Pages. This will take a few minutes...";

/// Receives interim and final pipeline messages.
#[async_trait]
pub trait ProgressCallback: Send + Sync {
    async fn on_progress(&self, update: ProgressUpdate);
}

#[derive(Debug)]
pub struct PipelineReport {
    /// `Done`, `TimedOut` or `Failed`.
    pub stage: PipelineStage,
    /// Last stage the pipeline task reached.
    pub reached: PipelineStage,
    pub run: PipelineRun,
    pub response: ProgressUpdate,
    pub error: Option<GenError>,
}

impl PipelineReport {
    pub fn is_success(&self) -> bool {
        self.stage == PipelineStage::Done
    }
}

#[derive(Clone)]
pub struct WebsitePipeline {
    model: Arc<dyn ModelAccess>,
    deployer: Arc<dyn Deployer>,
    deploy_config: DeployConfig,
    config: PipelineConfig,
    character: CharacterProfile,
}

impl WebsitePipeline {
    pub fn new(
        model: Arc<dyn ModelAccess>,
        deployer: Arc<dyn Deployer>,
        deploy_config: DeployConfig,
        config: PipelineConfig,
    ) -> Self {
        Self {
            model,
            deployer,
            deploy_config,
            config,
            character: CharacterProfile::new("Assistant"),
        }
    }

    pub fn with_character(mut self, character: CharacterProfile) -> Self {
        self.character = character;
        self
    }

    /// Runs the pipeline to completion, timeout or failure. The final message
    /// is delivered to `progress` exactly once and also returned in the report.
    pub async fn run(
        &self,
        prompt: &str,
        source: Option<String>,
        progress: Arc<dyn ProgressCallback>,
    ) -> PipelineReport {
        log::info!("Website prompt received: {}", prompt);
        let _timer = logger::timer("website pipeline");

        tokio::time::sleep(self.config.pacing_delay).await;
        log::info!("Starting website generation process");

        let run = Arc::new(Mutex::new(PipelineRun::new(prompt)));
        let (stage_tx, stage_rx) = watch::channel(PipelineStage::Idle);
        let cancel = CancellationToken::new();

        let task = PipelineTask {
            model: Arc::clone(&self.model),
            deployer: Arc::clone(&self.deployer),
            deploy_config: self.deploy_config.clone(),
            character: self.character.clone(),
            settle_delay: self.config.settle_delay,
            run: Arc::clone(&run),
            stage: stage_tx,
            cancel: cancel.clone(),
            progress: Arc::clone(&progress),
            source: source.clone(),
        };
        let mut handle = tokio::spawn(task.execute());

        let outcome = tokio::select! {
            joined = &mut handle => match joined {
                Ok(result) => result,
                Err(e) => Err(GenError::InternalError(format!("pipeline task failed: {}", e))),
            },
            _ = tokio::time::sleep(self.config.deadline) => {
                cancel.cancel();
                handle.abort();
                Err(GenError::Timeout(self.config.deadline))
            }
        };

        let reached = *stage_rx.borrow();
        let run = run.lock().await.clone();

        let (stage, response, error) = match outcome {
            Ok(url) => {
                log::info!("Website deployed: {}", url);
                let text = format!(
                    "I've created and deployed a website based on our conversation. You can view it at: {}",
                    url
                );
                (PipelineStage::Done, ProgressUpdate::new(text), None)
            }
            Err(err) => {
                let stage = if matches!(err, GenError::Timeout(_)) {
                    log::error!("Website creation timed out during {:?}", reached);
                    PipelineStage::TimedOut
                } else {
                    log::error!("Website creation failed: {}", err);
                    PipelineStage::Failed
                };
                let text = format!(
                    "Sorry, I encountered an error while creating the website: {}",
                    err
                );
                (stage, ProgressUpdate::new(text), Some(err))
            }
        };

        let response = response.with_source(source);
        progress.on_progress(response.clone()).await;

        PipelineReport {
            stage,
            reached,
            run,
            response,
            error,
        }
    }
}

/// Everything the spawned half of a run owns.
struct PipelineTask {
    model: Arc<dyn ModelAccess>,
    deployer: Arc<dyn Deployer>,
    deploy_config: DeployConfig,
    character: CharacterProfile,
    settle_delay: Duration,
    run: Arc<Mutex<PipelineRun>>,
    stage: watch::Sender<PipelineStage>,
    cancel: CancellationToken,
    progress: Arc<dyn ProgressCallback>,
    source: Option<String>,
}

impl PipelineTask {
    fn enter(&self, stage: PipelineStage) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(GenError::Cancelled);
        }
        log::debug!("Pipeline stage: {:?}", stage);
        self.stage.send_replace(stage);
        Ok(())
    }

    /// Resolves `fut` unless the run is cancelled first.
    async fn until_cancelled<F: Future>(&self, fut: F) -> Result<F::Output> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(GenError::Cancelled),
            output = fut => Ok(output),
        }
    }

    async fn notify(&self, update: ProgressUpdate) {
        if self.cancel.is_cancelled() {
            log::debug!("Suppressing progress from cancelled run: {}", update.text);
            return;
        }
        self.progress.on_progress(update).await;
    }

    fn credentials(&self) -> Result<DeployCredentials> {
        match (&self.deploy_config.github_token, &self.deploy_config.github_username) {
            (Some(token), Some(account)) => Ok(DeployCredentials {
                token: token.clone(),
                account: account.clone(),
            }),
            _ => Err(GenError::ConfigError("GitHub credentials not found".into())),
        }
    }

    async fn execute(self) -> Result<String> {
        let raw_prompt = self.run.lock().await.raw_prompt.clone();

        self.enter(PipelineStage::Enhancing)?;
        let brief = self
            .until_cancelled(generate_website_brief(
                &raw_prompt,
                &self.character,
                self.model.as_ref(),
            ))
            .await??;
        self.run.lock().await.enhanced_prompt = Some(brief.to_prompt());

        self.enter(PipelineStage::Classifying)?;
        let content_type = self
            .until_cancelled(classify(&raw_prompt, self.model.as_ref()))
            .await?;
        self.run.lock().await.classification = Some(content_type);

        self.enter(PipelineStage::GeneratingContent)?;
        let html = self
            .until_cancelled(generate_html(
                content_type,
                &brief,
                &raw_prompt,
                self.model.as_ref(),
            ))
            .await??;

        self.enter(PipelineStage::Sanitizing)?;
        let sanitized = sanitize_html(&html);
        for link in links::local_page_links(&detect_links(&sanitized)) {
            log::warn!("Generated page links to '{}' which is not part of the site", link);
        }
        {
            let mut run = self.run.lock().await;
            run.generated_html = Some(html);
            run.sanitized_html = Some(sanitized.clone());
        }

        let mut pages = PageSet::new();
        pages.insert(HOME_PAGE.to_string(), sanitized);

        let credentials = self.credentials()?;

        self.enter(PipelineStage::Deploying)?;
        self.notify(ProgressUpdate::new(DEPLOYING_MESSAGE).with_source(self.source.clone()))
            .await;

        let site_url = self
            .until_cancelled(self.deployer.deploy(&pages, &credentials, &self.cancel))
            .await??;
        self.run.lock().await.deployment_url = Some(site_url.clone());

        log::info!(
            "Waiting {}s for the site to publish",
            self.settle_delay.as_secs()
        );
        self.until_cancelled(tokio::time::sleep(self.settle_delay))
            .await?;

        self.enter(PipelineStage::Done)?;
        Ok(site_url)
    }
}
