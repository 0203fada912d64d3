//! Generation orchestration: image provider normalization, pacing, and a
//! deadline-bounded website generation and deployment pipeline.

pub mod caption;
pub mod classify;
pub mod config;
pub mod enhance;
pub mod error;
pub mod image_service;
pub mod logger;
pub mod models;
pub mod pipeline;
pub mod providers;
pub mod rate_limit;

pub use caption::generate_caption;
pub use classify::classify;
pub use config::{
    Config, DeployConfig, ImageProviderConfig, PipelineConfig, ProviderKind, TextModelConfig,
    TextProvider,
};
pub use enhance::{enhance, generate_website_brief};
pub use error::{GenError, Result};
pub use image_service::ImageService;
pub use models::*;
pub use pipeline::{
    Deployer, GithubPagesDeployer, PipelineReport, ProgressCallback, WebsitePipeline,
};
pub use providers::{
    ImageBackend, ImageDescriber, ImageFetcher, ModelAccess, ProviderAdapter, TextClient,
};
pub use rate_limit::RateLimiter;
