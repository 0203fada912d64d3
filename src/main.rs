use async_trait::async_trait;
use clap::{Parser, Subcommand};
use genpipe::{
    logger, Config, GenerationRequest, GithubPagesDeployer, ImageService, ModelAccess,
    ProgressCallback, ProgressUpdate, TextClient, WebsitePipeline,
};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "genpipe", about = "Generate images or deploy a generated website")]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON log lines
    #[arg(long, global = true, env = "GENPIPE_LOG_JSON")]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate images with the configured provider
    Image {
        prompt: String,
        #[arg(long, default_value_t = 1024)]
        width: u32,
        #[arg(long, default_value_t = 1024)]
        height: u32,
        #[arg(long, default_value_t = 1)]
        count: u32,
        /// Write each image as a data URI line to this file
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Generate a website or game and deploy it to GitHub Pages
    Website { prompt: String },
}

struct PrintProgress;

#[async_trait]
impl ProgressCallback for PrintProgress {
    async fn on_progress(&self, update: ProgressUpdate) {
        println!("{}", update.text);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_loaded = dotenv::dotenv().is_ok();
    let cli = Cli::parse();

    let mut logger_config = if cli.verbose {
        logger::LoggerConfig::development()
    } else {
        logger::LoggerConfig::default()
    };
    logger_config = logger_config.with_json_output(cli.json_logs);
    logger::init_with_config(logger_config)?;

    if env_loaded {
        log::info!("✅ .env file loaded successfully");
    } else {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }

    let config = Config::from_env();
    logger::log_config_info(&config);

    let model: Option<Arc<dyn ModelAccess>> = match TextClient::new(&config.text) {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            log::warn!("Text model unavailable: {}", e);
            None
        }
    };

    match cli.command {
        Command::Image {
            prompt,
            width,
            height,
            count,
            out,
        } => {
            let request = GenerationRequest::new(prompt, width, height)?.with_count(count)?;
            let service = ImageService::from_config(&config.images, model)?;
            let batch = service.generate(&request).await.into_result()?;

            log::info!("Received {} image(s)", batch.len());
            match out {
                Some(path) => {
                    fs::write(&path, batch.as_slice().join("\n"))?;
                    log::info!("Images written to {}", path.display());
                }
                None => {
                    for (index, uri) in batch.iter().enumerate() {
                        println!("image {}: {} chars", index + 1, uri.len());
                    }
                }
            }
        }
        Command::Website { prompt } => {
            let model = model.ok_or("A text model API key is required for website generation")?;
            let deployer = Arc::new(GithubPagesDeployer::new(
                config.deploy.github_api_url.clone(),
            ));
            let pipeline =
                WebsitePipeline::new(model, deployer, config.deploy.clone(), config.pipeline.clone());

            let report = pipeline
                .run(&prompt, Some("cli".to_string()), Arc::new(PrintProgress))
                .await;
            if let Some(err) = report.error {
                return Err(err.into());
            }
        }
    }

    Ok(())
}
