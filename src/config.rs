use std::env;
use std::time::Duration;

pub const DEFAULT_DEPLOYMENT_DEADLINE: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_PACING_DELAY: Duration = Duration::from_secs(1);
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(2 * 60);
pub const DEFAULT_MIN_GENERATION_DELAY: Duration = Duration::from_secs(1);

/// Credentials for the three image providers. Which one is set decides the
/// provider, see [`ImageProviderConfig::selected_provider`].
#[derive(Debug, Clone, Default)]
pub struct ImageProviderConfig {
    pub replicate_api_token: Option<String>,
    pub together_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub replicate_base_url: Option<String>,
    pub together_base_url: Option<String>,
    pub openai_base_url: Option<String>,
    pub min_delay_between_generations: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// Replicate, FLUX 1.1 pro. May answer with a byte stream or with URLs.
    Replicate,
    /// Together AI, FLUX.1-dev. Answers with URLs.
    Together,
    /// OpenAI DALL-E 3. Answers with inline base64.
    Dalle,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Replicate => "replicate",
            ProviderKind::Together => "together",
            ProviderKind::Dalle => "dall-e",
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl ImageProviderConfig {
    pub fn new() -> Self {
        Self {
            min_delay_between_generations: DEFAULT_MIN_GENERATION_DELAY,
            ..Self::default()
        }
    }

    pub fn from_env() -> Self {
        Self {
            replicate_api_token: non_empty(env::var("REPLICATE_API_TOKEN").ok()),
            together_api_key: non_empty(env::var("TOGETHER_API_KEY").ok()),
            openai_api_key: non_empty(env::var("OPENAI_API_KEY").ok()),
            replicate_base_url: env::var("REPLICATE_BASE_URL").ok(),
            together_base_url: env::var("TOGETHER_BASE_URL").ok(),
            openai_base_url: env::var("OPENAI_BASE_URL").ok(),
            min_delay_between_generations: env::var("MIN_GENERATION_DELAY_MS")
                .ok()
                .and_then(|ms| ms.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_MIN_GENERATION_DELAY),
        }
    }

    pub fn with_replicate(mut self, token: impl Into<String>) -> Self {
        self.replicate_api_token = Some(token.into());
        self
    }

    pub fn with_together(mut self, api_key: impl Into<String>) -> Self {
        self.together_api_key = Some(api_key.into());
        self
    }

    pub fn with_openai(mut self, api_key: impl Into<String>) -> Self {
        self.openai_api_key = Some(api_key.into());
        self
    }

    pub fn with_min_delay(mut self, delay: Duration) -> Self {
        self.min_delay_between_generations = delay;
        self
    }

    /// Primary credential wins over secondary, secondary over the default
    /// text-to-image provider.
    pub fn selected_provider(&self) -> Option<ProviderKind> {
        if self.replicate_api_token.is_some() {
            Some(ProviderKind::Replicate)
        } else if self.together_api_key.is_some() {
            Some(ProviderKind::Together)
        } else if self.openai_api_key.is_some() {
            Some(ProviderKind::Dalle)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextProvider {
    #[default]
    OpenAi,
    Anthropic,
}

#[derive(Debug, Clone, Default)]
pub struct TextModelConfig {
    pub provider: TextProvider,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub system_prompt: Option<String>,
}

impl TextModelConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Anthropic is used when its key is present, OpenAI otherwise.
    pub fn from_env() -> Self {
        let anthropic_key = non_empty(env::var("ANTHROPIC_API_KEY").ok());
        let system_prompt = env::var("SYSTEM_PROMPT").ok();
        match anthropic_key {
            Some(key) => TextModelConfig {
                provider: TextProvider::Anthropic,
                api_key: Some(key),
                base_url: env::var("ANTHROPIC_BASE_URL").ok(),
                system_prompt,
            },
            None => TextModelConfig {
                provider: TextProvider::OpenAi,
                api_key: non_empty(env::var("OPENAI_API_KEY").ok()),
                base_url: env::var("OPENAI_BASE_URL").ok(),
                system_prompt,
            },
        }
    }

    pub fn with_provider(mut self, provider: TextProvider, api_key: impl Into<String>) -> Self {
        self.provider = provider;
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeployConfig {
    pub github_token: Option<String>,
    pub github_username: Option<String>,
    pub github_api_url: Option<String>,
}

impl DeployConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        DeployConfig {
            github_token: non_empty(env::var("GITHUB_TOKEN").ok()),
            github_username: non_empty(env::var("GITHUB_USERNAME").ok()),
            github_api_url: env::var("GITHUB_API_URL").ok(),
        }
    }

    pub fn with_credentials(
        mut self,
        token: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        self.github_token = Some(token.into());
        self.github_username = Some(username.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub deadline: Duration,
    pub pacing_delay: Duration,
    pub settle_delay: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            deadline: DEFAULT_DEPLOYMENT_DEADLINE,
            pacing_delay: DEFAULT_PACING_DELAY,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let secs = |name: &str| {
            env::var(name)
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs)
        };
        PipelineConfig {
            deadline: secs("DEPLOYMENT_TIMEOUT_SECS").unwrap_or(DEFAULT_DEPLOYMENT_DEADLINE),
            pacing_delay: DEFAULT_PACING_DELAY,
            settle_delay: secs("DEPLOYMENT_SETTLE_SECS").unwrap_or(DEFAULT_SETTLE_DELAY),
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_pacing_delay(mut self, delay: Duration) -> Self {
        self.pacing_delay = delay;
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub images: ImageProviderConfig,
    pub text: TextModelConfig,
    pub deploy: DeployConfig,
    pub pipeline: PipelineConfig,
}

impl Config {
    pub fn new() -> Self {
        Config {
            images: ImageProviderConfig::new(),
            ..Self::default()
        }
    }

    pub fn from_env() -> Self {
        Config {
            images: ImageProviderConfig::from_env(),
            text: TextModelConfig::from_env(),
            deploy: DeployConfig::from_env(),
            pipeline: PipelineConfig::from_env(),
        }
    }

    pub fn with_images(mut self, config: ImageProviderConfig) -> Self {
        self.images = config;
        self
    }

    pub fn with_text(mut self, config: TextModelConfig) -> Self {
        self.text = config;
        self
    }

    pub fn with_deploy(mut self, config: DeployConfig) -> Self {
        self.deploy = config;
        self
    }

    pub fn with_pipeline(mut self, config: PipelineConfig) -> Self {
        self.pipeline = config;
        self
    }
}
