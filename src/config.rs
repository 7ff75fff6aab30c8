use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub vision: VisionConfig,
    pub tts: TtsConfig,
    pub capture: CaptureConfig,
    pub storage: StorageConfig,
    pub recipe: RecipeConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct VisionConfig {
    /// Base URL of the Generative Language API
    pub api_base: String,
    pub model: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TtsConfig {
    /// Base URL of the Cloud Text-to-Speech API
    pub api_base: String,
    pub api_key: Option<String>,
    /// Voice locale at startup ("en-US", "it-IT", "zh-CN", "grandma")
    pub locale: String,
}

#[derive(Debug, Deserialize)]
pub struct CaptureConfig {
    /// Frame source kind: "http" (snapshot URL) or "dir" (watched directory)
    pub source: String,
    pub snapshot_url: Option<String>,
    pub snapshot_dir: Option<String>,
    /// Delay between analysis cycles in milliseconds
    pub analysis_interval_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    pub url: String,
    pub anon_key: Option<String>,
    /// Disable persistence entirely (completions are logged instead)
    #[serde(default)]
    pub disabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct RecipeConfig {
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

impl VisionConfig {
    /// API key from config, falling back to the GEMINI_API_KEY environment variable
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .filter(|k| !k.is_empty())
    }
}

impl TtsConfig {
    /// API key from config, falling back to the GOOGLE_CLOUD_API_KEY environment variable
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("GOOGLE_CLOUD_API_KEY").ok())
            .filter(|k| !k.is_empty())
    }
}

impl StorageConfig {
    /// Anon key from config, falling back to the SUPABASE_ANON_KEY environment variable
    pub fn resolve_anon_key(&self) -> Option<String> {
        self.anon_key
            .clone()
            .or_else(|| std::env::var("SUPABASE_ANON_KEY").ok())
            .filter(|k| !k.is_empty())
    }
}
