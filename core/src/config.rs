use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

/// Request handling knobs. One handler serves every deployment variant;
/// what differs between them lives here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Only paths starting with this prefix are looked up in the store
    #[serde(default = "default_prefix")]
    pub prefix: String,

    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Exposes `GET /debug-list`
    #[serde(default)]
    pub debug_endpoint_enabled: bool,

    #[serde(default = "default_debug_list_prefix")]
    pub debug_list_prefix: String,

    #[serde(default = "default_debug_list_limit")]
    pub debug_list_limit: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            cors_enabled: true,
            debug_endpoint_enabled: false,
            debug_list_prefix: default_debug_list_prefix(),
            debug_list_limit: default_debug_list_limit(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    #[default]
    Memory,
    Fs,
    S3,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    #[serde(default)]
    pub fs: FsStoreConfig,

    #[serde(default)]
    pub s3: S3StoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FsStoreConfig {
    #[serde(default = "default_fs_root")]
    pub root: PathBuf,
}

impl Default for FsStoreConfig {
    fn default() -> Self {
        Self {
            root: default_fs_root(),
        }
    }
}

/// S3-compatible bucket settings (Cloudflare R2 in production)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3StoreConfig {
    #[serde(default)]
    pub bucket: String,

    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default = "default_region")]
    pub region: String,

    #[serde(default)]
    pub access_key_id: Option<String>,

    #[serde(default)]
    pub secret_access_key: Option<String>,

    #[serde(default)]
    pub force_path_style: bool,
}

impl Default for S3StoreConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            endpoint: None,
            region: default_region(),
            access_key_id: None,
            secret_access_key: None,
            force_path_style: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl LoggingConfig {
    /// `EnvFilter` directives used when `RUST_LOG` is unset
    pub fn filter_directives(&self) -> String {
        format!(
            "image_gateway={level},image_gateway_core={level},tower_http=debug",
            level = self.level
        )
    }
}

// Default value functions
fn default_port() -> u16 { 8787 }
fn default_host() -> String { "127.0.0.1".to_string() }
fn default_prefix() -> String { "/images/".to_string() }
fn default_true() -> bool { true }
fn default_debug_list_prefix() -> String { "images/".to_string() }
fn default_debug_list_limit() -> usize { 20 }
fn default_region() -> String { "auto".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_fs_root() -> PathBuf { PathBuf::from("./data") }

/// Get default config file path
/// Uses ~/.config/image-gateway/config.toml for Unix-like CLI experience
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("image-gateway")
        .join("config.toml")
}

/// Load config from file, or return defaults if not found.
///
/// Loading order:
/// 1. Specified path (if provided)
/// 2. ./config.toml (if exists)
/// 3. default_config_path() (usually ~/.config/image-gateway/config.toml)
///
/// R2 environment variables are applied on top of whichever source won.
pub fn load_config(path: Option<PathBuf>) -> anyhow::Result<Config> {
    Ok(load_config_with_source(path)?.0)
}

/// Same as [`load_config`], also returning the file that was used (None for defaults)
pub fn load_config_with_source(path: Option<PathBuf>) -> anyhow::Result<(Config, Option<PathBuf>)> {
    let (mut config, source) = load_config_file(path)?;
    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    Ok((config, source))
}

fn load_config_file(path: Option<PathBuf>) -> anyhow::Result<(Config, Option<PathBuf>)> {
    if let Some(config_path) = path {
        if config_path.exists() {
            let config = parse_config_file(&config_path)?;
            tracing::info!("Loaded config from specified path {:?}", config_path);
            return Ok((config, Some(config_path)));
        } else {
            anyhow::bail!("Specified config file not found: {:?}", config_path);
        }
    }

    // Try current directory config.toml
    let local_config = PathBuf::from("config.toml");
    if local_config.exists() {
        match parse_config_file(&local_config) {
            Ok(config) => {
                tracing::info!("Loaded config from current directory {:?}", local_config);
                return Ok((config, Some(local_config)));
            }
            Err(e) => {
                tracing::error!("Failed to load ./config.toml: {}. Falling back to default path.", e);
            }
        }
    }

    let default_path = default_config_path();
    if default_path.exists() {
        let config = parse_config_file(&default_path)?;
        tracing::info!("Loaded config from default path {:?}", default_path);
        Ok((config, Some(default_path)))
    } else {
        tracing::info!("No config file found, using defaults");
        Ok((Config::default(), None))
    }
}

fn parse_config_file(path: &Path) -> anyhow::Result<Config> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Overlay the R2 variables the ingest pipeline already uses.
/// Setting any of them switches the backend to S3.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let s3 = &mut config.store.s3;
    let mut touched = false;

    if let Some(endpoint) = lookup("R2_ENDPOINT_URL") {
        s3.endpoint = Some(endpoint);
        touched = true;
    }
    if let Some(key_id) = lookup("R2_ACCESS_KEY_ID") {
        s3.access_key_id = Some(key_id);
        touched = true;
    }
    if let Some(secret) = lookup("R2_SECRET_ACCESS_KEY") {
        s3.secret_access_key = Some(secret);
        touched = true;
    }
    if let Some(bucket) = lookup("R2_BUCKET_NAME") {
        s3.bucket = bucket;
        touched = true;
    }

    if touched && config.store.backend != StoreBackend::S3 {
        tracing::info!("R2 environment detected, using S3 store backend");
        config.store.backend = StoreBackend::S3;
    }
}

/// Expand ~ in path to home directory
pub fn expand_path(path: &Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(rest) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
    }
    path.to_path_buf()
}
