use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub guard: GuardConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    /// Port of the `/health` + `/metrics` listener; `0` disables it.
    #[serde(default = "default_admin_port")]
    pub admin_port: Option<u16>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4), admin_port: default_admin_port() }
    }
}

/// In-memory store tuning.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// `sequence` (per-kind counter) or `uuid`.
    #[serde(default = "default_id_strategy")]
    pub id_strategy: String,
    #[serde(default = "default_max_kind_len")]
    pub max_kind_len: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { id_strategy: default_id_strategy(), max_kind_len: default_max_kind_len() }
    }
}

/// Coarse authorization rules. All empty means every request is allowed.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct GuardConfig {
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub deny_kinds: Vec<String>,
    #[serde(default)]
    pub allow_kinds: Vec<String>,
}

impl GuardConfig {
    /// True when no rule is configured and the no-op guard suffices.
    pub fn is_open(&self) -> bool {
        !self.read_only && self.deny_kinds.is_empty() && self.allow_kinds.is_empty()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { format: default_log_format() }
    }
}

fn default_id_strategy() -> String { "sequence".into() }
fn default_max_kind_len() -> usize { 256 }
fn default_log_format() -> String { "compact".into() }
fn default_admin_port() -> Option<u16> { Some(9090) }

pub fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    from_toml_str(&content)
}

pub fn from_toml_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

/// Defaults overlaid with `SERVER_HOST`, `SERVER_PORT`, `SERVER_ADMIN_PORT`
/// and `TOKIO_WORKER_THREADS`.
pub fn from_env() -> AppConfig {
    let mut cfg = AppConfig::default();
    if let Ok(host) = std::env::var("SERVER_HOST") {
        cfg.server.host = host;
    }
    if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
        cfg.server.port = port;
    }
    if let Some(port) = std::env::var("SERVER_ADMIN_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
        cfg.server.admin_port = Some(port);
    }
    if let Some(w) = std::env::var("TOKIO_WORKER_THREADS").ok().and_then(|v| v.parse::<usize>().ok()) {
        cfg.server.worker_threads = Some(w);
    }
    cfg
}

impl AppConfig {
    /// Load `config.toml` (or `CONFIG_PATH`), falling back to the environment
    /// when the file is missing, then validate.
    pub fn load_and_validate() -> Result<Self> {
        Self::load_and_validate_from(&config_path())
    }

    /// Only a missing file falls back to the environment; a file that exists
    /// but cannot be read or parsed is an error.
    pub fn load_and_validate_from(path: &str) -> Result<Self> {
        let mut cfg = match load_from_file(path) {
            Ok(cfg) => cfg,
            Err(e) if is_missing_file(&e) => from_env(),
            Err(e) => return Err(e.context(format!("loading {path}"))),
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.store.validate()?;
        self.guard.validate()?;
        self.log.validate()?;
        Ok(())
    }
}

fn is_missing_file(err: &anyhow::Error) -> bool {
    err.downcast_ref::<std::io::Error>()
        .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound)
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        if self.admin_port == Some(0) {
            self.admin_port = None;
        }
        if self.admin_port == Some(self.port) {
            return Err(anyhow!("server.admin_port must differ from server.port"));
        }
        Ok(())
    }
}

impl StoreConfig {
    fn validate(&self) -> Result<()> {
        match self.id_strategy.as_str() {
            "sequence" | "uuid" => {}
            other => return Err(anyhow!("store.id_strategy must be `sequence` or `uuid`, got `{other}`")),
        }
        if self.max_kind_len == 0 {
            return Err(anyhow!("store.max_kind_len must be >= 1"));
        }
        Ok(())
    }
}

impl GuardConfig {
    fn validate(&self) -> Result<()> {
        if let Some(kind) = self.allow_kinds.iter().find(|k| self.deny_kinds.contains(k)) {
            return Err(anyhow!("guard: kind `{kind}` is both allowed and denied"));
        }
        Ok(())
    }
}

impl LogConfig {
    fn validate(&self) -> Result<()> {
        match self.format.as_str() {
            "compact" | "json" => Ok(()),
            other => Err(anyhow!("log.format must be `compact` or `json`, got `{other}`")),
        }
    }
}
