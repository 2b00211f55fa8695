use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Anthropic,
    OpenAi,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    pub provider: ProviderKind,
    pub model: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    /// Custom endpoint for compatible APIs
    #[serde(default)]
    pub api_base: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReportConfig {
    pub id: u32,
    pub name: String,
    pub tool: String,
    pub default_limit: usize,
    pub max_limit: usize,
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[server]
host = "0.0.0.0"
port = 3001

[llm]
provider = "anthropic"
model = "claude-sonnet-4-20250514"
max_tokens = 4000
timeout_secs = 60
api_key_env = "ANTHROPIC_API_KEY"

[report]
id = 272
name = "Sales by Customer Summary"
tool = "ns_runReport"
default_limit = 5
max_limit = 50
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
///
/// `PORT` from the environment overrides `server.port` in both cases.
pub fn load_config() -> anyhow::Result<Config> {
    let mut config = match find_config_file() {
        Some(contents) => parse_config(&contents)?,
        None => {
            tracing::info!("Using default embedded configuration");
            parse_config(DEFAULT_CONFIG)?
        }
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    Ok(config)
}

fn find_config_file() -> Option<String> {
    let exe_path = std::env::current_exe().ok()?;
    let config_path = exe_path.parent()?.join("config.toml");

    if !config_path.exists() {
        tracing::warn!("config.toml not found at: {}", config_path.display());
        return None;
    }

    tracing::info!("Loading config from: {}", config_path.display());
    match std::fs::read_to_string(&config_path) {
        Ok(contents) => Some(contents),
        Err(e) => {
            tracing::warn!("Cannot read {}: {}", config_path.display(), e);
            None
        }
    }
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let config: Config = toml::from_str(contents)?;

    if config.report.default_limit == 0 || config.report.default_limit > config.report.max_limit {
        anyhow::bail!(
            "report.default_limit must be in 1..={}, got {}",
            config.report.max_limit,
            config.report.default_limit
        );
    }
    if config.llm.timeout_secs == 0 {
        anyhow::bail!("llm.timeout_secs must be positive");
    }

    Ok(config)
}

fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> anyhow::Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(port) = lookup("PORT") {
        config.server.port = port
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid PORT value '{}': {}", port, e))?;
    }
    Ok(())
}

impl Config {
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse()
            .map_err(|e| anyhow::anyhow!("Invalid listen address '{}': {}", addr, e))
    }

    /// Read the provider credential once; absence is reported, not fatal
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.llm.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.llm.provider, ProviderKind::Anthropic);
        assert_eq!(config.llm.model, "claude-sonnet-4-20250514");
        assert_eq!(config.llm.max_tokens, 4000);
        assert_eq!(config.report.id, 272);
        assert_eq!(config.report.default_limit, 5);
        assert!(config.llm.api_base.is_none());
    }

    #[test]
    fn test_port_override() {
        let mut config = parse_config(DEFAULT_CONFIG).unwrap();
        apply_env_overrides(&mut config, |key| {
            (key == "PORT").then(|| "8080".to_string())
        })
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.socket_addr().unwrap().port(), 8080);
    }

    #[test]
    fn test_invalid_port_override() {
        let mut config = parse_config(DEFAULT_CONFIG).unwrap();
        let result = apply_env_overrides(&mut config, |_| Some("not-a-port".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_openai_provider_section() {
        let contents = DEFAULT_CONFIG
            .replace("provider = \"anthropic\"", "provider = \"openai\"\napi_base = \"http://localhost:1234/v1\"");
        let config = parse_config(&contents).unwrap();
        assert_eq!(config.llm.provider, ProviderKind::OpenAi);
        assert_eq!(config.llm.api_base.as_deref(), Some("http://localhost:1234/v1"));
    }

    #[test]
    fn test_default_limit_above_max_rejected() {
        let contents = DEFAULT_CONFIG.replace("default_limit = 5", "default_limit = 500");
        assert!(parse_config(&contents).is_err());
    }
}
