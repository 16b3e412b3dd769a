use std::env;

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        GeminiConfig {
            api_key: None,
            model: None,
            base_url: None,
        }
    }
}

impl GeminiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let api_key = env::var("GEMINI_API_KEY")
            .or_else(|_| env::var("GOOGLE_API_KEY"))
            .ok();
        let model = env::var("GEMINI_MODEL").ok();
        let base_url = env::var("GEMINI_BASE_URL").ok();

        GeminiConfig {
            api_key,
            model,
            base_url,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub gemini: Option<GeminiConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: None,
            port: None,
            gemini: None,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let host = env::var("HOST").ok();
        let port = env::var("PORT").ok().and_then(|port| port.parse().ok());

        Config {
            host,
            port,
            gemini: None,
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_gemini(mut self, config: GeminiConfig) -> Self {
        self.gemini = Some(config);
        self
    }

    pub fn bind_addr(&self) -> (String, u16) {
        (
            self.host.clone().unwrap_or_else(|| "127.0.0.1".to_string()),
            self.port.unwrap_or(8080),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_chain() {
        let config = Config::new()
            .with_host("0.0.0.0")
            .with_port(9090)
            .with_gemini(GeminiConfig::new().with_api_key("k").with_model("m"));

        assert_eq!(config.bind_addr(), ("0.0.0.0".to_string(), 9090));
        let gemini = config.gemini.unwrap();
        assert_eq!(gemini.api_key.as_deref(), Some("k"));
        assert_eq!(gemini.model.as_deref(), Some("m"));
    }

    #[test]
    fn test_bind_addr_defaults() {
        let config = Config::new();
        assert_eq!(config.bind_addr(), ("127.0.0.1".to_string(), 8080));
    }
}
