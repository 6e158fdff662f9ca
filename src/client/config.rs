use gemini_live_types::setup::Setup;
use secrecy::SecretString;

use crate::client::consts::{API_VERSION, BASE_URL, DEFAULT_CAPACITY, GEMINI_API_KEY};

#[derive(Debug, Clone)]
pub struct Config {
    base_url: String,
    api_version: String,
    api_key: SecretString,
    capacity: usize,
    setup: Setup,
}

pub struct ConfigBuilder {
    config: Config,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.config.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_api_version(mut self, api_version: &str) -> Self {
        self.config.api_version = api_version.to_string();
        self
    }

    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.config.api_key = SecretString::from(api_key.to_string());
        self
    }

    /// Size of the outbound message queue.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = capacity.max(1);
        self
    }

    pub fn with_setup(mut self, setup: Setup) -> Self {
        self.config.setup = setup;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Default endpoint and setup, with the api key taken from `GEMINI_API_KEY` when set.
    pub fn new() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            api_version: API_VERSION.to_string(),
            api_key: std::env::var(GEMINI_API_KEY).unwrap_or_default().into(),
            capacity: DEFAULT_CAPACITY,
            setup: Setup::default(),
        }
    }

    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub fn api_key(&self) -> &SecretString {
        &self.api_key
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn setup(&self) -> &Setup {
        &self.setup
    }
}
