//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use std::env;

/// Environment variable prefix
const ENV_PREFIX: &str = "SITETEST";

/// Environment configuration from environment variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// Config file from SITETEST_CONFIG
    pub config_file: Option<String>,
    /// Log level from SITETEST_LOG
    pub log_level: Option<String>,
    /// Output format from SITETEST_FORMAT
    pub format: Option<String>,
    /// Per test timeout from SITETEST_TIMEOUT
    pub timeout: Option<u64>,
    /// Simulated pass probability from SITETEST_PASS_PROBABILITY
    pub pass_probability: Option<f64>,
    /// Generation API base URL from SITETEST_BASE_URL
    pub base_url: Option<String>,
    /// Generation model from SITETEST_MODEL
    pub model: Option<String>,
    /// API key from SITETEST_API_KEY, falling back to OPENAI_API_KEY
    pub api_key: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            config_file: get_env("CONFIG"),
            log_level: get_env("LOG"),
            format: get_env("FORMAT"),
            timeout: get_env_parse("TIMEOUT"),
            pass_probability: get_env_parse("PASS_PROBABILITY"),
            base_url: get_env("BASE_URL"),
            model: get_env("MODEL"),
            api_key: get_env("API_KEY").or_else(|| env::var("OPENAI_API_KEY").ok()),
        }
    }

    /// Check if any environment variables are set
    pub fn has_any(&self) -> bool {
        self.config_file.is_some()
            || self.log_level.is_some()
            || self.format.is_some()
            || self.timeout.is_some()
            || self.pass_probability.is_some()
            || self.base_url.is_some()
            || self.model.is_some()
            || self.api_key.is_some()
    }

    /// Print current environment configuration
    pub fn print_summary(&self) {
        println!("Environment Configuration:");
        println!("  {}_CONFIG:           {:?}", ENV_PREFIX, self.config_file);
        println!("  {}_LOG:              {:?}", ENV_PREFIX, self.log_level);
        println!("  {}_FORMAT:           {:?}", ENV_PREFIX, self.format);
        println!("  {}_TIMEOUT:          {:?}", ENV_PREFIX, self.timeout);
        println!("  {}_PASS_PROBABILITY: {:?}", ENV_PREFIX, self.pass_probability);
        println!("  {}_BASE_URL:         {:?}", ENV_PREFIX, self.base_url);
        println!("  {}_MODEL:            {:?}", ENV_PREFIX, self.model);
        println!(
            "  {}_API_KEY:          {}",
            ENV_PREFIX,
            if self.api_key.is_some() { "<set>" } else { "<unset>" }
        );
    }
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}")).ok()
}

/// Get environment variable and parse to type
fn get_env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    get_env(name).and_then(|v| v.parse().ok())
}

/// Print all SITETEST environment variables
pub fn print_env_help() {
    println!("Environment Variables:");
    println!();
    println!("  {ENV_PREFIX}_CONFIG            Path to configuration file");
    println!("  {ENV_PREFIX}_LOG               Log level (trace, debug, info, warn, error)");
    println!("  {ENV_PREFIX}_FORMAT            Output format (table, json, json-pretty, csv, summary)");
    println!("  {ENV_PREFIX}_TIMEOUT           Per test case timeout in seconds");
    println!("  {ENV_PREFIX}_PASS_PROBABILITY  Pass probability of simulated runs (0.0-1.0)");
    println!("  {ENV_PREFIX}_BASE_URL          OpenAI-compatible API base URL");
    println!("  {ENV_PREFIX}_MODEL             Model used to generate test cases");
    println!("  {ENV_PREFIX}_API_KEY           API key (falls back to OPENAI_API_KEY)");
    println!();
    println!("Example:");
    println!("  export {ENV_PREFIX}_MODEL=gpt-4o-mini");
    println!("  sitetest run --url https://shop.example.com");
}
