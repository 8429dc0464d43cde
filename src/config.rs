//! Process configuration read from the environment at startup

use std::str::FromStr;

/// Default refinement passes when a request names neither a count nor an effort
pub const DEFAULT_REFINEMENT_LOOPS: u32 = 2;
pub const DEFAULT_MAX_TOKENS: u32 = 4096;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_PORT: u16 = 2024;

/// Knobs applied to every workflow run
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    pub default_refinement_loops: u32,
    pub include_few_shot_examples: bool,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            default_refinement_loops: DEFAULT_REFINEMENT_LOOPS,
            include_few_shot_examples: true,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl WorkflowConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_refinement_loops: parse_env("FRAMEWORK_REFINEMENT_LOOPS")
                .unwrap_or(defaults.default_refinement_loops),
            include_few_shot_examples: env_flag("INCLUDE_FEW_SHOT_EXAMPLES")
                .unwrap_or(defaults.include_few_shot_examples),
            max_tokens: parse_env("FRAMEWORK_MAX_TOKENS").unwrap_or(defaults.max_tokens),
            temperature: parse_env("FRAMEWORK_TEMPERATURE").unwrap_or(defaults.temperature),
        }
    }
}

/// HTTP listener settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            port: parse_env("PAPER_FRAMEWORK_PORT").unwrap_or(DEFAULT_PORT),
        }
    }
}

fn parse_env<T: FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(var = name, value = %raw, "Ignoring unparseable environment value");
            None
        }
    }
}

fn env_flag(name: &str) -> Option<bool> {
    let raw = std::env::var(name).ok()?;
    parse_flag(&raw)
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
