//! Runtime configuration: API key, provider endpoint, generation options.
//!
//! Sources, highest precedence first: command-line flags, environment
//! variables, an optional YAML file, built-in defaults. The API key never
//! comes from the file; when flag and environment are both absent the user
//! is asked for it with a masked prompt.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::llm::client::DEFAULT_BASE_URL;
use crate::llm::types::GenerationOptions;
use crate::llm::ChatClient;
use crate::term::{self, PromptError, Terminal};

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";

/// Errors while assembling configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file {path}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("invalid setting: {0}")]
    Invalid(String),

    #[error(transparent)]
    Prompt(#[from] PromptError),
}

/// Optional YAML config file.
///
/// ```yaml
/// model: gpt-4o
/// temperature: 0.4
/// max_tokens: 6000
/// base_url: https://api.openai.com/v1
/// ```
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub base_url: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }
}

/// Values taken from the process environment.
#[derive(Debug, Default, Clone)]
pub struct Environment {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

impl Environment {
    pub fn from_process() -> Self {
        Self {
            api_key: non_blank(std::env::var(API_KEY_ENV).ok()),
            base_url: non_blank(std::env::var(BASE_URL_ENV).ok()),
        }
    }
}

/// Settings given on the command line.
#[derive(Debug, Default, Clone)]
pub struct FlagSettings {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// Where the API key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Flag,
    Environment,
    Prompt,
}

/// Fully resolved configuration for one run.
#[derive(Clone)]
pub struct Settings {
    pub api_key: String,
    pub key_source: KeySource,
    pub base_url: String,
    pub options: GenerationOptions,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &"[REDACTED]")
            .field("key_source", &self.key_source)
            .field("base_url", &self.base_url)
            .field("options", &self.options)
            .finish()
    }
}

impl Settings {
    /// Resolve every setting, prompting for the API key if needed.
    pub fn resolve(
        flags: &FlagSettings,
        env: &Environment,
        file: &FileConfig,
        term: &mut dyn Terminal,
    ) -> Result<Self, ConfigError> {
        let options = resolve_options(flags, file)?;
        let base_url = flags
            .base_url
            .clone()
            .or_else(|| env.base_url.clone())
            .or_else(|| file.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let (api_key, key_source) = resolve_api_key(flags.api_key.as_deref(), env, term)?;

        info!(
            model = %options.model,
            base_url = %base_url,
            key_source = ?key_source,
            "configuration resolved"
        );

        Ok(Self {
            api_key,
            key_source,
            base_url,
            options,
        })
    }

    /// Build the production chat client from these settings.
    pub fn chat_client(&self) -> ChatClient {
        ChatClient::with_base_url(
            self.api_key.clone(),
            self.base_url.clone(),
            self.options.clone(),
        )
    }
}

/// API key: explicit flag, then environment, then masked prompt.
pub fn resolve_api_key(
    flag: Option<&str>,
    env: &Environment,
    term: &mut dyn Terminal,
) -> Result<(String, KeySource), ConfigError> {
    if let Some(key) = flag.map(str::trim).filter(|k| !k.is_empty()) {
        return Ok((key.to_string(), KeySource::Flag));
    }
    if let Some(key) = env.api_key.as_deref() {
        return Ok((key.to_string(), KeySource::Environment));
    }
    let key = term::ask_secret(term, "OpenAI API key:")?;
    Ok((key, KeySource::Prompt))
}

fn resolve_options(
    flags: &FlagSettings,
    file: &FileConfig,
) -> Result<GenerationOptions, ConfigError> {
    let defaults = GenerationOptions::default();
    let options = GenerationOptions {
        model: flags
            .model
            .clone()
            .or_else(|| file.model.clone())
            .unwrap_or(defaults.model),
        temperature: flags
            .temperature
            .or(file.temperature)
            .unwrap_or(defaults.temperature),
        max_tokens: flags
            .max_tokens
            .or(file.max_tokens)
            .unwrap_or(defaults.max_tokens),
    };

    if options.model.trim().is_empty() {
        return Err(ConfigError::Invalid("model name is empty".into()));
    }
    if !(0.0..=2.0).contains(&options.temperature) {
        return Err(ConfigError::Invalid(format!(
            "temperature {} is outside 0.0..=2.0",
            options.temperature
        )));
    }
    if options.max_tokens == 0 {
        return Err(ConfigError::Invalid("max_tokens must be positive".into()));
    }
    Ok(options)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::types::{ChatRequest, Message};
    use crate::term::testing::ScriptedTerminal;

    fn env_with_key(key: &str) -> Environment {
        Environment {
            api_key: Some(key.into()),
            base_url: None,
        }
    }

    #[test]
    fn flag_key_beats_environment() {
        let mut term = ScriptedTerminal::default();
        let (key, source) = resolve_api_key(Some("sk-flag"), &env_with_key("sk-env"), &mut term)
            .unwrap();
        assert_eq!(key, "sk-flag");
        assert_eq!(source, KeySource::Flag);
        assert!(term.questions.is_empty());
    }

    #[test]
    fn environment_key_used_without_flag() {
        let mut term = ScriptedTerminal::default();
        let (key, source) = resolve_api_key(None, &env_with_key("sk-env"), &mut term).unwrap();
        assert_eq!(key, "sk-env");
        assert_eq!(source, KeySource::Environment);
    }

    #[test]
    fn prompts_when_no_key_anywhere() {
        let mut term = ScriptedTerminal::default();
        term.secrets.push_back("sk-typed".into());
        let (key, source) = resolve_api_key(None, &Environment::default(), &mut term).unwrap();
        assert_eq!(key, "sk-typed");
        assert_eq!(source, KeySource::Prompt);
        assert_eq!(term.questions.len(), 1);
    }

    #[test]
    fn flag_key_is_sent_in_authorization_header() {
        let mut term = ScriptedTerminal::default();
        let flags = FlagSettings {
            api_key: Some("sk-flag".into()),
            base_url: Some("http://localhost:9".into()),
            ..FlagSettings::default()
        };
        let settings = Settings::resolve(
            &flags,
            &env_with_key("sk-env"),
            &FileConfig::default(),
            &mut term,
        )
        .unwrap();

        let client = settings.chat_client();
        let body = ChatRequest::new(vec![Message::user("x")], client.defaults());
        let request = client.raw().request(&body).build().unwrap();
        assert_eq!(request.headers()["authorization"], "Bearer sk-flag");
    }

    #[test]
    fn flags_override_file_and_defaults() {
        let file = FileConfig::parse("model: gpt-4o-mini\ntemperature: 0.2\nmax_tokens: 900\n")
            .unwrap();
        let flags = FlagSettings {
            temperature: Some(1.1),
            ..FlagSettings::default()
        };
        let options = resolve_options(&flags, &file).unwrap();
        assert_eq!(options.model, "gpt-4o-mini");
        assert!((options.temperature - 1.1).abs() < f32::EPSILON);
        assert_eq!(options.max_tokens, 900);
    }

    #[test]
    fn base_url_precedence() {
        let mut term = ScriptedTerminal::default();
        let env = Environment {
            api_key: Some("k".into()),
            base_url: Some("http://env".into()),
        };
        let file = FileConfig {
            base_url: Some("http://file".into()),
            ..FileConfig::default()
        };
        let settings =
            Settings::resolve(&FlagSettings::default(), &env, &file, &mut term).unwrap();
        assert_eq!(settings.base_url, "http://env");

        let settings = Settings::resolve(
            &FlagSettings::default(),
            &env_with_key("k"),
            &FileConfig::default(),
            &mut term,
        )
        .unwrap();
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn rejects_out_of_range_temperature() {
        let flags = FlagSettings {
            temperature: Some(3.5),
            ..FlagSettings::default()
        };
        let err = resolve_options(&flags, &FileConfig::default()).unwrap_err();
        assert!(err.to_string().contains("temperature"));
    }

    #[test]
    fn file_config_rejects_unknown_keys() {
        assert!(FileConfig::parse("modle: gpt-4o\n").is_err());
        assert_eq!(FileConfig::parse("").unwrap(), FileConfig::default());
    }

    #[test]
    fn file_config_load_reports_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("nope.yaml");
        let err = FileConfig::load(&missing).unwrap_err();
        assert!(err.to_string().contains("nope.yaml"));

        let path = dir.path().join("drafter.yaml");
        std::fs::write(&path, "max_tokens: 2500\n").unwrap();
        let file = FileConfig::load(&path).unwrap();
        assert_eq!(file.max_tokens, Some(2500));
    }

    #[test]
    fn settings_debug_redacts_key() {
        let mut term = ScriptedTerminal::default();
        let settings = Settings::resolve(
            &FlagSettings::default(),
            &env_with_key("sk-very-secret"),
            &FileConfig::default(),
            &mut term,
        )
        .unwrap();
        assert!(!format!("{settings:?}").contains("sk-very-secret"));
    }
}
