use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    /// Base URL of the OpenAI-compatible API, without a trailing slash.
    pub openai_api_base: String,
    pub chat_model: String,
    pub chat_temperature: f32,
    pub tts_model: String,
    pub tts_voice: String,
    pub stt_model: String,
    /// Program spawned once per tool round to serve the tool manifest.
    pub tool_server_command: String,
    pub tool_server_args: Vec<String>,
    pub tool_timeout_secs: u64,
    /// Appends the stay-on-topic reminder to the latest user message sent to the model.
    pub topic_guard: bool,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openai_api_key: require_env("OPENAI_API_KEY")?,
            openai_api_base: optional_env("OPENAI_API_BASE", "https://api.openai.com/v1")
                .trim_end_matches('/')
                .to_string(),
            chat_model: optional_env("OPENAI_MODEL", "gpt-4o-mini"),
            chat_temperature: optional_env("CHAT_TEMPERATURE", "0.7")
                .parse::<f32>()
                .context("CHAT_TEMPERATURE must be a number")?,
            tts_model: optional_env("TTS_MODEL", "tts-1"),
            tts_voice: optional_env("TTS_VOICE", "alloy"),
            stt_model: optional_env("STT_MODEL", "whisper-1"),
            tool_server_command: optional_env("TOOL_SERVER_COMMAND", "problem-server"),
            tool_server_args: split_args(&optional_env("TOOL_SERVER_ARGS", "")),
            tool_timeout_secs: optional_env("TOOL_TIMEOUT_SECS", "30")
                .parse::<u64>()
                .context("TOOL_TIMEOUT_SECS must be a whole number of seconds")?,
            topic_guard: parse_bool(&optional_env("TOPIC_GUARD", "true"))
                .context("TOPIC_GUARD must be true or false")?,
            port: optional_env("PORT", "8000")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn split_args(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(String::from).collect()
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("unrecognised boolean '{other}'"),
    }
}

#[cfg(test)]
impl Config {
    /// Configuration used by in-process tests. Nothing here is contacted.
    pub fn for_tests() -> Self {
        Config {
            openai_api_key: "test-key".to_string(),
            openai_api_base: "http://127.0.0.1:9".to_string(),
            chat_model: "test-model".to_string(),
            chat_temperature: 0.7,
            tts_model: "tts-1".to_string(),
            tts_voice: "alloy".to_string(),
            stt_model: "whisper-1".to_string(),
            tool_server_command: "problem-server".to_string(),
            tool_server_args: vec![],
            tool_timeout_secs: 5,
            topic_guard: true,
            port: 0,
            rust_log: "debug".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_args_on_whitespace() {
        assert_eq!(
            split_args("  --quiet   run server.py "),
            vec!["--quiet", "run", "server.py"]
        );
        assert!(split_args("").is_empty());
    }

    #[test]
    fn test_parse_bool_accepts_common_spellings() {
        assert!(parse_bool("TRUE").unwrap());
        assert!(parse_bool(" on ").unwrap());
        assert!(!parse_bool("0").unwrap());
        assert!(!parse_bool("no").unwrap());
    }

    #[test]
    fn test_parse_bool_rejects_garbage() {
        assert!(parse_bool("maybe").is_err());
    }
}
