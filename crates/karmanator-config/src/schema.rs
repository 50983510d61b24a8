use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

/// Root configuration — maps to `karmanator.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KarmaConfig {
    pub irc: IrcConfig,
    pub store: StoreConfig,
    pub logging: LoggingConfig,
}

// ── IRC ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IrcConfig {
    /// Nickname the bot registers with.
    pub nick: String,
    /// Username sent in the USER command.
    pub user: String,
    /// Server password (PASS). Falls back to `KARMANATOR_PASSWORD`.
    pub password: Option<String>,
    /// Server hostname.
    pub server: String,
    pub port: u16,
    /// Rooms to join. Accepts a single name or a list; `#` is optional.
    #[serde(
        alias = "channels",
        alias = "room",
        deserialize_with = "deserialize_rooms"
    )]
    pub rooms: Vec<String>,
}

impl Default for IrcConfig {
    fn default() -> Self {
        Self {
            nick: "karmanator".into(),
            user: "karmanator".into(),
            password: None,
            server: "irc.libera.chat".into(),
            port: 6667,
            rooms: vec![],
        }
    }
}

impl IrcConfig {
    /// Room names as they must appear in a JOIN, each prefixed with `#`.
    pub fn join_targets(&self) -> Vec<String> {
        self.rooms
            .iter()
            .map(|r| r.trim())
            .filter(|r| !r.is_empty())
            .map(|r| {
                if r.starts_with('#') || r.starts_with('&') {
                    r.to_string()
                } else {
                    format!("#{r}")
                }
            })
            .collect()
    }

    /// `host:port` for the TCP connection.
    pub fn address(&self) -> String {
        format!("{}:{}", self.server, self.port)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn deserialize_rooms<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(room) => vec![room],
        OneOrMany::Many(rooms) => rooms,
    })
}

// ── Store ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path to the YAML karma store.
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("karma.yaml"),
        }
    }
}

// ── Logging ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
    /// Output format: "pretty", "json", "compact".
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

// ── Validation ─────────────────────────────────────────────────

/// A problem found while validating the configuration.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub field: String,
    pub message: String,
    pub severity: WarningSeverity,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let icon = match self.severity {
            WarningSeverity::Error => "❌",
            WarningSeverity::Warning => "⚠️ ",
            WarningSeverity::Info => "💡",
        };
        write!(f, "{} {}: {}", icon, self.field, self.message)?;
        if let Some(ref h) = self.hint {
            write!(f, " ({})", h)?;
        }
        Ok(())
    }
}

impl KarmaConfig {
    /// Check the config for problems. Returns the non-fatal warnings, or
    /// `KarmaError::ConfigValidation` naming every `WarningSeverity::Error`
    /// found.
    pub fn validate(&self) -> karmanator_core::Result<Vec<ConfigWarning>> {
        let mut warnings = Vec::new();

        // ── Nick ───
        let nick = self.irc.nick.trim();
        if nick.is_empty() {
            warnings.push(ConfigWarning {
                field: "irc.nick".into(),
                message: "nick is empty".into(),
                severity: WarningSeverity::Error,
                hint: Some("Set to e.g. 'karmanator'".into()),
            });
        } else if nick.contains(char::is_whitespace) {
            warnings.push(ConfigWarning {
                field: "irc.nick".into(),
                message: format!("nick '{}' contains whitespace", nick),
                severity: WarningSeverity::Warning,
                hint: Some("IRC servers reject nicks with spaces".into()),
            });
        }

        // ── Server ───
        if self.irc.server.trim().is_empty() {
            warnings.push(ConfigWarning {
                field: "irc.server".into(),
                message: "server is empty".into(),
                severity: WarningSeverity::Error,
                hint: Some("Set to e.g. 'irc.libera.chat'".into()),
            });
        }

        if self.irc.port == 0 {
            warnings.push(ConfigWarning {
                field: "irc.port".into(),
                message: "port is 0".into(),
                severity: WarningSeverity::Error,
                hint: Some("Plain-text IRC usually listens on 6667".into()),
            });
        }

        if self.irc.password.as_deref().is_some_and(|p| !p.is_empty()) {
            warnings.push(ConfigWarning {
                field: "irc.password".into(),
                message: "the server password is sent over an unencrypted connection".into(),
                severity: WarningSeverity::Info,
                hint: Some("Use a password unique to this bot".into()),
            });
        }

        // ── Rooms ───
        if self.irc.join_targets().is_empty() {
            warnings.push(ConfigWarning {
                field: "irc.rooms".into(),
                message: "no rooms configured; the bot will only answer direct messages".into(),
                severity: WarningSeverity::Warning,
                hint: Some("Add e.g. rooms = [\"general\"]".into()),
            });
        }

        // ── Logging format ───
        let valid_formats = ["pretty", "json", "compact"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            warnings.push(ConfigWarning {
                field: "logging.format".into(),
                message: format!("unknown log format '{}'", self.logging.format),
                severity: WarningSeverity::Warning,
                hint: Some(format!("Valid values: {}", valid_formats.join(", "))),
            });
        }

        // ── Logging level ───
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            warnings.push(ConfigWarning {
                field: "logging.level".into(),
                message: format!("unknown log level '{}'", self.logging.level),
                severity: WarningSeverity::Warning,
                hint: Some(format!("Valid values: {}", valid_levels.join(", "))),
            });
        }

        let (errors, warnings): (Vec<_>, Vec<_>) = warnings
            .into_iter()
            .partition(|w| w.severity == WarningSeverity::Error);

        if !errors.is_empty() {
            let fields: Vec<&str> = errors.iter().map(|w| w.field.as_str()).collect();
            let reasons: Vec<String> = errors.iter().map(|w| w.to_string()).collect();
            return Err(karmanator_core::KarmaError::ConfigValidation {
                field: fields.join(", "),
                reason: format!("\n  {}", reasons.join("\n  ")),
            });
        }

        Ok(warnings)
    }

    /// A copy safe to print: the server password is masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.irc.password.is_some() {
            copy.irc.password = Some("********".into());
        }
        copy
    }
}
