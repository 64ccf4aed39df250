//! Configuration file loading for CLI defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use restclient_core::{Charset, HttpVersion, RedirectPolicy};

const HEADER_KEY_PREFIX: &str = "header.";

/// File configuration for restclient defaults.
#[derive(Debug, Clone, Default)]
pub struct FileConfig {
    /// Default whole-request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Default protocol version.
    pub http_version: Option<HttpVersion>,
    /// Default redirect policy.
    pub redirect: Option<RedirectPolicy>,
    /// Body charset.
    pub charset: Option<Charset>,
    /// User-Agent override.
    pub user_agent: Option<String>,
    /// Default headers, in file order.
    pub headers: Vec<(String, String)>,
}

impl FileConfig {
    /// Validates config values against CLI constraints.
    pub fn validate(&self) -> Result<()> {
        if let Some(timeout) = self.timeout_secs
            && !(1..=3600).contains(&timeout)
        {
            bail!("Invalid config value for `timeout_secs`: {timeout}. Expected range: 1..=3600");
        }
        if let Some(user_agent) = &self.user_agent
            && user_agent.trim().is_empty()
        {
            bail!("Invalid config value for `user_agent`: must not be empty");
        }
        Ok(())
    }
}

/// Loaded config metadata.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Resolved config path if a base directory is known.
    pub path: Option<PathBuf>,
    /// Parsed file config when a config file exists and was valid.
    pub config: Option<FileConfig>,
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/restclient/config.toml`
/// 2. `$HOME/.config/restclient/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("restclient")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("restclient")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from the default path if present.
pub fn load_default_file_config() -> Result<LoadedConfig> {
    let path = resolve_default_config_path();
    let config = match path.as_deref() {
        Some(path_ref) if path_ref.exists() => Some(load_file_config(path_ref)?),
        _ => None,
    };
    Ok(LoadedConfig { path, config })
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_number = line_index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_number}: expected key = value");
        };

        let key = raw_key.trim();
        let value = raw_value.trim();

        match key {
            "timeout_secs" => {
                let parsed = parse_integer_u64(value).with_context(|| {
                    format!("Invalid `timeout_secs` value on line {line_number}")
                })?;
                cfg.timeout_secs = Some(parsed);
            }
            "http_version" => {
                let parsed = parse_enum_literal::<HttpVersion>(value).with_context(|| {
                    format!("Invalid `http_version` value on line {line_number}")
                })?;
                cfg.http_version = Some(parsed);
            }
            "redirect" => {
                let parsed = parse_enum_literal::<RedirectPolicy>(value)
                    .with_context(|| format!("Invalid `redirect` value on line {line_number}"))?;
                cfg.redirect = Some(parsed);
            }
            "charset" => {
                let parsed = parse_enum_literal::<Charset>(value)
                    .with_context(|| format!("Invalid `charset` value on line {line_number}"))?;
                cfg.charset = Some(parsed);
            }
            "user_agent" => {
                let parsed = parse_string_literal(value).with_context(|| {
                    format!("Invalid `user_agent` value on line {line_number}")
                })?;
                cfg.user_agent = Some(parsed);
            }
            header_key if header_key.starts_with(HEADER_KEY_PREFIX) => {
                let name = header_key[HEADER_KEY_PREFIX.len()..].trim();
                if name.is_empty() {
                    bail!("Missing header name in `{header_key}` on line {line_number}");
                }
                let parsed = parse_string_literal(value).with_context(|| {
                    format!("Invalid `{header_key}` value on line {line_number}")
                })?;
                cfg.headers.push((name.to_string(), parsed));
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_number}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_enum_literal<T>(raw_value: &str) -> Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    let literal = parse_string_literal(raw_value)?;
    literal.parse::<T>().map_err(anyhow::Error::msg)
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}
