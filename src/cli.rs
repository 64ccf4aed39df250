//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use restclient_core::RedirectPolicy;

/// Send one HTTP request and print the response.
///
/// Restclient issues a single request through the asynchronous REST client
/// engine. Defaults can be set in `$XDG_CONFIG_HOME/restclient/config.toml`;
/// flags override them.
#[derive(Parser, Debug)]
#[command(name = "restclient")]
#[command(author, version, about)]
pub struct Args {
    /// Request method, or `download` to save the body to a file
    #[arg(value_enum)]
    pub method: CliMethod,

    /// Absolute request URL
    pub url: String,

    /// Request body for post, put and patch
    #[arg(short = 'd', long)]
    pub data: Option<String>,

    /// Per-call header as 'Name: value' (repeatable)
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Destination file for `download`
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Prefer HTTP/2 (negotiated, falls back to HTTP/1.1)
    #[arg(long)]
    pub http2: bool,

    /// Whole-request timeout in seconds (1-3600)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub timeout: Option<u64>,

    /// Redirect policy
    #[arg(long, value_enum)]
    pub redirect: Option<CliRedirect>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

/// Operation selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliMethod {
    Head,
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Download,
}

/// Redirect policy names accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliRedirect {
    Never,
    Always,
    Normal,
}

impl From<CliRedirect> for RedirectPolicy {
    fn from(value: CliRedirect) -> Self {
        match value {
            CliRedirect::Never => Self::Never,
            CliRedirect::Always => Self::Always,
            CliRedirect::Normal => Self::Normal,
        }
    }
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let Some((name, value)) = raw.split_once(':') else {
        return Err(format!("expected 'Name: value', got '{raw}'"));
    };
    let name = name.trim();
    if name.is_empty() {
        return Err("header name must not be empty".to_string());
    }
    Ok((name.to_string(), value.trim().to_string()))
}
