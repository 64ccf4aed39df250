//! CLI entry point for restclient.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use restclient_core::{
    HttpVersion, ResponseHeaders, ResponseMeta, RestClient, RestRequest, TransportConfig,
};
use tracing::{debug, info};

mod app_config;
mod cli;

use app_config::{FileConfig, load_default_file_config};
use cli::{Args, CliMethod};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(method = ?args.method, url = %args.url, "CLI arguments parsed");

    let loaded = load_default_file_config()?;
    if let Some(path) = loaded.path.as_deref().filter(|_| loaded.config.is_some()) {
        debug!(path = %path.display(), "Loaded config file");
    }
    let file_config = loaded.config.unwrap_or_default();

    let config = build_transport_config(&args, &file_config);
    let client = RestClient::with_config(config).context("Failed to build HTTP client")?;

    run(&client, args).await
}

fn build_transport_config(args: &Args, file: &FileConfig) -> TransportConfig {
    let mut builder = TransportConfig::builder().headers(file.headers.iter().cloned());

    let version = if args.http2 {
        Some(HttpVersion::Http2)
    } else {
        file.http_version
    };
    if let Some(version) = version {
        builder = builder.version(version);
    }
    if let Some(redirect) = args.redirect.map(Into::into).or(file.redirect) {
        builder = builder.redirect(redirect);
    }
    if let Some(secs) = args.timeout.or(file.timeout_secs) {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    if let Some(charset) = file.charset {
        builder = builder.charset(charset);
    }
    if let Some(user_agent) = &file.user_agent {
        builder = builder.user_agent(user_agent.clone());
    }
    builder.build()
}

async fn run(client: &RestClient, args: Args) -> Result<()> {
    let verbose = args.verbose > 0 && !args.quiet;

    let request = match args.method {
        CliMethod::Head => {
            let response = client
                .head(args.url.as_str())
                .await
                .with_context(|| format!("HEAD {} failed", args.url))?;
            print_head(&response, true);
            return Ok(());
        }
        CliMethod::Download => {
            let Some(output) = args.output else {
                bail!("`download` requires --output <PATH>");
            };
            let response = client
                .download_file(args.url.as_str(), output)
                .await
                .with_context(|| format!("Download of {} failed", args.url))?;
            print_head(&response, verbose);
            info!(bytes = response.bytes_written(), "Saved response body");
            println!("{}", response.path().display());
            return Ok(());
        }
        CliMethod::Get => RestRequest::get(args.url.as_str()),
        CliMethod::Delete => RestRequest::delete(args.url.as_str()),
        CliMethod::Post => RestRequest::post(args.url.as_str()),
        CliMethod::Put => RestRequest::put(args.url.as_str()),
        CliMethod::Patch => RestRequest::patch(args.url.as_str()),
    };

    let mut request = request.headers(args.headers);
    if let Some(data) = args.data {
        request = request.body(data);
    }

    let method = request.method();
    let response = client
        .execute(request)
        .await
        .with_context(|| format!("{method} {} failed", args.url))?;
    print_head(&response, verbose);
    println!("{}", response.body());
    Ok(())
}

fn print_head(response: &impl ResponseMeta, with_headers: bool) {
    println!("HTTP {}", response.status());
    if with_headers {
        print_headers(response.headers());
    }
}

fn print_headers(headers: &ResponseHeaders) {
    for (name, values) in headers.iter() {
        for value in values {
            println!("{name}: {value}");
        }
    }
}
