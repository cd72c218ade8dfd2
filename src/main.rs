use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};

use atomfeed::atom::{self, Content, Entry, Feed, Generator, Link, Mode, Person};
use atomfeed::config::Config;
use atomfeed::fetch;
use atomfeed::render::render_feed;

#[derive(Parser, Debug)]
#[command(name = "atomfeed", about = "Read, validate and write Atom 1.0 feeds")]
struct Args {
    /// Configuration file (defaults to ~/.config/atomfeed/config.toml)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a feed read from a file or URL
    Inspect {
        /// File path or http(s) URL
        source: String,
        /// Read in strict mode regardless of configuration
        #[arg(long)]
        strict: bool,
        /// Print the feed as JSON instead of a tree
        #[arg(long)]
        json: bool,
    },
    /// Check a feed in strict mode and report the first violation
    Validate {
        /// File path or http(s) URL
        source: String,
    },
    /// Read a feed and write it back in canonical form
    Normalize {
        /// File path or http(s) URL
        source: String,
        /// Destination file (stdout when omitted)
        #[arg(long, short, value_name = "FILE")]
        output: Option<PathBuf>,
        /// Read in strict mode regardless of configuration
        #[arg(long)]
        strict: bool,
    },
    /// Print a generated example feed
    Sample,
}

/// Reads the raw document from a local file or a remote URL.
async fn load_source(source: &str, config: &Config) -> Result<Vec<u8>> {
    if fetch::is_remote(source) {
        let client = reqwest::Client::builder()
            .user_agent(concat!("atomfeed/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        tracing::info!(url = %source, "Fetching feed");
        fetch::fetch_feed(&client, source, &config.fetch_options())
            .await
            .with_context(|| format!("Failed to fetch feed: {}", source))
    } else {
        tokio::fs::read(source)
            .await
            .with_context(|| format!("Failed to read feed file: {}", source))
    }
}

fn select_mode(strict: bool, config: &Config) -> Mode {
    if strict {
        Mode::Strict
    } else {
        config.mode
    }
}

/// Writes `content` to `path` via a temporary file and rename, so the
/// destination is never left in a partial state.
fn write_atomically(path: &Path, content: &[u8]) -> Result<()> {
    use std::time::{SystemTime, UNIX_EPOCH};

    let random_suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let temp_path = path.with_extension(format!("tmp.{:016x}", random_suffix));

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&temp_path)
        .with_context(|| {
            format!(
                "Failed to create temporary file '{}': check directory permissions",
                temp_path.display()
            )
        })?;

    file.write_all(content).with_context(|| {
        let _ = std::fs::remove_file(&temp_path);
        format!("Failed to write feed to '{}'", temp_path.display())
    })?;

    file.sync_all().with_context(|| {
        let _ = std::fs::remove_file(&temp_path);
        format!("Failed to sync '{}' to disk", temp_path.display())
    })?;

    drop(file);

    std::fs::rename(&temp_path, path).with_context(|| {
        let _ = std::fs::remove_file(&temp_path);
        format!(
            "Failed to rename '{}' to '{}'",
            temp_path.display(),
            path.display()
        )
    })?;

    Ok(())
}

/// Writes an encoded document to stdout followed by a newline.
fn write_stdout(bytes: &[u8]) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(bytes)
        .context("Failed to write feed to stdout")?;
    stdout.write_all(b"\n").context("Failed to write feed to stdout")?;
    stdout.flush().context("Failed to flush stdout")?;
    Ok(())
}

fn sample_feed() -> Feed {
    let now = Utc::now();

    let mut feed = Feed::new(format!("urn:uuid:{}", uuid::Uuid::new_v4()), "Feed Example", now);
    feed.links
        .push(Link::new("https://example.com/").with_media_type("text/html"));
    feed.authors.push(
        Person::new("Example Author")
            .with_email("me@example.com")
            .with_url("https://example.com/"),
    );
    feed.generator = Some(Generator {
        value: "atomfeed".to_string(),
        uri: Some(env!("CARGO_PKG_REPOSITORY").to_string()),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
    });
    feed.icon = Some("/icon.png".to_string());
    feed.logo = Some("/logo.png".to_string());

    let mut entry = Entry::new(
        format!("urn:uuid:{}", uuid::Uuid::new_v4()),
        "The First Article",
        now,
    );
    entry
        .links
        .push(Link::new("https://example.com/first-article").with_media_type("text/html"));
    entry.summary = Some("The summary of the first article.".into());
    entry.content = Some(Content {
        media_type: Some("text/plain".to_string()),
        ..Content::inline("The content of the first article.")
    });
    feed.entries.push(entry);

    feed
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match args.config.clone().or_else(Config::default_path) {
        Some(path) => Config::load(&path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => Config::default(),
    };

    match args.command {
        Command::Inspect {
            source,
            strict,
            json,
        } => {
            let bytes = load_source(&source, &config).await?;
            let mode = select_mode(strict, &config);
            let Some(feed) = atom::deserialize_slice(&bytes, mode)
                .with_context(|| format!("Failed to deserialize feed: {}", source))?
            else {
                eprintln!("Failed to deserialize feed.");
                std::process::exit(1);
            };

            if json {
                let out = serde_json::to_string_pretty(&feed).context("Failed to encode JSON")?;
                println!("{}", out);
            } else {
                print!("{}", render_feed(&feed));
            }
        }
        Command::Validate { source } => {
            let bytes = load_source(&source, &config).await?;
            match atom::deserialize_slice(&bytes, Mode::Strict) {
                Ok(Some(feed)) => {
                    println!("valid: {} ({} entries)", feed.id, feed.entries.len());
                }
                Ok(None) => {
                    println!("invalid: no feed");
                    std::process::exit(1);
                }
                Err(e) => {
                    println!("invalid: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Command::Normalize {
            source,
            output,
            strict,
        } => {
            let bytes = load_source(&source, &config).await?;
            let mode = select_mode(strict, &config);
            let feed = atom::deserialize_slice(&bytes, mode)
                .with_context(|| format!("Failed to deserialize feed: {}", source))?
                .ok_or_else(|| anyhow::anyhow!("No usable feed in {}", source))?;

            let document = atom::serialize(&feed, config.declared_encoding())
                .context("Feed violates Atom constraints")?;
            let bytes = document
                .to_xml_bytes(config.indent)
                .context("Failed to render feed")?;

            match output {
                Some(path) => {
                    write_atomically(&path, &bytes)?;
                    tracing::info!(
                        path = %path.display(),
                        entries = feed.entries.len(),
                        encoding = document.encoding().unwrap_or("utf-8"),
                        "Wrote normalized feed"
                    );
                    println!("Wrote {}", path.display());
                }
                None => write_stdout(&bytes)?,
            }
        }
        Command::Sample => {
            let bytes = atom::serialize(&sample_feed(), config.declared_encoding())
                .context("Sample feed violates Atom constraints")?
                .to_xml_bytes(config.indent)
                .context("Failed to render feed")?;
            write_stdout(&bytes)?;
        }
    }

    Ok(())
}
