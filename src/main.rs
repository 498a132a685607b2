//! Headless converter: turns a JSON-lines capture into an RPA configuration.
//!
//! Usage: rparecorder <events.jsonl> [--name NAME] [--description TEXT]
//!                    [--mode clean|raw|editor] [--out PATH]
//!
//! Without `--out` the configuration is printed to stdout. Logs go to stderr;
//! set RUST_LOG for more detail.

use anyhow::{bail, Context};
use rparecorder_lib::configuration::ConfigurationStore;
use rparecorder_lib::recording::{
    RecordedAction, RecordingSession, ViewMode, DEFAULT_CONFIGURATION_NAME,
};
use rparecorder_lib::storage::{FsStorage, MemoryStorage, Storage};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};

const EVENT_BUFFER: usize = 64;

struct Args {
    input: PathBuf,
    name: String,
    description: String,
    mode: ViewMode,
    out: Option<PathBuf>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<Args> {
    let mut input = None;
    let mut name = DEFAULT_CONFIGURATION_NAME.to_string();
    let mut description = String::new();
    let mut mode = ViewMode::Clean;
    let mut out = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--name" => name = args.next().context("--name needs a value")?,
            "--description" => {
                description = args.next().context("--description needs a value")?
            }
            "--mode" => {
                let value = args.next().context("--mode needs a value")?;
                mode = value.parse().map_err(anyhow::Error::msg)?;
            }
            "--out" => out = Some(PathBuf::from(args.next().context("--out needs a value")?)),
            flag if flag.starts_with("--") => bail!("Unknown option: {}", flag),
            path if input.is_none() => input = Some(PathBuf::from(path)),
            extra => bail!("Unexpected argument: {}", extra),
        }
    }

    Ok(Args {
        input: input.context(
            "Usage: rparecorder <events.jsonl> [--name NAME] [--description TEXT] [--mode clean|raw|editor] [--out PATH]",
        )?,
        name,
        description,
        mode,
        out,
    })
}

/// One action per non-empty line. Malformed lines are skipped.
fn parse_capture(content: &str) -> Vec<RecordedAction> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(n, line)| match serde_json::from_str(line) {
            Ok(action) => Some(action),
            Err(e) => {
                tracing::warn!("Skipping line {}: {}", n + 1, e);
                None
            }
        })
        .collect()
}

/// Push `actions` through a recording session the way a browser event
/// source would, and wait until the session has taken all of them.
async fn replay(session: &RecordingSession, actions: Vec<RecordedAction>) -> anyhow::Result<()> {
    let expected = actions.len();
    let mut changes = session.subscribe();
    let (tx, rx) = mpsc::channel(EVENT_BUFFER);
    if !session.attach_event_source(rx) {
        bail!("Failed to attach event source");
    }

    session.start_recording();
    for action in actions {
        tx.send(action).await.context("Event source closed early")?;
    }
    drop(tx);

    while session.actions().len() < expected {
        match changes.recv().await {
            Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
    session.stop_recording();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    let disk = FsStorage::new();

    let content = disk
        .read(&args.input)
        .await
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let actions = parse_capture(&content);

    // Scratch store: a headless run leaves the user's saved state alone.
    let store = ConfigurationStore::new(Arc::new(MemoryStorage::new()), "scratch");
    let session = RecordingSession::new(store, None);
    session.set_configuration_name(args.name.as_str());
    session.set_configuration_description(args.description.as_str());
    session.set_view_mode(args.mode);

    let captured = actions.len();
    replay(&session, actions).await?;
    tracing::info!(
        "Captured {} actions, {} visible in {} view",
        captured,
        session.filtered_actions().len(),
        args.mode
    );

    let config = session.generate_configuration();
    let json = config.to_json_pretty()?;
    session.dispose();

    match args.out {
        Some(path) => {
            disk.write(&path, &json)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Wrote {} entries to {}", config.entries.len(), path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> anyhow::Result<Args> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_args() {
        let parsed = args(&["cap.jsonl", "--mode", "raw", "--name", "Flow", "--out", "o.json"]).unwrap();
        assert_eq!(parsed.input, PathBuf::from("cap.jsonl"));
        assert_eq!(parsed.mode, ViewMode::Raw);
        assert_eq!(parsed.name, "Flow");
        assert_eq!(parsed.out, Some(PathBuf::from("o.json")));

        let defaults = args(&["cap.jsonl"]).unwrap();
        assert_eq!(defaults.name, DEFAULT_CONFIGURATION_NAME);
        assert_eq!(defaults.mode, ViewMode::Clean);
        assert!(defaults.out.is_none());
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(args(&[]).is_err());
        assert!(args(&["a", "b"]).is_err());
        assert!(args(&["a", "--mode", "fancy"]).is_err());
        assert!(args(&["a", "--bogus"]).is_err());
        assert!(args(&["a", "--name"]).is_err());
    }

    #[test]
    fn test_parse_capture_skips_bad_lines() {
        let content = r##"{"type":"click","selector":{"type":"css","value":"#a"},"timestamp":1}

not json
{"type":"navigate","selector":{"type":"none"},"value":"https://x.io","timestamp":2}
"##;
        let actions = parse_capture(content);
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[1].value.as_deref(), Some("https://x.io"));
    }

    #[tokio::test]
    async fn test_replay_collapses_typing() {
        let store = ConfigurationStore::new(Arc::new(MemoryStorage::new()), "scratch");
        let session = RecordingSession::new(store, None);
        let content = r##"{"type":"input","selector":{"type":"css","value":"#q"},"value":"r","timestamp":1}
{"type":"input","selector":{"type":"css","value":"#q"},"value":"ru","timestamp":2}
{"type":"input","selector":{"type":"css","value":"#q"},"value":"rust","timestamp":3}
{"type":"click","selector":{"type":"css","value":"#search"},"timestamp":4}
"##;

        replay(&session, parse_capture(content)).await.unwrap();
        assert_eq!(session.actions().len(), 4);

        let config = session.generate_configuration();
        assert_eq!(config.entries.len(), 2);
        assert_eq!(config.entries[0].value.as_deref(), Some("rust"));
        session.dispose();
    }
}
