//! levy: replay scripted operations against a levy token.

mod script;

use anyhow::Context;
use clap::Parser;
use levy_token::{Timestamp, Token, TokenConfig};
use levy_types::{Clock, SystemClock};
use levy_utils::LogFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "levy", about = "Taxed, stakeable, governable token ledger")]
struct Cli {
    /// Path to a TOML configuration file. Defaults are used when absent.
    #[arg(long, env = "LEVY_CONFIG")]
    config: Option<PathBuf>,

    /// Log level override: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "LEVY_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format override: "human" or "json".
    #[arg(long, env = "LEVY_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Print the default configuration as TOML.
    InitConfig,
    /// Replay an operation script and print the outcome as JSON.
    Run {
        /// TOML file of `[[op]]` entries.
        #[arg(long)]
        script: PathBuf,

        /// Bincode state file. Restored if it exists, written back afterwards.
        #[arg(long, env = "LEVY_STATE")]
        state: Option<PathBuf>,

        /// Clock value (unix seconds) for the first op. Defaults to now, or
        /// to the saved clock if that is later. Must not precede the saved clock.
        #[arg(long)]
        start: Option<u64>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => TokenConfig::from_toml_file(&path.to_string_lossy())
            .with_context(|| format!("loading config {}", path.display()))?,
        None => TokenConfig::default(),
    };

    let format = match cli.log_format {
        Some(format) => format,
        None => config
            .log_format
            .parse::<LogFormat>()
            .map_err(anyhow::Error::msg)?,
    };
    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    levy_utils::init_logging(format, level);

    match cli.command {
        Command::InitConfig => {
            print!("{}", config.to_toml_string()?);
        }
        Command::Run {
            script,
            state,
            start,
        } => {
            let report = run(&config, &script, state.as_deref(), start.map(Timestamp::new))?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

/// What the `--state` file holds: the token snapshot plus the replay clock,
/// so a resumed run never moves time backwards.
#[derive(Serialize, Deserialize)]
struct SavedState {
    clock: Timestamp,
    token: Vec<u8>,
}

/// Pick the clock for the first op of a run.
fn resolve_start(requested: Option<Timestamp>, saved: Option<Timestamp>) -> anyhow::Result<Timestamp> {
    match (requested, saved) {
        (Some(start), Some(saved)) if start < saved => {
            anyhow::bail!("start {start} precedes the saved clock {saved}")
        }
        (Some(start), _) => Ok(start),
        (None, Some(saved)) => Ok(SystemClock.now().max(saved)),
        (None, None) => Ok(SystemClock.now()),
    }
}

fn run(
    config: &TokenConfig,
    script_path: &Path,
    state_path: Option<&Path>,
    start: Option<Timestamp>,
) -> anyhow::Result<script::RunReport> {
    let text = std::fs::read_to_string(script_path)
        .with_context(|| format!("reading script {}", script_path.display()))?;
    let script = script::parse_script(&text)?;

    let (mut token, saved_clock) = match state_path {
        Some(path) if path.exists() => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("reading state {}", path.display()))?;
            let saved: SavedState = bincode::deserialize(&bytes)
                .with_context(|| format!("decoding state {}", path.display()))?;
            let token = Token::restore(&saved.token)
                .with_context(|| format!("restoring state {}", path.display()))?;
            (token, Some(saved.clock))
        }
        _ => (Token::new(config).context("creating token")?, None),
    };
    let start = resolve_start(start, saved_clock)?;

    tracing::info!(ops = script.ops.len(), %start, "replaying script");
    let (outcomes, finished_at) = script::replay(&mut token, &script, start);
    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
    tracing::info!(
        applied = outcomes.len() - failed,
        failed,
        elapsed = %levy_utils::format_duration(finished_at.as_secs() - start.as_secs()),
        "replay finished"
    );

    if let Some(path) = state_path {
        let saved = SavedState {
            clock: finished_at,
            token: token.snapshot()?,
        };
        std::fs::write(path, bincode::serialize(&saved)?)
            .with_context(|| format!("writing state {}", path.display()))?;
    }

    Ok(script::RunReport {
        outcomes,
        summary: token.summary(),
        events: token.take_events(),
        finished_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = r#"
        [[op]]
        kind = "transfer"
        from = "owner"
        to = "alice"
        amount = "100"

        [[op]]
        kind = "transfer"
        from = "alice"
        to = "bob"
        amount = "50"
    "#;

    #[test]
    fn state_file_carries_balances_between_runs() {
        let dir = tempfile::tempdir().unwrap();
        let script_path = dir.path().join("ops.toml");
        let state_path = dir.path().join("state.bin");
        std::fs::write(&script_path, SCRIPT).unwrap();
        let config = TokenConfig::default();

        let first = run(&config, &script_path, Some(&state_path), Some(Timestamp::new(0))).unwrap();
        assert!(state_path.exists());
        assert_eq!(first.events.len(), 2 + 1 + 4);
        let bob = levy_token::Address::derive("bob");
        assert_eq!(first.summary.balances[&bob], levy_token::Amount::from_tokens(49));

        let second = run(&config, &script_path, Some(&state_path), Some(Timestamp::new(10))).unwrap();
        assert_eq!(second.summary.balances[&bob], levy_token::Amount::from_tokens(98));
        assert!(second.summary.conserved);
        // The journal is not persisted, so only this run's events appear.
        assert_eq!(second.events.len(), 1 + 4);
    }

    #[test]
    fn missing_script_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(
            &TokenConfig::default(),
            &dir.path().join("nope.toml"),
            None,
            Some(Timestamp::new(0)),
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("reading script"));
    }

    #[test]
    fn resumed_run_cannot_rewind_the_clock() {
        let dir = tempfile::tempdir().unwrap();
        let script_path = dir.path().join("ops.toml");
        let state_path = dir.path().join("state.bin");
        std::fs::write(
            &script_path,
            "[[op]]\nkind = \"stake\"\naccount = \"owner\"\namount = \"1000\"\n\n\
             [[op]]\nkind = \"advance\"\nsecs = 3600\n",
        )
        .unwrap();
        let config = TokenConfig::default();

        let first = run(&config, &script_path, Some(&state_path), Some(Timestamp::new(500))).unwrap();
        assert_eq!(first.finished_at, Timestamp::new(4_100));

        let err = run(&config, &script_path, Some(&state_path), Some(Timestamp::new(100))).unwrap_err();
        assert!(format!("{err:#}").contains("precedes the saved clock"));

        let resumed = run(&config, &script_path, Some(&state_path), Some(Timestamp::new(4_100))).unwrap();
        assert!(resumed.outcomes.iter().all(|o| o.is_ok()));
        assert_eq!(resumed.finished_at, Timestamp::new(7_700));
    }

    #[test]
    fn start_defaults_to_the_later_of_now_and_saved() {
        let far = Timestamp::new(u64::MAX / 2);
        assert_eq!(resolve_start(None, Some(far)).unwrap(), far);
        assert_eq!(
            resolve_start(Some(Timestamp::new(7)), None).unwrap(),
            Timestamp::new(7)
        );
        assert!(resolve_start(Some(Timestamp::new(7)), Some(Timestamp::new(8))).is_err());
    }
}
