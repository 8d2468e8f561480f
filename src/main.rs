//! Binary entrypoint for the Riddle Rooms CLI.
//!
//! Commands:
//! - `play [--name <n>] [--difficulty <room>] [--no-save]` - play one session in the terminal
//! - `init` - write a starter `riddlerooms.toml` and an editable riddle bank
//! - `leaderboard` - print cumulative scores, highest first
//! - `sessions` - print how many sessions each player has started
//!
//! See the library crate docs for module‑level details: `riddlerooms::`.
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::io::{self, Write};
use std::path::Path;

use riddlerooms::config::Config;
use riddlerooms::riddle::{Difficulty, GameEngine, QuestionBank, RiddleError};
use riddlerooms::shell;
use riddlerooms::storage::{CsvSessionStore, MemorySessionStore, SessionStore, TallyFile};

#[derive(Parser)]
#[command(name = "riddlerooms")]
#[command(about = "A text riddle adventure with a leaderboard")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "riddlerooms.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one session
    Play {
        /// Player name (prompted when omitted)
        #[arg(short, long)]
        name: Option<String>,

        /// Room: easy, intermediate or hard (prompted when omitted)
        #[arg(short, long)]
        difficulty: Option<Difficulty>,

        /// Practice run: do not touch the session or leaderboard tables
        #[arg(long)]
        no_save: bool,
    },
    /// Write a default configuration and riddle bank
    Init,
    /// Show the leaderboard
    Leaderboard,
    /// Show per-player session counts
    Sessions,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match cli.command {
        Commands::Init => None,
        _ => Config::load_if_present(&cli.config).await?,
    };
    init_logging(&config, cli.verbose);
    if config.is_none() && !matches!(cli.command, Commands::Init) {
        warn!("No config at {}; using built-in defaults", cli.config);
    }
    let config = config.unwrap_or_default();

    match cli.command {
        Commands::Play {
            name,
            difficulty,
            no_save,
        } => {
            let bank = load_bank(&config)?;
            if no_save {
                play(&config, &bank, MemorySessionStore::new(), name, difficulty)?;
            } else {
                let store = CsvSessionStore::from_config(&config.storage);
                let board = store.leaderboard().clone();
                play(&config, &bank, store, name, difficulty)?;
                print_table(&board, "Leaderboard");
            }
        }
        Commands::Init => {
            info!("Initializing new Riddle Rooms configuration");
            let (cfg, created) = Config::load_or_create(&cli.config).await?;
            if created {
                info!("Configuration file created at {}", cli.config);
            } else {
                info!("Keeping existing configuration at {}", cli.config);
            }

            tokio::fs::create_dir_all(&cfg.storage.data_dir).await?;
            let bank_path = cfg.questions.bank_file.clone().unwrap_or_else(|| {
                Path::new(&cfg.storage.data_dir)
                    .join("riddles.json")
                    .to_string_lossy()
                    .into_owned()
            });
            if Path::new(&bank_path).exists() {
                info!("Keeping existing riddle bank at {}", bank_path);
            } else {
                let json = QuestionBank::builtin().to_json_pretty()?;
                tokio::fs::write(&bank_path, json).await?;
                info!("Riddle bank written to {}", bank_path);
            }
            println!("Config: {}\nRiddle bank: {}", cli.config, bank_path);
        }
        Commands::Leaderboard => {
            let store = CsvSessionStore::from_config(&config.storage);
            print_table(store.leaderboard(), "Leaderboard");
        }
        Commands::Sessions => {
            let store = CsvSessionStore::from_config(&config.storage);
            print_table(store.sessions(), "Sessions");
        }
    }

    Ok(())
}

fn load_bank(config: &Config) -> Result<QuestionBank> {
    match &config.questions.bank_file {
        Some(path) => QuestionBank::load_from_json(path)
            .map_err(|e| anyhow!("Failed to load riddle bank {}: {}", path, e)),
        None => Ok(QuestionBank::builtin()),
    }
}

fn play<S: SessionStore>(
    config: &Config,
    bank: &QuestionBank,
    store: S,
    name: Option<String>,
    difficulty: Option<Difficulty>,
) -> Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    let name = match name {
        Some(n) => n,
        None => shell::prompt_line(&mut input, &mut output, "Enter your name: ")?
            .unwrap_or_default(),
    };
    let difficulty = match difficulty {
        Some(d) => Some(d),
        None => shell::choose_difficulty(&mut input, &mut output)?,
    };

    let (mut engine, welcome) =
        match GameEngine::start(bank, config.game.clone(), store, &name, difficulty) {
            Ok(started) => started,
            Err(e @ RiddleError::EmptyBank(_)) => {
                return Err(anyhow!("{} - add riddles to the bank file and try again", e))
            }
            Err(e) => return Err(e.into()),
        };
    shell::play_session(&mut engine, &welcome, &mut input, &mut output)?;
    output.flush()?;
    Ok(())
}

fn print_table(table: &TallyFile, title: &str) {
    let loaded = table.load_lenient();
    for rejected in &loaded.rejected {
        warn!("{}", rejected);
    }
    println!();
    print!("{}", shell::render_leaderboard(title, &loaded.tally));
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    let mut builder = env_logger::Builder::new();
    // Base level from CLI verbosity overrides config
    let base_level = match verbosity {
        0 => config
            .as_ref()
            .map(|c| c.logging.level_filter())
            .unwrap_or(log::LevelFilter::Warn),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config
        .as_ref()
        .and_then(|c| c.logging.file.as_ref())
        .and_then(|file| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(file)
                .ok()
        });

    if let Some(f) = log_file {
        let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
        // Mirror to the console only when someone is watching it
        let is_tty = atty::is(atty::Stream::Stdout);
        builder.format(move |fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            let line = format!("{} [{}] {}", ts, record.level(), record.args());
            if let Ok(mut guard) = write_mutex.lock() {
                let _ = writeln!(guard, "{}", line);
            }
            if is_tty {
                writeln!(fmt, "{}", line)
            } else {
                Ok(())
            }
        });
    } else {
        builder.format(|fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
        });
    }
    let _ = builder.try_init();
}
