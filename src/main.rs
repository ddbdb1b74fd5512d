use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use chess_session::config::AppConfig;
use chess_session::session::player::{Player, SessionConfig};
use chess_session::session::session_controller::Session;
use chess_session::uci::uci_top::run_stdio_loop;

/// Chess rules core with pluggable move oracles.
#[derive(Parser, Debug)]
#[command(name = "chess_session")]
#[command(version, about, long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `chess_session=trace` (overrides RUST_LOG)
    #[arg(long)]
    log: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Speak UCI on stdin/stdout (default)
    Uci,

    /// Let the configured computer players play one game against each other
    Selfplay {
        /// Stop after this many half-moves
        #[arg(long, default_value = "300")]
        max_plies: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout belongs to the UCI protocol.
    let filter = match &cli.log {
        Some(directives) => EnvFilter::try_new(directives).context("invalid --log filter")?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;

    match cli.command.unwrap_or(Command::Uci) {
        Command::Uci => run_stdio_loop(config.engine).context("UCI loop failed")?,
        Command::Selfplay { max_plies } => selfplay(config, max_plies)?,
    }
    Ok(())
}

fn selfplay(config: AppConfig, max_plies: usize) -> Result<()> {
    // Human seats are filled with the UCI engine settings.
    let computer = |player: Player| match player {
        Player::Human => Player::Computer(config.engine.clone()),
        other => other,
    };
    let session_config = SessionConfig {
        white: computer(config.session.white.clone()),
        black: computer(config.session.black.clone()),
    };

    let mut session = Session::new(session_config).context("failed to start engines")?;
    info!(max_plies, "self-play started");

    while !session.game_result().is_terminal() && session.game().history().len() < max_plies {
        session
            .play_computer_turn()
            .context("computer player failed")?;
    }

    println!("{}", session.position());
    println!("{}", session.game_result());
    print!("{}", session.to_pgn().context("failed to write PGN")?);
    Ok(())
}
