//! Dots and Boxes game server.
//!
//! Seats two players, solicits their moves over WebSocket and broadcasts the
//! game to observers. Rounds are driven from the operator console.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin dotbox-server
//! cargo run --bin dotbox-server -- --board-size 5 --mode solo
//! cargo run --bin dotbox-server -- --mode screensaver --no-console
//! ```

use std::{sync::Arc, time::Duration};

use clap::{Parser, ValueEnum};

use dotbox_server::{
    domain::{AutomatedPlayerFactory, GameMode, InvalidResponsePolicy, MoveSource, SessionGateway},
    infrastructure::move_source::LocalAutomatedPlayer,
    ui::{Server, console::run_console},
    usecase::{SessionConfig, SessionHandle},
};
use dotbox_shared::{
    game::{MIN_BOARD_SIZE, RandomMoveChooser},
    logger::setup_logger,
    time::SystemClock,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    /// Two remote players
    Standard,
    /// One remote player against a local automated player
    Solo,
    /// Two local automated players, restarting forever
    Screensaver,
}

impl From<ModeArg> for GameMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Standard => GameMode::Standard,
            ModeArg::Solo => GameMode::Solo,
            ModeArg::Screensaver => GameMode::Screensaver,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    /// The responding player loses the round
    Forfeit,
    /// The responding player is asked again
    Reissue,
}

impl From<PolicyArg> for InvalidResponsePolicy {
    fn from(policy: PolicyArg) -> Self {
        match policy {
            PolicyArg::Forfeit => InvalidResponsePolicy::Forfeit,
            PolicyArg::Reissue => InvalidResponsePolicy::Reissue,
        }
    }
}

fn parse_board_size(raw: &str) -> Result<usize, String> {
    let size: usize = raw
        .parse()
        .map_err(|e| format!("'{}' is not a number: {}", raw, e))?;
    if size < MIN_BOARD_SIZE {
        return Err(format!("board size must be at least {}", MIN_BOARD_SIZE));
    }
    Ok(size)
}

#[derive(Parser, Debug)]
#[command(name = "dotbox-server")]
#[command(about = "Dots and Boxes game server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Dots per side of the board
    #[arg(short = 's', long, default_value = "8", value_parser = parse_board_size)]
    board_size: usize,

    /// How the player slots get filled
    #[arg(short = 'm', long, value_enum, default_value = "standard")]
    mode: ModeArg,

    /// Milliseconds a player has to answer a move request
    #[arg(long, default_value = "2000")]
    move_timeout_ms: u64,

    /// Think time of local automated players in milliseconds
    #[arg(long, default_value = "100")]
    processing_delay_ms: u64,

    /// Pause before the next round in screensaver mode, in milliseconds
    #[arg(long, default_value = "3000")]
    round_restart_delay_ms: u64,

    /// What to do with missing or illegal moves
    #[arg(long, value_enum, default_value = "forfeit")]
    invalid_response_policy: PolicyArg,

    /// Do not read operator commands from stdin
    #[arg(long)]
    no_console: bool,
}

impl Args {
    fn session_config(&self) -> SessionConfig {
        SessionConfig {
            board_size: self.board_size,
            mode: self.mode.into(),
            move_timeout: Duration::from_millis(self.move_timeout_ms),
            processing_delay: Duration::from_millis(self.processing_delay_ms),
            round_restart_delay: Duration::from_millis(self.round_restart_delay_ms),
            invalid_response_policy: self.invalid_response_policy.into(),
        }
    }
}

fn local_players(think_time: Duration) -> AutomatedPlayerFactory {
    Box::new(move || {
        Box::new(LocalAutomatedPlayer::new(
            Box::new(RandomMoveChooser::new()),
            think_time,
        )) as Box<dyn MoveSource>
    })
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();
    let config = args.session_config();
    tracing::debug!("Session config: {:?}", config);

    // 1. Spawn the session task
    let (handle, _session_task) = match SessionHandle::spawn(
        config.clone(),
        Arc::new(SystemClock),
        local_players(config.processing_delay),
    ) {
        Ok(spawned) => spawned,
        Err(e) => {
            tracing::error!("Failed to create session: {}", e);
            std::process::exit(1);
        }
    };
    let session: Arc<dyn SessionGateway> = Arc::new(handle);

    // 2. Screensaver mode plays without an operator
    if config.mode == GameMode::Screensaver
        && let Err(e) = session.start_round().await
    {
        tracing::error!("Failed to start screensaver round: {}", e);
    }

    // 3. Operator console
    if !args.no_console {
        tokio::spawn(run_console(session.clone()));
    }

    // 4. Create and run the server
    let server = Server::new(session);
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
