use whiteboard::console_view::ConsoleView;
use whiteboard::credentials::{credentials_from_env, try_load_dotenv};
use whiteboard::error::WhiteboardError;
use whiteboard::logger::initialize as LoggerInitialize;
use whiteboard::operator::{HELP_TEXT, OperatorCommand, parse_command};
use whiteboard::paths::detect_config_paths;
use whiteboard::resume::resumable_session;

use whiteboard_core::channel::RealtimeChannel;
use whiteboard_core::config::{AppConfig, PolicyConfig};
use whiteboard_core::crossbar::{Credentials, CrossbarClient};
use whiteboard_core::effects::{QuickCall, SideEffects, SoundCommand};
use whiteboard_core::protocol::{self, MachineSettings, ProtocolStateMachine, SessionState, WhiteboardHandle};
use whiteboard_core::session::SessionStore;

use common::ErrorLocation;

use std::fs::create_dir_all;
use std::panic::Location;
use std::process::ExitCode;
use std::sync::Arc;

use log::{error, info, warn};
use tokio::io::{AsyncBufReadExt, BufReader, stdin};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("whiteboard: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), WhiteboardError> {
    let paths = detect_config_paths()?;
    let config_dir = paths.config_dir;

    create_dir_all(&config_dir).map_err(|e| WhiteboardError::Whiteboard {
        message: format!("Failed to create config directory: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    // Initialize logger FIRST
    LoggerInitialize(&config_dir)?;

    info!("Whiteboard console starting");
    info!("Config directory ({}): {}", paths.source, config_dir.display());

    try_load_dotenv();

    let config = AppConfig::load(&config_dir)?;
    let policy = PolicyConfig::load(&config_dir)?;
    let crossbar = CrossbarClient::new(&config.server.crossbar_url)?;

    let effects = SideEffects::new(
        QuickCall::new(crossbar.clone(), config.server.quickcall_extension.clone()),
        SoundCommand::new(config.alert.player.clone(), config.alert.args.clone()),
    );

    let settings = MachineSettings {
        endpoint: config.realtime_endpoint()?,
        binding: config.server.binding.clone(),
    };

    let (channel, events) = RealtimeChannel::new();
    let machine = ProtocolStateMachine::new(
        channel,
        settings,
        Arc::new(policy),
        ConsoleView::default(),
        effects,
    );
    let (handle, machine_task) = protocol::spawn(machine, events);

    let store = SessionStore::new(&config_dir);
    let forget_task = tokio::spawn(forget_session_on_logout(handle.clone(), store.clone()));

    if let Some(session) = resumable_session(&store) {
        handle.authenticate(session)?;
    } else if let Some(credentials) = credentials_from_env()? {
        sign_in(&crossbar, &store, &handle, &credentials).await?;
    } else {
        println!("{HELP_TEXT}");
    }

    let mut lines = BufReader::new(stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!("Failed to read stdin: {e}");
                break;
            }
        };

        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(WhiteboardError::Command { message, .. }) => {
                println!("{message}");
                continue;
            }
            Err(e) => return Err(e),
        };

        match command {
            OperatorCommand::Login(credentials) => {
                sign_in(&crossbar, &store, &handle, &credentials).await?;
            }
            OperatorCommand::Clear => handle.clear()?,
            OperatorCommand::Logout => handle.logout()?,
            OperatorCommand::Status => println!("state: {:?}", handle.state()),
            OperatorCommand::Help => println!("{HELP_TEXT}"),
            OperatorCommand::Quit => break,
        }
    }

    info!("Shutting down");
    forget_task.abort();
    drop(handle);
    if let Err(e) = machine_task.await {
        warn!("Machine task ended abnormally: {e}");
    }

    Ok(())
}

/// Authenticate with crossbar and hand the session to the machine.
///
/// A rejection is shown to the operator and is not an error of the console.
async fn sign_in(
    crossbar: &CrossbarClient,
    store: &SessionStore,
    handle: &WhiteboardHandle,
    credentials: &Credentials,
) -> Result<(), WhiteboardError> {
    let session = match crossbar.authenticate(credentials).await {
        Ok(session) => session,
        Err(e) => {
            warn!("Sign-in failed: {e}");
            println!("status: {}", e.operator_message());
            return Ok(());
        }
    };

    if let Err(e) = store.save(&session) {
        warn!("Session will not survive a restart: {e}");
    }

    handle.authenticate(session)?;
    Ok(())
}

/// A session that ended (server error, close, logout) is not resumed on restart.
async fn forget_session_on_logout(handle: WhiteboardHandle, store: SessionStore) {
    let mut state = handle.watch_state();
    drop(handle);

    while state.changed().await.is_ok() {
        if *state.borrow_and_update() == SessionState::LoggedOut {
            if let Err(e) = store.clear() {
                warn!("Failed to forget session: {e}");
            }
        }
    }
}
