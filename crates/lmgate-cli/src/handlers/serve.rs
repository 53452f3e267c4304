//! `lmgate serve`: run the gateway under interactive control.
//!
//! Commands are read line by line from stdin until `quit`, end of input or
//! Ctrl-C. The server is stopped before returning.

use std::io::BufRead;
use std::sync::Arc;

use lmgate_core::validate_settings;
use lmgate_runtime::{
    ControlCommand, GatewayConfig, GatewayController, GatewaySupervisor, ParseCommandError,
};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::bootstrap::build_client;
use crate::commands::ServeArgs;
use crate::error::CliError;

/// One line of operator input.
#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Empty,
    Quit,
    Command(ControlCommand),
    Invalid(ParseCommandError),
}

impl Input {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            return Self::Quit;
        }
        line.parse().map_or_else(Self::Invalid, Self::Command)
    }
}

pub async fn execute(args: &ServeArgs) -> Result<(), CliError> {
    let settings = args.settings();
    validate_settings(&settings)?;

    let client = build_client(&args.upstream, Some(&settings.system_prompt))?;
    let supervisor = Arc::new(GatewaySupervisor::new(GatewayConfig::from(&settings)));
    let controller =
        GatewayController::new(supervisor, client).with_auto_start(settings.auto_start);

    controller.launch().await;
    println!("Commands: start, stop, status, quit");

    let mut lines = spawn_stdin_reader();
    loop {
        tokio::select! {
            line = lines.recv() => {
                let Some(line) = line else {
                    info!("Input closed");
                    break;
                };
                match Input::parse(&line) {
                    Input::Empty => {}
                    Input::Quit => break,
                    Input::Command(command) => {
                        let status = controller.execute(command).await;
                        println!("{status}");
                    }
                    Input::Invalid(e) => {
                        warn!("{e}");
                        println!("{e}");
                    }
                }
            }
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    error!("Failed to listen for Ctrl-C: {e}");
                }
                info!("Interrupted");
                break;
            }
        }
    }

    controller.shutdown().await;
    Ok(())
}

/// Read stdin on a plain thread so a pending read never blocks runtime
/// shutdown.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}
