//! flowstream: create, update and delete token streams from the terminal.
//!
//! The input loop reads commands from stdin and sends [`events::UiEvent`]s to
//! the service task, which owns all wallet I/O and answers with
//! [`events::ServiceEvent`]s.

mod command;
mod config;
mod events;
mod rpc_wallet;
mod service;
mod state;
mod view;

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use command::Command;
use events::{ServiceEvent, UiEvent};
use state::AppState;

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = config::Config::load().unwrap_or_else(|e| {
        log::warn!("⚠️ Using default config: {}", e);
        config::Config::default()
    });

    let token = CancellationToken::new();
    let (ui_tx, ui_rx) = mpsc::unbounded_channel::<UiEvent>();
    let (svc_tx, mut svc_rx) = mpsc::unbounded_channel::<ServiceEvent>();

    let service = tokio::spawn(service::run(token.clone(), ui_rx, svc_tx, config));

    let mut state = AppState::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", view::HELP);
    print_prompt(&state);

    loop {
        tokio::select! {
            _ = token.cancelled() => break,

            Some(event) = svc_rx.recv() => {
                if let Some(line) = view::describe(&event) {
                    println!("\n{}", line);
                }
                state.apply(event);
                print_prompt(&state);
            }

            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    // EOF or unreadable stdin
                    Ok(None) | Err(_) => {
                        let _ = ui_tx.send(UiEvent::Shutdown);
                        break;
                    }
                };

                match Command::parse(&line) {
                    Ok(None) => {}
                    Ok(Some(Command::Quit)) => {
                        let _ = ui_tx.send(UiEvent::Shutdown);
                        break;
                    }
                    Ok(Some(Command::Help)) => println!("{}", view::HELP),
                    Ok(Some(Command::Status)) => println!("{}", view::status(&state)),
                    Ok(Some(Command::Connect)) => {
                        let _ = ui_tx.send(UiEvent::Connect);
                    }
                    Ok(Some(Command::Rate(amount))) => {
                        let _ = ui_tx.send(UiEvent::FlowRateInput(amount));
                    }
                    Ok(Some(Command::Execute(op))) => {
                        let _ = ui_tx.send(UiEvent::Execute(op));
                    }
                    Ok(Some(Command::Unwrap)) => {
                        let _ = ui_tx.send(UiEvent::Unwrap);
                    }
                    Err(e) => println!("❌ {}", e),
                }
                print_prompt(&state);
            }
        }
    }

    token.cancel();
    let _ = service.await;
}

fn print_prompt(state: &AppState) {
    print!("{}", view::prompt(state));
    let _ = std::io::stdout().flush();
}
