//! Host input adapter: turns stdin lines into face events.
//!
//! `tap` simulates a wrist tap, a JSON object is a configuration message and
//! `quit` stops the face.

use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};
use tokio_util::sync::CancellationToken;

use crate::settings::ConfigMessage;

use super::{FaceEvent, TapAxis, TapEvent};

const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

#[derive(Debug, Clone, PartialEq)]
pub enum InputCommand {
    Event(FaceEvent),
    Quit,
}

pub fn parse_line(line: &str) -> Option<InputCommand> {
    let line = line.trim();
    match line {
        "" => None,
        "tap" => Some(InputCommand::Event(FaceEvent::Tap(TapEvent {
            axis: TapAxis::Z,
            direction: 1,
        }))),
        "quit" | "exit" => Some(InputCommand::Quit),
        raw if raw.starts_with('{') => match ConfigMessage::from_json(raw) {
            Ok(message) => Some(InputCommand::Event(FaceEvent::Config(message))),
            Err(err) => {
                log_warn!("Ignoring configuration line: {err:#}");
                None
            }
        },
        other => {
            log_warn!("Unrecognized input '{}'", other);
            None
        }
    }
}

/// Forward stdin lines until EOF, `quit` or cancellation.
pub async fn read_stdin(events: mpsc::Sender<FaceEvent>, cancel: CancellationToken) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line,
            _ = cancel.cancelled() => break,
        };

        match line {
            Ok(Some(line)) => match parse_line(&line) {
                Some(InputCommand::Event(event)) => {
                    if events.send(event).await.is_err() {
                        break;
                    }
                }
                Some(InputCommand::Quit) => {
                    log_info!("Quit requested");
                    cancel.cancel();
                    break;
                }
                None => {}
            },
            Ok(None) => {
                log_info!("Input closed");
                break;
            }
            Err(err) => {
                log_error!("Failed to read input: {err}");
                break;
            }
        }
    }
}
