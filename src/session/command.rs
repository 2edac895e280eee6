use crate::core::{Day, PointType, RouteSelection, SelectionError};
use std::str::FromStr;
use thiserror::Error;

/// Commands from the selector and controls collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    TogglePlay,
    Play,
    Pause,
    Reset,
    Select(RouteSelection),
    Status,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}' (try play, pause, toggle, reset, select <day> <type>, status, quit)")]
    Unknown(String),
    #[error("usage: select <today|yesterday|3daysAgo> <wireless|manual>")]
    SelectUsage,
    #[error(transparent)]
    Selection(#[from] SelectionError),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let verb = words.next().ok_or(CommandError::Empty)?.to_lowercase();

        let cmd = match verb.as_str() {
            "toggle" | "t" | "space" => Command::TogglePlay,
            "play" | "p" => Command::Play,
            "pause" => Command::Pause,
            "reset" | "r" => Command::Reset,
            "status" | "s" => Command::Status,
            "quit" | "q" | "exit" => Command::Quit,
            "select" | "show" => {
                let (day, kind) = match (words.next(), words.next(), words.next()) {
                    (Some(day), Some(kind), None) => (day, kind),
                    _ => return Err(CommandError::SelectUsage),
                };
                let day: Day = day.parse()?;
                let kind: PointType = kind.parse()?;
                return Ok(Command::Select(RouteSelection::new(day, kind)));
            }
            _ => return Err(CommandError::Unknown(verb)),
        };

        if words.next().is_some() {
            return Err(CommandError::Unknown(s.trim().to_string()));
        }
        Ok(cmd)
    }
}
