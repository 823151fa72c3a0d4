//! Console commands read line by line from stdin.

use thiserror::Error;

use take_recorder_core::models::tags::TagTuple;

pub const HELP: &str = "\
commands:
  <enter>      start / stop recording
  d            discard the current take
  a            toggle auto mode
  t TAG...     set the tags for the next take
  w N          auto mode wait seconds
  r N          auto mode record seconds
  n            count existing takes for the current tags
  s            show state
  l            list input devices
  h            help
  q            quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Toggle,
    Discard,
    ToggleAuto,
    SetTags(TagTuple),
    SetWait(String),
    SetRecord(String),
    Count,
    Status,
    ListDevices,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command: {0} (h for help)")]
    Unknown(String),

    #[error("{0} needs an argument")]
    MissingArgument(&'static str),
}

impl ConsoleCommand {
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };

        let command = match head {
            "" => Self::Toggle,
            "d" => Self::Discard,
            "a" => Self::ToggleAuto,
            "t" => {
                if rest.is_empty() {
                    return Err(CommandError::MissingArgument("t"));
                }
                Self::SetTags(rest.split_whitespace().collect())
            }
            // Timing is validated by the scheduler, so the raw text is kept.
            "w" => Self::SetWait(required("w", rest)?),
            "r" => Self::SetRecord(required("r", rest)?),
            "n" => Self::Count,
            "s" => Self::Status,
            "l" => Self::ListDevices,
            "h" | "?" => Self::Help,
            "q" => Self::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

fn required(name: &'static str, rest: &str) -> Result<String, CommandError> {
    if rest.is_empty() {
        Err(CommandError::MissingArgument(name))
    } else {
        Ok(rest.to_string())
    }
}
