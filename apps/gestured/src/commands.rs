//! Line commands driving the simulated device.

use gestures_engine::platform::RingerMode;
use gestures_events::{ActionCode, UnknownAction};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Key down followed by key up.
    Tap(i32),
    Down(i32),
    Up(i32),
    /// Proximity reading in centimetres.
    Proximity(f32),
    /// Reading at the sensor's maximum range.
    Far,
    Near,
    /// Let simulated time pass, in milliseconds.
    Wait(u64),
    Bind { gesture: u32, action: ActionCode },
    List,
    /// Torch switched on or off by another app.
    Torch(bool),
    Ringer(RingerMode),
    Haptics(bool),
    ProximityCheck(bool),
    Reset,
    Status,
    Help,
    Quit,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CommandError {
    #[error("unknown command: {0}")]
    Unknown(String),

    #[error("{command}: expected {expected}")]
    Usage {
        command: &'static str,
        expected: &'static str,
    },

    #[error(transparent)]
    Action(#[from] UnknownAction),
}

pub const HELP: &str = "\
tap <scan>            key down + up
down <scan> | up <scan>
prox <cm> | far | near
wait <ms>
bind <gesture> <action>
list
torch on|off          torch toggled by another app
ringer silent|vibrate|normal
haptics on|off
proximity on|off
reset | status | help | quit";

impl Command {
    /// Parse one input line. Blank lines and `#` comments yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let mut words = line.split_whitespace();
        let name = words.next().unwrap_or_default().to_ascii_lowercase();
        let args: Vec<&str> = words.collect();

        let command = match name.as_str() {
            "tap" => Command::Tap(one(&args, "tap", "<scan code>")?),
            "down" => Command::Down(one(&args, "down", "<scan code>")?),
            "up" => Command::Up(one(&args, "up", "<scan code>")?),
            "prox" => Command::Proximity(one(&args, "prox", "<distance>")?),
            "far" => Command::Far,
            "near" => Command::Near,
            "wait" => Command::Wait(one(&args, "wait", "<milliseconds>")?),
            "bind" => {
                let [gesture, action] = args[..] else {
                    return Err(usage("bind", "<gesture id> <action>"));
                };
                Command::Bind {
                    gesture: gesture
                        .parse()
                        .map_err(|_| usage("bind", "<gesture id> <action>"))?,
                    action: ActionCode::from_str(action)?,
                }
            }
            "list" => Command::List,
            "torch" => Command::Torch(switch(&args, "torch")?),
            "ringer" => {
                let mode = match args[..] {
                    ["silent"] => RingerMode::Silent,
                    ["vibrate"] => RingerMode::Vibrate,
                    ["normal"] => RingerMode::Normal,
                    _ => return Err(usage("ringer", "silent|vibrate|normal")),
                };
                Command::Ringer(mode)
            }
            "haptics" => Command::Haptics(switch(&args, "haptics")?),
            "proximity" => Command::ProximityCheck(switch(&args, "proximity")?),
            "reset" => Command::Reset,
            "status" => Command::Status,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            _ => return Err(CommandError::Unknown(name)),
        };
        Ok(Some(command))
    }
}

fn usage(command: &'static str, expected: &'static str) -> CommandError {
    CommandError::Usage { command, expected }
}

fn one<T: FromStr>(
    args: &[&str],
    command: &'static str,
    expected: &'static str,
) -> Result<T, CommandError> {
    match args {
        [value] => value.parse().map_err(|_| usage(command, expected)),
        _ => Err(usage(command, expected)),
    }
}

fn switch(args: &[&str], command: &'static str) -> Result<bool, CommandError> {
    match args {
        ["on"] => Ok(true),
        ["off"] => Ok(false),
        _ => Err(usage(command, "on|off")),
    }
}
