//! Line-oriented console — the interactive command issuer.
//!
//! Each stdin line is parsed into a [`ConsoleCommand`] and forwarded to the
//! [`CommandIssuer`]. The console never talks to a controller directly.

use homewatch_app::ports::{ChannelStore, Clock, EventLog};
use homewatch_app::services::issuer::CommandIssuer;
use homewatch_domain::channel::Channel;
use homewatch_domain::error::HomeWatchError;
use homewatch_domain::plug::PlugState;
use homewatch_domain::thermostat::ThermostatMode;

pub const HELP: &str = "\
Commands:
  1  ring the doorbell        5  unlock the door
  2  acknowledge the doorbell 6  toggle the lock
  3  mute the doorbell        7  report forced entry
  4  lock the door            8  clear the forced entry alert
  smoke <level>     publish a smoke reading
  reset | fire-ack  reset or acknowledge the fire alarm
  plug on|off       switch the smart plug
  setpoint <value>  thermostat setpoint
  mode heat|cool|off
  status            print every channel
  help              show this list
  q                 quit";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConsoleCommand {
    Ring,
    AcknowledgeDoorbell,
    MuteDoorbell,
    Lock,
    Unlock,
    Toggle,
    ReportForcedEntry,
    ClearAlert,
    Smoke(f64),
    ResetFireAlarm,
    AcknowledgeFireAlarm,
    Plug(PlugState),
    Setpoint(f64),
    Mode(ThermostatMode),
    Status,
    Help,
    Quit,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown command {0:?}")]
    Unknown(String),
    #[error("{command} needs {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },
    #[error("{command}: {argument:?} is not {expected}")]
    InvalidArgument {
        command: &'static str,
        argument: String,
        expected: &'static str,
    },
}

/// Parse one input line. Blank lines yield `None`.
///
/// # Errors
///
/// Returns [`ParseError`] for unknown commands and bad arguments.
pub fn parse(line: &str) -> Result<Option<ConsoleCommand>, ParseError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let argument = words.next();

    let command = match head.to_ascii_lowercase().as_str() {
        "1" => ConsoleCommand::Ring,
        "2" => ConsoleCommand::AcknowledgeDoorbell,
        "3" => ConsoleCommand::MuteDoorbell,
        "4" => ConsoleCommand::Lock,
        "5" => ConsoleCommand::Unlock,
        "6" => ConsoleCommand::Toggle,
        "7" => ConsoleCommand::ReportForcedEntry,
        "8" => ConsoleCommand::ClearAlert,
        "smoke" => ConsoleCommand::Smoke(number("smoke", argument)?),
        "reset" => ConsoleCommand::ResetFireAlarm,
        "fire-ack" => ConsoleCommand::AcknowledgeFireAlarm,
        "plug" => ConsoleCommand::Plug(token("plug", argument, "on or off")?),
        "setpoint" => ConsoleCommand::Setpoint(number("setpoint", argument)?),
        "mode" => ConsoleCommand::Mode(token("mode", argument, "heat, cool or off")?),
        "status" => ConsoleCommand::Status,
        "help" | "?" => ConsoleCommand::Help,
        "q" | "quit" | "exit" => ConsoleCommand::Quit,
        _ => return Err(ParseError::Unknown(head.to_string())),
    };
    Ok(Some(command))
}

fn number(command: &'static str, argument: Option<&str>) -> Result<f64, ParseError> {
    let argument = argument.ok_or(ParseError::MissingArgument {
        command,
        expected: "a number",
    })?;
    argument
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ParseError::InvalidArgument {
            command,
            argument: argument.to_string(),
            expected: "a number",
        })
}

fn token<T: std::str::FromStr>(
    command: &'static str,
    argument: Option<&str>,
    expected: &'static str,
) -> Result<T, ParseError> {
    let argument = argument.ok_or(ParseError::MissingArgument { command, expected })?;
    argument.parse().map_err(|_| ParseError::InvalidArgument {
        command,
        argument: argument.to_string(),
        expected,
    })
}

/// Forward a command to the issuer. Returns `false` for the commands the
/// console handles itself (`status`, `help`, `q`) and for failed writes.
pub async fn dispatch<S, L, C>(issuer: &CommandIssuer<S, L, C>, command: ConsoleCommand) -> bool
where
    S: ChannelStore,
    L: EventLog,
    C: Clock,
{
    match command {
        ConsoleCommand::Ring => issuer.press_doorbell().await,
        ConsoleCommand::AcknowledgeDoorbell => issuer.acknowledge_doorbell().await,
        ConsoleCommand::MuteDoorbell => issuer.mute_doorbell().await,
        ConsoleCommand::Lock => issuer.lock().await,
        ConsoleCommand::Unlock => issuer.unlock().await,
        ConsoleCommand::Toggle => issuer.toggle().await,
        ConsoleCommand::ReportForcedEntry => issuer.report_forced_entry().await,
        ConsoleCommand::ClearAlert => issuer.clear_alert().await,
        ConsoleCommand::Smoke(level) => issuer.report_smoke(level).await,
        ConsoleCommand::ResetFireAlarm => issuer.reset_fire_alarm().await,
        ConsoleCommand::AcknowledgeFireAlarm => issuer.acknowledge_fire_alarm().await,
        ConsoleCommand::Plug(state) => issuer.switch_plug(state).await,
        ConsoleCommand::Setpoint(value) => issuer.set_setpoint(value).await,
        ConsoleCommand::Mode(mode) => issuer.set_mode(mode).await,
        ConsoleCommand::Status | ConsoleCommand::Help | ConsoleCommand::Quit => false,
    }
}

/// One `key: value` line per channel. Multi-line payloads are folded onto
/// one line; unset channels show as `-`.
///
/// # Errors
///
/// Returns the first storage error.
pub async fn status_lines<S: ChannelStore>(store: &S) -> Result<Vec<String>, HomeWatchError> {
    let mut lines = Vec::with_capacity(Channel::ALL.len());
    for channel in Channel::ALL {
        let value = match store.get(channel).await? {
            None => "-".to_string(),
            Some(text) => text
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
        };
        lines.push(format!("{:<16} {value}", channel.key()));
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use homewatch_app::clock::ManualClock;
    use homewatch_app::memory::{MemoryChannelStore, MemoryEventLog};

    #[test]
    fn should_parse_numbered_shortcuts() {
        assert_eq!(parse("1"), Ok(Some(ConsoleCommand::Ring)));
        assert_eq!(parse(" 4 "), Ok(Some(ConsoleCommand::Lock)));
        assert_eq!(parse("8"), Ok(Some(ConsoleCommand::ClearAlert)));
    }

    #[test]
    fn should_ignore_blank_lines() {
        assert_eq!(parse(""), Ok(None));
        assert_eq!(parse("   \t"), Ok(None));
    }

    #[test]
    fn should_parse_commands_with_arguments() {
        assert_eq!(parse("smoke 62.5"), Ok(Some(ConsoleCommand::Smoke(62.5))));
        assert_eq!(parse("PLUG on"), Ok(Some(ConsoleCommand::Plug(PlugState::On))));
        assert_eq!(
            parse("mode cool"),
            Ok(Some(ConsoleCommand::Mode(ThermostatMode::Cool)))
        );
        assert_eq!(parse("setpoint 21"), Ok(Some(ConsoleCommand::Setpoint(21.0))));
    }

    #[test]
    fn should_report_missing_and_invalid_arguments() {
        assert_eq!(
            parse("smoke"),
            Err(ParseError::MissingArgument {
                command: "smoke",
                expected: "a number"
            })
        );
        assert!(matches!(
            parse("setpoint warm"),
            Err(ParseError::InvalidArgument { .. })
        ));
        assert!(matches!(parse("smoke inf"), Err(ParseError::InvalidArgument { .. })));
        assert!(matches!(parse("plug dim"), Err(ParseError::InvalidArgument { .. })));
    }

    #[test]
    fn should_reject_unknown_command() {
        assert_eq!(parse("9"), Err(ParseError::Unknown("9".to_string())));
    }

    #[tokio::test]
    async fn should_forward_commands_to_issuer() {
        let store = Arc::new(MemoryChannelStore::new());
        let issuer = CommandIssuer::new(
            Arc::clone(&store),
            MemoryEventLog::new(),
            ManualClock::default(),
        );
        assert!(dispatch(&issuer, ConsoleCommand::Toggle).await);
        assert!(dispatch(&issuer, ConsoleCommand::Ring).await);
        assert!(!dispatch(&issuer, ConsoleCommand::Status).await);
        assert_eq!(store.value(Channel::LOCK_COMMAND).as_deref(), Some("TOGGLE"));
        assert_eq!(store.value(Channel::DOORBELL_STATUS).as_deref(), Some("RING"));
    }

    #[tokio::test]
    async fn should_list_every_channel_in_status() {
        let store = MemoryChannelStore::new()
            .with(Channel::LOCK_STATUS, "LOCKED")
            .with(Channel::THERMOSTAT_STATUS, "temp=20\nhum=40\n");
        let lines = status_lines(&store).await.unwrap();
        assert_eq!(lines.len(), Channel::ALL.len());
        assert_eq!(lines[0], "lock_status      LOCKED");
        assert!(lines.contains(&"lock_cmd         -".to_string()));
        assert!(lines.contains(&"thermo_status    temp=20, hum=40".to_string()));
    }
}
