//! Smart plug payloads.
//!
//! Status channel: `state=ON|OFF`. Command channel: `cmd=ON|OFF`.

use crate::token::define_token;

define_token! {
    /// Power state of the plug.
    #[derive(Default)]
    PlugState ("plug state") {
        On => "ON",
        #[default]
        Off => "OFF",
    }
}

const STATUS_KEY: &str = "state";
const COMMAND_KEY: &str = "cmd";

impl PlugState {
    /// Read the state from a status payload; `None` if absent or malformed.
    #[must_use]
    pub fn from_status_text(text: &str) -> Option<Self> {
        find_value(text, STATUS_KEY)
    }

    /// Read the requested state from a command payload.
    #[must_use]
    pub fn from_command_text(text: &str) -> Option<Self> {
        find_value(text, COMMAND_KEY)
    }

    /// Status payload for this state.
    #[must_use]
    pub fn to_status_text(self) -> String {
        format!("{STATUS_KEY}={self}")
    }

    /// Command payload requesting this state.
    #[must_use]
    pub fn to_command_text(self) -> String {
        format!("{COMMAND_KEY}={self}")
    }
}

fn find_value(text: &str, key: &str) -> Option<PlugState> {
    text.lines()
        .filter_map(|line| line.split_once('='))
        .filter(|(k, _)| k.trim() == key)
        .find_map(|(_, value)| value.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_status_payload() {
        assert_eq!(PlugState::from_status_text("state=ON"), Some(PlugState::On));
    }

    #[test]
    fn should_parse_command_payload_with_spaces() {
        assert_eq!(
            PlugState::from_command_text(" cmd = off \n"),
            Some(PlugState::Off)
        );
    }

    #[test]
    fn should_ignore_other_keys() {
        assert_eq!(PlugState::from_status_text("cmd=ON"), None);
    }

    #[test]
    fn should_return_none_for_malformed_value() {
        assert_eq!(PlugState::from_command_text("cmd=HALF"), None);
        assert_eq!(PlugState::from_command_text("cmd"), None);
    }

    #[test]
    fn should_render_payloads() {
        assert_eq!(PlugState::On.to_status_text(), "state=ON");
        assert_eq!(PlugState::Off.to_command_text(), "cmd=OFF");
    }
}
