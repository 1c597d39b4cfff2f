//! Integration tests for Layer 3: Runtime
//!
//! Tests for sessions, save files, and the terminal player.

mod player;
mod saves;
mod session;

/// A small quest using every kind of event.
pub const QUEST: &str = r#"LET name = <getPlayerName>
LET gold = <getData; "gold">
Elder: "Welcome, {name}." [warm]
LABEL ask
CHOICE {
  "Take the quest" {
    LET reward = <getReward; gold>
    Elder: "You will earn {reward}."
  } [brave]
  "Ask again" { GOTO ask }
  "Leave" {
    Elder: "Another time."
    END
  }
}
Elder: "Go now."
"#;
