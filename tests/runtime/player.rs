//! Integration tests for the terminal player
//!
//! Tests whole play-throughs driven by scripted input.

use quill_engine::{FunctionTable, InterpreterConfig};
use quill_foundation::Value;
use quill_language::compile;
use quill_runtime::serialize::load_from_file;
use quill_runtime::{Outcome, Player, ScriptedEditor, Session};

use crate::QUEST;

fn session() -> Session {
    let mut tools = FunctionTable::new();
    tools.register_constant("getPlayerName", Value::from("Ada"));
    Session::from_source(QUEST, InterpreterConfig::seeded(9))
        .unwrap()
        .with_tools(tools)
}

fn play(session: Session, inputs: &[&str]) -> (Outcome, String, Vec<String>) {
    let editor = ScriptedEditor::new(inputs.iter().copied());
    let mut player = Player::with_io(session, editor, Vec::new());
    let outcome = player.run().unwrap();
    let prompts = player.editor().prompts().to_vec();
    let output = String::from_utf8(player.into_output()).unwrap();
    (outcome, output, prompts)
}

#[test]
fn full_play_through() {
    let (outcome, output, prompts) = play(session(), &["40", "1", "\"gold\""]);
    assert_eq!(outcome, Outcome::Ended);
    assert_eq!(
        output,
        "--- Starting script execution ---\n\
         \n--- Tool Call: getData ---\n\
         Arguments: [\"gold\"]\n\
         Elder: Welcome, Ada. [warm]\n\
         \nChoices:\n\
         1. Take the quest [brave]\n\
         2. Ask again\n\
         3. Leave\n\
         \n--- Tool Call: getReward ---\n\
         Arguments: [40]\n\
         Elder: You will earn gold.\n\
         Elder: Go now.\n\
         \n--- End of script ---\n"
    );
    assert_eq!(
        prompts,
        vec![
            "Value for getData: ".to_string(),
            "\nEnter your choice (1-3): ".to_string(),
            "Value for getReward: ".to_string(),
        ]
    );
}

#[test]
fn leaving_early_ends_the_script() {
    let (outcome, output, _) = play(session(), &["5", "2", "3"]);
    assert_eq!(outcome, Outcome::Ended);
    assert_eq!(output.matches("\nChoices:\n").count(), 2);
    assert!(output.contains("Elder: Another time.\n"));
    assert!(!output.contains("Go now."));
}

#[test]
fn bad_input_reprompts() {
    let (outcome, output, prompts) = play(session(), &["5", "4", "zero", "3"]);
    assert_eq!(outcome, Outcome::Ended);
    assert_eq!(output.matches("Invalid choice. Please try again.\n").count(), 2);
    assert_eq!(prompts.len(), 4);
}

#[test]
fn running_out_of_input_quits() {
    let (outcome, output, _) = play(session(), &["5"]);
    assert_eq!(outcome, Outcome::Quit);
    assert!(!output.contains("--- End of script ---"));
}

#[test]
fn runtime_errors_are_reported_as_failures() {
    let session = Session::from_source("A: \"x\"\nLET n = 1\nn += \"y\"", InterpreterConfig::seeded(1)).unwrap();
    let (outcome, output, _) = play(session, &[]);
    let Outcome::Failed(err) = outcome else {
        panic!("expected failure, got {outcome:?}");
    };
    assert_eq!(err.line, Some(3));
    assert!(output.ends_with("A: x\n"));
}

#[test]
fn saved_session_resumes_at_the_prompt() {
    let path = std::env::temp_dir().join(format!("quill_player_resume_{}.msgpack", std::process::id()));
    let save = format!(":save {}", path.display());
    let (outcome, output, _) = play(session(), &["5", save.as_str(), ":quit"]);
    assert_eq!(outcome, Outcome::Quit);
    assert!(output.contains("Saved to "));

    let snapshot = load_from_file(&path).unwrap();
    let _ = std::fs::remove_file(&path);
    let resumed = Session::resume(compile(QUEST).unwrap(), snapshot, InterpreterConfig::default()).unwrap();
    let (outcome, output, _) = play(resumed, &["3"]);
    assert_eq!(outcome, Outcome::Ended);
    assert!(output.starts_with("--- Starting script execution ---\n\nChoices:\n1. Take the quest [brave]\n"));
    assert!(output.contains("Elder: Another time.\n"));
}
