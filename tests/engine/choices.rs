//! Integration tests for CHOICE
//!
//! Tests option rendering, selection, and rejected input.

use quill_engine::{Phase, StepResult};
use quill_foundation::ErrorKind;

use crate::{dialog, interpreter};

const SHOP: &str = r#"LET gold = 20
Merchant: "Welcome."
CHOICE {
  "Buy a sword ({gold} gold left)" {
    gold -= 15
    Merchant: "A fine blade."
  } [shop, weapon]
  "Leave" {
    Merchant: "Farewell."
    END
  }
}
Merchant: "You have {gold} gold."
"#;

fn reach_choice() -> (quill_engine::Interpreter, StepResult) {
    let mut interp = interpreter(SHOP);
    assert_eq!(interp.step(), dialog("Merchant", "Welcome."));
    let choice = interp.step();
    (interp, choice)
}

#[test]
fn options_are_rendered_with_tags() {
    let (interp, choice) = reach_choice();
    let StepResult::Choice { options } = choice else {
        panic!("expected a choice, got {choice:?}");
    };
    assert_eq!(options.len(), 2);
    assert_eq!(options[0].index, 0);
    assert_eq!(options[0].text, "Buy a sword (20 gold left)");
    assert_eq!(options[0].tags, vec!["shop".to_string(), "weapon".to_string()]);
    assert!(options[1].tags.is_empty());
    assert_eq!(interp.phase(), Phase::WaitingForChoice);
}

#[test]
fn picking_runs_the_body_then_continues() {
    let (mut interp, _) = reach_choice();
    assert_eq!(interp.handle_choice_input(0), dialog("Merchant", "A fine blade."));
    assert_eq!(interp.step(), dialog("Merchant", "You have 5 gold."));
    assert_eq!(interp.step(), StepResult::End);
}

#[test]
fn end_inside_an_option_ends_the_script() {
    let (mut interp, _) = reach_choice();
    assert_eq!(interp.handle_choice_input(1), dialog("Merchant", "Farewell."));
    assert_eq!(interp.step(), StepResult::End);
    assert!(interp.is_ended());
}

#[test]
fn invalid_choice_leaves_state_unchanged() {
    let (mut interp, choice) = reach_choice();
    let before = interp.snapshot();

    let result = interp.handle_choice_input(2);
    let err = result.error().unwrap();
    assert_eq!(err.kind, ErrorKind::InvalidChoice { index: 2, count: 2 });
    assert_eq!(err.line, Some(3));
    assert_eq!(interp.snapshot(), before);
    assert_eq!(interp.phase(), Phase::WaitingForChoice);

    assert_eq!(
        interp.step().error().map(|e| &e.kind),
        Some(&ErrorKind::AwaitingChoice)
    );
    assert_eq!(interp.snapshot(), before);

    let StepResult::Choice { options } = choice else {
        panic!("expected a choice");
    };
    assert_eq!(options.len(), 2);
    assert_eq!(interp.handle_choice_input(0), dialog("Merchant", "A fine blade."));
}

#[test]
fn choice_input_without_a_pending_choice_is_rejected() {
    let mut interp = interpreter("A: \"hi\"");
    let result = interp.handle_choice_input(0);
    assert_eq!(
        result.error().map(|e| &e.kind),
        Some(&ErrorKind::NotWaitingForChoice)
    );
    assert_eq!(interp.phase(), Phase::Ready);
    assert_eq!(interp.step(), dialog("A", "hi"));
}

#[test]
fn empty_option_body_falls_through() {
    let mut interp = interpreter("CHOICE {\n  \"Nothing\" {\n  }\n}\nA: \"after\"");
    assert!(matches!(interp.step(), StepResult::Choice { .. }));
    assert_eq!(interp.handle_choice_input(0), dialog("A", "after"));
}
