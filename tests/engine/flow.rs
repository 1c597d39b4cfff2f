//! Integration tests for control flow
//!
//! Tests dialog order, blocks, GOTO, END, and the silent-step limit.

use proptest::prelude::*;
use quill_engine::{InterpreterConfig, Interpreter, Phase, StepResult};
use quill_foundation::{ErrorKind, SemanticLimit};
use quill_language::compile;

use crate::{dialog, interpreter};

proptest! {
    #[test]
    fn dialog_comes_out_in_source_order(
        lines in prop::collection::vec(("[A-Z][a-z]{0,6}", "[a-zA-Z0-9 .,!?']{0,20}"), 0..20)
    ) {
        let source: Vec<String> = lines
            .iter()
            .map(|(speaker, text)| format!("{speaker}: \"{text}\""))
            .collect();
        let mut interp = interpreter(&source.join("\n"));
        for (speaker, text) in &lines {
            prop_assert_eq!(interp.step(), dialog(speaker, text));
        }
        prop_assert_eq!(interp.step(), StepResult::End);
        prop_assert_eq!(interp.step(), StepResult::End);
        prop_assert!(interp.is_ended());
    }
}

#[test]
fn nested_blocks_return_to_the_parent() {
    let mut interp = interpreter("{\n  A: \"in\"\n  {\n    B: \"deeper\"\n  }\n}\nC: \"out\"");
    assert_eq!(interp.step(), dialog("A", "in"));
    assert_eq!(interp.stack_depth(), 1);
    assert_eq!(interp.step(), dialog("B", "deeper"));
    assert_eq!(interp.stack_depth(), 2);
    assert_eq!(interp.step(), dialog("C", "out"));
    assert_eq!(interp.stack_depth(), 0);
}

#[test]
fn goto_from_deep_nesting_clears_the_stack() {
    let source = "LET n = 1\nIF n == 1 {\n  {\n    IF TRUE {\n      GOTO done\n    }\n  }\n}\nA: \"skipped\"\nLABEL done\nB: \"landed\"";
    let mut interp = interpreter(source);
    assert_eq!(interp.step(), dialog("B", "landed"));
    assert_eq!(interp.stack_depth(), 0);
    assert_eq!(interp.step(), StepResult::End);
}

#[test]
fn goto_can_loop_backwards() {
    let source = "LET n = 0\nLABEL top\nn += 1\nIF n < 3 {\n  GOTO top\n}\nA: \"{n}\"";
    let mut interp = interpreter(source);
    assert_eq!(interp.step(), dialog("A", "3"));
}

#[test]
fn undefined_goto_fails_permanently() {
    let mut interp = interpreter("A: \"before\"\nGOTO nowhere\nB: \"never\"");
    assert_eq!(interp.step(), dialog("A", "before"));
    let failure = interp.step();
    let err = failure.error().unwrap();
    assert_eq!(err.kind, ErrorKind::UndefinedLabel("nowhere".into()));
    assert_eq!(err.line, Some(2));
    assert_eq!(err.message(), "label 'nowhere' not found");

    assert_eq!(interp.phase(), Phase::Failed);
    for _ in 0..3 {
        assert_eq!(interp.step(), failure);
    }
    assert_eq!(
        interp.handle_choice_input(0).error().map(|e| &e.kind),
        Some(&ErrorKind::NotWaitingForChoice)
    );
    assert_eq!(interp.error(), failure.error());
}

#[test]
fn end_stops_everything_after_it() {
    let mut interp = interpreter("A: \"one\"\n{\n  END\n}\nB: \"two\"");
    assert_eq!(interp.step(), dialog("A", "one"));
    assert_eq!(interp.step(), StepResult::End);
    assert_eq!(interp.step(), StepResult::End);
    assert_eq!(interp.phase(), Phase::Ended);
}

#[test]
fn silent_loops_hit_the_limit() {
    let program = compile("LABEL spin\nGOTO spin").unwrap();
    let config = InterpreterConfig::seeded(1).with_max_silent_steps(50);
    let mut interp = Interpreter::with_config(program, config);
    let result = interp.step();
    assert_eq!(
        result.error().map(|e| &e.kind),
        Some(&ErrorKind::LimitExceeded(SemanticLimit::MaxSilentSteps { limit: 50 }))
    );
    assert!(interp.is_failed());
}

#[test]
fn dialog_resets_the_silent_count() {
    let mut source = String::from("LET n = 0\nLABEL top\nn += 1\nA: \"tick\"\nIF n < 20 {\n  GOTO top\n}");
    source.push('\n');
    let program = compile(&source).unwrap();
    let config = InterpreterConfig::seeded(1).with_max_silent_steps(10);
    let mut interp = Interpreter::with_config(program, config);
    for _ in 0..20 {
        assert_eq!(interp.step(), dialog("A", "tick"));
    }
    assert_eq!(interp.step(), StepResult::End);
}
