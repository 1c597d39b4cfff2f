//! Integration tests for the pretty-printer
//!
//! Printed programs must parse back to a program that prints the same way.

use proptest::prelude::*;
use quill_language::compile;
use quill_language::pretty::pretty_print;

fn name() -> impl Strategy<Value = String> {
    prop_oneof![Just("gold"), Just("name"), Just("met_guard"), Just("x")].prop_map(String::from)
}

fn speaker() -> impl Strategy<Value = String> {
    prop_oneof![Just("Alice"), Just("Guard"), Just("Narrator")].prop_map(String::from)
}

fn text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ,.!?']{0,16}"
}

fn tags() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z]{1,5}", 0..3).prop_map(|tags| {
        if tags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", tags.join(", "))
        }
    })
}

fn expression() -> impl Strategy<Value = String> {
    prop_oneof![
        (0..1000i64).prop_map(|n| n.to_string()),
        name(),
        Just("TRUE".to_string()),
        (name(), 0..100i64).prop_map(|(n, v)| format!("{n} + {v}")),
        (name(), 0..100i64).prop_map(|(n, v)| format!("{n} >= {v} && !done")),
        (name(), text()).prop_map(|(n, t)| format!("\"{t} {{{n}}}\"")),
        name().prop_map(|n| format!("<getData; \"{n}\"> ?? 0")),
    ]
}

fn simple_statement() -> impl Strategy<Value = String> {
    prop_oneof![
        (name(), expression()).prop_map(|(n, e)| format!("LET {n} = {e}")),
        (name(), 0..50i64).prop_map(|(n, v)| format!("{n} += {v}")),
        (name(), 0..50i64).prop_map(|(n, v)| format!("{n} -= {v}")),
        (speaker(), text(), tags()).prop_map(|(s, t, g)| format!("{s}: \"{t}\"{g}")),
        name().prop_map(|n| format!("LABEL {n}")),
        name().prop_map(|n| format!("GOTO {n}")),
        Just("END".to_string()),
        Just("# comment".to_string()),
    ]
}

fn statement() -> impl Strategy<Value = String> {
    simple_statement().prop_recursive(3, 32, 4, |inner| {
        let body = prop::collection::vec(inner, 0..4).prop_map(|lines| lines.join("\n"));
        prop_oneof![
            (expression(), body.clone()).prop_map(|(c, b)| format!("IF {c} {{\n{b}\n}}")),
            (expression(), body.clone(), body.clone())
                .prop_map(|(c, b, e)| format!("IF {c} {{\n{b}\n}} ELSE {{\n{e}\n}}")),
            prop::collection::vec((text(), body.clone(), tags()), 1..4).prop_map(|options| {
                let options: Vec<String> = options
                    .into_iter()
                    .map(|(t, b, g)| format!("\"{t}\" {{\n{b}\n}}{g}"))
                    .collect();
                format!("CHOICE {{\n{}\n}}", options.join("\n"))
            }),
            prop::collection::vec((body.clone(), tags()), 1..4).prop_map(|options| {
                let options: Vec<String> = options
                    .into_iter()
                    .map(|(b, g)| format!("{{\n{b}\n}}{g}"))
                    .collect();
                format!("RANDOM {{\n{}\n}}", options.join("\n"))
            }),
            body.prop_map(|b| format!("{{\n{b}\n}}")),
        ]
    })
}

fn script() -> impl Strategy<Value = String> {
    prop::collection::vec(statement(), 0..12).prop_map(|lines| lines.join("\n"))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn printed_programs_are_a_fixed_point(source in script()) {
        let program = compile(&source).map_err(|e| TestCaseError::fail(format!("{e:?}\n{source}")))?;
        let printed = pretty_print(&program);
        let reparsed = compile(&printed).map_err(|e| TestCaseError::fail(format!("{e:?}\n{printed}")))?;
        prop_assert_eq!(reparsed.len(), program.len());
        prop_assert_eq!(reparsed.blocks().len(), program.blocks().len());
        prop_assert_eq!(pretty_print(&reparsed), printed);
    }
}

#[test]
fn else_if_chains_print_flat() {
    let source = "IF a {\n  END\n} ELSE {\n  IF b {\n    END\n  }\n}\n";
    let printed = pretty_print(&compile(source).unwrap());
    assert_eq!(printed, "IF a {\n  END\n} ELSE IF b {\n  END\n}\n");
}

#[test]
fn escapes_survive_printing() {
    let source = r#"A: "say \"hi\" and \{literal\}""#;
    let printed = pretty_print(&compile(source).unwrap());
    assert_eq!(pretty_print(&compile(&printed).unwrap()), printed);
}
