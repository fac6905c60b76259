//! Tests for spec loading.

use super::*;
use crate::error::JigError;
use tempfile::TempDir;

const FULL_SPEC: &str = r#"
metadata:
  name: go-service
  description: Go micro-service
  version: 0.2.0
  placeholders:
    projekt: "{{.PROJECT | lower}}"
actions:
  create:
    - input: {question: "Project name", var: PROJECT, default: demo}
    - option: {question: "Use database?", var: DB, default: true}
    - options:
        question: Features
        items:
          - {text: CI, var: CI, default: true}
          - {text: Docker, var: DOCKER}
    - choice:
        question: License
        var: LICENSE
        default: mit
        items:
          - {text: MIT, value: mit}
          - {text: Apache, value: apache}
    - set: {IMAGE: "registry/{{.PROJECT}}", PORT: 8080}
    - if: .DB
      then:
        - render: database
    - render: {source: common}
    - exec: make init
    - exec: [go mod tidy, go build ./...]
    - exec: {commands: make test}
    - do: lint
    - do: {action: lint}
    - if: .CI
      exec: make ci
  lint:
    - exec: golangci-lint run
"#;

fn spec_with_steps(steps: &str) -> String {
    format!(
        "metadata:\n  name: t\n  description: d\n  version: 0.2.0\nactions:\n  create:\n{}",
        steps
    )
}

#[test]
fn test_load_full_spec() {
    let spec = Spec::from_yaml(FULL_SPEC).unwrap();

    assert_eq!(spec.name, "go-service");
    assert_eq!(spec.description, "Go micro-service");
    assert_eq!(spec.version, SPEC_VERSION);
    assert_eq!(spec.placeholders["projekt"], "{{.PROJECT | lower}}");
    assert_eq!(spec.actions.names(), vec!["create", "lint"]);

    let create = spec.actions.lookup("create").unwrap();
    assert_eq!(create.steps.len(), 13);
    assert_eq!(
        create.steps[0],
        Step::Prompt {
            question: "Project name".to_string(),
            var: "PROJECT".to_string(),
            default: "demo".to_string(),
        }
    );
    assert_eq!(
        create.steps[1],
        Step::OptionPrompt {
            question: "Use database?".to_string(),
            var: "DB".to_string(),
            default: true,
        }
    );
    assert_eq!(
        create.steps[2],
        Step::MultiOptionPrompt {
            question: "Features".to_string(),
            items: vec![
                OptionItem {
                    text: "CI".to_string(),
                    var: "CI".to_string(),
                    default: true,
                },
                OptionItem {
                    text: "Docker".to_string(),
                    var: "DOCKER".to_string(),
                    default: false,
                },
            ],
        }
    );
    assert!(matches!(
        &create.steps[3],
        Step::ChoicePrompt { var, default, items, .. }
            if var == "LICENSE" && default == "mit" && items.len() == 2
    ));
    assert_eq!(
        create.steps[4],
        Step::SetOutput {
            vars: vec![
                ("IMAGE".to_string(), "registry/{{.PROJECT}}".to_string()),
                ("PORT".to_string(), "8080".to_string()),
            ],
        }
    );
    assert_eq!(
        create.steps[5],
        Step::If {
            condition: ".DB".to_string(),
            then: vec![Step::Render {
                source: "database".to_string()
            }],
        }
    );
    assert_eq!(
        create.steps[6],
        Step::Render {
            source: "common".to_string()
        }
    );
    assert_eq!(
        create.steps[7],
        Step::Exec {
            commands: vec!["make init".to_string()]
        }
    );
    assert_eq!(
        create.steps[8],
        Step::Exec {
            commands: vec!["go mod tidy".to_string(), "go build ./...".to_string()]
        }
    );
    assert_eq!(
        create.steps[9],
        Step::Exec {
            commands: vec!["make test".to_string()]
        }
    );
    assert_eq!(create.steps[10], create.steps[11]);
    assert_eq!(
        create.steps[12],
        Step::If {
            condition: ".CI".to_string(),
            then: vec![Step::Exec {
                commands: vec!["make ci".to_string()]
            }],
        }
    );
}

#[test]
fn test_lookup_unknown_action() {
    let spec = Spec::from_yaml(FULL_SPEC).unwrap();
    let err = spec.actions.lookup("deploy").unwrap_err();
    assert!(matches!(err, JigError::UnknownAction(ref name) if name == "deploy"));
}

#[test]
fn test_unsupported_version() {
    let yaml = FULL_SPEC.replace("version: 0.2.0", "version: 0.1.0");
    let err = Spec::from_yaml(&yaml).unwrap_err();
    assert_eq!(
        err.to_string(),
        "unsupported spec file version 0.1.0 (expected 0.2.0)"
    );
}

#[test]
fn test_missing_metadata_field() {
    let err = Spec::from_yaml("metadata:\n  name: x\n  version: 0.2.0\nactions: {}\n").unwrap_err();
    assert!(err.to_string().contains("description"));
}

#[test]
fn test_root_must_be_mapping() {
    assert!(matches!(
        Spec::from_yaml("- a\n- b\n").unwrap_err(),
        JigError::UserError(_)
    ));
}

#[test]
fn test_action_must_be_list() {
    let yaml = "metadata:\n  name: t\n  description: d\n  version: 0.2.0\nactions:\n  create: nope\n";
    let err = Spec::from_yaml(yaml).unwrap_err();
    assert_eq!(err.to_string(), "value of action \"create\" must be a list");
}

#[test]
fn test_step_with_no_known_key() {
    let err = Spec::from_yaml(&spec_with_steps("    - input: {question: q, var: A}\n    - frob: x\n"))
        .unwrap_err();
    match err {
        JigError::UnsupportedStep { action, index, reason } => {
            assert_eq!(action, "create");
            assert_eq!(index, 2);
            assert!(reason.contains("frob"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_step_with_several_keys() {
    let err = Spec::from_yaml(&spec_with_steps("    - exec: a\n      do: b\n")).unwrap_err();
    assert!(matches!(
        err,
        JigError::UnsupportedStep { index: 1, ref reason, .. } if reason.starts_with("several step keys")
    ));
}

#[test]
fn test_then_without_if() {
    let err = Spec::from_yaml(&spec_with_steps("    - then: [{exec: a}]\n")).unwrap_err();
    assert!(matches!(err, JigError::UnsupportedStep { .. }));
}

#[test]
fn test_if_with_then_and_step_key() {
    let err = Spec::from_yaml(&spec_with_steps("    - if: .A\n      then: []\n      exec: b\n"))
        .unwrap_err();
    assert!(matches!(err, JigError::UnsupportedStep { .. }));
}

#[test]
fn test_nested_error_names_enclosing_step() {
    let yaml = spec_with_steps("    - exec: a\n    - if: .A\n      then:\n        - bogus: 1\n");
    let err = Spec::from_yaml(&yaml).unwrap_err();
    match err {
        JigError::UnsupportedStep { action, index, .. } => {
            assert_eq!(action, "create step #2 then");
            assert_eq!(index, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_missing_required_property() {
    let err = Spec::from_yaml(&spec_with_steps("    - input: {var: A}\n")).unwrap_err();
    assert_eq!(
        err.to_string(),
        "action \"create\" step #1: unsupported step: input: missing required property \"question\""
    );
}

#[test]
fn test_option_default_must_be_bool() {
    let err = Spec::from_yaml(&spec_with_steps(
        "    - option: {question: q, var: A, default: maybe}\n",
    ))
    .unwrap_err();
    assert!(err.to_string().contains("must be a boolean"));
}

#[test]
fn test_choice_requires_items() {
    let err = Spec::from_yaml(&spec_with_steps(
        "    - choice: {question: q, var: A, items: []}\n",
    ))
    .unwrap_err();
    assert!(err.to_string().contains("must not be empty"));
}

#[test]
fn test_load_from_template_dir() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join(SPEC_FILE_NAME), FULL_SPEC).unwrap();

    let spec = Spec::load(temp.path()).unwrap();
    assert_eq!(spec.actions.len(), 2);
}

#[test]
fn test_load_missing_spec_file() {
    let temp = TempDir::new().unwrap();
    let err = Spec::load(temp.path()).unwrap_err();
    assert!(matches!(err, JigError::IoError { .. }));
}

#[test]
fn test_registry_from_iter() {
    let registry: ActionRegistry = ["b", "a"]
        .into_iter()
        .map(|name| Action {
            name: name.to_string(),
            steps: Vec::new(),
        })
        .collect();
    assert_eq!(registry.names(), vec!["a", "b"]);
    assert!(!registry.is_empty());
}

#[test]
fn test_step_display() {
    let step = Step::Exec {
        commands: vec!["make".to_string(), "make test".to_string()],
    };
    assert_eq!(step.to_string(), "exec make; make test");
    assert_eq!(step.kind(), "exec");
}
