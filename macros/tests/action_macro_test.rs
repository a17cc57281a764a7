//! Tests for #[derive(Action)] macro

use composable_state_macros::Action;

#[derive(Action, Clone, Debug)]
enum TodoAction {
    // Requests
    #[request]
    LoadRequested,

    #[request]
    AddRequested { title: String },

    #[request]
    ToggleRequested(String),

    // Outcomes
    #[outcome]
    LoadSucceeded { items: Vec<String> },

    #[outcome]
    LoadFailed { reason: String },

    // Neither
    Reset,
}

#[test]
fn test_is_request() {
    assert!(TodoAction::LoadRequested.is_request());
    assert!(!TodoAction::LoadRequested.is_outcome());

    let add = TodoAction::AddRequested {
        title: "Learn X".to_string(),
    };
    assert!(add.is_request());
}

#[test]
fn test_tuple_variant_request() {
    let toggle = TodoAction::ToggleRequested("1".to_string());
    assert!(toggle.is_request());
    assert_eq!(toggle.name(), "ToggleRequested");
}

#[test]
fn test_is_outcome() {
    let outcomes = vec![
        TodoAction::LoadSucceeded { items: vec![] },
        TodoAction::LoadFailed {
            reason: "network".to_string(),
        },
    ];

    for outcome in outcomes {
        assert!(outcome.is_outcome(), "Expected outcome: {outcome:?}");
        assert!(!outcome.is_request(), "Should not be request: {outcome:?}");
    }
}

#[test]
fn test_unmarked_variant_is_neither() {
    assert!(!TodoAction::Reset.is_request());
    assert!(!TodoAction::Reset.is_outcome());
}

#[test]
fn test_names_follow_variants() {
    let cases = vec![
        (TodoAction::LoadRequested, "LoadRequested"),
        (
            TodoAction::AddRequested {
                title: String::new(),
            },
            "AddRequested",
        ),
        (TodoAction::LoadSucceeded { items: vec![] }, "LoadSucceeded"),
        (
            TodoAction::LoadFailed {
                reason: String::new(),
            },
            "LoadFailed",
        ),
        (TodoAction::Reset, "Reset"),
    ];

    for (action, expected) in cases {
        assert_eq!(action.name(), expected);
    }
}

#[derive(Action, Clone, Debug)]
enum OnlyRequests {
    #[request]
    Ping,
}

#[test]
fn test_enum_without_outcomes() {
    assert!(OnlyRequests::Ping.is_request());
    assert!(!OnlyRequests::Ping.is_outcome());
}
