mod common;

use common::{premium_registry, premium_wizard, step_ids};
use serde_json::json;
use wizard_core::wizard::{FormValues, NavigationError, NavigationOutcome, StepId, Wizard};

#[test]
fn payment_is_skipped_when_not_premium() {
    let mut wizard = premium_wizard();
    wizard.set("isPremium", false).unwrap();
    wizard.set("name", "Gulf Coast Bakery").unwrap();

    assert_eq!(step_ids(&wizard), vec!["info", "review"]);
    let outcome = wizard.advance();
    assert_eq!(
        outcome,
        NavigationOutcome::Moved {
            from: StepId::from("info"),
            to: StepId::from("review"),
        }
    );
}

#[test]
fn premium_then_retreat_lands_on_payment() {
    let mut wizard = premium_wizard();
    wizard.set("isPremium", false).unwrap();
    wizard.set("name", "Gulf Coast Bakery").unwrap();
    assert!(wizard.advance().moved());
    assert_eq!(wizard.current_step_id().as_str(), "review");

    wizard.set("isPremium", true).unwrap();
    assert_eq!(wizard.current_step_id().as_str(), "review");
    assert!(wizard.retreat().moved());
    assert_eq!(wizard.current_step_id().as_str(), "payment");
}

#[test]
fn hiding_the_active_step_moves_back() {
    let mut wizard = premium_wizard();
    wizard
        .set_many([("name", json!("Gulf Coast Bakery")), ("isPremium", json!(true))])
        .unwrap();
    assert!(wizard.advance().moved());
    assert_eq!(wizard.current_step_id().as_str(), "payment");

    wizard.set("isPremium", false).unwrap();
    assert_eq!(wizard.current_step_id().as_str(), "info");
}

#[test]
fn removing_the_flag_also_renavigates() {
    let mut wizard = premium_wizard();
    wizard
        .set_many([("name", json!("Harbor Books")), ("isPremium", json!(true))])
        .unwrap();
    wizard.advance();
    assert_eq!(wizard.current_step_id().as_str(), "payment");

    assert_eq!(wizard.remove("isPremium"), Some(json!(true)));
    assert_eq!(wizard.current_step_id().as_str(), "info");
}

#[test]
fn advance_never_leaves_an_invalid_step() {
    let mut wizard = premium_wizard();
    for _ in 0..3 {
        match wizard.advance() {
            NavigationOutcome::Invalid(errors) => {
                assert_eq!(errors.get("name"), Some("Name is required"))
            }
            other => panic!("expected validation errors, got {other:?}"),
        }
        assert_eq!(wizard.current_step_id().as_str(), "info");
    }

    wizard.set("name", "   ").unwrap();
    assert!(matches!(wizard.advance(), NavigationOutcome::Invalid(_)));
}

#[test]
fn retreat_never_validates() {
    let mut wizard = premium_wizard();
    wizard.set("name", "Harbor Books").unwrap();
    wizard.advance();
    wizard.set("name", "").unwrap();

    assert!(wizard.retreat().moved());
    assert_eq!(wizard.current_step_id().as_str(), "info");
    assert_eq!(wizard.retreat(), NavigationOutcome::Stayed);
}

#[test]
fn last_visible_step_reports_ready_to_submit() {
    let mut wizard = premium_wizard();
    wizard.set("name", "Harbor Books").unwrap();
    wizard.advance();
    assert!(wizard.is_last_visible_step());
    assert_eq!(wizard.advance(), NavigationOutcome::ReadyToSubmit);
    assert_eq!(wizard.current_step_id().as_str(), "review");
}

#[test]
fn jump_to_requires_a_visible_step() {
    let mut wizard = premium_wizard();

    assert_eq!(
        wizard.jump_to("payment"),
        NavigationOutcome::Rejected(NavigationError::HiddenStep(StepId::from("payment")))
    );
    assert_eq!(
        wizard.jump_to("shipping"),
        NavigationOutcome::Rejected(NavigationError::UnknownStep(StepId::from("shipping")))
    );
    assert_eq!(wizard.current_step_id().as_str(), "info");

    assert!(wizard.jump_to("review").moved());
    assert_eq!(wizard.jump_to("review"), NavigationOutcome::Stayed);
}

#[test]
fn visible_steps_are_stable_for_unchanged_values() {
    let mut wizard = premium_wizard();
    wizard.set("isPremium", true).unwrap();
    let first = step_ids(&wizard);
    let second = step_ids(&wizard);
    assert_eq!(first, second);
    assert_eq!(first, vec!["info", "payment", "review"]);
}

#[test]
fn prefilled_values_pick_the_first_visible_step() {
    let mut values = FormValues::new();
    values.set("isPremium", true).unwrap();
    let wizard = Wizard::with_values(premium_registry(), values).unwrap();
    assert_eq!(wizard.current_step_id().as_str(), "info");
    assert_eq!(wizard.visible_steps().len(), 3);
}
