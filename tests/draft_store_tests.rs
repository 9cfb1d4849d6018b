mod common;

use chrono::{Duration, Utc};
use common::{premium_registry, premium_wizard};
use tempfile::TempDir;
use wizard_core::errors::{StorageError, WizardError};
use wizard_core::wizard::{Draft, DraftStore, JsonDraftStore, StepId, Wizard};

fn store() -> (TempDir, JsonDraftStore) {
    let dir = TempDir::new().expect("create temp dir");
    let store = JsonDraftStore::new(dir.path().join("drafts")).expect("create draft store");
    (dir, store)
}

#[test]
fn drafts_round_trip_through_disk() {
    let (_dir, store) = store();
    let mut wizard = premium_wizard();
    wizard.set("name", "Harbor Books").unwrap();
    wizard.set("isPremium", true).unwrap();
    wizard.advance();

    store.save(&wizard.to_draft("premium")).unwrap();
    let draft = store.load("premium").unwrap().expect("draft saved");
    assert_eq!(draft.current_step_id.as_str(), "payment");
    assert!(draft.visited_step_ids.contains(&StepId::from("info")));

    let resumed = Wizard::from_draft(premium_registry(), draft).unwrap();
    assert_eq!(resumed.current_step_id().as_str(), "payment");
    assert_eq!(resumed.values(), wizard.values());
    assert!(resumed.state().is_visited(&StepId::from("info")));
}

#[test]
fn resuming_on_a_hidden_step_moves_back() {
    let (_dir, store) = store();
    let mut wizard = premium_wizard();
    wizard.set("name", "Harbor Books").unwrap();
    wizard.set("isPremium", true).unwrap();
    wizard.advance();
    let mut draft = wizard.to_draft("premium");
    draft.values.set("isPremium", false).unwrap();
    store.save(&draft).unwrap();

    let loaded = store.load("premium").unwrap().unwrap();
    let resumed = Wizard::from_draft(premium_registry(), loaded).unwrap();
    assert_eq!(resumed.current_step_id().as_str(), "info");
}

#[test]
fn unknown_draft_step_is_an_error() {
    let mut draft = premium_wizard().to_draft("premium");
    draft.current_step_id = StepId::from("shipping");
    assert!(matches!(
        Wizard::from_draft(premium_registry(), draft),
        Err(WizardError::UnknownDraftStep(_))
    ));
}

#[test]
fn list_is_newest_first_and_discard_removes() {
    let (_dir, store) = store();
    let mut older: Draft = premium_wizard().to_draft("older");
    older.saved_at = Utc::now() - Duration::hours(2);
    store.save(&older).unwrap();
    store.save(&premium_wizard().to_draft("newer")).unwrap();

    let flows: Vec<String> = store.list().unwrap().into_iter().map(|d| d.flow).collect();
    assert_eq!(flows, vec!["newer", "older"]);

    store.discard("older").unwrap();
    assert!(store.load("older").unwrap().is_none());
    assert!(matches!(store.discard("older"), Err(StorageError::NotFound(_))));
}

#[test]
fn flow_names_are_sanitized_into_file_names() {
    let (_dir, store) = store();
    let path = store.draft_path("../Legal Notice");
    assert_eq!(path.parent(), Some(store.dir()));
    assert_eq!(
        path.file_name().and_then(|name| name.to_str()),
        Some("___legal_notice.json")
    );
    assert!(store.load("never-saved").unwrap().is_none());
}

#[test]
fn corrupt_draft_files_do_not_hide_the_rest() {
    let (_dir, store) = store();
    store.save(&premium_wizard().to_draft("premium")).unwrap();
    std::fs::write(store.dir().join("broken.json"), "{ not json").unwrap();

    let flows: Vec<String> = store.list().unwrap().into_iter().map(|d| d.flow).collect();
    assert_eq!(flows, vec!["premium"]);
    assert!(matches!(store.load("broken"), Err(StorageError::Serde(_))));
}
