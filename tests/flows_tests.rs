use serde_json::json;
use wizard_core::errors::SubmitError;
use wizard_core::flows::{business_profile, FlowKind};
use wizard_core::wizard::{
    FormValues, NavigationOutcome, StepStatus, SubmissionOutcome, SubmitFn, Wizard,
};

fn advance_ok(wizard: &mut Wizard) {
    let outcome = wizard.advance();
    assert!(
        outcome.moved() || outcome == NavigationOutcome::ReadyToSubmit,
        "step `{}` did not advance: {outcome:?}",
        wizard.current_step_id()
    );
}

#[test]
fn slugs_resolve_case_insensitively() {
    for kind in FlowKind::ALL {
        assert_eq!(FlowKind::from_slug(&kind.slug().to_uppercase()), Some(kind));
    }
    assert_eq!(FlowKind::from_slug("press-release"), None);
}

#[test]
fn business_profile_free_listing_skips_payment() {
    let mut wizard = FlowKind::BusinessProfile.build().unwrap();
    wizard
        .set_many([
            ("business.name", json!("Harbor Books")),
            ("business.category", json!("Retail")),
        ])
        .unwrap();
    advance_ok(&mut wizard);

    wizard
        .set_many([
            ("contact.email", json!("owner@harborbooks.com")),
            ("contact.phone", json!("(727) 555-0100")),
            ("contact.address.street", json!("12 Main St")),
            ("contact.address.city", json!("Clearwater")),
            ("contact.address.state", json!("FL")),
            ("contact.address.zip", json!("33755")),
        ])
        .unwrap();
    advance_ok(&mut wizard);

    wizard.set("hours.weekdays", "9am-5pm").unwrap();
    advance_ok(&mut wizard);

    wizard.set("plan.premium", false).unwrap();
    advance_ok(&mut wizard);
    assert_eq!(wizard.current_step_id().as_str(), "review");
    assert_eq!(wizard.derived_value("plan.monthly_price"), Some(json!(0)));

    assert!(!wizard.can_submit());
    wizard.set("terms.accepted", true).unwrap();
    assert!(wizard.can_submit());

    let progress = wizard.progress();
    assert!(progress.iter().all(|entry| entry.id.as_str() != "payment"));
    assert_eq!(progress.len(), 5);
    assert_eq!(progress[4].status, StepStatus::Current);
    assert!(progress[..4]
        .iter()
        .all(|entry| entry.status == StepStatus::Completed));
}

#[test]
fn business_profile_premium_requires_card_details() {
    let mut wizard = FlowKind::BusinessProfile.build().unwrap();
    wizard.set("plan.premium", true).unwrap();
    assert_eq!(
        wizard.derived_value("plan.monthly_price"),
        Some(json!(business_profile::PREMIUM_MONTHLY_PRICE))
    );
    assert!(wizard.jump_to("payment").moved());

    wizard
        .set_many([
            ("payment.card_name", json!("Ana Ruiz")),
            ("payment.card_number", json!("4111 1111 1111")),
            ("payment.expiry", json!("13/27")),
            ("payment.cvv", json!("12")),
        ])
        .unwrap();
    let errors = wizard.validate_current();
    assert_eq!(
        errors.get("payment.card_number"),
        Some("Card number must be exactly 16 digits")
    );
    assert_eq!(errors.get("payment.expiry"), Some("Expiry must use MM/YY format"));
    assert!(errors.get("payment.cvv").is_some());
    assert!(errors.get("payment.card_name").is_none());
}

#[tokio::test]
async fn legal_notice_runs_to_submission() {
    let mut wizard = FlowKind::LegalNotice.build().unwrap();
    wizard.set("notice.type", "Public Hearing").unwrap();
    advance_ok(&mut wizard);

    wizard
        .set_many([
            ("notice.title", json!("Zoning variance hearing")),
            (
                "notice.content",
                json!("The board will hear a request for a zoning variance at 12 Main St."),
            ),
        ])
        .unwrap();
    advance_ok(&mut wizard);

    wizard
        .set("notice.publication_dates", json!(["2024-05-01", "2024-05-08"]))
        .unwrap();
    advance_ok(&mut wizard);

    wizard
        .set_many([
            ("billing.contact_name", json!("Clerk of Court")),
            ("billing.contact_email", json!("clerk@county.gov")),
            ("billing.invoice", json!(true)),
        ])
        .unwrap();
    advance_ok(&mut wizard);
    assert_eq!(wizard.current_step_id().as_str(), "review");

    let adapter = SubmitFn(|values: FormValues| async move {
        assert_eq!(values.get_bool("billing.invoice"), Some(true));
        SubmissionOutcome::Accepted {
            receipt_id: "LN-1".into(),
        }
    });
    match wizard.submit(&adapter).await {
        Err(SubmitError::Invalid { step_id, errors }) => {
            assert_eq!(step_id.as_str(), "review");
            assert!(errors.get("notice.attested").is_some());
        }
        other => panic!("expected the attestation to be required, got {other:?}"),
    }

    wizard.set("notice.attested", true).unwrap();
    assert_eq!(wizard.advance(), NavigationOutcome::ReadyToSubmit);
    let outcome = wizard.submit(&adapter).await.unwrap();
    assert_eq!(
        outcome,
        SubmissionOutcome::Accepted {
            receipt_id: "LN-1".into()
        }
    );
    assert_eq!(wizard.derived_value("notice.total"), Some(json!(150)));
}

#[test]
fn news_article_event_step_appears_for_events() {
    let mut wizard = FlowKind::NewsArticle.build().unwrap();
    wizard
        .set_many([
            ("article.category", json!("Events")),
            ("article.headline", json!("Harbor festival returns")),
        ])
        .unwrap();
    let ids: Vec<&str> = wizard
        .visible_steps()
        .into_iter()
        .map(|step| step.id().as_str())
        .collect();
    assert_eq!(ids, vec!["category", "content", "media", "event_details", "review"]);

    wizard.set("article.body", vec!["word"; 401].join(" ")).unwrap();
    assert_eq!(wizard.derived_value("article.reading_minutes"), Some(json!(3)));
}
