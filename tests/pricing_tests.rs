use serde_json::json;
use wizard_core::flows::{legal_notice, FlowKind};
use wizard_core::wizard::{DerivedCalculator, FormValues, Quantity, TieredPrice};

fn words(count: usize) -> String {
    vec!["word"; count].join(" ")
}

#[test]
fn tier_boundaries_are_inclusive() {
    let pricing = legal_notice::pricing();
    assert_eq!(pricing.price_for(0), 75);
    assert_eq!(pricing.price_for(250), 75);
    assert_eq!(pricing.price_for(251), 100);
    assert_eq!(pricing.price_for(500), 100);
    assert_eq!(pricing.price_for(501), 150);
}

#[test]
fn tiers_may_be_declared_out_of_order() {
    let pricing = TieredPrice::new("price", "body", Quantity::Characters, 9)
        .tier(10, 2)
        .tier(5, 1);
    assert_eq!(pricing.price_for(5), 1);
    assert_eq!(pricing.price_for(6), 2);
    assert_eq!(pricing.price_for(11), 9);
}

#[test]
fn derived_price_follows_every_content_edit() {
    let mut wizard = FlowKind::LegalNotice.build().unwrap();
    wizard.set(legal_notice::CONTENT_FIELD, words(250)).unwrap();
    assert_eq!(wizard.derived_value("notice.word_count"), Some(json!(250)));
    assert_eq!(wizard.derived_value("notice.price"), Some(json!(75)));

    wizard.set(legal_notice::CONTENT_FIELD, words(251)).unwrap();
    assert_eq!(wizard.derived_value("notice.price"), Some(json!(100)));

    wizard
        .set(legal_notice::DATES_FIELD, json!(["2024-05-01", "2024-05-08"]))
        .unwrap();
    assert_eq!(wizard.derived_value("notice.total"), Some(json!(200)));

    wizard.remove(legal_notice::CONTENT_FIELD);
    assert_eq!(wizard.derived_value("notice.price"), Some(json!(75)));
}

#[test]
fn calculator_recomputes_from_scratch() {
    let mut calculator = DerivedCalculator::new();
    calculator.push(legal_notice::pricing());
    let mut values = FormValues::new();
    values.set(legal_notice::CONTENT_FIELD, words(600)).unwrap();

    let first = calculator.recompute(&values);
    let second = calculator.recompute(&values);
    assert_eq!(first, second);
    assert_eq!(first.get("notice.price"), Some(&json!(150)));
    assert_eq!(calculator.value("missing", &values), None);
}
