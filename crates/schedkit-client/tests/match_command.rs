mod support;

use schedkit_client::commands::match_item::{self, MatchRunOptions};
use serde_json::json;
use support::schedule_testkit::{
    envelope_value, temp_dir_in_tmp, write_fixture_text, write_merchant_profile,
};

#[test]
fn exact_contract_name_matches_with_high_confidence() {
    let temp = temp_dir_in_tmp("schedkit-match-exact");
    assert!(temp.is_ok());
    let Ok(temp) = temp else {
        return;
    };
    let mapping = write_fixture_text(
        temp.path(),
        "mapping.csv",
        "name,code\nPlatform License,SKU-LICENSE\nPlatform Support Plan,SKU-SUPPORT\n",
    );
    assert!(mapping.is_ok());
    let Ok(mapping) = mapping else {
        return;
    };

    let payload = envelope_value(match_item::run(
        "Platform Support Plan",
        Some(&mapping.display().to_string()),
        None,
    ));
    let data = &payload["data"];
    assert_eq!(payload["command"], json!("match"));
    assert_eq!(data["integration_item"], json!("SKU-SUPPORT"));
    assert_eq!(data["match_confidence"], json!("high"));
    assert_eq!(data["match_score"], json!(0.0));
    assert_eq!(data["matched_contract_name"], json!("Platform Support Plan"));
    assert_eq!(data["mapping_pairs"], json!(2));
}

#[test]
fn merchant_profile_supplies_the_table() {
    let temp = temp_dir_in_tmp("schedkit-match-profile");
    assert!(temp.is_ok());
    let Ok(temp) = temp else {
        return;
    };
    let home = temp.path().join("home");
    let profile = write_merchant_profile(&home, "acme", None, Some("name,code\nSupport,SKU-1\n"));
    assert!(profile.is_ok());

    let payload = envelope_value(match_item::run_with_options(MatchRunOptions {
        item_name: "Premium Support".to_string(),
        mapping: None,
        merchant: Some("acme".to_string()),
        home_override: Some(&home),
    }));
    assert_eq!(payload["data"]["match_confidence"], json!("none"));
    assert_eq!(payload["data"]["integration_item"], json!(null));

    let substring = envelope_value(match_item::run_with_options(MatchRunOptions {
        item_name: "Supp".to_string(),
        mapping: None,
        merchant: Some("acme".to_string()),
        home_override: Some(&home),
    }));
    assert_eq!(substring["data"]["integration_item"], json!("SKU-1"));
    assert_eq!(substring["data"]["match_confidence"], json!("high"));
}

#[test]
fn match_requires_a_table_source() {
    let result = match_item::run("Support", None, None);
    assert!(result.is_err());
    if let Err(error) = result {
        assert_eq!(error.code, "invalid_argument");
        assert_eq!(
            error.recovery_steps,
            vec!["Run `schedkit match --help` for usage.".to_string()]
        );
    }

    let temp = temp_dir_in_tmp("schedkit-match-empty-profile");
    assert!(temp.is_ok());
    if let Ok(temp) = temp {
        assert!(write_merchant_profile(temp.path(), "bare", None, None).is_ok());
        let bare = match_item::run_with_options(MatchRunOptions {
            item_name: "Support".to_string(),
            mapping: None,
            merchant: Some("bare".to_string()),
            home_override: Some(temp.path()),
        });
        assert!(bare.is_err_and(|error| error.code == "invalid_argument"));
    }
}
