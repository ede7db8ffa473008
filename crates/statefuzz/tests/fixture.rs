//! Reproducibility and serialization of generated fixtures.

use std::collections::BTreeSet;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use statefuzz::{Config, Fixture, TemplateBuilder, DEFAULT_FIXTURE_NAME};

fn config() -> Config {
    let mut config = Config::default();
    config.prestate.arguments.enabled = true;
    config.prestate.arguments.renew_every = 2;
    config.prestate.seed_precompiled = true;
    config
}

#[test]
fn equal_seeds_yield_equal_fixtures() {
    let mut first = TemplateBuilder::new(config()).seed(99).build().unwrap();
    let mut second = TemplateBuilder::new(config()).seed(99).build().unwrap();
    for _ in 0..10 {
        assert_eq!(first.fill(), second.fill());
    }
    assert_eq!(first.nonce(), second.nonce());
    assert_eq!(first.last_report(), second.last_report());
}

#[test]
fn reseeded_clones_diverge() {
    let mut template = TemplateBuilder::new(config()).seed(5).build().unwrap();
    template.fill();
    let mut clone = template.clone();
    assert_eq!(template.clone().fill(), clone.clone().fill());

    clone.reseed(6);
    let (ours, theirs) = (template.fill(), clone.fill());
    assert_eq!(ours.transaction.nonce, theirs.transaction.nonce);
    assert_ne!(ours, theirs);
}

#[test]
fn rendered_json_has_the_state_test_layout() {
    let mut template = TemplateBuilder::new(config()).seed(1).build().unwrap();
    let json: serde_json::Value = serde_json::from_str(&template.fill_json().unwrap()).unwrap();

    let fixture = json[DEFAULT_FIXTURE_NAME].as_object().unwrap();
    let keys: BTreeSet<_> = fixture.keys().map(String::as_str).collect();
    assert_eq!(keys, BTreeSet::from(["env", "info", "post", "pre", "transaction"]));

    let env: BTreeSet<_> = fixture["env"].as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(
        env,
        BTreeSet::from([
            "currentCoinbase",
            "currentDifficulty",
            "currentGasLimit",
            "currentNumber",
            "currentTimestamp",
            "previousHash",
        ])
    );
    let transaction: BTreeSet<_> = fixture["transaction"]
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(
        transaction,
        BTreeSet::from(["data", "gasLimit", "gasPrice", "nonce", "secretKey", "to", "value"])
    );
    assert_eq!(
        fixture["transaction"]["secretKey"],
        "0x45a915e4d060149eb4365960e6a7a45f334393093061116b197e3240065ff2d8"
    );

    for (address, account) in fixture["pre"].as_object().unwrap() {
        assert_eq!(address.len(), 42, "{address}");
        assert_eq!(*address, address.to_lowercase());
        let fields: BTreeSet<_> = account.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(fields, BTreeSet::from(["balance", "code", "nonce", "storage"]));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn parsing_preserves_addresses(seed: u64, fills in 1_usize..6) {
        let mut template = TemplateBuilder::new(config()).seed(seed).build().unwrap();
        for _ in 1..fills {
            template.fill();
        }
        let fixture = template.fill();
        let json = serde_json::to_string(&fixture.clone().named("case")).unwrap();
        let mut parsed: std::collections::BTreeMap<String, Fixture> =
            serde_json::from_str(&json).unwrap();
        let parsed = parsed.remove("case").unwrap();

        prop_assert_eq!(
            parsed.pre.keys().collect::<Vec<_>>(),
            fixture.pre.keys().collect::<Vec<_>>()
        );
        prop_assert_eq!(parsed, fixture);
    }
}
