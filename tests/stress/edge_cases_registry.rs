//! Edge case tests: the attribute-count override, retyping, unset reads,
//! bytes payloads, large values, and journal behaviour on rejection.

use std::sync::Arc;

use identity_registry::attribute::{
    COMPETENCY_RATING, COUNTRY_CODE, PRIMARY_ID, PROOF_OF_LIVELINESS, USER_TYPE,
};
use identity_registry::storage::check_additive;
use identity_registry::{
    Account, AttributeId, AttributeType, AttributeValue, EventValue, IdentityRegistry,
    IssueRequest, ManualClock, RegistryConfig, RegistryError, RegistryEvent, SharedRegistry,
    Uint256,
};

const NOW: u64 = 1_000_000;

fn foundation() -> Account {
    Account::new("foundation")
}

fn operator() -> Account {
    Account::new("operator")
}

fn registry() -> IdentityRegistry {
    IdentityRegistry::new(
        &RegistryConfig::new(foundation(), operator()),
        Arc::new(ManualClock::new(NOW)),
    )
}

fn issue(registry: &mut IdentityRegistry, account: &Account) {
    registry
        .issue_identity(
            &operator(),
            account,
            IssueRequest {
                primary_id: true,
                country_code: "sg".into(),
                proof_of_liveliness: false,
                user_type: Uint256::from(2u64),
                expiries: [NOW + 500; 4],
                uri: String::new(),
            },
        )
        .unwrap();
}

// === Attribute count override ===

#[test]
fn edge_lowered_count_hides_values() {
    let mut reg = registry();
    let x = Account::new("x");
    issue(&mut reg, &x);

    reg.set_attribute_count(&foundation(), 2).unwrap();
    for id in [PROOF_OF_LIVELINESS, USER_TYPE, COMPETENCY_RATING] {
        assert!(matches!(
            reg.get_uint_attribute(&x, id),
            Err(RegistryError::InvalidAttribute(i)) if i == id
        ));
        assert!(reg.attribute_type(id).is_err());
    }
    assert_eq!(reg.attribute_name(USER_TYPE), "");

    // Raising the count again exposes the old definitions and values.
    reg.set_attribute_count(&foundation(), 5).unwrap();
    assert_eq!(reg.user_type(&x).unwrap().value, Uint256::from(2u64));
    assert_eq!(reg.attribute_name(USER_TYPE), "userType");
}

#[test]
fn edge_raised_count_exposes_undefined_bool_slots() {
    let mut reg = registry();
    let x = Account::new("x");
    issue(&mut reg, &x);

    reg.set_attribute_count(&foundation(), 8).unwrap();
    let slot = AttributeId(6);
    assert_eq!(reg.attribute_name(slot), "");
    assert_eq!(reg.attribute_type(slot).unwrap(), AttributeType::Bool);
    assert!(!reg.get_bool_attribute(&x, slot).unwrap().value);

    // The next add lands after the forced count.
    let id = reg
        .add_attribute(&operator(), "late", AttributeType::String)
        .unwrap();
    assert_eq!(id, AttributeId(8));

    // Undefined slots can be named and written like any other id.
    reg.set_attribute_name(&operator(), slot, "filled").unwrap();
    reg.set_bool_attribute(&operator(), &x, slot, true, NOW + 1)
        .unwrap();
    assert!(reg.get_bool_attribute(&x, slot).unwrap().value);
}

#[test]
fn edge_count_override_is_not_additive() {
    let mut reg = registry();
    let before = reg.state().attributes.clone();
    reg.set_attribute_count(&foundation(), 1).unwrap();

    let diff = check_additive(&before, &reg.state().attributes);
    assert!(!diff.is_additive());
    assert_eq!(diff.removed.len(), 4);
}

#[test]
fn edge_add_after_max_count_is_rejected_cleanly() {
    let shared = SharedRegistry::new(registry());
    shared
        .write(|r| r.set_attribute_count(&foundation(), u64::MAX))
        .unwrap();
    shared.write(|r| r.drain_events());
    let before = shared.snapshot();

    let err = shared
        .write(|r| r.add_attribute(&foundation(), "x", AttributeType::Bool))
        .unwrap_err();
    assert!(matches!(err, RegistryError::InvalidAttribute(AttributeId(u64::MAX))));
    assert_eq!(shared.snapshot(), before);
    assert!(shared.read(|r| r.events().is_empty()));

    // The handle keeps working after the rejection.
    assert_eq!(shared.read(|r| r.attribute_name(USER_TYPE)), "userType");
}

#[test]
fn edge_huge_count_schema_comparison_stays_cheap() {
    let mut reg = registry();
    reg.set_attribute_count(&foundation(), 3_000_000_000).unwrap();
    let old = reg.state().attributes.clone();

    let same = check_additive(&old, &old);
    assert!(same.is_additive());
    assert!(same.removed.is_empty() && same.appended.is_empty() && same.corrected.is_empty());

    reg.set_attribute_count(&foundation(), u64::MAX).unwrap();
    reg.set_attribute_name(&operator(), AttributeId(u64::MAX - 1), "tail")
        .unwrap();
    let grown = check_additive(&old, &reg.state().attributes);
    assert!(grown.is_additive());
    assert_eq!(grown.appended, vec![AttributeId(u64::MAX - 1)]);

    let shrunk = check_additive(&reg.state().attributes, &old);
    assert!(!shrunk.is_additive());
    assert_eq!(shrunk.removed, vec![AttributeId(u64::MAX - 1)]);
}

// === Types and values ===

#[test]
fn edge_unset_reads_zero_for_every_type() {
    let mut reg = registry();
    let doc = reg
        .add_attribute(&operator(), "doc", AttributeType::Bytes)
        .unwrap();
    let nobody = Account::new("nobody");

    let b = reg.get_bool_attribute(&nobody, PRIMARY_ID).unwrap();
    let s = reg.get_string_attribute(&nobody, COUNTRY_CODE).unwrap();
    let u = reg.get_uint_attribute(&nobody, USER_TYPE).unwrap();
    let d = reg.get_bytes_attribute(&nobody, doc).unwrap();
    assert!(!b.value);
    assert!(s.value.is_empty());
    assert!(u.value.is_zero());
    assert!(d.value.is_empty());
    for (expiry, updated_at) in [
        (b.expiry, b.updated_at),
        (s.expiry, s.updated_at),
        (u.expiry, u.updated_at),
        (d.expiry, d.updated_at),
    ] {
        assert_eq!((expiry, updated_at), (0, 0));
    }
}

#[test]
fn edge_uint_full_width() {
    let mut reg = registry();
    let x = Account::new("x");
    issue(&mut reg, &x);

    reg.set_uint_attribute(&operator(), &x, COMPETENCY_RATING, Uint256::MAX, NOW + 1)
        .unwrap();
    assert_eq!(reg.competency_rating(&x).unwrap().value, Uint256::MAX);
    assert_eq!(
        Uint256::MAX.to_string(),
        "115792089237316195423570985008687907853269984665640564039457584007913129639935"
    );
}

#[test]
fn edge_large_bytes_never_enter_events() {
    let mut reg = registry();
    let x = Account::new("x");
    issue(&mut reg, &x);
    let doc = reg
        .add_attribute(&operator(), "scan", AttributeType::Bytes)
        .unwrap();
    reg.drain_events();

    let blob = vec![0xabu8; 1 << 20];
    reg.set_bytes_attribute(&operator(), &x, doc, blob.clone(), NOW + 1)
        .unwrap();
    assert_eq!(reg.get_bytes_attribute(&x, doc).unwrap().value, blob);

    let events = reg.drain_events();
    assert_eq!(events.len(), 1);
    match &events[0] {
        RegistryEvent::AttributeSet {
            value: EventValue::Bytes { len, sha256 },
            ..
        } => {
            assert_eq!(*len, 1 << 20);
            assert_eq!(sha256.len(), 64);
        }
        other => panic!("unexpected event {other:?}"),
    }
    let json = serde_json::to_string(&events[0]).unwrap();
    assert!(json.len() < 1_000);
}

#[test]
fn edge_generic_setter_checks_value_variant() {
    let mut reg = registry();
    let x = Account::new("x");
    issue(&mut reg, &x);
    let before = reg.state().clone();

    let err = reg
        .set_attribute(
            &operator(),
            &x,
            USER_TYPE,
            AttributeValue::Str("2".into()),
            NOW + 1,
        )
        .unwrap_err();
    assert!(matches!(err, RegistryError::InvalidAttribute(USER_TYPE)));
    assert_eq!(reg.state(), &before);
}

// === Rejections leave no trace ===

#[test]
fn edge_rejections_emit_nothing() {
    let mut reg = registry();
    let x = Account::new("x");
    let outsider = Account::new("outsider");
    issue(&mut reg, &x);
    reg.drain_events();
    let before = reg.state().clone();

    assert!(reg
        .add_attribute(&outsider, "nope", AttributeType::Bool)
        .is_err());
    assert!(reg
        .set_attribute_type(&operator(), PRIMARY_ID, AttributeType::UInt)
        .is_err());
    assert!(reg.set_attribute_count(&operator(), 0).is_err());
    assert!(reg
        .set_bool_attribute(&operator(), &x, PRIMARY_ID, true, NOW)
        .is_err());
    assert!(reg
        .grant_role(&operator(), identity_registry::Role::Admin, &outsider)
        .is_err());
    assert!(reg.authorize_migration(&foundation(), 0).is_err());
    assert!(reg.suspend_account(&outsider, &x, "x").is_err());

    assert!(reg.events().is_empty());
    assert_eq!(reg.state(), &before);
}

#[test]
fn edge_many_accounts_each_hold_one_credential() {
    let mut reg = registry();
    for i in 0..2_000 {
        issue(&mut reg, &Account::new(format!("acct-{i}")));
    }
    assert_eq!(reg.current_credential_id().0, 2_000);
    for i in [0u64, 999, 1_999] {
        let account = Account::new(format!("acct-{i}"));
        let record = reg.credential_of(&account).unwrap();
        assert_eq!(record.credential_id.0, i + 1);
        assert_eq!(reg.owner_of(record.credential_id).unwrap(), account);
    }
}
