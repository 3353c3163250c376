//! Integration test: full end-to-end workflow.
//!
//! Tests the complete lifecycle:
//! 1. Deploy a registry with the bootstrap schema
//! 2. Issue credentials with core attributes
//! 3. Grow the schema and write the new attribute
//! 4. Suspend and unsuspend, checking consumer eligibility
//! 5. Persist, reload and keep operating

use std::sync::Arc;

use identity_registry::attribute::{COUNTRY_CODE, PRIMARY_ID, USER_TYPE};
use identity_registry::query::{EligibilityPolicy, Ineligibility};
use identity_registry::storage::{load_state, save_state};
use identity_registry::{
    Account, AttributeId, AttributeType, Clock, IdentityRegistry, IssueRequest, ManualClock,
    RegistryConfig, RegistryError, Role, Uint256,
};

const T: u64 = 1_735_689_600;
const TWO_YEARS: u64 = 2 * 365 * 24 * 3600;

fn foundation() -> Account {
    Account::new("0xf0undation")
}

fn operator() -> Account {
    Account::new("0x0perator")
}

fn deploy() -> (IdentityRegistry, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(T));
    let registry = IdentityRegistry::new(
        &RegistryConfig::new(foundation(), operator()),
        clock.clone(),
    );
    (registry, clock)
}

fn retail(country: &str) -> IssueRequest {
    IssueRequest {
        primary_id: true,
        country_code: country.to_string(),
        proof_of_liveliness: true,
        user_type: Uint256::from(1u64),
        expiries: [T + TWO_YEARS; 4],
        uri: "ipfs://bafy-credential".to_string(),
    }
}

fn sg_retail_policy() -> EligibilityPolicy {
    EligibilityPolicy::new()
        .bool_is(PRIMARY_ID, true)
        .string_in(COUNTRY_CODE, ["sg"])
        .uint_equals(USER_TYPE, 1u64)
}

#[test]
fn full_workflow_issue_to_suspension() {
    // ── Step 1: Deploy ──────────────────────────────────────────────────
    let (mut registry, clock) = deploy();
    assert_eq!(registry.attribute_count(), 5);
    assert_eq!(registry.attribute_name(COUNTRY_CODE), "countryCode");
    assert!(registry.has_role(Role::Admin, &foundation()));
    assert!(registry.has_role(Role::Operator, &foundation()));
    assert!(registry.has_role(Role::Operator, &operator()));
    assert!(!registry.has_role(Role::Admin, &operator()));

    // ── Step 2: Issue ───────────────────────────────────────────────────
    let x = Account::new("0xinvestor");
    let credential = registry
        .issue_identity(&operator(), &x, retail("sg"))
        .expect("issuance should succeed");

    let cc = registry.country_code(&x).unwrap();
    assert_eq!(
        (cc.value.as_str(), cc.expiry, cc.updated_at),
        ("sg", T + TWO_YEARS, T)
    );
    assert_eq!(registry.owner_of(credential).unwrap(), x);

    // ── Step 3: Consumer check, then suspend ────────────────────────────
    clock.advance(3600);
    let now = clock.now();
    assert!(sg_retail_policy().evaluate(&registry, &x, now).is_eligible());

    registry
        .suspend_account(&operator(), &x, "sanctions screening hit")
        .unwrap();
    assert!(registry.is_suspended(&x));
    assert!(registry.has_credential(&x));
    assert_eq!(registry.user_type(&x).unwrap().value, Uint256::from(1u64));

    let verdict = sg_retail_policy().evaluate(&registry, &x, now);
    assert!(!verdict.is_eligible());
    assert_eq!(verdict.reasons, vec![Ineligibility::Suspended]);

    // ── Step 4: Unsuspend restores eligibility ──────────────────────────
    registry.unsuspend_account(&operator(), &x).unwrap();
    assert!(sg_retail_policy().evaluate(&registry, &x, now).is_eligible());

    // ── Step 5: Transfers always refused ────────────────────────────────
    for caller in [foundation(), operator(), x.clone()] {
        let err = registry
            .transfer_credential(&caller, &x, &Account::new("0xother"), credential)
            .unwrap_err();
        assert!(matches!(err, RegistryError::NotTransferable(_)));
    }
}

#[test]
fn full_workflow_schema_growth_after_issuance() {
    let (mut registry, clock) = deploy();
    let holder = Account::new("0xholder");
    let stranger = Account::new("0xstranger");
    registry
        .issue_identity(&operator(), &holder, retail("sg"))
        .unwrap();

    let before = registry.attribute_count();
    let accredited = registry
        .add_attribute(&operator(), "accredited", AttributeType::Bool)
        .unwrap();
    assert_eq!(accredited, AttributeId(before));
    assert_eq!(registry.attribute_count(), before + 1);
    assert_eq!(registry.attribute_type(accredited).unwrap(), AttributeType::Bool);

    let expiry = clock.now() + 365 * 24 * 3600;
    registry
        .set_bool_attribute(&operator(), &holder, accredited, true, expiry)
        .expect("holder write should succeed");
    let err = registry
        .set_bool_attribute(&operator(), &stranger, accredited, true, expiry)
        .unwrap_err();
    assert!(matches!(err, RegistryError::NotVerified(ref a) if *a == stranger));

    // Policies pick the new attribute up without a redeploy.
    let policy = sg_retail_policy().bool_is(accredited, true);
    assert!(policy.evaluate(&registry, &holder, clock.now()).is_eligible());
}

#[test]
fn full_workflow_expiry_boundary() {
    let (mut registry, clock) = deploy();
    let x = Account::new("0xx");
    registry.issue_identity(&operator(), &x, retail("sg")).unwrap();
    clock.advance(60);
    let now = clock.now();

    let err = registry
        .set_string_attribute(&operator(), &x, COUNTRY_CODE, "my", now - 1)
        .unwrap_err();
    assert!(matches!(err, RegistryError::InvalidExpiry(e) if e == now - 1));
    assert_eq!(registry.country_code(&x).unwrap().value, "sg");

    registry
        .set_string_attribute(&operator(), &x, COUNTRY_CODE, "my", now + 1)
        .unwrap();
    let cc = registry.country_code(&x).unwrap();
    assert_eq!((cc.value.as_str(), cc.expiry, cc.updated_at), ("my", now + 1, now));

    // One second later the value is still stored but no longer valid.
    clock.advance(1);
    let verdict = EligibilityPolicy::new()
        .string_in(COUNTRY_CODE, ["my"])
        .evaluate(&registry, &x, clock.now());
    assert_eq!(
        verdict.reasons,
        vec![Ineligibility::AttributeExpired(COUNTRY_CODE)]
    );
}

#[test]
fn full_workflow_persist_and_resume() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("registry.json");

    let (mut registry, clock) = deploy();
    let a = Account::new("0xa");
    registry.issue_identity(&operator(), &a, retail("sg")).unwrap();
    registry
        .add_attribute(&operator(), "documentHash", AttributeType::Bytes)
        .unwrap();
    registry.suspend_account(&operator(), &a, "kyc refresh").unwrap();
    save_state(registry.state(), &path).expect("save");

    let mut resumed = IdentityRegistry::from_state(load_state(&path).expect("load"), clock.clone());
    assert_eq!(resumed.state(), registry.state());
    assert!(resumed.events().is_empty());
    assert!(resumed.is_suspended(&a));

    // Credential ids keep counting from the persisted counter.
    let b = Account::new("0xb");
    let id = resumed.issue_identity(&operator(), &b, retail("my")).unwrap();
    assert_eq!(id.0, 2);
    assert!(matches!(
        resumed.issue_identity(&operator(), &a, retail("sg")),
        Err(RegistryError::AlreadyVerified(_))
    ));
}

#[test]
fn full_workflow_role_handover() {
    let (mut registry, _clock) = deploy();
    let new_operator = Account::new("0xnew-operator");
    let x = Account::new("0xx");

    assert!(registry
        .issue_identity(&new_operator, &x, retail("sg"))
        .is_err());
    registry
        .grant_role(&foundation(), Role::Operator, &new_operator)
        .unwrap();
    registry
        .revoke_role(&foundation(), Role::Operator, &operator())
        .unwrap();

    registry
        .issue_identity(&new_operator, &x, retail("sg"))
        .expect("new operator can issue");
    assert!(matches!(
        registry.suspend_account(&operator(), &x, "stale key"),
        Err(RegistryError::Unauthorized { .. })
    ));
    assert_eq!(
        registry.role_members(Role::Operator),
        vec![Account::new("0xf0undation"), new_operator]
    );
}
