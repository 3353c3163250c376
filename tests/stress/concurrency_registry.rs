//! Concurrency test: parallel issuance, writes and reads through the
//! shared registry handle.
//!
//! Validates that mutations are serialized and that readers never observe
//! partially-applied operations.

use std::sync::{Arc, Mutex};
use std::thread;

use identity_registry::attribute::{COMPETENCY_RATING, COUNTRY_CODE, USER_TYPE};
use identity_registry::query::{EligibilityPolicy, Ineligibility};
use identity_registry::{
    Account, CredentialId, IdentityRegistry, IssueRequest, ManualClock, RegistryConfig,
    RegistryError, RegistryReader, SharedRegistry, Uint256,
};

const NOW: u64 = 1_700_000_000;

fn operator() -> Account {
    Account::new("operator")
}

fn shared() -> SharedRegistry {
    SharedRegistry::new(IdentityRegistry::new(
        &RegistryConfig::new("foundation", "operator"),
        Arc::new(ManualClock::new(NOW)),
    ))
}

fn request(user_type: u64) -> IssueRequest {
    IssueRequest {
        primary_id: true,
        country_code: "sg".to_string(),
        proof_of_liveliness: true,
        user_type: Uint256::from(user_type),
        expiries: [NOW + 1_000; 4],
        uri: String::new(),
    }
}

#[test]
fn stress_50_threads_issue_distinct_accounts() {
    let registry = shared();
    let ids = Arc::new(Mutex::new(Vec::new()));

    let mut handles = Vec::new();
    for thread_id in 0..50 {
        let registry = registry.clone();
        let ids = Arc::clone(&ids);
        handles.push(thread::spawn(move || {
            for i in 0..20 {
                let account = Account::new(format!("acct-{thread_id}-{i}"));
                let id = registry
                    .write(|r| r.issue_identity(&operator(), &account, request(thread_id)))
                    .expect("issuance should succeed");
                ids.lock().unwrap().push(id);
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    let mut ids = ids.lock().unwrap().clone();
    ids.sort();
    let expected: Vec<CredentialId> = (1..=1_000).map(CredentialId).collect();
    assert_eq!(ids, expected, "credential ids must be dense and unique");
    assert_eq!(
        registry.read(|r| r.current_credential_id()),
        CredentialId(1_000)
    );
}

#[test]
fn stress_racing_issuers_same_account() {
    let registry = shared();
    let contested = Account::new("contested");
    let outcomes = Arc::new(Mutex::new(Vec::new()));

    let mut handles = Vec::new();
    for thread_id in 0..32 {
        let registry = registry.clone();
        let contested = contested.clone();
        let outcomes = Arc::clone(&outcomes);
        handles.push(thread::spawn(move || {
            let result =
                registry.write(|r| r.issue_identity(&operator(), &contested, request(thread_id)));
            outcomes.lock().unwrap().push(result);
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    let outcomes = outcomes.lock().unwrap();
    let winners = outcomes.iter().filter(|r| r.is_ok()).count();
    let already = outcomes
        .iter()
        .filter(|r| matches!(r, Err(RegistryError::AlreadyVerified(_))))
        .count();
    assert_eq!(winners, 1);
    assert_eq!(already, 31);
    assert_eq!(registry.read(|r| r.balance_of(&contested)), 1);
}

#[test]
fn stress_readers_never_see_partial_issuance() {
    let registry = shared();
    let writer = {
        let registry = registry.clone();
        thread::spawn(move || {
            for i in 0..500u64 {
                let account = Account::new(format!("user-{i}"));
                registry
                    .write(|r| r.issue_identity(&operator(), &account, request(i)))
                    .unwrap();
            }
        })
    };

    let mut readers = Vec::new();
    for _ in 0..8 {
        let registry = registry.clone();
        readers.push(thread::spawn(move || {
            for i in 0..500u64 {
                let account = Account::new(format!("user-{i}"));
                // A credential and its core attributes appear together.
                let (has, user_type) = registry.read(|r| {
                    (r.has_credential(&account), r.user_type(&account).unwrap())
                });
                if has {
                    assert_eq!(user_type.value, Uint256::from(i));
                    assert_eq!(user_type.updated_at, NOW);
                } else {
                    assert_eq!(user_type.updated_at, 0);
                }
            }
        }));
    }

    writer.join().unwrap();
    for r in readers {
        r.join().unwrap();
    }
    assert_eq!(registry.snapshot().identities.credential_count(), 500);
}

#[test]
fn stress_concurrent_attribute_writers() {
    let registry = shared();
    let holder = Account::new("holder");
    registry
        .write(|r| r.issue_identity(&operator(), &holder, request(1)))
        .unwrap();

    let mut handles = Vec::new();
    for thread_id in 0..20u64 {
        let registry = registry.clone();
        let holder = holder.clone();
        handles.push(thread::spawn(move || {
            for i in 0..50u64 {
                registry
                    .write(|r| {
                        r.set_uint_attribute(
                            &operator(),
                            &holder,
                            COMPETENCY_RATING,
                            thread_id * 1_000 + i,
                            NOW + 10,
                        )
                    })
                    .unwrap();
                let rating = RegistryReader::get_uint_attribute(&registry, &holder, COMPETENCY_RATING)
                    .unwrap();
                assert_eq!(rating.expiry, NOW + 10);
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    // 1 issuance + 4 core writes + 1 000 rating writes.
    let events = registry.write(|r| r.drain_events());
    assert_eq!(events.len(), 1 + 4 + 1_000);
    assert_eq!(
        RegistryReader::get_string_attribute(&registry, &holder, COUNTRY_CODE)
            .unwrap()
            .value,
        "sg"
    );
    assert!(RegistryReader::get_uint_attribute(&registry, &holder, USER_TYPE).is_ok());
}

#[test]
fn stress_policy_evaluation_sees_one_state() {
    let registry = shared();
    let holder = Account::new("holder");
    registry
        .write(|r| r.issue_identity(&operator(), &holder, request(1)))
        .unwrap();

    // Each write flips suspension and country together.
    let writer = {
        let registry = registry.clone();
        let holder = holder.clone();
        thread::spawn(move || {
            for i in 0..2_000u64 {
                registry
                    .write(|r| {
                        if i % 2 == 0 {
                            r.suspend_account(&operator(), &holder, "review")?;
                            r.set_string_attribute(
                                &operator(),
                                &holder,
                                COUNTRY_CODE,
                                "my",
                                NOW + 10,
                            )
                        } else {
                            r.unsuspend_account(&operator(), &holder)?;
                            r.set_string_attribute(
                                &operator(),
                                &holder,
                                COUNTRY_CODE,
                                "sg",
                                NOW + 10,
                            )
                        }
                    })
                    .unwrap();
            }
        })
    };

    let policy = EligibilityPolicy::new().string_in(COUNTRY_CODE, ["sg"]);
    let both = vec![
        Ineligibility::Suspended,
        Ineligibility::AttributeMismatch(COUNTRY_CODE),
    ];
    let mut readers = Vec::new();
    for _ in 0..4 {
        let registry = registry.clone();
        let holder = holder.clone();
        let policy = policy.clone();
        let both = both.clone();
        readers.push(thread::spawn(move || {
            for _ in 0..2_000 {
                let verdict = registry.evaluate(&policy, &holder, NOW);
                assert!(
                    verdict.reasons.is_empty() || verdict.reasons == both,
                    "mixed state observed: {:?}",
                    verdict.reasons
                );
            }
        }));
    }

    writer.join().unwrap();
    for r in readers {
        r.join().unwrap();
    }
    assert!(registry.evaluate(&policy, &holder, NOW).is_eligible());
}
