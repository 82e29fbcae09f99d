use std::sync::Arc;

use airgrab_lib::merkle::verify;
use airgrab_lib::samples::{build_sample_snapshot_with_records, sample_address};
use airgrab_lib::util::normalize_address;
use airgrab_lib::{AirgrabError, AirgrabTree, AllocationService, Record, U256};

fn service(n: usize) -> AllocationService {
    AllocationService::new(AirgrabTree::build(&build_sample_snapshot_with_records(n).unwrap()).unwrap())
}

#[test]
fn test_allocation_lookup_ignores_case() {
    let svc = service(6);
    let addr = normalize_address(&sample_address(2));
    let expected = U256::from(3u64) * U256::from(1_000_000_000_000_000_000u128);
    assert_eq!(svc.allocation_for(&addr).unwrap(), expected);
    assert_eq!(svc.allocation_for(&addr.to_uppercase().replace("0X", "0x")).unwrap(), expected);
}

#[test]
fn test_claim_verifies() {
    let svc = service(6);
    for i in 0..6 {
        let claim = svc.claim_for(&normalize_address(&sample_address(i))).unwrap();
        assert_eq!(claim.root, svc.root());
        assert!(verify(&claim.root, claim.leaf, &claim.proof));
        let json = claim.to_json();
        assert_eq!(json.proof.len(), claim.proof.len());
        assert_eq!(json.leaf, format!("0x{}", hex::encode(claim.leaf)));
    }
}

#[test]
fn test_unknown_address_is_not_eligible() {
    let svc = service(4);
    let err = svc.claim_for(&normalize_address(&sample_address(99))).unwrap_err();
    assert!(err.is_not_found());
    assert!(err.to_string().contains("not eligible"));
    // The service keeps answering after a miss.
    assert!(svc.claim_for(&normalize_address(&sample_address(0))).is_ok());
}

#[test]
fn test_malformed_query_is_encoding_error() {
    let svc = service(2);
    assert!(matches!(svc.allocation_for("0xnothex"), Err(AirgrabError::Encoding { .. })));
}

#[test]
fn test_proof_for_rederived_leaf() {
    let svc = service(5);
    let record = Record::new(sample_address(1), U256::from(2u64) * U256::from(1_000_000_000_000_000_000u128));
    let proof = svc.proof_for_leaf(&record.leaf()).unwrap();
    assert!(verify(&svc.root(), record.leaf(), &proof));
    let wrong = Record::new(sample_address(1), U256::from(1u64));
    assert!(svc.proof_for_leaf(&wrong.leaf()).unwrap_err().is_not_found());
}

#[test]
fn test_allocations_sorted_by_address() {
    let svc = service(7);
    let all = svc.allocations();
    assert_eq!(all.len(), 7);
    assert_eq!(svc.len(), 7);
    assert!(all.windows(2).all(|w| w[0].0 < w[1].0));
}

#[test]
fn test_independent_rounds() {
    let small = service(2);
    let large = service(9);
    assert_ne!(small.root(), large.root());
    let addr = normalize_address(&sample_address(5));
    assert!(small.allocation_for(&addr).unwrap_err().is_not_found());
    assert!(large.allocation_for(&addr).is_ok());
}

#[test]
fn test_concurrent_readers() {
    let svc = Arc::new(service(32));
    let handles: Vec<_> = (0..4u64)
        .map(|t| {
            let svc = Arc::clone(&svc);
            std::thread::spawn(move || {
                for i in (t..32).step_by(4) {
                    let claim = svc.claim_for(&normalize_address(&sample_address(i))).unwrap();
                    assert!(verify(&svc.root(), claim.leaf, &claim.proof));
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
}

#[test]
fn test_open_from_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tree.json");
    let built = service(3);
    built.tree().write_to(&path, None, false).unwrap();
    let svc = AllocationService::open(&path).unwrap();
    assert_eq!(svc.root(), built.root());
    assert_eq!(svc.allocations(), built.allocations());
}
