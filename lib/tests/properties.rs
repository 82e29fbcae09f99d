use airgrab_lib::merkle::verify;
use airgrab_lib::{AirgrabTree, Address, Record, Snapshot, U256};
use proptest::prelude::*;

fn records() -> impl Strategy<Value = Vec<Record>> {
    prop::collection::btree_map(prop::array::uniform20(1u8..), any::<u128>(), 1..40).prop_map(|m| {
        m.into_iter().map(|(a, v)| Record::new(Address::from(a), U256::from(v))).collect()
    })
}

proptest! {
    #[test]
    fn root_ignores_record_order(recs in records(), seed in any::<u64>()) {
        let mut shuffled = recs.clone();
        let len = shuffled.len();
        shuffled.rotate_left((seed as usize) % len);
        shuffled.reverse();
        let a = AirgrabTree::build(&Snapshot::from_records(recs).unwrap()).unwrap();
        let b = AirgrabTree::build(&Snapshot::from_records(shuffled).unwrap()).unwrap();
        prop_assert_eq!(a.root(), b.root());
    }

    #[test]
    fn every_proof_verifies_and_tampering_fails(recs in records()) {
        let tree = AirgrabTree::build(&Snapshot::from_records(recs.clone()).unwrap()).unwrap();
        let root = tree.root();
        for r in &recs {
            let proof = tree.proof(&r.leaf()).unwrap();
            prop_assert!(verify(&root, r.leaf(), &proof));
            let forged = Record::new(r.address, r.amount ^ U256::from(1u64));
            prop_assert!(!verify(&root, forged.leaf(), &proof));
        }
    }

    #[test]
    fn dump_load_preserves_proofs(recs in records()) {
        let tree = AirgrabTree::build(&Snapshot::from_records(recs).unwrap()).unwrap();
        let loaded = AirgrabTree::load(&tree.dump(false).unwrap()).unwrap();
        prop_assert_eq!(loaded.root(), tree.root());
        for e in tree.entries() {
            let leaf = e.record.leaf();
            prop_assert_eq!(loaded.proof(&leaf).unwrap(), tree.proof(&leaf).unwrap());
        }
    }
}
