use airgrab_lib::encode::{hash_leaf, AirgrabLeaf, Record};
use airgrab_lib::merkle::*;
use airgrab_lib::{Address, U256};
use alloy_sol_types::SolType;
use sha3::{Digest, Keccak256};

fn addr(byte: u8) -> Address {
    Address::from([byte; 20])
}

#[test]
fn test_keccak_matches_sha3() {
    let expected: [u8; 32] = Keccak256::digest(b"airgrab").into();
    assert_eq!(keccak(b"airgrab"), expected);
}

#[test]
fn test_encoding_parity_with_abi_encode() {
    // Manual parity with Solidity's abi.encode(address, uint256)
    let record = Record::new(addr(0xAA), U256::from(123u64));
    let mut words = [0u8; 64];
    words[12..32].copy_from_slice(&[0xAA; 20]);
    words[63] = 123;
    assert_eq!(record.encode(), words.to_vec());
    let via_sol = AirgrabLeaf::abi_encode(&AirgrabLeaf { account: addr(0xAA), amount: U256::from(123u64) });
    assert_eq!(via_sol, words.to_vec());
}

#[test]
fn test_leaf_is_double_keccak() {
    let record = Record::new(addr(0x11), U256::from(1_000_000_000_000_000_000u128));
    let once = keccak(&record.encode());
    assert_eq!(record.leaf(), keccak(&once));
    assert_eq!(record.leaf(), hash_leaf(&record.encode()));
    assert_ne!(record.leaf(), once);
}

#[test]
fn test_leaf_depends_on_both_fields() {
    let base = Record::new(addr(0x11), U256::from(5u64));
    assert_ne!(base.leaf(), Record::new(addr(0x12), U256::from(5u64)).leaf());
    assert_ne!(base.leaf(), Record::new(addr(0x11), U256::from(6u64)).leaf());
}

#[test]
fn test_formatting_does_not_change_leaf() {
    let a = Record::parse("0xABABABABABABABABABABABABABABABABABABABAB", "1000", 0).unwrap();
    let b = Record::parse("abababababababababababababababababababab", "0001000.00", 0).unwrap();
    let c = Record::parse("0xabababababababababababababababababababab", "0.000000000000001", 18).unwrap();
    assert_eq!(a.leaf(), b.leaf());
    assert_eq!(a.leaf(), c.leaf());
}

#[test]
fn test_merkle_root_two_leaves() {
    let a = keccak(&[1u8]);
    let b = keccak(&[2u8]);
    let tree = MerkleTree::build(vec![a, b]).unwrap();
    assert_eq!(tree.root(), fold_sorted_pair(a, b));
    assert_eq!(tree.proof(&a).unwrap(), vec![b]);
    assert_eq!(tree.proof(&b).unwrap(), vec![a]);
}

#[test]
fn test_verify_sorted_pair_either_side() {
    let a = keccak(&[1u8]);
    let b = keccak(&[2u8]);
    let root = fold_sorted_pair(a, b);
    assert!(verify(&root, a, &[b]));
    assert!(verify(&root, b, &[a]));
    assert!(!verify(&root, a, &[a]));
    assert!(!verify(&root, a, &[]));
}

#[test]
fn test_internal_node_is_not_a_leaf() {
    let leaves: Vec<_> = (0..4u8).map(|i| Record::new(addr(i + 1), U256::from(i)).leaf()).collect();
    let tree = MerkleTree::build(leaves).unwrap();
    let internal = tree.layers()[1][0];
    assert!(tree.proof(&internal).unwrap_err().is_not_found());
}

#[test]
fn test_five_leaves_layer_shape() {
    let leaves: Vec<_> = (0..5u8).map(|i| keccak(&[i])).collect();
    let tree = MerkleTree::build(leaves).unwrap();
    let widths: Vec<_> = tree.layers().iter().map(Vec::len).collect();
    assert_eq!(widths, vec![5, 3, 2, 1]);
    // The last leaf is promoted twice and paired only at the top.
    assert_eq!(tree.proof_at(4).unwrap().len(), 1);
    for i in 0..4 {
        assert_eq!(tree.proof_at(i).unwrap().len(), 3);
    }
}

#[test]
fn test_proof_for_unknown_leaf() {
    let tree = MerkleTree::build(vec![keccak(&[1u8]), keccak(&[2u8])]).unwrap();
    let err = tree.proof(&keccak(&[3u8])).unwrap_err();
    assert!(err.is_not_found());
}
