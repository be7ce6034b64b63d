use super::*;

use proptest::prelude::*;
use rust_ndnfib_common::PortId;
use std::collections::HashMap;

#[derive(Clone, Debug)]
enum Op {
    Insert(Vec<u8>, PrefixKind),
    Contains(Vec<u8>, PrefixKind),
    Lookup(Vec<u8>),
}

fn small_config() -> FibConfig {
    FibConfig {
        num_buckets: 8,
        slots_per_bucket: 4,
        log_capacity: 1 << 16,
        ..FibConfig::default()
    }
}

fn key_strategy() -> impl Strategy<Value = Vec<u8>> + Clone {
    // A narrow alphabet makes tag collisions and shared prefixes common.
    "(/[abc]{0,3}){0,4}/".prop_map(String::into_bytes)
}

fn kind_strategy() -> impl Strategy<Value = PrefixKind> + Clone {
    prop_oneof![
        3 => Just(PrefixKind::Interior),
        1 => (0u8..16).prop_map(|p| PrefixKind::Terminal(PortId(p))),
    ]
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    let key = key_strategy();
    let kind = kind_strategy();
    let op = prop_oneof![
        60 => (key.clone(), kind.clone()).prop_map(|(k, t)| Op::Insert(k, t)),
        15 => (key.clone(), kind).prop_map(|(k, t)| Op::Contains(k, t)),
        25 => key.prop_map(Op::Lookup),
    ];
    prop::collection::vec(op, 0..=300)
}

/// Applies an upgrade to the model the way the table does.
fn model_upgrade(model: &mut HashMap<Vec<u8>, PrefixKind>, key: &[u8], kind: PrefixKind) {
    if let Some(stored) = model.get_mut(key) {
        if !stored.is_terminal() && kind.is_terminal() {
            *stored = kind;
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_matches_model(ops in ops_strategy()) {
        let mut table = FibTable::new(small_config()).unwrap();
        let mut model: HashMap<Vec<u8>, PrefixKind> = HashMap::new();
        let mut expected_head = 1usize;

        for op in ops {
            match op {
                Op::Insert(key, kind) => {
                    let present = model.contains_key(&key);
                    match table.insert(&key, kind).unwrap() {
                        InsertOutcome::Present => {
                            prop_assert!(present);
                            model_upgrade(&mut model, &key, kind);
                        }
                        InsertOutcome::Inserted { offset, bucket } => {
                            prop_assert!(!present);
                            prop_assert_eq!(offset as usize, expected_head);
                            prop_assert!(table.candidates(&key).contains(bucket));
                            expected_head += footprint(key.len());
                            model.insert(key.clone(), kind);
                            // Self-lookup right after a successful insert.
                            prop_assert_eq!(table.lookup(&key).unwrap(), Some(kind));
                        }
                        InsertOutcome::BucketsFull => {
                            prop_assert!(!present);
                            let candidates = table.candidates(&key);
                            for bucket in candidates.buckets() {
                                prop_assert!(table.bucket(bucket).iter().all(|&w| !slot::is_empty(w)));
                            }
                        }
                    }
                }
                Op::Contains(key, kind) => {
                    let found = table.contains(&key, kind).unwrap();
                    prop_assert_eq!(found, model.contains_key(&key));
                    model_upgrade(&mut model, &key, kind);
                }
                Op::Lookup(key) => {
                    prop_assert_eq!(table.lookup(&key).unwrap(), model.get(&key).copied());
                }
            }
            prop_assert_eq!(table.log_head(), expected_head);
        }

        prop_assert_eq!(table.verify().unwrap(), model.len());
        for (key, kind) in &model {
            prop_assert_eq!(table.lookup(key).unwrap(), Some(*kind));
        }
    }

    #[test]
    fn prop_terminal_is_sticky(key in key_strategy(), ports in prop::collection::vec(0u8..16, 1..8)) {
        let mut table = FibTable::new(small_config()).unwrap();
        table.insert(&key, PrefixKind::Interior).unwrap();

        let first = PrefixKind::Terminal(PortId(ports[0]));
        for &port in &ports {
            table.insert(&key, PrefixKind::Terminal(PortId(port))).unwrap();
            table.insert(&key, PrefixKind::Interior).unwrap();
            table.contains(&key, PrefixKind::Terminal(PortId(port))).unwrap();
            prop_assert_eq!(table.lookup(&key).unwrap(), Some(first));
        }
        prop_assert_eq!(table.metrics().upgrades.value(), 1);
    }

    #[test]
    fn prop_placement_is_deterministic(keys in prop::collection::vec(key_strategy(), 0..100)) {
        let mut a = FibTable::new(small_config()).unwrap();
        let mut b = FibTable::new(small_config()).unwrap();
        for key in &keys {
            let left = a.insert(key, PrefixKind::Interior).unwrap();
            let right = b.insert(key, PrefixKind::Interior).unwrap();
            prop_assert_eq!(left, right);
        }
        for bucket in 0..small_config().num_buckets {
            prop_assert_eq!(a.bucket(bucket), b.bucket(bucket));
        }
        prop_assert_eq!(a.log_bytes()[..a.log_head()].to_vec(), b.log_bytes()[..b.log_head()].to_vec());
    }

    #[test]
    fn prop_candidates_are_symmetric(key in key_strategy(), bits in 0u32..16) {
        let mask = (1u64 << bits) - 1;
        let c = Candidates::of(&key, mask);
        prop_assert_eq!(crate::hash::alternate_bucket(c.second, c.tag, mask), c.first);
        prop_assert_eq!(crate::hash::alternate_bucket(c.first, c.tag, mask), c.second);
    }
}
