use partition_core::PartitionTask;
use proptest::prelude::*;
use std::collections::BTreeSet;

/// Strategy for generating distinct positive record keys
pub fn key_set_strategy() -> impl Strategy<Value = BTreeSet<i64>> {
    prop::collection::btree_set(1i64..=10_000, 0..200)
}

/// Strategy for generating page sizes, including degenerate ones
pub fn page_size_strategy() -> impl Strategy<Value = usize> {
    1usize..=25
}

/// Strategy for generating namespace ids
pub fn namespace_id_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,15}"
}

/// Keyset page over an ordered key set: keys > cursor, ascending, capped
pub fn keyset_page(keys: &BTreeSet<i64>, cursor: i64, page_size: usize) -> Vec<PartitionTask<()>> {
    keys.range(cursor.saturating_add(1)..)
        .take(page_size)
        .map(|key| PartitionTask::new(*key, ()))
        .collect()
}
