//! Property-Based Tests for List Bookkeeping
//!
//! Random operation sequences against a small table, checked after every
//! step against the verifier and a plain `VecDeque` model of each list.
//!
//! # Test Properties
//!
//! 1. **Structure**: forward and backward walks agree, sizes match, ends hold
//!    the sentinel
//! 2. **Ordering**: free list is FIFO by insertion, partitions are LIFO
//! 3. **Round trip**: add followed by remove restores `{head, tail, size}`
//! 4. **Resort count**: one resort per empty/non-empty flip of an invalid
//!    partition, none otherwise

#![cfg(test)]

use std::collections::VecDeque;

use proptest::prelude::*;

use super::{CacheLine, LineMetadata, ListId, ListRuntime, PartitionId};
use crate::partition::PartitionHook;

// =============================================================================
// Model
// =============================================================================

const LINES: u32 = 12;
const PARTITIONS: u16 = 3;

/// Partition 2 is invalid; counts resorts.
#[derive(Default)]
struct CountingHook {
    resorts: usize,
}

impl PartitionHook for CountingHook {
    fn is_valid(&self, partition: PartitionId) -> bool {
        partition.get() != 2
    }

    fn resort(&mut self, _runtimes: &[ListRuntime]) {
        self.resorts += 1;
    }
}

#[derive(Debug, Clone)]
enum Op {
    /// Move the `n`-th free line (mod free count) into a partition
    Assign { pick: usize, partition: u16 },
    /// Release the `n`-th line of a partition
    Release { pick: usize, partition: u16 },
    /// Move the `n`-th line of one partition into another
    Reassign { pick: usize, from: u16, to: u16 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (any::<usize>(), 0..PARTITIONS).prop_map(|(pick, partition)| Op::Assign { pick, partition }),
        (any::<usize>(), 0..PARTITIONS).prop_map(|(pick, partition)| Op::Release { pick, partition }),
        (any::<usize>(), 0..PARTITIONS, 0..PARTITIONS)
            .prop_map(|(pick, from, to)| Op::Reassign { pick, from, to }),
    ]
}

struct Model {
    free: VecDeque<CacheLine>,
    parts: Vec<VecDeque<CacheLine>>,
    expected_resorts: usize,
}

impl Model {
    fn new() -> Self {
        Self {
            free: (0..LINES).map(CacheLine::new).collect(),
            parts: vec![VecDeque::new(); PARTITIONS as usize],
            expected_resorts: 0,
        }
    }

    fn part_add(&mut self, partition: u16, line: CacheLine) {
        let list = &mut self.parts[partition as usize];
        if list.is_empty() && partition == 2 {
            self.expected_resorts += 1;
        }
        list.push_front(line);
    }

    fn part_remove(&mut self, partition: u16, index: usize) -> CacheLine {
        let list = &mut self.parts[partition as usize];
        let line = list.remove(index).unwrap();
        if list.is_empty() && partition == 2 {
            self.expected_resorts += 1;
        }
        line
    }
}

fn check(meta: &LineMetadata<CountingHook>, model: &Model) -> Result<(), TestCaseError> {
    prop_assert_eq!(meta.verify_lists(), Ok(()));
    prop_assert!(meta.verify().is_ok());

    let free: Vec<_> = meta.iter_free().collect();
    prop_assert_eq!(&free, &model.free.iter().copied().collect::<Vec<_>>());
    prop_assert_eq!(meta.free_list().size as usize, model.free.len());

    for (id, expected) in model.parts.iter().enumerate() {
        let partition = PartitionId::new(id as u16);
        let walked: Vec<_> = meta.iter_partition(partition).collect();
        prop_assert_eq!(&walked, &expected.iter().copied().collect::<Vec<_>>());

        // Backward walk is the reverse of the forward walk
        let mut backward = Vec::new();
        let mut cursor = meta.partition(partition).tail;
        while let Some(line) = cursor.resolve(meta.line_entries()) {
            backward.push(line);
            cursor = meta.link_info(line).prev;
        }
        backward.reverse();
        prop_assert_eq!(&backward, &walked);

        for line in &walked {
            prop_assert_eq!(meta.link_info(*line).partition, partition);
        }
    }

    prop_assert_eq!(meta.hook().resorts, model.expected_resorts);
    Ok(())
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: every random sequence of moves keeps lists consistent with the model.
    #[test]
    fn prop_random_moves_match_model(ops in prop::collection::vec(op_strategy(), 1..80)) {
        let mut meta = LineMetadata::with_hook(LINES, CountingHook::default()).unwrap();
        let mut model = Model::new();

        for op in ops {
            match op {
                Op::Assign { pick, partition } => {
                    if model.free.is_empty() {
                        continue;
                    }
                    let line = model.free.remove(pick % model.free.len()).unwrap();
                    meta.assign(PartitionId::new(partition), line);
                    model.part_add(partition, line);
                }
                Op::Release { pick, partition } => {
                    let len = model.parts[partition as usize].len();
                    if len == 0 {
                        continue;
                    }
                    let line = model.part_remove(partition, pick % len);
                    meta.release(PartitionId::new(partition), line);
                    model.free.push_back(line);
                }
                Op::Reassign { pick, from, to } => {
                    let len = model.parts[from as usize].len();
                    if len == 0 {
                        continue;
                    }
                    let line = model.part_remove(from, pick % len);
                    meta.reassign(PartitionId::new(from), PartitionId::new(to), line);
                    model.part_add(to, line);
                }
            }

            check(&meta, &model)?;
        }
    }

    /// Property: add immediately followed by remove restores `{head, tail, size}`.
    #[test]
    fn prop_add_remove_round_trip(
        prefill in prop::collection::vec(0..LINES, 0..8),
        pick in 0..LINES,
    ) {
        let mut meta = LineMetadata::with_hook(LINES, CountingHook::default()).unwrap();
        let partition = PartitionId::new(1);
        let line = CacheLine::new(pick);

        for other in prefill {
            let other = CacheLine::new(other);
            if other != line && meta.owner(other) == ListId::Free {
                meta.assign(partition, other);
            }
        }

        // Detach the line so it can be added to either list
        meta.free_list_remove(line);

        let free_before = *meta.free_list();
        meta.free_list_add(line);
        meta.free_list_remove(line);
        prop_assert_eq!(*meta.free_list(), free_before);

        let part_before = *meta.partition(partition);
        meta.partition_add(partition, line);
        meta.partition_remove(partition, line);
        prop_assert_eq!(*meta.partition(partition), part_before);

        meta.free_list_add(line);
        prop_assert!(meta.verify().is_ok());
    }
}
