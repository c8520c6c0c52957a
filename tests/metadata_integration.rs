//! Cache-Line Metadata Integration Tests
//!
//! Exercises the public surface end to end:
//! - Free list and partition list moves
//! - Partition ordering and resort notifications
//! - Configuration loading
//! - Shared handle, workload driver and metrics

use cline_meta::metadata::Position;
use cline_meta::{
    CacheLine, LineMetadata, ListId, ListRuntime, MetadataConfig, NoopHook, PartitionConfig,
    PartitionId, SharedLineMetadata,
};

fn line(index: u32) -> CacheLine {
    CacheLine::new(index)
}

fn lines(ids: &[u32]) -> Vec<CacheLine> {
    ids.iter().copied().map(CacheLine::new).collect()
}

// =============================================================================
// List Moves
// =============================================================================

mod list_tests {
    use super::*;

    const P0: PartitionId = PartitionId::DEFAULT;

    #[test]
    fn test_four_line_walkthrough() {
        let mut meta = LineMetadata::with_hook(4, NoopHook).unwrap();
        let n = meta.sentinel();
        assert_eq!(n, line(4));

        assert_eq!(meta.free_list_remove(line(2)), Position::Middle);
        meta.partition_add(P0, line(2));
        assert_eq!(meta.iter_free().collect::<Vec<_>>(), lines(&[0, 1, 3]));

        assert_eq!(meta.free_list_remove(line(0)), Position::Head);
        meta.partition_add(P0, line(0));
        assert_eq!(meta.iter_partition(P0).collect::<Vec<_>>(), lines(&[0, 2]));
        assert_eq!(meta.free_list().head, line(1));
        assert_eq!(meta.link_info(line(1)).prev, n);

        assert_eq!(meta.partition_remove(P0, line(2)), Position::Tail);
        assert_eq!(
            *meta.partition(P0),
            ListRuntime {
                head: line(0),
                tail: line(0),
                size: 1
            }
        );

        meta.free_list_add(line(2));
        assert_eq!(meta.iter_free().collect::<Vec<_>>(), lines(&[1, 3, 2]));
        assert_eq!(meta.owner(line(2)), ListId::Free);
        assert!(meta.verify().is_ok());
    }

    #[test]
    fn test_sole_element_leaves_empty_list() {
        let mut meta = LineMetadata::with_hook(1, NoopHook).unwrap();
        let n = meta.sentinel();

        assert_eq!(meta.free_list_remove(line(0)), Position::Sole);
        assert_eq!(*meta.free_list(), ListRuntime::empty(1));
        assert_eq!(meta.free_list().head, n);

        meta.partition_add(P0, line(0));
        assert_eq!(meta.partition_remove(P0, line(0)), Position::Sole);
        assert!(meta.partition(P0).is_empty());
        assert_eq!(meta.partition(P0).tail, n);

        meta.free_list_add(line(0));
        assert!(meta.verify().is_ok());
    }

    #[test]
    fn test_free_list_fifo_partition_lifo() {
        let mut meta = LineMetadata::with_hook(6, NoopHook).unwrap();
        let p = PartitionId::new(5);

        for i in 0..6 {
            meta.assign(p, line(i));
        }
        assert_eq!(meta.iter_partition(p).collect::<Vec<_>>(), lines(&[5, 4, 3, 2, 1, 0]));

        for i in [3, 0, 5] {
            meta.release(p, line(i));
        }
        assert_eq!(meta.iter_free().collect::<Vec<_>>(), lines(&[3, 0, 5]));
        assert_eq!(meta.iter_partition(p).collect::<Vec<_>>(), lines(&[4, 2, 1]));
        assert!(meta.verify().is_ok());
    }

    #[test]
    #[should_panic(expected = "is not in partition")]
    fn test_remove_from_wrong_partition_panics() {
        let mut meta = LineMetadata::with_hook(4, NoopHook).unwrap();
        meta.assign(PartitionId::new(1), line(0));
        meta.partition_remove(PartitionId::new(2), line(0));
    }

    #[test]
    #[should_panic(expected = "still linked")]
    fn test_adding_a_free_line_twice_panics() {
        let mut meta = LineMetadata::with_hook(4, NoopHook).unwrap();
        meta.free_list_add(line(1));
    }

    #[test]
    #[should_panic(expected = "still linked")]
    fn test_partition_add_of_free_member_panics() {
        let mut meta = LineMetadata::with_hook(4, NoopHook).unwrap();
        meta.partition_add(P0, line(1));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_out_of_range_line_panics() {
        let mut meta = LineMetadata::with_hook(4, NoopHook).unwrap();
        meta.free_list_remove(line(4));
    }
}

// =============================================================================
// Partition Ordering
// =============================================================================

mod ordering_tests {
    use super::*;

    fn config() -> MetadataConfig {
        MetadataConfig {
            line_entries: 16,
            partitions: vec![
                PartitionConfig::unclassified().with_priority(10),
                PartitionConfig::new(PartitionId::new(1), "bulk").with_priority(200),
                PartitionConfig::new(PartitionId::new(2), "retired").with_valid(false),
            ],
        }
    }

    #[test]
    fn test_invalid_partition_evicted_first() {
        let mut meta = LineMetadata::from_config(&config()).unwrap();

        meta.assign(PartitionId::new(0), line(0));
        meta.assign(PartitionId::new(1), line(1));
        assert_eq!(meta.hook().resort_count(), 0);

        meta.assign(PartitionId::new(2), line(2));
        assert_eq!(meta.hook().resort_count(), 1);
        assert_eq!(
            meta.hook().order(),
            &[PartitionId::new(2), PartitionId::new(1), PartitionId::new(0)]
        );
    }

    #[test]
    fn test_validity_change_needs_explicit_resort() {
        let mut meta = LineMetadata::from_config(&config()).unwrap();
        meta.assign(PartitionId::new(0), line(0));
        meta.assign(PartitionId::new(1), line(1));

        meta.hook_mut().set_valid(PartitionId::new(0), false).unwrap();
        assert_eq!(meta.hook().resort_count(), 0);

        meta.resort();
        assert_eq!(meta.hook().eviction_candidate(), Some(PartitionId::new(0)));
        assert_eq!(meta.metrics().resort_count(), 1);
    }

    #[test]
    fn test_valid_partition_transitions_do_not_resort() {
        let mut meta = LineMetadata::from_config(&config()).unwrap();
        for _ in 0..3 {
            meta.assign(PartitionId::new(1), line(7));
            meta.release(PartitionId::new(1), line(7));
        }
        assert_eq!(meta.hook().resort_count(), 0);
    }
}

// =============================================================================
// Configuration
// =============================================================================

mod config_tests {
    use super::*;
    use cline_meta::Error;

    #[test]
    fn test_sample_config_loads() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/partitions.yaml");
        let config = MetadataConfig::from_file(path).unwrap();
        assert_eq!(config.line_entries, 4096);

        let meta = LineMetadata::from_config(&config).unwrap();
        assert_eq!(meta.free_list().size, 4096);
        assert!(!meta.hook().config(PartitionId::new(4)).unwrap().valid);
    }

    #[test]
    fn test_zero_lines_rejected() {
        let config = MetadataConfig::with_line_entries(0);
        assert!(matches!(
            LineMetadata::from_config(&config),
            Err(Error::InvalidLineEntries(0))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = MetadataConfig::from_file("/nonexistent/partitions.yaml");
        assert!(matches!(result, Err(Error::Io(_))));
    }
}

// =============================================================================
// Shared Handle, Workload and Metrics
// =============================================================================

mod runtime_tests {
    use super::*;
    use cline_meta::sim::{self, WorkloadConfig};
    use std::thread;

    #[test]
    fn test_shared_handle_across_threads() {
        let shared = SharedLineMetadata::new(LineMetadata::with_hook(64, NoopHook).unwrap());

        let handles: Vec<_> = (0..4u16)
            .map(|t| {
                let shared = shared.clone();
                thread::spawn(move || {
                    let from = PartitionId::new(t);
                    let to = PartitionId::new(t + 4);
                    for _ in 0..200 {
                        shared.with(|meta| {
                            if let Some(l) = meta.take_free_line(from) {
                                meta.reassign(from, to, l);
                                meta.release(to, l);
                            }
                        });
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let meta = shared.lock();
        assert_eq!(meta.used_lines(), 0);
        assert!(meta.verify().is_ok());
    }

    #[test]
    fn test_workload_against_configured_partitions() {
        let config = MetadataConfig::from_yaml_str(
            r#"
line_entries: 128
partitions:
  - id: 0
    name: unclassified
  - id: 1
    name: hot
    priority: 1
  - id: 2
    name: retired
    valid: false
"#,
        )
        .unwrap();
        let mut meta = LineMetadata::from_config(&config).unwrap();
        let partitions: Vec<_> = meta.hook().configs().map(|c| c.id).collect();

        let workload = WorkloadConfig {
            operations: 5_000,
            seed: 7,
            verify_every: 500,
            ..Default::default()
        };
        let report = sim::run(&mut meta, &partitions, &workload).unwrap();

        assert_eq!(report.verifications, 11);
        assert_eq!(report.resorts, meta.hook().resort_count());
        assert!(report.resorts > 0);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["operations"], 5_000);
        assert_eq!(json["snapshot"]["line_entries"], 128);
    }

    #[test]
    fn test_metrics_text_exposition() {
        let mut meta = LineMetadata::with_hook(8, NoopHook).unwrap();
        meta.assign(PartitionId::new(3), line(1));

        let text = meta.metrics().encode_text().unwrap();
        assert!(text.contains("cline_list_ops_total"));
        assert!(text.contains(r#"list="p3""#));
        assert!(text.contains("cline_list_size"));
    }
}
