use std::sync::Arc;

use ordex_bench::{
    Error, WorkloadConfig, compare_concurrent, compare_sequential, partition, run_concurrent,
    run_sequential,
};
use ordex_core::{
    AvlTree, ConcurrentAvlTree, ConcurrentIndex, ConcurrentSkipList, OrderedIndex, SkipList,
};
use rstest::rstest;

// Trait for type-level parametrization
trait TestIndex {
    type Sequential: OrderedIndex<i64> + Default;
    type Concurrent: ConcurrentIndex<i64> + Default + 'static;
}

// Marker types for each structure
struct UseAvlTree;
struct UseSkipList;

impl TestIndex for UseAvlTree {
    type Sequential = AvlTree<i64>;
    type Concurrent = ConcurrentAvlTree<i64>;
}

impl TestIndex for UseSkipList {
    type Sequential = SkipList<i64>;
    type Concurrent = ConcurrentSkipList<i64>;
}

fn small_config(workers: usize) -> WorkloadConfig {
    WorkloadConfig {
        total_keys: 10_003,
        workers,
        searches_per_insert: 3,
        search_queries: 500,
        seed: Some(17),
    }
}

#[rstest]
#[case(1_000_000, 8)]
#[case(10, 3)]
#[case(7, 7)]
#[case(5, 1)]
#[case(0, 4)]
fn test_partition_is_disjoint_cover(#[case] total: usize, #[case] workers: usize) {
    let blocks = partition(total, workers);
    assert_eq!(blocks.len(), workers);

    let keys: Vec<i64> = blocks.iter().cloned().flatten().collect();
    assert_eq!(keys, (1..=total as i64).collect::<Vec<_>>());

    // All blocks but the last have the same size.
    let block = total / workers;
    for range in &blocks[..workers - 1] {
        assert_eq!(range.clone().count(), block);
    }
}

#[rstest]
#[case::avl_tree(UseAvlTree)]
#[case::skip_list(UseSkipList)]
fn test_sequential_workload<T: TestIndex>(#[case] _type: T) {
    let config = small_config(1);
    let mut index = T::Sequential::default();

    let report = run_sequential(&mut index, &config);

    assert_eq!(report.keys, config.total_keys);
    assert_eq!(report.searches, config.search_queries);
    // Every search key is drawn from the populated range.
    assert_eq!(report.hits, report.searches);
    assert_eq!(index.len(), config.total_keys);
    index.validate().unwrap();
}

#[rstest]
#[case::avl_tree(UseAvlTree)]
#[case::skip_list(UseSkipList)]
fn test_concurrent_workload_inserts_union<T: TestIndex>(#[case] _type: T) {
    let config = small_config(8);
    let index = Arc::new(T::Concurrent::default());

    let report = run_concurrent(Arc::clone(&index), &config).unwrap();

    assert_eq!(report.workers.len(), 8);
    assert_eq!(report.inserted(), config.total_keys);
    assert_eq!(report.searches(), config.total_keys * config.searches_per_insert);
    assert!(report.hits() <= report.searches());
    assert_eq!(report.workers[7].keys, 8_751..=10_003);

    assert_eq!(index.to_vec(), (1..=config.total_keys as i64).collect::<Vec<_>>());
    index.validate().unwrap();

    let rendered = report.to_string();
    assert!(rendered.contains("8 workers"));
    assert!(rendered.contains(&format!("inserts:  {}", config.total_keys)));
}

#[rstest]
#[case(3)]
#[case(42)]
fn test_sequential_comparison_shares_search_keys(#[case] seed: u64) {
    let config = WorkloadConfig {
        seed: Some(seed),
        ..small_config(1)
    };
    let mut skip_list = SkipList::<i64>::new();
    let mut avl_tree = AvlTree::<i64>::new();

    let comparison = compare_sequential(&mut skip_list, &mut avl_tree, &config);

    assert_eq!(comparison.seed, seed);
    assert_eq!(comparison.skip_list.searches, config.search_queries);
    assert_eq!(comparison.skip_list.searches, comparison.avl_tree.searches);
    assert_eq!(comparison.skip_list.hits, comparison.avl_tree.hits);
    assert_eq!(comparison.avl_tree.hits, comparison.avl_tree.searches);
    assert_eq!(skip_list.to_vec(), avl_tree.to_vec());

    let rendered = comparison.to_string();
    assert!(rendered.contains("--- skip list ---"));
    assert!(rendered.contains("--- avl tree ---"));
    assert!(rendered.contains(&format!("=== summary (seed {}) ===", seed)));
}

#[rstest]
#[case(3)]
#[case(42)]
fn test_concurrent_comparison_covers_same_work(#[case] seed: u64) {
    let config = WorkloadConfig {
        seed: Some(seed),
        ..small_config(4)
    };
    let skip_list = Arc::new(ConcurrentSkipList::<i64>::new());
    let avl_tree = Arc::new(ConcurrentAvlTree::<i64>::new());

    let comparison =
        compare_concurrent(Arc::clone(&skip_list), Arc::clone(&avl_tree), &config).unwrap();

    assert_eq!(comparison.seed, seed);
    assert_eq!(comparison.skip_list.searches(), comparison.avl_tree.searches());
    assert_eq!(comparison.skip_list.inserted(), config.total_keys);
    assert_eq!(comparison.avl_tree.inserted(), config.total_keys);
    let workers = comparison.skip_list.workers.iter().zip(&comparison.avl_tree.workers);
    for (list_worker, tree_worker) in workers {
        assert_eq!(list_worker.keys, tree_worker.keys);
        assert_eq!(list_worker.searches, tree_worker.searches);
    }
    assert_eq!(skip_list.to_vec(), avl_tree.to_vec());
    skip_list.validate().unwrap();
    avl_tree.validate().unwrap();
}

#[test]
fn test_comparison_without_seed_picks_one() {
    let config = WorkloadConfig {
        seed: None,
        ..small_config(1)
    };
    let comparison = compare_sequential(&mut SkipList::new(), &mut AvlTree::new(), &config);
    assert_eq!(comparison.skip_list.hits, comparison.avl_tree.hits);
    assert_eq!(comparison.skip_list.searches, comparison.avl_tree.searches);
}

#[test]
fn test_concurrent_workload_needs_workers() {
    let index = Arc::new(ConcurrentSkipList::<i64>::new());
    let result = run_concurrent(index, &small_config(0));
    assert!(matches!(result, Err(Error::NoWorkers)));
}

#[test]
fn test_empty_workload() {
    let config = WorkloadConfig {
        total_keys: 0,
        ..small_config(4)
    };
    let index = Arc::new(ConcurrentAvlTree::<i64>::new());

    let report = run_concurrent(Arc::clone(&index), &config).unwrap();
    assert_eq!(report.inserted(), 0);
    assert_eq!(report.searches(), 0);
    assert!(index.is_empty());

    let mut list = SkipList::new();
    let report = run_sequential(&mut list, &config);
    assert_eq!(report.searches, 0);
}
