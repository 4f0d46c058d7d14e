use std::io::{self, Write};
use std::process::exit;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{LevelFilter, error, info};
use ordex_bench::workload::{
    DEFAULT_SEARCH_QUERIES, DEFAULT_SEARCHES_PER_INSERT, DEFAULT_TOTAL_KEYS, DEFAULT_WORKERS,
};
use ordex_bench::{
    Explainer, Result, WorkloadConfig, compare_concurrent, compare_sequential, fill,
    run_concurrent, run_sequential, run_session,
};
use ordex_core::data_structures::sorted::{DEFAULT_MAX_LEVEL, DEFAULT_PROBABILITY};
use ordex_core::{
    AvlTree, ConcurrentAvlTree, ConcurrentIndex, ConcurrentSkipList, OrderedIndex, SkipList,
    SkipListConfig,
};

#[derive(Parser, Debug)]
#[command(name = "ordex", version, about = "Ordered index workloads and walkthroughs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Insert 1..=N in order, then time random searches
    Sequential {
        #[arg(long, value_enum, default_value_t = Target::Both)]
        structure: Target,
        #[command(flatten)]
        index: IndexArgs,
        /// Number of random searches after the build
        #[arg(long, default_value_t = DEFAULT_SEARCH_QUERIES)]
        queries: usize,
    },
    /// Insert 1..=N from several threads with searches after every insert
    Concurrent {
        #[arg(long, value_enum, default_value_t = Target::Both)]
        structure: Target,
        #[command(flatten)]
        index: IndexArgs,
        #[arg(long, default_value_t = DEFAULT_WORKERS)]
        workers: usize,
        #[arg(long, default_value_t = DEFAULT_SEARCHES_PER_INSERT)]
        searches_per_insert: usize,
    },
    /// Build an index over 1..=N, then search keys typed on stdin
    Interactive {
        #[arg(long, value_enum, default_value_t = Structure::SkipList)]
        structure: Structure,
        #[command(flatten)]
        index: IndexArgs,
    },
    /// Walk through searches on a fixed five-level skip list over 1..=1000
    Explain {
        /// Explain this key and exit instead of reading keys from stdin
        #[arg(long)]
        key: Option<i64>,
    },
}

#[derive(Args, Debug)]
struct IndexArgs {
    /// Keys 1..=N are inserted
    #[arg(long, default_value_t = DEFAULT_TOTAL_KEYS)]
    keys: usize,
    /// Highest skip list level
    #[arg(long)]
    max_level: Option<usize>,
    /// Skip list promotion probability
    #[arg(long)]
    probability: Option<f64>,
    /// Seed for level assignment and search keys
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Structure {
    Avl,
    SkipList,
}

/// Structures a workload runs against; `both` runs the skip list, then the
/// AVL tree, on the same search keys.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Avl,
    SkipList,
    Both,
}

impl IndexArgs {
    fn skip_list_config(&self) -> Result<SkipListConfig> {
        let config = SkipListConfig::new(
            self.max_level.unwrap_or(DEFAULT_MAX_LEVEL),
            self.probability.unwrap_or(DEFAULT_PROBABILITY),
        )?;
        Ok(match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        })
    }

    fn workload(&self) -> WorkloadConfig {
        WorkloadConfig {
            total_keys: self.keys,
            seed: self.seed,
            ..WorkloadConfig::default()
        }
    }
}

fn main() {
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        error!("{}", e);
        exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    info!("ordex {}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Sequential {
            structure,
            index,
            queries,
        } => {
            let config = WorkloadConfig {
                search_queries: queries,
                ..index.workload()
            };
            info!("structure: {:?}", structure);
            match structure {
                Target::Avl => sequential(AvlTree::new(), &config),
                Target::SkipList => {
                    sequential(SkipList::with_config(index.skip_list_config()?), &config)
                }
                Target::Both => {
                    let mut skip_list = SkipList::<i64>::with_config(index.skip_list_config()?);
                    let comparison =
                        compare_sequential(&mut skip_list, &mut AvlTree::new(), &config);
                    println!("{}", comparison);
                    Ok(())
                }
            }
        }
        Command::Concurrent {
            structure,
            index,
            workers,
            searches_per_insert,
        } => {
            let config = WorkloadConfig {
                workers,
                searches_per_insert,
                ..index.workload()
            };
            info!("structure: {:?}", structure);
            match structure {
                Target::Avl => concurrent(ConcurrentAvlTree::new(), &config),
                Target::SkipList => concurrent(
                    ConcurrentSkipList::with_config(index.skip_list_config()?),
                    &config,
                ),
                Target::Both => {
                    let skip_list = Arc::new(ConcurrentSkipList::<i64>::with_config(
                        index.skip_list_config()?,
                    ));
                    let avl_tree = Arc::new(ConcurrentAvlTree::<i64>::new());
                    let comparison = compare_concurrent(
                        Arc::clone(&skip_list),
                        Arc::clone(&avl_tree),
                        &config,
                    )?;
                    println!("{}", comparison);

                    skip_list.validate()?;
                    avl_tree.validate()?;
                    Ok(())
                }
            }
        }
        Command::Interactive { structure, index } => match structure {
            Structure::Avl => interactive(AvlTree::new(), index.keys),
            Structure::SkipList => {
                interactive(SkipList::with_config(index.skip_list_config()?), index.keys)
            }
        },
        Command::Explain { key } => {
            let explainer = Explainer::new()?;
            let stdout = io::stdout();
            let mut out = stdout.lock();
            match key {
                Some(key) => {
                    explainer.explain(key, &mut out)?;
                }
                None => explainer.run(io::stdin().lock(), &mut out)?,
            }
            out.flush()?;
            Ok(())
        }
    }
}

fn sequential<I: OrderedIndex<i64>>(mut index: I, config: &WorkloadConfig) -> Result<()> {
    let report = run_sequential(&mut index, config);
    println!("{}", report);
    Ok(())
}

fn concurrent<I>(index: I, config: &WorkloadConfig) -> Result<()>
where
    I: ConcurrentIndex<i64> + 'static,
{
    let index = Arc::new(index);
    let report = run_concurrent(Arc::clone(&index), config)?;
    println!("{}", report);

    index.validate()?;
    info!("final structure holds {} keys and passed validation", index.len());
    Ok(())
}

fn interactive<I: OrderedIndex<i64>>(mut index: I, keys: usize) -> Result<()> {
    let max = keys as i64;
    let elapsed = fill(&mut index, 1..=max);
    println!("inserted {} keys in {:.4}s", keys, elapsed.as_secs_f64());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let summary = run_session(&index, max, io::stdin().lock(), &mut out)?;
    info!(
        "session done: {} queries, {} found, {} rejected",
        summary.queries, summary.hits, summary.rejected
    );
    Ok(())
}
