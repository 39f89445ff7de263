//! Evolution command - evolve a population of memory strategies
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_evolution_config(), load_initial_population(), run_replicates(), save_results()
//! - Level 3: run_replicate(), final_table(), save_history(), save_final()
//! - Level 4: file I/O, formatting utilities

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Serialize;

use ipd_core::{builtin, load_definitions, Strategy, StrategyId};
use ipd_evolve::{EvolutionConfig, GenerationStats, Population};

use crate::players::parse_population_entry;

/// Population used when none is given on the command line
const DEFAULT_POPULATION: [(&str, usize); 4] = [
    ("tit-for-tat", 500),
    ("majority", 500),
    ("always-cooperate", 500),
    ("always-defect", 500),
];

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct EvolveArgs {
    /// Initial population entry, a builtin name or strategy ID with a count
    #[arg(long = "strategy", value_name = "NAME=COUNT")]
    pub strategies: Vec<String>,

    /// JSON file of strategy definitions to add to the initial population
    #[arg(long, value_name = "FILE")]
    pub definitions: Option<PathBuf>,

    /// Number of generations to run
    #[arg(long, default_value = "1000")]
    pub generations: usize,

    /// Rounds per competition
    #[arg(long, default_value = "64")]
    pub rounds: usize,

    /// Chance that each offspring mutates (0.0-1.0)
    #[arg(long, default_value = "0.01")]
    pub mutation_rate: f64,

    /// Fitness penalty per memory bit per competition
    #[arg(long, default_value = "0.0")]
    pub memory_cost: f64,

    /// Round at which both players are forced to defect
    #[arg(long)]
    pub hard_defect_round: Option<usize>,

    /// Independent replicates, seeded consecutively
    #[arg(long, default_value = "1")]
    pub replicates: usize,

    /// Log progress every N generations
    #[arg(long, default_value = "100")]
    pub print_step: usize,

    /// Output directory for results
    #[arg(long, default_value = "evolution_output")]
    pub output: PathBuf,

    /// Output run summary as JSON
    #[arg(long)]
    pub json: bool,
}

/// Outcome of one replicate
#[derive(Clone, Debug)]
struct ReplicateResult {
    replicate: usize,
    seed: u64,
    history: Vec<GenerationStats>,
    survivors: Vec<Survivor>,
    known_strategies: usize,
    cache_entries: usize,
    cache_hits: u64,
    cache_misses: u64,
}

impl ReplicateResult {
    fn dominant(&self) -> Option<&Survivor> {
        self.survivors
            .iter()
            .max_by(|a, b| a.count.cmp(&b.count).then(b.id.cmp(&a.id)))
    }
}

/// A strategy alive at the end of a replicate
#[derive(Clone, Debug, Serialize)]
struct Survivor {
    id: StrategyId,
    name: String,
    count: usize,
    fitness: f64,
    memory_size: usize,
    start_state: String,
    decision_list: String,
}

#[derive(Serialize)]
struct SeedEntry {
    id: StrategyId,
    name: String,
    count: usize,
}

#[derive(Serialize)]
struct ReplicateSummary {
    replicate: usize,
    seed: u64,
    dominant: Option<Survivor>,
    distinct_strategies: usize,
    known_strategies: usize,
    cache_entries: usize,
    cache_hits: u64,
    cache_misses: u64,
}

#[derive(Serialize)]
struct RunManifest<'a> {
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    base_seed: u64,
    config: &'a EvolutionConfig,
    initial_population: Vec<SeedEntry>,
    replicates: Vec<ReplicateSummary>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run evolution command
///
/// 1. Build and validate the configuration
/// 2. Assemble the initial population
/// 3. Run every replicate
/// 4. Save results
pub fn run(args: EvolveArgs, seed: Option<u64>) -> Result<()> {
    let config = build_evolution_config(&args)?;
    let population = load_initial_population(&args)?;
    let base_seed = seed.unwrap_or_else(rand::random);
    let started_at = Utc::now();

    tracing::info!(
        "Starting evolution: pop={}, gen={}, rounds={}, replicates={}, seed={}",
        population.iter().map(|(_, count)| count).sum::<usize>(),
        config.max_generations,
        config.num_rounds,
        config.max_replicates,
        base_seed
    );

    let results = run_replicates(&population, &config, base_seed)?;

    let manifest = RunManifest {
        started_at,
        finished_at: Utc::now(),
        base_seed,
        config: &config,
        initial_population: population
            .iter()
            .map(|(strategy, count)| SeedEntry {
                id: strategy.id(),
                name: strategy.name().to_string(),
                count: *count,
            })
            .collect(),
        replicates: results.iter().map(summarize_replicate).collect(),
    };

    save_results(&results, &manifest, &args.output)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&manifest)?);
    } else {
        print_summary(&results, &args.output);
    }

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Build evolution configuration from command arguments
fn build_evolution_config(args: &EvolveArgs) -> Result<EvolutionConfig> {
    let config = EvolutionConfig {
        num_rounds: args.rounds,
        max_generations: args.generations,
        mut_prob: args.mutation_rate,
        memory_cost: args.memory_cost,
        hard_defect_round: args.hard_defect_round,
        max_replicates: args.replicates,
        print_step: args.print_step,
    };
    config.validate().context("Invalid evolution settings")?;
    Ok(config)
}

/// Initial population from `--strategy` entries and definitions, or the
/// default mix when neither is given
fn load_initial_population(args: &EvolveArgs) -> Result<Vec<(Strategy, usize)>> {
    let mut population = Vec::new();

    for entry in &args.strategies {
        population.push(parse_population_entry(entry)?);
    }

    if let Some(path) = &args.definitions {
        let defs = load_definitions(path)
            .with_context(|| format!("Failed to load definitions from {}", path.display()))?;
        for def in defs {
            population.push((def.to_strategy()?, def.count));
        }
    }

    if population.is_empty() {
        for (name, count) in DEFAULT_POPULATION {
            population.push((builtin(name)?, count));
        }
    }

    if population.iter().all(|(_, count)| *count == 0) {
        anyhow::bail!("Initial population is empty");
    }

    for (strategy, count) in &population {
        tracing::debug!("Seed: {} x{}", strategy, count);
    }

    Ok(population)
}

/// Run all replicates in parallel
fn run_replicates(
    population: &[(Strategy, usize)],
    config: &EvolutionConfig,
    base_seed: u64,
) -> Result<Vec<ReplicateResult>> {
    let total = (config.max_generations * config.max_replicates) as u64;
    let progress = ProgressBar::new(total);
    progress.set_style(
        ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} generations ({eta})")?,
    );

    let results: Vec<ReplicateResult> = (0..config.max_replicates)
        .into_par_iter()
        .map(|replicate| {
            let seed = base_seed.wrapping_add(replicate as u64);
            run_replicate(replicate, seed, population, config, &progress)
        })
        .collect();

    progress.finish_and_clear();
    Ok(results)
}

/// Write per-replicate CSVs and the run manifest
fn save_results(results: &[ReplicateResult], manifest: &RunManifest, output: &Path) -> Result<()> {
    std::fs::create_dir_all(output).context("Failed to create output directory")?;

    for result in results {
        save_history(result, output)?;
        save_final(result, output)?;
    }

    let path = output.join("run.json");
    let json = serde_json::to_string_pretty(manifest)?;
    std::fs::write(&path, json).context("Failed to write run manifest")?;
    tracing::info!("Saved run manifest to {}", path.display());

    Ok(())
}

/// Print summary to console
fn print_summary(results: &[ReplicateResult], output: &Path) {
    println!("\n=== Evolution Complete ===");
    for result in results {
        match result.dominant() {
            Some(dominant) => println!(
                "Replicate {} (seed {}): dominant #{} {} [{}|{}] x{} of {} strategies",
                result.replicate,
                result.seed,
                dominant.id,
                dominant.name,
                dominant.start_state,
                dominant.decision_list,
                dominant.count,
                result.survivors.len()
            ),
            None => println!("Replicate {}: population died out", result.replicate),
        }
    }
    println!("Output directory: {}", output.display());
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn run_replicate(
    replicate: usize,
    seed: u64,
    seeds: &[(Strategy, usize)],
    config: &EvolutionConfig,
    progress: &ProgressBar,
) -> ReplicateResult {
    let span = tracing::info_span!("replicate", replicate, seed);
    let _guard = span.enter();

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut population = Population::new(config.clone());
    for (strategy, count) in seeds {
        population.add_org(strategy.clone(), *count);
    }

    for _ in 0..config.max_generations {
        population.step(&mut rng);
        progress.inc(1);
    }

    let survivors = final_table(&mut population);
    let cache = population.source();
    tracing::debug!(
        entries = cache.len(),
        hits = cache.hits(),
        misses = cache.misses(),
        "competition cache"
    );

    ReplicateResult {
        replicate,
        seed,
        history: population.history().to_vec(),
        survivors,
        known_strategies: population.known_strategies(),
        cache_entries: cache.len(),
        cache_hits: cache.hits(),
        cache_misses: cache.misses(),
    }
}

/// Present strategies with their fitness in the final population
fn final_table(population: &mut Population) -> Vec<Survivor> {
    let table = population.fitness_table();
    table
        .into_iter()
        .filter_map(|entry| {
            let strategy = population.strategy(entry.id)?;
            Some(Survivor {
                id: entry.id,
                name: strategy.name().to_string(),
                count: entry.count,
                fitness: entry.fitness,
                memory_size: entry.memory_size,
                start_state: strategy.start_state().to_string(),
                decision_list: strategy.decision_list().to_string(),
            })
        })
        .collect()
}

fn summarize_replicate(result: &ReplicateResult) -> ReplicateSummary {
    ReplicateSummary {
        replicate: result.replicate,
        seed: result.seed,
        dominant: result.dominant().cloned(),
        distinct_strategies: result.survivors.len(),
        known_strategies: result.known_strategies,
        cache_entries: result.cache_entries,
        cache_hits: result.cache_hits,
        cache_misses: result.cache_misses,
    }
}

/// Save generation history to CSV
fn save_history(result: &ReplicateResult, output: &Path) -> Result<()> {
    let path = output.join(format!("rep-{}-history.csv", result.replicate));
    std::fs::write(&path, history_csv(&result.history)).context("Failed to write generation history")?;
    tracing::info!("Saved generation history to {}", path.display());
    Ok(())
}

/// Save final population to CSV
fn save_final(result: &ReplicateResult, output: &Path) -> Result<()> {
    let path = output.join(format!("rep-{}-final.csv", result.replicate));
    std::fs::write(&path, final_csv(&result.survivors)).context("Failed to write final population")?;
    tracing::info!("Saved final population to {}", path.display());
    Ok(())
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn history_csv(history: &[GenerationStats]) -> String {
    let mut content = String::from(
        "generation,population_size,distinct_strategies,best_id,best_fitness,mean_fitness,\
         most_common_id,most_common_count,min_memory,max_memory,mean_memory\n",
    );

    for stats in history {
        content.push_str(&format!(
            "{},{},{},{},{:.4},{:.4},{},{},{},{},{:.4}\n",
            stats.generation,
            stats.population_size,
            stats.distinct_strategies,
            stats.best_id,
            stats.best_fitness,
            stats.mean_fitness,
            stats.most_common_id,
            stats.most_common_count,
            stats.min_memory,
            stats.max_memory,
            stats.mean_memory
        ));
    }

    content
}

fn final_csv(survivors: &[Survivor]) -> String {
    let mut content = String::from("id,name,count,fitness,memory_size,start_state,decision_list\n");

    for s in survivors {
        content.push_str(&format!(
            "{},\"{}\",{},{:.4},{},{},{}\n",
            s.id,
            s.name.replace('"', "\"\""),
            s.count,
            s.fitness,
            s.memory_size,
            s.start_state,
            s.decision_list
        ));
    }

    content
}

// ============================================================================
// TESTS
// ============================================================================
