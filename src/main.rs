use beer_game_rlom::io::reporting;
use beer_game_rlom::simulation::config::ExperimentConfig;
use beer_game_rlom::simulation::engine::SupplyChainEnv;
use beer_game_rlom::simulation::evaluation::{evaluate_strategy, EvaluationResult};
use beer_game_rlom::strategy::implementations::{
    FixedAdjustmentPolicy, GreedyTablePolicy, OneForOnePolicy,
};
use beer_game_rlom::strategy::q_learning::QLearningAgent;
use beer_game_rlom::Result;
use log::{error, info, warn};
use std::env;
use std::path::Path;

const DEFAULT_CONFIG_PATH: &str = "beer_game.toml";

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        error!("{e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn load_config() -> Result<ExperimentConfig> {
    match env::args().nth(1) {
        Some(path) => {
            info!("Loading config from {path}");
            ExperimentConfig::load(path)
        }
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            info!("Loading config from {DEFAULT_CONFIG_PATH}");
            ExperimentConfig::load(DEFAULT_CONFIG_PATH)
        }
        None => {
            warn!("No config file given, using defaults");
            Ok(ExperimentConfig::default())
        }
    }
}

fn run() -> Result<()> {
    println!("=== Beer Game: RLOM vs. fixed ordering rules ===");

    // 1. SETUP CONFIGURATION
    let config = load_config()?;
    let sim_config = config.simulation_config()?;
    println!(
        "Horizon: {} periods, demand: {:?}",
        sim_config.time_horizon,
        &sim_config.customer_demand[..sim_config.time_horizon]
    );

    // 2. TRAIN THE LEARNER
    // Every strategy gets its own environment instance.
    let mut agent = QLearningAgent::new(&config.learner)?;
    let mut training_env = SupplyChainEnv::new(sim_config.clone())?;
    println!("Training RLOM for {} episodes...", config.training.episodes);
    let rewards = agent.train(&mut training_env, &config.training)?;
    if let Some(last) = rewards.last() {
        info!("Last training episode cost: {}", -last);
    }
    let policy = agent.get_optimal_policy();
    println!("Learned actions for {} coded states.", policy.len());

    // 3. EVALUATE STRATEGIES
    let mut results: Vec<EvaluationResult> = Vec::new();
    let mut rlom = GreedyTablePolicy::new(QLearningAgent::NAME, policy.clone());
    results.push(evaluate_strategy(&mut SupplyChainEnv::new(sim_config.clone())?, &mut rlom));
    results.push(evaluate_strategy(
        &mut SupplyChainEnv::new(sim_config.clone())?,
        &mut FixedAdjustmentPolicy::ga_based(),
    ));
    results.push(evaluate_strategy(
        &mut SupplyChainEnv::new(sim_config)?,
        &mut OneForOnePolicy::new(),
    ));

    // 4. PRINT COST ANALYSIS
    println!("\n=== Cost Analysis ===");
    for result in &results {
        println!("[{}] Total Cost: {:.0}", result.strategy, result.total_cost);
    }
    if let Some(best) = results
        .iter()
        .min_by(|a, b| a.total_cost.total_cmp(&b.total_cost))
    {
        println!("Lowest cost: {}", best.strategy);
    }

    // 5. EXPORT RESULTS
    let mut written = reporting::write_report(&config.output_dir, &results, Some(&policy))?;
    written.push(reporting::write_q_values(&config.output_dir, agent.table())?);
    println!(
        "\nWrote {} files to ./{}",
        written.len(),
        config.output_dir.display()
    );

    println!("\nComparison Complete.");
    Ok(())
}
