//! Command-line driver: `explicit-fea <config.json>`

use anyhow::Context;
use fea_dynamics::manager::SimulationManager;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let Some(config_path) = std::env::args().nth(1) else {
        eprintln!("Usage: explicit-fea <config.json>");
        std::process::exit(2);
    };

    let mut manager = SimulationManager::from_config_file(&config_path)
        .with_context(|| format!("failed to set up analysis from {}", config_path))?;

    let summary = manager
        .run()
        .with_context(|| format!("analysis of {} failed", config_path))?;

    println!("Analysis complete");
    println!("  Iterations:       {}", summary.iterations);
    println!("  Final time:       {:e} s", summary.final_time);
    println!("  Time step:        {:e} s", summary.time_step);
    println!(
        "  Max displacement: {:e} at node {}",
        summary.max_displacement, summary.max_disp_node
    );
    println!(
        "  Max nodal force:  {:e} at node {}",
        summary.max_force, summary.max_force_node
    );
    println!("  State dumps:      {}", summary.dumps_written);

    Ok(())
}
