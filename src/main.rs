use quadsim::{ScenarioConfig, Scenario, Simulation, Control};
use quadsim::bench_solver;

use clap::Parser;
use anyhow::{Context, Result};
use log::info;

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

/// Ticks a headless run takes when the scenario sets no limit
const HEADLESS_TICKS: u64 = 1000;

#[derive(Parser, Debug)]
struct Args {
    /// Scenario file, looked up as given and then under `scenarios/`
    #[arg(short, long, default_value = "default.yaml")]
    file_name: String,

    /// Run without a window, logging progress instead
    #[arg(long)]
    headless: bool,

    /// Draw quadtree node rectangles and centroids
    #[arg(long)]
    #[cfg_attr(not(feature = "viewer"), allow(dead_code))]
    overlay: bool,

    /// Time the quadtree solver against direct summation and exit
    #[arg(long)]
    bench: bool,
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let direct = PathBuf::from(file_name);
    let config_path = if direct.is_file() {
        direct
    } else {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name)
    };

    let file = File::open(&config_path).with_context(|| format!("opening {}", config_path.display()))?;
    let reader = BufReader::new(file);
    let scenario_cfg: ScenarioConfig = serde_yaml::from_reader(reader)
        .with_context(|| format!("parsing {}", config_path.display()))?;

    Ok(scenario_cfg)
}

fn run_headless(mut sim: Simulation) -> Result<()> {
    if sim.engine.max_ticks.is_none() {
        sim.engine.max_ticks = Some(HEADLESS_TICKS);
    }

    let ticks = sim.run(|snap| {
        if snap.tick % 100 == 0 {
            info!("tick {}: {} nodes, {} escaped", snap.tick, snap.nodes.len(), snap.escaped);
        }
        Control::Continue
    })?;

    println!("completed {} ticks, momentum {:?}", ticks, sim.store.momentum());
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.bench {
        bench_solver()?;
        return Ok(());
    }

    let scenario_cfg = load_scenario_from_yaml(&args.file_name)?;
    let scenario = Scenario::build_scenario(scenario_cfg)?;
    let sim = Simulation::new(scenario);

    if args.headless {
        return run_headless(sim);
    }

    #[cfg(feature = "viewer")]
    {
        quadsim::run_2d(sim, args.overlay);
        Ok(())
    }

    #[cfg(not(feature = "viewer"))]
    {
        log::warn!("built without the viewer feature, running headless");
        run_headless(sim)
    }
}
