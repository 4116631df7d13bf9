use dotenv::dotenv;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use stackbot::{DefaultObserver, Game, RunConfig, RunStatus, Simulation, SimulationConfig, layout};

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stackbot=info,warn"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(true)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("setting default subscriber failed: {e}");
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_logging();

    let run = RunConfig::from_env();
    let config = SimulationConfig::from_env();
    tracing::info!("Layout seed: {}, simulation seed: {}", run.layout_seed, config.seed);
    tracing::info!("Formation: {:?}", config.formation);

    let mut rng = StdRng::seed_from_u64(run.layout_seed);
    let layout = layout::generate(&run, &mut rng)?;
    let simulation = Simulation::initialize(&layout, config)?;

    let mut game = Game::new(simulation, DefaultObserver::new(run.map_every), run.max_ticks);
    let summary = game.run()?;

    match summary.status {
        RunStatus::Completed => tracing::info!(
            "Completed in {} ticks with {} moves ({:.1}ms)",
            summary.ticks,
            summary.total_moves,
            summary.elapsed.as_secs_f64() * 1000.0
        ),
        RunStatus::TimedOut => tracing::warn!(
            "Stopped after {} ticks with {} items still loose",
            summary.ticks,
            game.simulation().warehouse().items_outside_piles()
        ),
    }

    Ok(())
}
