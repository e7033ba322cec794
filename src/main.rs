use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pinn_well::{exact_eigenvalue, read_run_config, run, RunConfig};

#[derive(Parser, Debug)]
#[command(version, about = "Train a PINN on the 2D infinite square well", long_about = None)]
struct Args {
    /// YAML run configuration; the reference experiment is used when absent
    #[arg(short, long)]
    config: Option<String>,

    /// Override the total number of training iterations
    #[arg(short, long)]
    iterations: Option<usize>,

    /// Seed both weight initialisation and collocation jitter
    #[arg(short, long)]
    seed: Option<u64>,

    /// Write the training history to this YAML file
    #[arg(long)]
    history: Option<String>,

    /// Log every training interval, not just stage summaries
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let mut config = match &args.config {
        Some(path) => read_run_config(path).with_context(|| format!("loading {}", path))?,
        None => RunConfig::default(),
    };
    if let Some(n) = args.iterations {
        config.training.total_iterations = n;
    }
    if let Some(seed) = args.seed {
        config.model.seed = Some(seed);
        config.sampler.seed = Some(seed.wrapping_add(1));
    }

    let (model, report) = run(&config).context("training failed")?;

    let width = config.domain.width();
    println!("PINN Training Results for the 2D Infinite Square Well");
    println!("-----------------------------------------------------");
    println!("Collocation points: {}", config.grid.resolution.pow(2));
    println!("Network parameters: {}", model.network().num_params());
    println!("Iterations: {}", model.history().len());
    println!("Final loss: {:.6e}", report.final_loss);
    println!("Stages converged: {} of {}", report.candidates.len(), report.stages.len());
    match report.best {
        Some(best) => {
            let exact = exact_eigenvalue(1, 1, width);
            println!("Best eigenvalue: {:.4} (stage {}, loss {:.3e})", best.eigenvalue, best.stage, best.loss);
            println!("Exact ground state: {:.4} (error {:.4})", exact, best.eigenvalue - exact);
        }
        None => println!("No stage reached loss <= {:.3e}", config.training.max_required_loss),
    }

    if let Some(path) = &args.history {
        model
            .history()
            .write_yaml(path)
            .with_context(|| format!("writing history to {}", path))?;
        println!("History written to {}", path);
    }
    Ok(())
}
