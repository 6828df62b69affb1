use nbsim::{ScenarioConfig, Scenario, KernelKind};
use nbsim::{list_frames, FrameRenderer};
use nbsim::{bench_gravity, bench_leapfrog};
use nbsim::logger;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KernelArg {
    Direct,
    Parallel,
}

#[derive(Parser, Debug)]
#[command(about = "Direct-summation N-body integrator (kick-drift-kick leapfrog)")]
struct Args {
    /// Scenario file; looked up in the crate's `scenarios/` directory when not an existing path
    #[arg(short, default_value = "default.yaml")]
    file_name: String,

    /// Override the kernel chosen in the scenario file
    #[arg(long, value_enum)]
    kernel: Option<KernelArg>,

    /// Skip frame rendering even if the scenario has a `render` section
    #[arg(long)]
    no_render: bool,

    /// Run the kernel and step benchmarks instead of a scenario
    #[arg(long)]
    bench: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short, action = clap::ArgAction::Count)]
    verbose: u8,
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let given = PathBuf::from(file_name);
    let config_path = if given.exists() {
        given
    } else {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name)
    };

    let file = File::open(&config_path)
        .with_context(|| format!("failed to open scenario {}", config_path.display()))?;
    let reader = BufReader::new(file);
    let scenario_cfg = ScenarioConfig::from_reader(reader)
        .with_context(|| format!("failed to parse scenario {}", config_path.display()))?;

    log::debug!("loaded {}: {:?}", config_path.display(), scenario_cfg);
    Ok(scenario_cfg)
}

fn main() -> Result<()> {
    let args = Args::parse();
    logger::init(logger::level_from_verbosity(args.verbose));

    if args.bench {
        bench_gravity()?;
        bench_leapfrog()?;
        return Ok(());
    }

    let scenario_cfg = load_scenario_from_yaml(&args.file_name)?;
    let mut scenario = Scenario::build_scenario(scenario_cfg)?;
    if let Some(k) = args.kernel {
        scenario.engine.kernel = match k {
            KernelArg::Direct => KernelKind::Direct,
            KernelArg::Parallel => KernelKind::Parallel,
        };
    }

    log::info!(
        "{} bodies, {} steps of dt = {}, {:?} kernel",
        scenario.bodies.len(),
        scenario.parameters.n_steps(),
        scenario.parameters.dt,
        scenario.engine.kernel
    );

    let start = Instant::now();
    let mut integrator = scenario.integrator()?;

    match scenario.render.as_ref().filter(|_| !args.no_render) {
        Some(render_cfg) => {
            let mut renderer = FrameRenderer::new(render_cfg, integrator.n_steps())?;
            integrator.run_with(|snap| renderer.consume(snap))?;

            let frames = list_frames(renderer.dir())?;
            log::info!("wrote {} frames to {}", frames.len(), renderer.dir().display());

            if let Some((path, n)) = renderer.write_animation()? {
                log::info!("assembled {} frames into {}", n, path.display());
            }
        }
        None => integrator.run_with(|_| Ok(()))?,
    }

    if let Some(step) = integrator.non_finite_at() {
        log::warn!("state became non-finite at step {step}");
    }

    let stop = start.elapsed();
    log::info!("Total simulation time is {} mins", stop.as_secs_f64() / 60.0);

    Ok(())
}
