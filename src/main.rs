use clap::Parser;
use stratoflow::config::Config;
use stratoflow::hydro::initial::InitialCondition;
use stratoflow::output::{CborOutput, Snapshot};
use stratoflow::simulation::Simulation;

#[derive(Debug, Parser)]
#[clap(version, about = "Stratified compressible flow in a 2D atmosphere")]
struct Opts {
    /// Number of cells in the x-direction
    #[clap(long, default_value = "100")]
    nx: i64,

    /// Number of cells in the z-direction
    #[clap(long, default_value = "50")]
    nz: i64,

    /// Simulated seconds to run
    #[clap(long, default_value = "1000")]
    sim_time: f64,

    /// Seconds between outputs; negative disables output
    #[clap(long, default_value = "10", allow_hyphen_values = true)]
    output_freq: f64,

    /// Initial condition: collision, thermal, gravity_waves,
    /// density_current, injection (or 1, 2, 3, 5, 6)
    #[clap(short, long, default_value = "thermal")]
    data_spec: InitialCondition,

    /// Number of x-partitions exchanging halos
    #[clap(short, long, default_value = "1")]
    partitions: usize,

    /// Worker threads (0 for one per core)
    #[clap(short, long, default_value = "0")]
    threads: usize,

    /// Output file for the snapshot time series
    #[clap(short, long, default_value = "output.cbor")]
    output: String,

    /// Log per-step progress
    #[clap(short, long)]
    verbose: bool,
}

fn init_thread_pool(num_threads: usize) -> Result<(), rayon::ThreadPoolBuildError> {
    let core_ids = core_affinity::get_core_ids().unwrap_or_default();

    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .start_handler(move |n| {
            if let Some(core_id) = core_ids.get(n % core_ids.len().max(1)) {
                core_affinity::set_for_current(core_id.clone());
            }
        })
        .build_global()
}

fn run(opts: Opts) -> Result<(), Box<dyn std::error::Error>> {
    init_thread_pool(opts.threads)?;

    let config = Config {
        nx_glob: opts.nx,
        nz_glob: opts.nz,
        sim_time: opts.sim_time,
        output_freq: opts.output_freq,
        initial_condition: opts.data_spec,
        num_partitions: opts.partitions,
    };
    let mut simulation = Simulation::new(config)?;

    let report = if simulation.config().output_enabled() {
        let mut output = CborOutput::create(&opts.output)?;
        let report = simulation.run(&mut output)?;
        log::info!("{} snapshots written to {}", output.count(), output.path().display());
        report
    } else {
        simulation.run(&mut Vec::<Snapshot>::new())?
    };

    log::info!(
        "{} iterations to t = {} in {:.3}s",
        report.iterations,
        report.time,
        report.wall_seconds
    );
    Ok(())
}

fn main() {
    let opts = Opts::parse();
    let level = if opts.verbose {
        log::Level::Debug
    } else {
        log::Level::Info
    };

    if let Err(e) = simple_logger::init_with_level(level) {
        eprintln!("{}", e);
    }
    log::debug!("{:?}", opts);

    if let Err(e) = run(opts) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
