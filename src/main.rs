use clap::{Parser, Subcommand};
use mtrun::dispatch::config::parse_workers;
use mtrun::{CheckSummary, Checks, DispatchConfig, Mode, Suite, SuiteReport};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::hint::black_box;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

// --- Command Line Arguments ---

#[derive(Parser)]
#[command(name = "mtrun")]
#[command(about = "mtrun - parallel test-case dispatcher")]
#[command(version)]
#[command(subcommand_required = true)]
#[command(arg_required_else_help = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the number of logical processors used as the default worker count
    Cpus,
    /// Dispatch a synthetic suite of CPU-bound test cases
    Run {
        /// Number of queued test cases
        #[arg(long, default_value = "64")]
        count: usize,
        /// Number of exclusive test cases run after the queued batch
        #[arg(long, default_value = "0")]
        exclusive: usize,
        /// Work iterations per test case
        #[arg(long, default_value = "100000")]
        work: u64,
        /// Vary the work per test case between half and one and a half times `--work`
        #[arg(long)]
        jitter: bool,
        /// Random seed for `--jitter`
        #[arg(long, default_value = "0")]
        seed: u64,
        /// Every K-th test case records a failed check
        #[arg(long)]
        fail_every: Option<usize>,
        /// Execution mode: sequential (single, serial) or parallel (mt)
        #[arg(long)]
        mode: Option<Mode>,
        /// Run every test case on the main thread, in order (same as `--mode single`)
        #[arg(long)]
        single: bool,
        /// Number of worker threads (defaults to the logical CPU count)
        #[arg(long, short = 'j', value_parser = parse_workers)]
        workers: Option<usize>,
        /// Enable verbose output
        #[arg(long, short)]
        verbose: bool,
    },
}

/// Options for the synthetic workload
struct WorkloadOptions {
    count: usize,
    exclusive: usize,
    work: u64,
    jitter: bool,
    seed: u64,
    fail_every: Option<usize>,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Spin on integer mixing so the test case has real CPU work to do.
fn spin(iterations: u64) -> u64 {
    let mut acc = 0x9e37_79b9_7f4a_7c15u64;
    for i in 0..iterations {
        acc = black_box(acc.rotate_left(5) ^ i).wrapping_mul(0x100_0000_01b3);
    }
    acc
}

/// Work for one test case: `work`, or with jitter a value in `[work/2, 1.5*work]`
/// capped at `u64::MAX`.
fn work_iterations(rng: &mut ChaCha8Rng, work: u64, jitter: bool) -> u64 {
    if jitter && work > 1 {
        rng.random_range(work / 2..=work.saturating_add(work / 2))
    } else {
        work
    }
}

fn build_suite(options: &WorkloadOptions, checks: &Arc<Checks>) -> Suite {
    let mut rng = ChaCha8Rng::seed_from_u64(options.seed);
    let mut suite = Suite::new();

    let work_for = |rng: &mut ChaCha8Rng| work_iterations(rng, options.work, options.jitter);

    for index in 0..options.count {
        let iterations = work_for(&mut rng);
        let should_fail = options
            .fail_every
            .is_some_and(|k| k > 0 && index % k == k - 1);
        let checks = Arc::clone(checks);

        suite.queue(format!("spin_{index}"), move || {
            black_box(spin(iterations));
            checks.ok(!should_fail, format!("spin_{index} configured to fail"));
        });
    }

    for index in 0..options.exclusive {
        let iterations = work_for(&mut rng);
        let checks = Arc::clone(checks);

        suite.exclusive(format!("exclusive_spin_{index}"), move || {
            black_box(spin(iterations));
            checks.ok(true, format!("exclusive_spin_{index} completed"));
        });
    }

    suite
}

fn run_workload(
    options: &WorkloadOptions,
    config: &DispatchConfig,
) -> Result<(SuiteReport, CheckSummary), Box<dyn std::error::Error>> {
    let checks = Arc::new(Checks::new());
    let suite = build_suite(options, &checks);

    println!("Dispatching {} queued test cases", suite.queued().len());
    println!("  Mode: {}", config.mode);
    if config.mode == Mode::Parallel {
        println!("  Requested workers: {}", config.requested_workers());
    }
    if options.exclusive > 0 {
        println!("  Exclusive test cases: {}", options.exclusive);
    }

    let report = suite.run(config)?;
    Ok((report, checks.summary()))
}

fn print_check_summary(summary: &CheckSummary) {
    println!("\nCheck Summary:");
    println!("  Passed: {}", summary.passed);
    println!("  Failed: {}", summary.failed);
    println!("  Skipped: {}", summary.skipped);
    println!("  Todo: {}", summary.todo);
}

// --- Main Function ---
fn main() {
    let args = Args::parse();

    match args.command {
        Commands::Cpus => {
            println!("{}", num_cpus::get());
        }
        Commands::Run {
            count,
            exclusive,
            work,
            jitter,
            seed,
            fail_every,
            mode,
            single,
            workers,
            verbose,
        } => {
            init_logging(verbose);

            let mut config = match DispatchConfig::from_env() {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Error reading environment: {}", e);
                    std::process::exit(1);
                }
            };
            if let Some(mode) = mode {
                config = config.with_mode(mode);
            }
            if single {
                config = config.with_mode(Mode::Sequential);
            }
            if let Some(workers) = workers {
                config = config.with_workers(workers);
            }

            let options = WorkloadOptions {
                count,
                exclusive,
                work,
                jitter,
                seed,
                fail_every,
            };

            match run_workload(&options, &config) {
                Ok((report, checks)) => {
                    println!();
                    print!("{}", report);
                    print_check_summary(&checks);

                    if report.is_success() && checks.is_success() {
                        println!("\nAll tests passed.");
                    } else {
                        eprintln!("\nSome tests failed.");
                        std::process::exit(1);
                    }
                }
                Err(e) => {
                    eprintln!("Error during dispatch: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}
