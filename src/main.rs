//! `cpu-sched`: run a workload through the simulated multi-core scheduler.
//!
//! ```text
//! cpu-sched [--config FILE] [--workload FILE]
//! ```
//!
//! `SCHED_SIM_CONFIG` and `SCHED_SIM_WORKLOAD` (also read from `.env`) supply
//! the same paths; flags win. Without a workload file a built-in demo set runs.
//! Without a configured policy the menu is shown on stdin.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context};
use tracing::info;

use prometheus_cpu_scheduler::builders::{build_orchestrator, build_scheduler};
use prometheus_cpu_scheduler::config::SimulatorConfig;
use prometheus_cpu_scheduler::core::{AppResult, SchedulingPolicy};
use prometheus_cpu_scheduler::infra::{demo_workload, load_workload, PidAllocator};
use prometheus_cpu_scheduler::runtime::{read_policy_selection, RunSummary, MENU};
use prometheus_cpu_scheduler::util::init_tracing;

const CONFIG_ENV: &str = "SCHED_SIM_CONFIG";
const WORKLOAD_ENV: &str = "SCHED_SIM_WORKLOAD";

#[derive(Debug, Default)]
struct CliArgs {
    config: Option<PathBuf>,
    workload: Option<PathBuf>,
}

impl CliArgs {
    fn parse(args: impl IntoIterator<Item = String>) -> AppResult<Self> {
        let mut parsed = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    parsed.config = Some(args.next().context("--config needs a path")?.into());
                }
                "--workload" | "-w" => {
                    parsed.workload = Some(args.next().context("--workload needs a path")?.into());
                }
                other => bail!("unknown argument: {other}"),
            }
        }
        Ok(parsed)
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var_os(key).filter(|v| !v.is_empty()).map(PathBuf::from)
}

fn prompt_policy() -> AppResult<SchedulingPolicy> {
    let mut stdout = io::stdout();
    write!(stdout, "{MENU}")?;
    stdout.flush()?;
    let policy = read_policy_selection(io::stdin().lock())?;
    writeln!(stdout, "\n\t ---------------------------------------------------\n")?;
    Ok(policy)
}

fn main() -> AppResult<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = CliArgs::parse(std::env::args().skip(1))?;

    let cfg = match args.config.or_else(|| env_path(CONFIG_ENV)) {
        Some(path) => SimulatorConfig::from_file(&path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SimulatorConfig::default(),
    };

    let workload = match args.workload.or_else(|| env_path(WORKLOAD_ENV)) {
        Some(path) => load_workload(&path)
            .with_context(|| format!("loading workload {}", path.display()))?,
        None => demo_workload(),
    };

    let policy = match cfg.policy {
        Some(policy) => policy,
        None => prompt_policy()?,
    };

    let scheduler = build_scheduler(&cfg)?;
    let pids = PidAllocator::default();
    let ids = workload.admit_into(&scheduler, &pids)?;
    info!(processes = ids.len(), policy = %policy, "workload admitted");

    let orchestrator = build_orchestrator(&cfg, scheduler, Some(policy))?;
    let report = orchestrator.run()?;
    let summary = RunSummary::from(&report);

    let mut stdout = io::stdout();
    writeln!(
        stdout,
        "Completed: {}  Blocked: {}  Slices: {}  CPU time: {}",
        summary.completed, summary.blocked, summary.slices, summary.cpu_time
    )?;
    writeln!(stdout, "Elapsed: {} ns", summary.elapsed_ns)?;

    if !summary.failed_cores.is_empty() {
        bail!("dispatchers stopped on error: {:?}", summary.failed_cores);
    }
    Ok(())
}
