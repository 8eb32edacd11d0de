//! CLI entrypoint for the frankentest runner.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use frankentest_core::Engine;
use frankentest_core::structured_log::{LogEmitter, validate_log_file};
use frankentest_harness::{
    ColorChoice, ConsoleReporter, DemoSet, LedgerExport, PalletOverrides, audit_file, demo,
    parse_seed, resolve_pallet,
};

/// Unit-test runner with a hash-chained run ledger.
#[derive(Debug, Parser)]
#[command(name = "frankentest")]
#[command(about = "Run frankentest suites and audit their ledgers")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the built-in suites.
    Run(RunArgs),
    /// Re-verify an exported ledger JSON file.
    VerifyLedger {
        /// Ledger JSON written by `run --ledger-out`.
        #[arg(long)]
        input: PathBuf,
        /// Output path for the audit report (if omitted, prints to stdout).
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Validate a structured JSONL run log.
    ValidateLog {
        /// JSONL log written by `run --log`.
        #[arg(long)]
        log: PathBuf,
    },
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Pallet JSON; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Built-in suite set: `smoke`, `math` or `all`.
    #[arg(long, default_value = "smoke")]
    demo: String,
    /// Structured JSONL log path.
    #[arg(long)]
    log: Option<PathBuf>,
    /// Export every ledger chain to this JSON path after the run.
    #[arg(long)]
    ledger_out: Option<PathBuf>,
    /// `auto`, `always` or `never`.
    #[arg(long, default_value = "auto")]
    color: String,
    /// Print the run summary as JSON on stdout after the run.
    #[arg(long)]
    json: bool,

    /// Exact case name.
    #[arg(long)]
    name: Option<String>,
    /// Exact suite name.
    #[arg(long)]
    suite: Option<String>,
    /// Substring of the case tags.
    #[arg(long)]
    tag: Option<String>,
    /// Sort key: `name`, `result` or `time`.
    #[arg(long)]
    sort_by: Option<String>,
    /// `asc` or `desc`.
    #[arg(long)]
    sort_order: Option<String>,
    /// Shuffle cases within each suite.
    #[arg(long)]
    shuffle: bool,
    /// Shuffle seed (decimal or 0x...); implies --shuffle.
    #[arg(long)]
    seed: Option<String>,
    /// Ascending sort key applied after the shuffle.
    #[arg(long)]
    shuffle_by: Option<String>,
    /// Run only the case with this name.
    #[arg(long)]
    only: Option<String>,
    /// Mark the case with this name skipped.
    #[arg(long)]
    skip: Option<String>,
    /// Iterations per case (1..=100).
    #[arg(long)]
    repeat: Option<u32>,
    /// Abort the run on the first failing case.
    #[arg(long)]
    fail_fast: bool,
    /// fossil, catch, doctest, cpputest, tap, googletest or unity.
    #[arg(long)]
    theme: Option<String>,
    /// list, tree or graph.
    #[arg(long)]
    mode: Option<String>,
    /// plain, ci or doge.
    #[arg(long)]
    verbose: Option<String>,
    /// Only report cases with this outcome label.
    #[arg(long)]
    show_result: Option<String>,
    /// Timeout ceiling in seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// Ledger author.
    #[arg(long)]
    author: Option<String>,
    /// Ledger origin device id.
    #[arg(long)]
    origin: Option<String>,
    /// Fixed unix timestamp for deterministic ledgers.
    #[arg(long)]
    timestamp: Option<i64>,
    /// Run id used in log trace ids.
    #[arg(long)]
    run_id: Option<String>,
}

impl RunArgs {
    fn overrides(&self) -> Result<PalletOverrides, Box<dyn std::error::Error>> {
        let seed = self.seed.as_deref().map(parse_seed).transpose()?;
        Ok(PalletOverrides {
            filter_name: self.name.clone(),
            filter_suite: self.suite.clone(),
            filter_tag: self.tag.clone(),
            sort_by: self.sort_by.clone(),
            sort_order: self.sort_order.clone(),
            shuffle: self.shuffle,
            seed,
            shuffle_by: self.shuffle_by.clone(),
            only: self.only.clone(),
            skip: self.skip.clone(),
            repeat: self.repeat,
            fail_fast: self.fail_fast,
            theme: self.theme.clone(),
            mode: self.mode.clone(),
            verbose: self.verbose.clone(),
            show_result: self.show_result.clone(),
            timeout_secs: self.timeout_secs,
            author: self.author.clone(),
            origin: self.origin.clone(),
            timestamp: self.timestamp,
            run_id: self.run_id.clone(),
        })
    }
}

fn ensure_parent(path: &std::path::Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

fn run(args: &RunArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let pallet = resolve_pallet(args.config.as_deref(), &args.overrides()?)?;
    let color = ColorChoice::from_str_loose(&args.color);
    let reporter = if args.json {
        ConsoleReporter::to_writer(std::io::stderr(), false)
    } else {
        ConsoleReporter::stdout(color)
    };
    let mut engine = Engine::start(pallet, Box::new(reporter))?;
    if let Some(path) = &args.log {
        ensure_parent(path)?;
        let emitter = LogEmitter::to_file(path, engine.run_id())?;
        engine.set_log(emitter);
    }

    demo::register(&mut engine, DemoSet::from_str_loose(&args.demo))?;
    engine.run_all()?;

    if let Some(path) = &args.ledger_out {
        LedgerExport::from_engine(&engine).write_to(path)?;
        eprintln!("Wrote ledger to {}", path.display());
    }
    let summary = engine.end()?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(summary.exit_code())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => {
            let code = run(&args)?;
            if code != 0 {
                std::process::exit(code);
            }
        }
        Command::VerifyLedger { input, output } => {
            let report = audit_file(&input)?;
            let body = serde_json::to_string_pretty(&report)?;
            if let Some(path) = output {
                ensure_parent(&path)?;
                std::fs::write(&path, body)?;
            } else {
                println!("{body}");
            }
            if !report.ok {
                return Err(format!(
                    "Ledger audit failed: {} violation(s)",
                    report.violations.len()
                )
                .into());
            }
            eprintln!(
                "Ledger OK: {} chain(s), {} record(s)",
                report.chains_checked, report.records_checked
            );
        }
        Command::ValidateLog { log } => {
            let (lines, errors) = validate_log_file(&log)?;
            for err in &errors {
                eprintln!("{err}");
            }
            if !errors.is_empty() {
                return Err(format!(
                    "Log validation failed: {} error(s) in {lines} line(s)",
                    errors.len()
                )
                .into());
            }
            eprintln!("Log OK: {lines} line(s) in {}", log.display());
        }
    }

    Ok(())
}
