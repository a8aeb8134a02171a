use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "strata", version)]
struct Cli {
    /// Log layout decisions to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Lay out a timeline and write the composition plan as JSON.
    Layout(LayoutArgs),
    /// Print the instruction and frame job active at a given time.
    Probe(ProbeArgs),
}

#[derive(Parser, Debug)]
struct LayoutArgs {
    /// Input timeline JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output plan JSON. Defaults to stdout.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Duration in seconds of the neutral filler source (unbounded when unset).
    #[arg(long)]
    blank_duration: Option<f64>,

    /// Only reserve the transition track pair when a transition occurs.
    #[arg(long)]
    no_reserve_transition_tracks: bool,
}

#[derive(Parser, Debug)]
struct ProbeArgs {
    /// Input timeline JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Timeline instant in seconds.
    #[arg(long)]
    at: f64,

    /// Extra transition effects: a JSON object of effect id to `{ "kind", "params" }`.
    #[arg(long)]
    effects: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(std::io::stderr)
            .init();
    }
    match cli.cmd {
        Command::Layout(args) => cmd_layout(args),
        Command::Probe(args) => cmd_probe(args),
    }
}

fn read_timeline(path: &Path) -> anyhow::Result<strata::Timeline> {
    strata::Timeline::from_path(path)
        .with_context(|| format!("load timeline '{}'", path.display()))
}

fn cmd_layout(args: LayoutArgs) -> anyhow::Result<()> {
    let timeline = read_timeline(&args.in_path)?;

    let blank_source_duration = args
        .blank_duration
        .map(strata::MediaTime::try_from_secs)
        .transpose()?;
    let opts = strata::LayoutOptions {
        blank_source_duration,
        reserve_transition_tracks: !args.no_reserve_transition_tracks,
    };
    let plan = strata::layout_with_opts(&timeline, &opts)?;

    for d in &plan.diagnostics {
        eprintln!("note: {}", serde_json::to_string(d)?);
    }

    let json = serde_json::to_string_pretty(&plan).context("serialize plan JSON")?;
    match &args.out {
        Some(out) => {
            if let Some(parent) = out.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create output dir '{}'", parent.display()))?;
            }
            std::fs::write(out, json)
                .with_context(|| format!("write plan '{}'", out.display()))?;
            eprintln!("wrote {} (fingerprint {})", out.display(), plan.fingerprint());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}")?;
        }
    }
    Ok(())
}

fn read_registry(path: Option<&Path>) -> anyhow::Result<strata::TransitionRegistry> {
    let mut registry = strata::TransitionRegistry::with_builtins();
    let Some(path) = path else {
        return Ok(registry);
    };
    let f = File::open(path).with_context(|| format!("open effects '{}'", path.display()))?;
    let specs: BTreeMap<String, strata::EffectSpec> =
        serde_json::from_reader(BufReader::new(f)).with_context(|| "parse effects JSON")?;
    for (id, spec) in &specs {
        registry
            .register_spec(id.as_str(), spec)
            .with_context(|| format!("register effect '{id}'"))?;
    }
    Ok(registry)
}

fn cmd_probe(args: ProbeArgs) -> anyhow::Result<()> {
    let timeline = read_timeline(&args.in_path)?;
    let registry = read_registry(args.effects.as_deref())?;
    let at = strata::MediaTime::try_from_secs(args.at)?;

    let plan = strata::layout(&timeline)?;
    let instruction = plan.instruction_at(at).cloned();
    let dispatcher = strata::Dispatcher::new(plan, registry, strata::DispatchOpts::default())?;
    let outcome = dispatcher.resolve(at)?;

    let report = serde_json::json!({
        "at": at,
        "instruction": instruction,
        "outcome": outcome,
    });
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", serde_json::to_string_pretty(&report)?)?;
    Ok(())
}
