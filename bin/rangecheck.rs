//! CLI front end: runs the fixpoint analyzer over a named demo program and
//! prints each reachable block's pre/post abstract state.
//!
//! There is no C parser in this crate (see lib.rs), so the programs this
//! binary analyzes come from `rangecheck::demos`, built directly through
//! `ast::build` the way a lowering pass would hand over an already-validated
//! function.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::info;

use rangecheck::ast::{BbId, Function};
use rangecheck::domain::intervals::IntervalDomain;
use rangecheck::domain::octagon::OctagonDomain;
use rangecheck::domain::NumericDomain;
use rangecheck::env::VarRegistry;
use rangecheck::{analyze_function, demos, AnalysisResult, AnalyzerConfig, DomainKind};

#[derive(Parser)]
#[command(version, about = "Static value-range analysis of C programs by abstract interpretation")]
struct Args {
    /// Name of an embedded demo program to analyze. Pass `list` to print
    /// the available names and exit.
    scenario: String,

    /// Numerical domain backend. Overrides the value loaded from `--config`.
    #[arg(long, value_enum)]
    domain: Option<DomainKind>,

    /// Back-edge visits between widenings. Overrides `--config`.
    #[arg(long)]
    unrolling_delay: Option<u32>,

    /// TOML file to load an `AnalyzerConfig` from; CLI flags above take
    /// precedence over its contents.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the report here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn load_config(args: &Args) -> Result<AnalyzerConfig, String> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(|e| format!("reading {}: {e}", path.display()))?;
            toml::from_str(&text).map_err(|e| format!("parsing {}: {e}", path.display()))?
        }
        None => AnalyzerConfig::default(),
    };
    if let Some(domain) = args.domain {
        config.domain = domain;
    }
    if let Some(delay) = args.unrolling_delay {
        config.unrolling_delay = delay;
    }
    Ok(config)
}

fn render<D: NumericDomain>(func: &Function, result: &AnalysisResult<D>, registry: &VarRegistry) -> String {
    use std::fmt::Write;
    let mut out = String::new();
    writeln!(out, "function {}", func.name).unwrap();
    let order: Vec<&BbId> = result.cfg.order.iter().collect();
    for b in order {
        let Some(post) = result.store.post(b) else {
            writeln!(out, "  {b}: unreachable").unwrap();
            continue;
        };
        let pre = result.store.pre(b).map(|p| p.print(registry.env())).unwrap_or_else(|| "-".to_string());
        writeln!(out, "  {b}:").unwrap();
        writeln!(out, "    pre:  {pre}").unwrap();
        writeln!(out, "    post: {}", post.print(registry.env())).unwrap();
    }
    if !result.diagnostics.is_empty() {
        writeln!(out, "diagnostics:").unwrap();
        write!(out, "{}", result.diagnostics).unwrap();
    }
    out
}

fn run(func: Function, config: &AnalyzerConfig) -> String {
    let mut registry = VarRegistry::new();
    for (name, c_type) in &func.params {
        registry
            .declare_from_type(name, c_type)
            .unwrap_or_else(|e| panic!("parameter `{name}`: {e}"));
    }
    match config.domain {
        DomainKind::Intervals => {
            let result: AnalysisResult<IntervalDomain> = analyze_function(&func, &mut registry, config.unrolling_delay);
            render(&func, &result, &registry)
        }
        DomainKind::Octagons | DomainKind::Polyhedra => {
            let result: AnalysisResult<OctagonDomain> = analyze_function(&func, &mut registry, config.unrolling_delay);
            render(&func, &result, &registry)
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive("rangecheck=info".parse().unwrap()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if args.scenario == "list" {
        for name in demos::NAMES {
            println!("{name}");
        }
        return ExitCode::SUCCESS;
    }

    let Some(func) = demos::by_name(&args.scenario) else {
        eprintln!("unknown scenario `{}`; pass `list` to see available names", args.scenario);
        return ExitCode::FAILURE;
    };

    let config = match load_config(&args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    info!(scenario = %args.scenario, domain = ?config.domain, "starting analysis");
    let report = run(func, &config);

    match &args.out {
        Some(path) => {
            if let Err(e) = fs::write(path, &report) {
                eprintln!("writing {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        }
        None => print!("{report}"),
    }

    ExitCode::SUCCESS
}
