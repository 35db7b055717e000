use adleman::{
    about,
    encoder::PathProblem,
    engine::{DnaEngine, Engine, ExperimentState, Operation, SolverParameters, Workflow},
    export::export_fasta,
    gel_render::{build_gel_layout, export_gel_svg},
    render::render_duplexes,
};
use adleman_protocol::{GelReport, PoolSummary};
use serde::Serialize;
use std::{env, fs};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_STATE_PATH: &str = ".adleman_state.json";

#[derive(Serialize)]
struct StateSummary<'a> {
    vertices: Vec<String>,
    start: Option<String>,
    end: Option<String>,
    pool: PoolSummary,
    parameters: &'a SolverParameters,
    gel: Option<&'a GelReport>,
}

struct GlobalArgs {
    state_path: String,
    config_path: Option<String>,
    cmd_idx: usize,
}

fn usage() {
    eprintln!(
        "Usage:\n  \
  adleman_cli --version\n  \
  adleman_cli [--state PATH] [--config PATH] capabilities\n  \
  adleman_cli [--state PATH] [--config PATH] op '<operation-json>'\n  \
  adleman_cli [--state PATH] [--config PATH] workflow '<workflow-json>'\n  \
  adleman_cli [--state PATH] [--config PATH] solve '<problem-json>'\n  \
  adleman_cli [--state PATH] state-summary\n  \
  adleman_cli [--state PATH] strands\n  \
  adleman_cli [--state PATH] gel SIZE [OUTPUT.svg]\n  \
  adleman_cli [--state PATH] export-fasta PATH\n\n  \
  Tip: pass @file.json instead of inline JSON; set RUST_LOG=debug for tracing"
    );
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn load_json_arg(value: &str) -> Result<String, String> {
    if let Some(path) = value.strip_prefix('@') {
        fs::read_to_string(path).map_err(|e| format!("Could not read JSON file '{path}': {e}"))
    } else {
        Ok(value.to_string())
    }
}

fn load_state(globals: &GlobalArgs) -> Result<ExperimentState, String> {
    let mut state = if std::path::Path::new(&globals.state_path).exists() {
        ExperimentState::load_from_path(&globals.state_path).map_err(|e| e.to_string())?
    } else {
        ExperimentState::default()
    };
    if let Some(config) = &globals.config_path {
        state.parameters = SolverParameters::load_from_path(config).map_err(|e| e.to_string())?;
    }
    Ok(state)
}

fn save_state(engine: &DnaEngine, globals: &GlobalArgs) -> Result<(), String> {
    engine
        .state()
        .save_to_path(&globals.state_path)
        .map_err(|e| e.to_string())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Could not serialize JSON output: {e}"))?;
    println!("{text}");
    Ok(())
}

fn parse_global_args(args: &[String]) -> Result<GlobalArgs, String> {
    let mut ret = GlobalArgs {
        state_path: DEFAULT_STATE_PATH.to_string(),
        config_path: None,
        cmd_idx: 1,
    };
    while ret.cmd_idx < args.len() {
        let flag = args[ret.cmd_idx].as_str();
        if flag != "--state" && flag != "--config" {
            break;
        }
        let value = args
            .get(ret.cmd_idx + 1)
            .ok_or_else(|| format!("Missing path for {flag}"))?
            .clone();
        if flag == "--state" {
            ret.state_path = value;
        } else {
            ret.config_path = Some(value);
        }
        ret.cmd_idx += 2;
    }
    Ok(ret)
}

fn summarize_state(state: &ExperimentState) -> StateSummary<'_> {
    StateSummary {
        vertices: state
            .problem
            .as_ref()
            .map(|p| p.vertices.clone())
            .unwrap_or_default(),
        start: state.problem.as_ref().map(|p| p.start.clone()),
        end: state.problem.as_ref().map(|p| p.end.clone()),
        pool: state.pool.summary(),
        parameters: &state.parameters,
        gel: state.gel.as_ref(),
    }
}

fn main() {
    init_logging();
    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = env::args().collect();
    if args.len() <= 1 {
        usage();
        return Err("Missing command".to_string());
    }
    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("{}", about::version_cli_text());
        return Ok(());
    }

    let globals = parse_global_args(&args)?;
    let cmd_idx = globals.cmd_idx;
    if args.len() <= cmd_idx {
        usage();
        return Err("Missing command".to_string());
    }

    let command = &args[cmd_idx];

    match command.as_str() {
        "capabilities" => print_json(&DnaEngine::capabilities()),
        "state-summary" => {
            let state = load_state(&globals)?;
            print_json(&summarize_state(&state))
        }
        "strands" => {
            let state = load_state(&globals)?;
            let pairs = state.pool.get_dna_strands();
            if pairs.is_empty() {
                println!("No duplexes in pool");
            } else {
                println!("{}", render_duplexes(&state.pool, &pairs));
            }
            Ok(())
        }
        "gel" => {
            let Some(size) = args.get(cmd_idx + 1) else {
                usage();
                return Err("gel requires: SIZE [OUTPUT.svg]".to_string());
            };
            let size: usize = size
                .parse()
                .map_err(|e| format!("Invalid gel size '{size}': {e}"))?;
            let mut engine = DnaEngine::from_state(load_state(&globals)?);
            engine
                .apply(Operation::RunGel { size: Some(size) })
                .map_err(|e| e.to_string())?;
            save_state(&engine, &globals)?;
            let report = engine
                .state()
                .gel
                .as_ref()
                .ok_or_else(|| "Gel run produced no report".to_string())?;
            if let Some(output) = args.get(cmd_idx + 2) {
                let layout =
                    build_gel_layout(&report.band_counts, Some(size)).map_err(|e| e.to_string())?;
                fs::write(output, export_gel_svg(&layout))
                    .map_err(|e| format!("Could not write SVG output '{output}': {e}"))?;
                eprintln!("Wrote gel preview to '{output}'");
            }
            print_json(report)
        }
        "export-fasta" => {
            let Some(target) = args.get(cmd_idx + 1) else {
                usage();
                return Err(format!("Missing path for {command}"));
            };
            let state = load_state(&globals)?;
            let pairs = state.pool.get_dna_strands();
            let records = export_fasta(&state.pool, &pairs, target).map_err(|e| format!("{e:#}"))?;
            println!("Wrote {records} FASTA record(s) to '{target}'");
            Ok(())
        }
        "solve" => {
            let Some(arg) = args.get(cmd_idx + 1) else {
                usage();
                return Err("Missing problem JSON".to_string());
            };
            let json = load_json_arg(arg)?;
            let problem: PathProblem =
                serde_json::from_str(&json).map_err(|e| format!("Invalid problem JSON: {e}"))?;

            let mut engine = DnaEngine::from_state(load_state(&globals)?);
            let report = engine.solve(problem).map_err(|e| e.to_string())?;
            save_state(&engine, &globals)?;
            print_json(&report)
        }
        "op" => {
            let Some(arg) = args.get(cmd_idx + 1) else {
                usage();
                return Err("Missing operation JSON".to_string());
            };
            let json = load_json_arg(arg)?;
            let op: Operation =
                serde_json::from_str(&json).map_err(|e| format!("Invalid operation JSON: {e}"))?;

            let mut engine = DnaEngine::from_state(load_state(&globals)?);
            let result = engine.apply(op).map_err(|e| e.to_string())?;
            save_state(&engine, &globals)?;
            print_json(&result)
        }
        "workflow" => {
            let Some(arg) = args.get(cmd_idx + 1) else {
                usage();
                return Err("Missing workflow JSON".to_string());
            };
            let json = load_json_arg(arg)?;
            let workflow: Workflow =
                serde_json::from_str(&json).map_err(|e| format!("Invalid workflow JSON: {e}"))?;

            let mut engine = DnaEngine::from_state(load_state(&globals)?);
            let results = engine.apply_workflow(workflow).map_err(|e| e.to_string())?;
            save_state(&engine, &globals)?;
            print_json(&results)
        }
        _ => {
            usage();
            Err(format!("Unknown command '{command}'"))
        }
    }
}
