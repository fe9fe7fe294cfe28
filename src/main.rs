mod debug_report;

use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use bandpath::graph::params::EmptyParameterTable;
use bandpath::graph::table::{CompTable, GraphRow, GraphTable};
use bandpath::lang::interp::{Interpreter, TraceFactory};
use bandpath::lang::{earley, scanner};
use bandpath::observatory::Observatory;

fn main() {
    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    let result = match &config.obsmode {
        Some(obsmode) => run_obsmode(obsmode, &config),
        None => run_expression(&config),
    };
    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run_expression(config: &CliConfig) -> Result<(), String> {
    let src = scanner::rewrite(&config.input);
    let tokens = scanner::scan(&src).map_err(|e| e.to_string())?;
    let tree = earley::parse(&tokens, src.len()).map_err(|e| e.to_string())?;

    let factory = TraceFactory::new();
    let plan = match load_observatory(config)? {
        Some(obs) => {
            Interpreter::with_observatory(&factory, &obs).interpret(&src).map_err(|e| e.to_string())?
        }
        None => Interpreter::standalone(&factory).interpret(&src).map_err(|e| e.to_string())?,
    };

    debug_report::print_expression(&config.input, &tokens, &tree, &factory.calls(), &plan, config.color);
    Ok(())
}

fn run_obsmode(obsmode: &str, config: &CliConfig) -> Result<(), String> {
    let obs = load_observatory(config)?
        .ok_or_else(|| "--obsmode requires --graph <file>".to_string())?;
    let path = obs.resolve(obsmode).map_err(|e| e.to_string())?;
    debug_report::print_path(&path, config.color);
    Ok(())
}

/// Build an observatory from the plain-text table files, when given.
fn load_observatory(config: &CliConfig) -> Result<Option<Observatory<EmptyParameterTable>>, String> {
    let Some(graph_path) = &config.graph else {
        return Ok(None);
    };
    let rows = read_graph_rows(graph_path)?;

    let optical = match &config.comp {
        Some(comp_path) => read_comp_rows(comp_path)?,
        // Without a component table, filenames echo the component names.
        None => CompTable::from_rows(
            "echo",
            rows.iter()
                .map(|r| (r.compname.clone(), r.compname.to_lowercase()))
                .collect::<Vec<_>>(),
        ),
    };
    let thermal = CompTable::from_rows(
        "echo-thermal",
        rows.iter().map(|r| (r.thcompname.clone(), r.thcompname.to_lowercase())).collect::<Vec<_>>(),
    );

    let graph = GraphTable::from_rows(&graph_path.display().to_string(), rows)
        .map_err(|e| e.to_string())?;
    Ok(Some(Observatory::new(graph, optical, thermal, EmptyParameterTable)))
}

/// Whitespace-separated columns: innode keyword outnode compname thcompname.
/// Blank lines and lines starting with '#' are skipped.
fn read_graph_rows(path: &Path) -> Result<Vec<GraphRow>, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|err| format!("cannot read {}: {err}", path.display()))?;
    let mut rows = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [innode, keyword, outnode, compname, thcompname] = fields.as_slice() else {
            return Err(format!(
                "{}:{}: expected 5 columns, found {}",
                path.display(),
                lineno + 1,
                fields.len()
            ));
        };
        let parse_node = |s: &str| {
            s.parse::<u32>()
                .map_err(|_| format!("{}:{}: invalid node id '{s}'", path.display(), lineno + 1))
        };
        rows.push(GraphRow {
            innode: parse_node(innode)?,
            keyword: keyword.to_string(),
            outnode: parse_node(outnode)?,
            compname: compname.to_string(),
            thcompname: thcompname.to_string(),
        });
    }
    Ok(rows)
}

/// Two columns: component filename.
fn read_comp_rows(path: &Path) -> Result<CompTable, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|err| format!("cannot read {}: {err}", path.display()))?;
    let mut rows = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = line.split_whitespace();
        match (fields.next(), fields.next()) {
            (Some(comp), Some(file)) => rows.push((comp.to_string(), file.to_string())),
            _ => {
                return Err(format!("{}:{}: expected 2 columns", path.display(), lineno + 1));
            }
        }
    }
    Ok(CompTable::from_rows(&path.display().to_string(), rows))
}

struct CliConfig {
    input: String,
    obsmode: Option<String>,
    graph: Option<PathBuf>,
    comp: Option<PathBuf>,
    color: bool,
}

fn parse_args() -> Result<CliConfig, String> {
    let mut input: Option<String> = None;
    let mut obsmode: Option<String> = None;
    let mut graph: Option<PathBuf> = None;
    let mut comp: Option<PathBuf> = None;
    let mut color = io::stdout().is_terminal();
    let mut args = std::env::args().skip(1).peekable();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("bandpath {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => color = true,
            "--no-color" => color = false,
            "--obsmode" => {
                let value = args.next().ok_or_else(|| "error: --obsmode expects a value".to_string())?;
                obsmode = Some(value);
            }
            "--graph" => {
                let value = args.next().ok_or_else(|| "error: --graph expects a file".to_string())?;
                graph = Some(PathBuf::from(value));
            }
            "--comp" => {
                let value = args.next().ok_or_else(|| "error: --comp expects a file".to_string())?;
                comp = Some(PathBuf::from(value));
            }
            "--" => {
                let rest = args.collect::<Vec<_>>().join(" ");
                if !rest.trim().is_empty() {
                    if input.is_some() {
                        return Err("error: input provided multiple times".to_string());
                    }
                    input = Some(rest);
                }
                break;
            }
            _ if arg.starts_with("--obsmode=") => {
                obsmode = Some(arg.trim_start_matches("--obsmode=").to_string());
            }
            _ if arg.starts_with("--graph=") => {
                graph = Some(PathBuf::from(arg.trim_start_matches("--graph=")));
            }
            _ if arg.starts_with("--comp=") => {
                comp = Some(PathBuf::from(arg.trim_start_matches("--comp=")));
            }
            _ if arg.starts_with('-') && arg.len() > 1 => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => {
                let rest = std::iter::once(arg).chain(args).collect::<Vec<_>>().join(" ");
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(rest);
                break;
            }
        }
    }

    if obsmode.is_some() && graph.is_none() {
        return Err("error: --obsmode requires --graph <file>".to_string());
    }

    let input = match (input, &obsmode) {
        (Some(value), _) => value,
        (None, Some(_)) => String::new(),
        (None, None) => read_stdin_input()?,
    };

    if obsmode.is_none() && input.trim().is_empty() {
        return Err(format!("error: no input provided\n\n{}", help_text()));
    }

    Ok(CliConfig { input, obsmode, graph, comp, color })
}

fn read_stdin_input() -> Result<String, String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(|err| format!("error: failed to read stdin: {err}"))?;
    Ok(buffer)
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "bandpath {version}

Bandpass resolution and expression language CLI.

Usage:
  bandpath [OPTIONS] [--] <expression...>
  bandpath [OPTIONS] --obsmode <string> --graph <file>

Options:
  --obsmode <string>         Resolve an obsmode string instead of an
                             expression. Requires --graph.
  --graph <file>             Plain-text graph table: innode keyword outnode
                             compname thcompname, one edge per line.
  --comp <file>              Plain-text component table: component filename.
                             Without it, filenames echo component names.
  --color                    Force ANSI color output.
  --no-color                 Disable ANSI color output.
  -h, --help                 Show this help message.
  -V, --version              Print version information.

Expressions run against a trace factory: the output is the construction
plan, not spectral data. band(...) resolves when --graph is given.

Exit codes:
  0  Success.
  1  Resolution, parse, or table error.
  2  Invalid arguments or missing input.
",
        version = env!("CARGO_PKG_VERSION")
    )
}
