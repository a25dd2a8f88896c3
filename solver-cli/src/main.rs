mod config;

use std::fs::File;
use std::io::{self, prelude::*};
use std::path::PathBuf;
use std::process::exit;
use std::str::FromStr;

use allsat::{
    enumerate_with, model_to_dimacs, solve_with, DimacsError, DpllEngine, Engine, Formula,
    Solution, SolverConfig, Verdict, CNF,
};
use clap::{App, Arg, ArgMatches};
use config::{Config, EngineKind, InputFormat};
use log::{error, info, LevelFilter};
use thiserror::Error;

#[derive(Error, Debug)]
enum CliError {
    #[error("IO error, more details: {0}")]
    Io(#[from] io::Error),
    #[error("The dimacs input was invalid, more details: {0}")]
    Dimacs(#[from] DimacsError),
    #[error("The json input was invalid, more details: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Solving failed: {0}")]
    Solve(#[from] allsat::Error),
    #[error("Invalid value '{value}' for --{argument}")]
    InvalidArgument { argument: &'static str, value: String },
}

type CliResult<T> = Result<T, CliError>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Outcome {
    Satisfiable,
    Unsatisfiable,
    Unknown,
}

impl Outcome {
    fn of(solution: &Solution) -> Outcome {
        match solution {
            Solution::Satisfiable(_) => Outcome::Satisfiable,
            Solution::Unsatisfiable => Outcome::Unsatisfiable,
            Solution::Unknown => Outcome::Unknown,
        }
    }
}

fn engine_names() -> &'static [&'static str] {
    #[cfg(feature = "cadical")]
    {
        &["dpll", "cadical"]
    }
    #[cfg(not(feature = "cadical"))]
    {
        &["dpll"]
    }
}

fn parse_number<T: FromStr>(matches: &ArgMatches<'_>, argument: &'static str) -> CliResult<Option<T>> {
    match matches.value_of(argument) {
        None => Ok(None),
        Some(value) => value.parse().map(Some).map_err(|_| CliError::InvalidArgument {
            argument,
            value: value.to_string(),
        }),
    }
}

fn make_config() -> CliResult<Config> {
    let matches = App::new("allsat")
        .version("1.0")
        .author("Alex&Korbi&Radek inc.")
        .about("Finds one or all satisfying assignments of a CNF formula")
        .arg(
            Arg::with_name("input")
                .short("i")
                .long("input")
                .takes_value(true)
                .help("Input file, standard input if omitted"),
        )
        .arg(
            Arg::with_name("format")
                .long("format")
                .takes_value(true)
                .possible_values(&["dimacs", "json"])
                .default_value("dimacs")
                .help("Input format, json expects a list of lists of non-zero integers"),
        )
        .arg(
            Arg::with_name("all")
                .short("a")
                .long("all")
                .help("Enumerate all models instead of stopping at the first one"),
        )
        .arg(
            Arg::with_name("max-models")
                .short("n")
                .long("max-models")
                .takes_value(true)
                .requires("all")
                .help("Stop the enumeration after this many models"),
        )
        .arg(
            Arg::with_name("vars")
                .long("vars")
                .takes_value(true)
                .help("Number of variables, overrides the DIMACS header"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .help("Verbosity, repeat for more output. Two or more dump the ingested formula"),
        )
        .arg(
            Arg::with_name("prop-limit")
                .long("prop-limit")
                .takes_value(true)
                .default_value("0")
                .help("Propagation budget per search, 0 for unbounded"),
        )
        .arg(
            Arg::with_name("engine")
                .long("engine")
                .takes_value(true)
                .possible_values(engine_names())
                .default_value("dpll")
                .help("Search engine"),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .takes_value(true)
                .help("File name for output in DIMACS format"),
        )
        .arg(
            Arg::with_name("return_code")
                .long("return-code")
                .short("r")
                .help("Will return 1 if satisfiable and 0 if not (useful for scripting)")
                .takes_value(false),
        )
        .get_matches();

    let engine = match matches.value_of("engine") {
        #[cfg(feature = "cadical")]
        Some("cadical") => EngineKind::Cadical,
        _ => EngineKind::Dpll,
    };
    let format = match matches.value_of("format") {
        Some("json") => InputFormat::Json,
        _ => InputFormat::Dimacs,
    };

    let mut solver = SolverConfig::default()
        .with_verbosity(matches.occurrences_of("verbose") as u32)
        .with_propagation_limit(parse_number(&matches, "prop-limit")?.unwrap_or(0));
    solver.variables = parse_number(&matches, "vars")?;

    Ok(Config {
        input: matches.value_of("input").map(PathBuf::from),
        format,
        output: matches.value_of("output").map(PathBuf::from),
        all: matches.is_present("all"),
        max_models: parse_number(&matches, "max-models")?,
        return_code: matches.is_present("return_code"),
        engine,
        solver,
    })
}

fn configure_logging(verbosity: u32) {
    let level_filter = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .format(|buf, record| writeln!(buf, "c {}", record.args()))
        .filter_level(level_filter)
        .target(env_logger::Target::Stderr)
        .init();
}

fn get_input(handle: &mut impl Read) -> io::Result<String> {
    let mut buffer = String::new();
    handle.read_to_string(&mut buffer)?;
    Ok(buffer)
}

/// Runs the request and renders the DIMACS answer.
fn execute<E, F, M>(make_engine: M, formula: &F, config: &Config) -> CliResult<(String, Outcome)>
where
    E: Engine,
    F: Formula + ?Sized,
    M: FnOnce() -> E,
{
    if !config.all {
        let solution = solve_with(make_engine, formula, config.solver)?;
        return Ok((solution.to_dimacs(), Outcome::of(&solution)));
    }

    let mut out = String::new();
    let mut enumerator = enumerate_with(make_engine, formula, config.solver)?;
    let limit = config.max_models.unwrap_or(usize::MAX);
    let mut count = 0;
    for model in enumerator.by_ref().take(limit) {
        let model = model?;
        count += 1;
        out.push_str("s SATISFIABLE\n");
        out.push_str(&model_to_dimacs(&model));
    }

    // a budget stop leaves the enumeration undecided, whatever was found before
    let outcome = match enumerator.exhausted_by() {
        Some(Verdict::Unknown) => {
            out.push_str(&Solution::Unknown.to_dimacs());
            Outcome::Unknown
        }
        _ if count > 0 => Outcome::Satisfiable,
        _ => {
            out.push_str(&Solution::Unsatisfiable.to_dimacs());
            Outcome::Unsatisfiable
        }
    };
    out.push_str(&format!("c {} models\n", count));
    Ok((out, outcome))
}

fn dispatch<F: Formula + ?Sized>(formula: &F, config: &Config) -> CliResult<(String, Outcome)> {
    match config.engine {
        EngineKind::Dpll => execute(DpllEngine::new, formula, config),
        #[cfg(feature = "cadical")]
        EngineKind::Cadical => execute(allsat::CadicalEngine::new, formula, config),
    }
}

fn run() -> CliResult<(Outcome, bool)> {
    let mut config = make_config()?;
    configure_logging(config.solver.verbosity);

    let input = match &config.input {
        None => {
            info!("No input file specified. Reading from standard input...");
            get_input(&mut io::stdin())
        }
        Some(file) => get_input(&mut File::open(file)?),
    }?;

    let (answer, outcome) = match config.format {
        InputFormat::Dimacs => {
            let formula = CNF::from_dimacs(&input)?;
            if config.solver.variables.is_none() {
                config.solver.variables = Some(formula.num_variables);
            }
            dispatch(&formula, &config)?
        }
        InputFormat::Json => {
            let formula: serde_json::Value = serde_json::from_str(&input)?;
            dispatch(&formula, &config)?
        }
    };

    match &config.output {
        Some(path) => std::fs::write(path, answer)?,
        None => print!("{}", answer),
    }

    Ok((outcome, config.return_code))
}

fn main() {
    match run() {
        Ok((Outcome::Satisfiable, true)) => exit(1),
        Ok((Outcome::Unknown, false)) => exit(2),
        Ok(_) => {}
        Err(e) => {
            error!("Execution failed, error: {}", e);
            exit(3);
        }
    }
}
