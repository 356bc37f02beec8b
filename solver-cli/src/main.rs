mod benchmark;
mod config;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use num_bigint::BigInt;
use config::{Config, Reduction, SubsetSumSource, Task};
use benchmark::{BenchmarkPlan, Problem, Strategies, Table};
use npc_solver::{
    reduction::{sat_to_subset_sum, sat_to_three_sat, three_sat_to_subset_sum},
    sat_solver, subset_sum_solver, three_sat_solver, verifier, SATSolution, SearchStats, SubsetSumInstance,
    SubsetSumSolution, ThreeCNF, CNF,
};
use std::convert::TryFrom;
use std::error::Error;
use std::fs::File;
use std::io;
use std::io::prelude::*;
use std::path::PathBuf;
use std::process::exit;
use std::time::Duration;

fn file_arg() -> Arg {
    Arg::new("file")
        .short('f')
        .long("file")
        .value_name("PATH")
        .value_parser(value_parser!(PathBuf))
        .help("Input file, standard input if omitted")
}

fn sat_strategy_arg() -> Arg {
    Arg::new("strategy")
        .short('s')
        .long("strategy")
        .value_parser(["brute", "backtrack", "dpll"])
        .default_value("dpll")
        .help("SAT solving algorithm")
}

fn integer(text: &str) -> Result<BigInt, String> {
    text.trim().parse().map_err(|_| format!("invalid integer `{}`", text))
}

fn subset_sum_args(command: Command) -> Command {
    command
        .arg(file_arg().conflicts_with_all(["numbers", "target"]))
        .arg(Arg::new("numbers")
            .short('n')
            .long("numbers")
            .value_name("CSV")
            .value_delimiter(',')
            .allow_hyphen_values(true)
            .value_parser(integer)
            .requires("target")
            .help("Elements, comma separated"))
        .arg(Arg::new("target")
            .short('t')
            .long("target")
            .allow_hyphen_values(true)
            .value_parser(integer)
            .requires("numbers")
            .help("Target sum"))
}

fn cli() -> Command {
    Command::new("npc")
        .version("1.0")
        .about("Exact solvers, verifiers and reductions for SAT, 3-SAT and Subset Sum")
        .subcommand_required(true)
        .arg(Arg::new("verbose")
            .short('v')
            .long("verbose")
            .action(ArgAction::Count)
            .global(true)
            .help("Log more (-v info, -vv debug, -vvv trace); RUST_LOG overrides"))
        .arg(Arg::new("output")
            .short('o')
            .long("output")
            .value_name("PATH")
            .value_parser(value_parser!(PathBuf))
            .global(true)
            .help("Write the result to a file instead of standard output"))
        .arg(Arg::new("return_code")
            .short('r')
            .long("return-code")
            .action(ArgAction::SetTrue)
            .global(true)
            .help("Will return 1 if a witness exists and 0 if not (useful for scripting)"))
        .subcommand(Command::new("solve")
            .about("Decide an instance and print a witness")
            .subcommand_required(true)
            .subcommand(Command::new("sat")
                .about("General CNF formula in DIMACS format")
                .arg(file_arg())
                .arg(sat_strategy_arg()))
            .subcommand(Command::new("3sat")
                .about("DIMACS formula with exactly three literals per clause")
                .arg(file_arg())
                .arg(sat_strategy_arg()))
            .subcommand(subset_sum_args(Command::new("subset-sum"))
                .about("Subset Sum, inline or in the `n`/`t` text format")
                .arg(Arg::new("strategy")
                    .short('s')
                    .long("strategy")
                    .value_parser(["brute", "backtrack", "dp"])
                    .default_value("dp")
                    .help("Subset Sum solving algorithm"))))
        .subcommand(Command::new("reduce")
            .about("Transform an instance along SAT → 3-SAT → Subset Sum")
            .subcommand_required(true)
            .subcommand(Command::new("sat-to-3sat").arg(file_arg()))
            .subcommand(Command::new("3sat-to-subset-sum").arg(file_arg()))
            .subcommand(Command::new("sat-to-subset-sum").arg(file_arg())))
        .subcommand(Command::new("verify")
            .about("Check a witness in polynomial time")
            .subcommand_required(true)
            .subcommand(Command::new("sat")
                .arg(file_arg())
                .arg(assignment_arg()))
            .subcommand(Command::new("3sat")
                .arg(file_arg())
                .arg(assignment_arg()))
            .subcommand(subset_sum_args(Command::new("subset-sum"))
                .arg(Arg::new("indices")
                    .short('i')
                    .long("indices")
                    .value_name("CSV")
                    .value_delimiter(',')
                    .default_value("")
                    .help("Selected positions, comma separated"))))
        .subcommand(Command::new("benchmark")
            .about("Compare strategies on seeded random instances")
            .subcommand_required(true)
            .subcommand(Command::new("run")
                .arg(Arg::new("problem")
                    .short('p')
                    .long("problem")
                    .required(true)
                    .value_parser(["sat", "3sat", "subset-sum"]))
                .arg(Arg::new("sizes")
                    .long("sizes")
                    .value_delimiter(',')
                    .value_parser(value_parser!(usize))
                    .help("Variable counts or element counts [default: 5,10,15]"))
                .arg(Arg::new("instances")
                    .long("instances")
                    .value_parser(value_parser!(usize))
                    .help("Instances per size [default: 5]"))
                .arg(Arg::new("strategies")
                    .long("strategies")
                    .value_delimiter(',')
                    .help("Strategies to compare [default: all of the problem]"))
                .arg(Arg::new("seed")
                    .long("seed")
                    .value_parser(value_parser!(u64))
                    .help("Base seed of the instance generator [default: 42]"))
                .arg(Arg::new("timeout")
                    .long("timeout")
                    .value_name("SECONDS")
                    .value_parser(seconds)
                    .help("Stop a single solve after this long and record it as timed out [default: 300]"))
                .arg(Arg::new("max_nodes")
                    .long("max-nodes")
                    .value_parser(value_parser!(u64))
                    .help("Stop a single solve after this many search nodes"))))
}

fn assignment_arg() -> Arg {
    Arg::new("assignment")
        .short('a')
        .long("assignment")
        .required(true)
        .allow_hyphen_values(true)
        .help("Literals of the assignment, e.g. \"1 -2 3\"; unmentioned variables are false")
}

fn seconds(text: &str) -> Result<Duration, String> {
    text.parse::<f64>()
        .ok()
        .and_then(|seconds| Duration::try_from_secs_f64(seconds).ok())
        .ok_or_else(|| format!("invalid number of seconds `{}`", text))
}

/// `"1 -2 3 0"` over 4 variables → `[true, false, true, false]`.
/// Unmentioned variables are false, literals beyond `num_variables` are
/// rejected.
fn parse_assignment(text: &str, num_variables: usize) -> Result<Vec<bool>, String> {
    let mut valuation = vec![false; num_variables];
    for token in text.split(|c: char| c.is_whitespace() || c == ',').filter(|token| !token.is_empty()) {
        let literal: i64 = token.parse().map_err(|_| format!("invalid literal `{}`", token))?;
        if literal == 0 {
            continue;
        }
        let slot = usize::try_from(literal.unsigned_abs())
            .ok()
            .and_then(|id| valuation.get_mut(id - 1))
            .ok_or_else(|| format!("literal {} names a variable outside [1, {}]", literal, num_variables))?;
        *slot = literal > 0;
    }
    Ok(valuation)
}

fn subset_sum_source(matches: &ArgMatches) -> SubsetSumSource {
    match (matches.get_many::<BigInt>("numbers"), matches.get_one::<BigInt>("target")) {
        (Some(numbers), Some(target)) => SubsetSumSource::Inline {
            numbers: numbers.cloned().collect(),
            target: target.clone(),
        },
        _ => SubsetSumSource::Text(matches.get_one::<PathBuf>("file").cloned()),
    }
}

fn strategy<T: std::str::FromStr<Err = String>>(matches: &ArgMatches) -> Result<T, String> {
    matches.get_one::<String>("strategy")
        .ok_or_else(|| "missing strategy".to_string())?
        .parse()
}

fn make_config() -> Result<Config, Box<dyn Error>> {
    let matches = cli().get_matches();
    let file = |matches: &ArgMatches| matches.get_one::<PathBuf>("file").cloned();

    let task = match matches.subcommand() {
        Some(("solve", solve)) => match solve.subcommand() {
            Some(("sat", args)) => Task::SolveSat { input: file(args), strategy: strategy(args)?, three_sat: false },
            Some(("3sat", args)) => Task::SolveSat { input: file(args), strategy: strategy(args)?, three_sat: true },
            Some(("subset-sum", args)) => Task::SolveSubsetSum {
                source: subset_sum_source(args),
                strategy: strategy(args)?,
            },
            _ => unreachable!(), // already handled by clap
        },
        Some(("reduce", reduce)) => {
            let (reduction, args) = match reduce.subcommand() {
                Some(("sat-to-3sat", args)) => (Reduction::SatToThreeSat, args),
                Some(("3sat-to-subset-sum", args)) => (Reduction::ThreeSatToSubsetSum, args),
                Some(("sat-to-subset-sum", args)) => (Reduction::SatToSubsetSum, args),
                _ => unreachable!(), // already handled by clap
            };
            Task::Reduce { input: file(args), reduction }
        }
        Some(("verify", verify)) => match verify.subcommand() {
            Some((name @ ("sat" | "3sat"), args)) => Task::VerifySat {
                input: file(args),
                assignment: args.get_one::<String>("assignment").cloned().unwrap_or_default(),
                three_sat: name == "3sat",
            },
            Some(("subset-sum", args)) => Task::VerifySubsetSum {
                source: subset_sum_source(args),
                indices: args.get_many::<String>("indices")
                    .into_iter()
                    .flatten()
                    .filter(|index| !index.is_empty())
                    .map(|index| index.trim().parse().map_err(|_| format!("invalid index `{}`", index)))
                    .collect::<Result<_, _>>()?,
            },
            _ => unreachable!(), // already handled by clap
        },
        Some(("benchmark", benchmark)) => match benchmark.subcommand() {
            Some(("run", args)) => {
                let problem: Problem = args.get_one::<String>("problem")
                    .ok_or("missing problem")?
                    .parse()?;
                let strategies = match args.get_many::<String>("strategies") {
                    Some(names) => Strategies::parse(problem, names.map(String::as_str))?,
                    None => Strategies::all(problem),
                };
                Task::Benchmark(BenchmarkPlan {
                    problem,
                    sizes: args.get_many::<usize>("sizes")
                        .map(|sizes| sizes.copied().collect())
                        .unwrap_or_else(|| benchmark::DEFAULT_SIZES.to_vec()),
                    instances: args.get_one::<usize>("instances").copied().unwrap_or(benchmark::DEFAULT_INSTANCES),
                    strategies,
                    seed: args.get_one::<u64>("seed").copied().unwrap_or(benchmark::DEFAULT_SEED),
                    timeout: Some(args.get_one::<Duration>("timeout").copied().unwrap_or(benchmark::DEFAULT_TIMEOUT)),
                    max_nodes: args.get_one::<u64>("max_nodes").copied(),
                })
            }
            _ => unreachable!(), // already handled by clap
        },
        _ => unreachable!(), // already handled by clap
    };

    Ok(Config {
        task,
        output: matches.get_one::<PathBuf>("output").cloned(),
        return_code: matches.get_flag("return_code"),
        verbosity: matches.get_count("verbose"),
    })
}

fn init_logger(verbosity: u8) {
    let level = match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn get_input(handle: &mut impl Read) -> io::Result<String> {
    let mut buffer = String::new();
    handle.read_to_string(&mut buffer)?;
    Ok(buffer)
}

fn read_input(path: &Option<PathBuf>) -> io::Result<String> {
    match path {
        None => {
            eprintln!("No input file specified. Reading from standard input...");
            get_input(&mut io::stdin())
        }
        Some(file) => get_input(&mut File::open(file)?),
    }
}

fn load_subset_sum(source: SubsetSumSource) -> Result<SubsetSumInstance, Box<dyn Error>> {
    Ok(match source {
        SubsetSumSource::Inline { numbers, target } => SubsetSumInstance::new(numbers, target),
        SubsetSumSource::Text(path) => SubsetSumInstance::from_text(&read_input(&path)?)?,
    })
}

fn stats_comment(prefix: &str, stats: &SearchStats) -> String {
    format!("{0} nodes {1}\n{0} seconds {2:.6}\n", prefix, stats.nodes, stats.elapsed.as_secs_f64())
}

/// Runs the task and returns its report together with whether a witness
/// exists, if the task decides anything. Benchmarks report CSV when the
/// report goes to a file and print their table regardless.
fn execute(task: Task, to_file: bool) -> Result<(String, Option<bool>), Box<dyn Error>> {
    Ok(match task {
        Task::SolveSat { input, strategy, three_sat } => {
            let formula = CNF::from_dimacs(&read_input(&input)?)?;
            let outcome = match three_sat {
                true => three_sat_solver::solve(&formula, strategy)?,
                false => sat_solver::solve(&formula, strategy)?,
            };
            let witness = matches!(outcome.solution, SATSolution::Satisfiable(_));
            (stats_comment("c", &outcome.stats) + &outcome.solution.to_dimacs(), Some(witness))
        }
        Task::SolveSubsetSum { source, strategy } => {
            let instance = load_subset_sum(source)?;
            let outcome = subset_sum_solver::solve(&instance, strategy)?;
            let report = match &outcome.solution {
                SubsetSumSolution::Found(indices) => format!(
                    "{}\nelements: {}\n",
                    outcome.solution,
                    indices.iter().map(|&index| instance.numbers[index].to_string()).collect::<Vec<_>>().join(" + ")
                ),
                SubsetSumSolution::NotFound => format!("{}\n", outcome.solution),
            };
            (stats_comment("#", &outcome.stats) + &report, Some(outcome.solution.is_found()))
        }
        Task::Reduce { input, reduction } => {
            let formula = CNF::from_dimacs(&read_input(&input)?)?;
            let text = match reduction {
                Reduction::SatToThreeSat => sat_to_three_sat(&formula)?.formula.to_dimacs(),
                Reduction::ThreeSatToSubsetSum => {
                    three_sat_to_subset_sum(&ThreeCNF::try_from(&formula)?)?.instance.to_text()
                }
                Reduction::SatToSubsetSum => sat_to_subset_sum(&formula)?.instance.to_text(),
            };
            (text, None)
        }
        Task::VerifySat { input, assignment, three_sat } => {
            let formula = CNF::from_dimacs(&read_input(&input)?)?;
            let assignment = parse_assignment(&assignment, formula.num_variables)?;
            let verdict = match three_sat {
                true => verifier::verify_three_sat(&formula, &assignment),
                false => verifier::verify_sat(&formula, &assignment),
            };
            verdict_report(verdict)
        }
        Task::VerifySubsetSum { source, indices } => {
            let instance = load_subset_sum(source)?;
            verdict_report(verifier::verify_subset_sum(&instance, &indices))
        }
        Task::Benchmark(plan) => {
            let records = benchmark::run(&plan)?;
            match to_file {
                true => {
                    print!("{}", Table(&records));
                    (benchmark::to_csv(&records), None)
                }
                false => (Table(&records).to_string(), None),
            }
        }
    })
}

fn verdict_report(verdict: verifier::Verdict) -> (String, Option<bool>) {
    match verdict {
        Ok(()) => ("VALID\n".to_string(), Some(true)),
        Err(rejection) => (format!("INVALID: {}\n", rejection), Some(false)),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let config = make_config()?;
    init_logger(config.verbosity);

    let verifying = matches!(config.task, Task::VerifySat { .. } | Task::VerifySubsetSum { .. });
    let (report, witness) = execute(config.task, config.output.is_some())?;

    match config.output {
        Some(path) => std::fs::write(path, report)?,
        None => print!("{}", report),
    }

    if verifying {
        if witness == Some(false) {
            exit(1)
        }
    } else if config.return_code && witness == Some(true) {
        exit(1)
    }
    Ok(())
}
