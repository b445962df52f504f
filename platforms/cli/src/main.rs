use clap::{CommandFactory, Parser};
use dfa::{coordinates_of, to_json, Automaton, AutomatonCatalog, AutomatonLoader, DfaError};
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

/// Runs input strings through a deterministic finite automaton.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
#[clap(after_help = "EXAMPLES:
  dfa-cli automaton.json -i 0110 -i 11
  dfa-cli automaton.json --input-file input.json --trace
  cat automaton.json | dfa-cli -i 0110
  dfa-cli --builtin \"Ends with zero\" -i 10")]
struct Cli {
    /// Path to an automaton definition (.json).
    /// Definition content can also be piped via stdin.
    definition: Option<PathBuf>,

    /// Use a built-in automaton by name instead of a definition file
    #[clap(short, long, conflicts_with = "definition")]
    builtin: Option<String>,

    /// An input string to run; may be repeated
    #[clap(short, long)]
    input: Vec<String>,

    /// An input document of the form {"input": "..."}; may be repeated
    #[clap(long)]
    input_file: Vec<PathBuf>,

    /// Print each consumed symbol
    #[clap(short, long)]
    trace: bool,

    /// Print the plotting coordinates of every state
    #[clap(short, long)]
    coordinates: bool,

    /// Print the automaton in the canonical flat layout
    #[clap(short, long)]
    encode: bool,

    /// List the built-in automata and exit
    #[clap(short, long)]
    list: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.list {
        return match list_builtins() {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::from(2)
            }
        };
    }

    let automaton = match load_automaton(&cli) {
        Ok(automaton) => automaton,
        Err(DfaError::NoAutomatonLoaded) => {
            // Nothing given and nothing piped
            let _ = Cli::command().print_help();
            return ExitCode::from(2);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(2);
        }
    };

    for warning in automaton.warnings() {
        warn!("{}", warning);
    }

    match execute(&cli, &automaton) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}

/// Loads the automaton from a built-in name, a file path, or stdin, in that order.
fn load_automaton(cli: &Cli) -> Result<Automaton, DfaError> {
    if let Some(name) = &cli.builtin {
        debug!(name = %name, "using built-in automaton");
        AutomatonCatalog::get_by_name(name).cloned()
    } else if let Some(path) = &cli.definition {
        AutomatonLoader::load_from_file(path)
    } else if atty::isnt(atty::Stream::Stdin) {
        let mut buffer = Vec::new();
        io::stdin()
            .read_to_end(&mut buffer)
            .map_err(|e| DfaError::FileError(format!("Failed to read from stdin: {}", e)))?;
        AutomatonLoader::load_from_bytes(&buffer)
    } else {
        Err(DfaError::NoAutomatonLoaded)
    }
}

/// Performs the requested actions. Returns whether every input was accepted.
fn execute(cli: &Cli, automaton: &Automaton) -> Result<bool, DfaError> {
    if cli.encode {
        println!("{}", to_json(automaton)?);
    }

    if cli.coordinates {
        for (state, (x, y)) in automaton.states().iter().zip(coordinates_of(automaton)?) {
            println!("{}: ({}, {})", state.name, x, y);
        }
    }

    let mut inputs = cli.input.clone();
    for path in &cli.input_file {
        inputs.push(AutomatonLoader::load_input_file(path)?);
    }

    if inputs.is_empty() && !cli.encode && !cli.coordinates {
        print_summary(automaton);
        return Ok(true);
    }

    let mut all_accepted = true;
    for input in &inputs {
        if cli.trace {
            println!("{:?}: start in {}", input, automaton.initial_state());
            for step in automaton.trace(input) {
                println!(
                    "  [{}] {} --{}--> {}",
                    step.position, step.from, step.symbol, step.to
                );
            }
        }

        let verdict = automaton.run(input);
        match verdict.rejection() {
            None => println!("{:?}: {}", input, verdict),
            Some(reason) => println!("{:?}: {} ({})", input, verdict, reason),
        }
        all_accepted &= verdict.is_accepted();
    }

    Ok(all_accepted)
}

fn print_summary(automaton: &Automaton) {
    if let Some(name) = automaton.name() {
        println!("Name: {}", name);
    }
    let states: Vec<&str> = automaton.states().iter().map(|s| s.name.as_str()).collect();
    println!("States: {}", states.join(", "));
    println!(
        "Alphabet: {}",
        automaton
            .alphabet()
            .iter()
            .map(char::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("Initial state: {}", automaton.initial_state());
    println!("Final states: {}", automaton.final_states().join(", "));
    println!("Transitions: {}", automaton.transition_count());
}

fn list_builtins() -> Result<(), DfaError> {
    for index in 0..AutomatonCatalog::count()? {
        let info = AutomatonCatalog::info(index)?;
        println!(
            "{}: {} ({} states, {} transitions)",
            info.index, info.name, info.state_count, info.transition_count
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_arguments_is_accepted_for_piped_definitions() {
        let cli = Cli::try_parse_from(["dfa-cli"]).unwrap();
        assert!(cli.definition.is_none());
        assert!(cli.builtin.is_none());

        let cli = Cli::try_parse_from(["dfa-cli", "-i", "0110", "--trace"]).unwrap();
        assert!(cli.definition.is_none());
        assert_eq!(cli.input, vec!["0110".to_string()]);
        assert!(cli.trace);
    }

    #[test]
    fn test_builtin_conflicts_with_definition() {
        assert!(Cli::try_parse_from(["dfa-cli", "a.json", "--builtin", "Ends with zero"]).is_err());
    }

    #[test]
    fn test_builtin_is_loaded_without_stdin() {
        let cli = Cli::try_parse_from(["dfa-cli", "--builtin", "Ends with zero"]).unwrap();
        let automaton = load_automaton(&cli).unwrap();
        assert!(automaton.accepts("10"));
    }
}
