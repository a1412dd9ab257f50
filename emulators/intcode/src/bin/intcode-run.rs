use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use intcode::{max_signal_with, Machine, MachineConfig, Program, Topology, Word};
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "intcode-run")]
#[command(about = "Run Intcode programs and amplifier pipelines", long_about = None)]
struct Args {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Maximum number of memory cells per machine
    #[arg(long, global = true)]
    memory_limit: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a program with a fixed input sequence and print its outputs
    Run {
        /// Program file; comma-separated integers
        program: PathBuf,

        /// Input value, may be repeated
        #[arg(short, long = "input", allow_negative_numbers = true)]
        inputs: Vec<Word>,

        /// Patch memory before running, as ADDR=VALUE
        #[arg(long = "set", value_parser = parse_patch)]
        patches: Vec<(Word, Word)>,

        /// Print the value at ADDR after the program halts
        #[arg(long = "dump")]
        dumps: Vec<Word>,

        /// Emit a JSON report instead of plain lines
        #[arg(long, action = ArgAction::SetTrue)]
        json: bool,
    },
    /// Run a self-test program and print its diagnostic code
    Diagnostic {
        program: PathBuf,

        #[arg(long, default_value_t = 1)]
        system_id: Word,
    },
    /// Search phase settings for the highest amplifier signal
    Amplify {
        program: PathBuf,

        /// Wire the amplifiers into a feedback ring (phases 5..=9) instead of a chain (0..=4)
        #[arg(long, action = ArgAction::SetTrue)]
        feedback: bool,
    },
}

#[derive(Serialize)]
struct Report {
    outputs: Vec<Word>,
    instructions: u64,
    memory_cells: usize,
    dumps: Vec<(Word, Word)>,
}

fn parse_patch(raw: &str) -> Result<(Word, Word), String> {
    let (addr, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected ADDR=VALUE, got {raw:?}"))?;
    let addr = addr.trim().parse().map_err(|e| format!("bad address: {e}"))?;
    let value = value.trim().parse().map_err(|e| format!("bad value: {e}"))?;
    Ok((addr, value))
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn load(path: &Path) -> Result<Program> {
    Program::load(path).with_context(|| format!("loading program {}", path.display()))
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = MachineConfig::new();
    if let Some(limit) = args.memory_limit {
        config = config.with_memory_limit(limit);
    }

    match args.command {
        Command::Run {
            program,
            inputs,
            patches,
            dumps,
            json,
        } => {
            let program = load(&program)?;
            let mut machine = Machine::with_input(&program, inputs).with_config(config);
            for (addr, value) in patches {
                machine
                    .write(addr, value)
                    .with_context(|| format!("patching address {addr}"))?;
            }
            let outputs = machine.run_to_halt()?;
            let dumps = dumps
                .into_iter()
                .map(|addr| Ok((addr, machine.read(addr)?)))
                .collect::<Result<Vec<_>>>()?;
            if json {
                let report = Report {
                    outputs,
                    instructions: machine.instructions_executed(),
                    memory_cells: machine.memory().len(),
                    dumps,
                };
                serde_json::to_writer(io::stdout(), &report)?;
                println!();
            } else {
                for value in outputs {
                    println!("{value}");
                }
                for (addr, value) in dumps {
                    println!("[{addr}] = {value}");
                }
            }
        }
        Command::Diagnostic { program, system_id } => {
            let program = load(&program)?;
            let mut machine = Machine::with_input(&program, [system_id]).with_config(config);
            let code = machine
                .diagnostic_code()
                .with_context(|| format!("diagnostic run for system {system_id}"))?;
            println!("{code}");
        }
        Command::Amplify { program, feedback } => {
            let program = load(&program)?;
            let (topology, phases): (Topology, Vec<Word>) = if feedback {
                (Topology::Ring, (5..=9).collect())
            } else {
                (Topology::Chain, (0..=4).collect())
            };
            let (best, signal) = max_signal_with(&program, &phases, topology, config)?;
            let setting = best
                .iter()
                .map(Word::to_string)
                .collect::<Vec<_>>()
                .join(",");
            println!("{signal} (phases {setting})");
        }
    }
    Ok(())
}
