use std::{io, process::ExitCode, sync::Arc};

use anyhow::Context;
use plotscript::{init_tracing, repl::{self, InterruptToken}, Kernel, KernelConfig, OutputMessage, OutputQueue};

const USAGE: &str = "usage: plotscript [<file> | -e <program>]";

fn evaluate_once(program: String) -> anyhow::Result<ExitCode> {
    let output = Arc::new(OutputQueue::new());
    Kernel::oneshot(program, Arc::clone(&output), &KernelConfig::default())?
        .join()
        .map_err(|_| anyhow::anyhow!("interpreter thread panicked"))?;

    match output.wait_pop() {
        OutputMessage::Expression(expression) => {
            println!("{}", expression);
            Ok(ExitCode::SUCCESS)
        }
        OutputMessage::Error(message) => {
            eprintln!("Error: {}", message);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn run() -> anyhow::Result<ExitCode> {
    let args: Vec<String> = std::env::args().collect();

    match args.as_slice() {
        [_] => {
            let mut kernel = Kernel::new(KernelConfig::default());
            kernel.start()?;
            repl::run(&mut kernel, io::stdin().lock(), io::stdout(), io::stderr(), &InterruptToken::new())?;
            Ok(ExitCode::SUCCESS)
        }
        [_, flag, program] if flag == "-e" => evaluate_once(program.clone()),
        [_, path] => {
            let program = std::fs::read_to_string(path)
                .with_context(|| format!("could not open {} for reading", path))?;
            evaluate_once(program)
        }
        _ => {
            eprintln!("Error: incorrect number of command line arguments");
            eprintln!("{}", USAGE);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn main() -> ExitCode {
    init_tracing();

    match run() {
        Ok(code) => code,
        Err(error) => {
            eprintln!("Error: {:#}", error);
            ExitCode::FAILURE
        }
    }
}
