use std::{io::{self, BufRead, Write}, sync::{atomic::{AtomicUsize, Ordering}, Arc}, time::Duration};

use crate::kernel::{Kernel, OutputMessage};


pub const PROMPT: &str = "plotscript> ";

// How often a waiting loop checks for a pending interrupt
const INTERRUPT_POLL: Duration = Duration::from_millis(10);

const NOT_RUNNING: &str = "interpreter kernel not running";

/// Cooperative interrupt flag shared between whoever receives the user's
/// interrupts and the REPL loop. The first interrupt is only recorded, the
/// second one in a row asks the loop to exit.
#[derive(Debug, Clone, Default)]
pub struct InterruptToken(Arc<AtomicUsize>);

impl InterruptToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interrupt(&self) -> bool {
        self.0.fetch_add(1, Ordering::AcqRel) >= 1
    }

    pub fn clear(&self) {
        self.0.store(0, Ordering::Release);
    }

    pub fn exit_requested(&self) -> bool {
        self.0.load(Ordering::Acquire) >= 2
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplExit {
    EndOfInput,
    ExitCommand,
    Interrupted,
}

fn await_response(kernel: &Kernel, token: &InterruptToken) -> Option<OutputMessage> {
    loop {
        if token.exit_requested() { return None; }
        if let Some(message) = kernel.recv_timeout(INTERRUPT_POLL) {
            return Some(message);
        }
        if !kernel.is_active() {
            return Some(OutputMessage::Error(NOT_RUNNING.to_owned()));
        }
    }
}

/// Read programs line by line from `input` and print each result to
/// `output`, or each failure to `errors` as `Error: <message>`.
///
/// Lines starting with `%` control the kernel: `%start`, `%stop`, `%reset`
/// and `%exit`.
pub fn run<R: BufRead, W: Write, E: Write>(
    kernel: &mut Kernel,
    input: R,
    mut output: W,
    mut errors: E,
    token: &InterruptToken,
) -> io::Result<ReplExit> {
    let mut lines = input.lines();

    loop {
        token.clear();
        write!(output, "{}", PROMPT)?;
        output.flush()?;

        let Some(line) = lines.next() else { return Ok(ReplExit::EndOfInput) };
        let line = line?;

        match line.trim() {
            "" => continue,
            "%start" => { kernel.start()?; continue; }
            "%stop" => { kernel.stop(); continue; }
            "%reset" => { kernel.reset()?; continue; }
            "%exit" => return Ok(ReplExit::ExitCommand),
            _ => {}
        }

        if !kernel.is_active() {
            writeln!(errors, "Error: {}", NOT_RUNNING)?;
            continue;
        }

        kernel.submit(line);
        match await_response(kernel, token) {
            Some(OutputMessage::Expression(expression)) => writeln!(output, "{}", expression)?,
            Some(OutputMessage::Error(message)) => writeln!(errors, "Error: {}", message)?,
            None => return Ok(ReplExit::Interrupted),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use pretty_assertions::assert_eq;

    use crate::kernel::KernelConfig;

    use super::*;

    struct Session {
        exit: ReplExit,
        output: String,
        errors: String,
    }

    fn session(script: &str) -> Session {
        let mut kernel = Kernel::new(KernelConfig::default());
        kernel.start().unwrap();

        let mut output = vec![];
        let mut errors = vec![];
        let exit = run(&mut kernel, Cursor::new(script), &mut output, &mut errors, &InterruptToken::new()).unwrap();

        Session {
            exit,
            output: String::from_utf8(output).unwrap().replace(PROMPT, ""),
            errors: String::from_utf8(errors).unwrap(),
        }
    }

    #[test]
    fn prints_results_and_errors() {
        let session = session("(+ 1 2)\n\n(define a (list 1 2))\n(first b)\n");
        assert_eq!(session.exit, ReplExit::EndOfInput);
        assert_eq!(session.output, "(3)\n((1) (2))\n");
        assert_eq!(session.errors, "Error: Error during evaluation: unknown symbol `b`\n");
    }

    #[test]
    fn parse_errors_are_reported() {
        let session = session("(+ 1 2\n");
        assert!(session.errors.starts_with("Error: Invalid Expression. Could not parse"), "{}", session.errors);
    }

    #[test]
    fn stopped_kernel_refuses_input() {
        let session = session("%stop\n(+ 1 2)\n%start\n(+ 1 2)\n");
        assert_eq!(session.output, "(3)\n");
        assert_eq!(session.errors, "Error: interpreter kernel not running\n");
    }

    #[test]
    fn reset_clears_definitions() {
        let session = session("(define a 1)\n%reset\n(a)\n");
        assert_eq!(session.output, "(1)\n");
        assert!(session.errors.contains("unknown symbol"), "{}", session.errors);
    }

    #[test]
    fn exit_command_stops_reading() {
        let session = session("(+ 1 1)\n%exit\n(+ 2 2)\n");
        assert_eq!(session.exit, ReplExit::ExitCommand);
        assert_eq!(session.output, "(2)\n");
    }

    #[test]
    fn second_interrupt_requests_exit() {
        let token = InterruptToken::new();
        assert!(!token.exit_requested());
        assert!(!token.interrupt());
        assert!(token.interrupt());
        assert!(token.exit_requested());

        token.clear();
        assert!(!token.exit_requested());
        assert!(!token.clone().interrupt());
    }

    #[test]
    fn interrupted_wait_returns_control() {
        let kernel = Kernel::new(KernelConfig::default());
        let token = InterruptToken::new();
        token.interrupt();
        token.interrupt();

        // Nothing would ever answer a stopped kernel
        assert_eq!(await_response(&kernel, &token), None);
    }

    #[test]
    fn dead_kernel_does_not_hang_the_wait() {
        let kernel = Kernel::new(KernelConfig::default());
        kernel.submit("(+ 1 1)");
        assert_eq!(await_response(&kernel, &InterruptToken::new()), Some(OutputMessage::Error(NOT_RUNNING.to_owned())));
    }
}
