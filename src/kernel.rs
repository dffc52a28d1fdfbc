use std::{io, sync::{atomic::{AtomicBool, Ordering}, Arc}, thread::{self, JoinHandle}, time::Duration};

use crate::{expression::Expression, interpreter::Interpreter, message_queue::MessageQueue};


pub type InputMessage = String;

#[derive(Debug, Clone, PartialEq)]
pub enum OutputMessage {
    Expression(Expression),
    Error(String),
}

pub type InputQueue = MessageQueue<InputMessage>;
pub type OutputQueue = MessageQueue<OutputMessage>;

#[derive(Debug, Clone)]
pub struct KernelConfig {
    pub startup_program: Option<String>,
    pub poll_interval: Duration,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self { startup_program: None, poll_interval: Duration::from_millis(10) }
    }
}

impl KernelConfig {
    pub fn with_startup_program(mut self, program: impl Into<String>) -> Self {
        self.startup_program = Some(program.into());
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

fn respond(interpreter: &mut Interpreter, program: &str) -> OutputMessage {
    match interpreter.evaluate_str(program) {
        Ok(expression) => OutputMessage::Expression(expression),
        Err(error) => OutputMessage::Error(error.to_string()),
    }
}

// The startup program gets no response, so a failure can only be logged
fn prepared_interpreter(config: &KernelConfig) -> Interpreter {
    let mut interpreter = Interpreter::new();
    if let Some(program) = &config.startup_program {
        if let Err(error) = interpreter.evaluate_str(program) {
            tracing::warn!(%error, "startup program failed");
        }
    }
    interpreter
}

fn run_worker(input: Arc<InputQueue>, output: Arc<OutputQueue>, active: Arc<AtomicBool>, config: KernelConfig) {
    let mut interpreter = prepared_interpreter(&config);

    while active.load(Ordering::Acquire) {
        let Some(program) = input.wait_pop_timeout(config.poll_interval) else { continue };
        output.push(respond(&mut interpreter, &program));
    }

    tracing::debug!("kernel worker exiting");
}

/// An interpreter running on its own thread, fed through an input queue and
/// answering on an output queue with exactly one message per program.
pub struct Kernel {
    input: Arc<InputQueue>,
    output: Arc<OutputQueue>,
    config: KernelConfig,
    active: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl Kernel {
    pub fn new(config: KernelConfig) -> Self {
        Self::with_queues(Arc::new(MessageQueue::new()), Arc::new(MessageQueue::new()), config)
    }

    pub fn with_queues(input: Arc<InputQueue>, output: Arc<OutputQueue>, config: KernelConfig) -> Self {
        Self { input, output, config, active: Arc::new(AtomicBool::new(false)), worker: None }
    }

    pub fn start(&mut self) -> io::Result<()> {
        if self.is_active() { return Ok(()); }
        // Reap a worker that died on its own
        self.stop();

        self.active.store(true, Ordering::Release);
        let input = Arc::clone(&self.input);
        let output = Arc::clone(&self.output);
        let active = Arc::clone(&self.active);
        let config = self.config.clone();

        let spawned = thread::Builder::new()
            .name("plotscript-kernel".to_owned())
            .spawn(move || run_worker(input, output, active, config));

        match spawned {
            Ok(worker) => {
                self.worker = Some(worker);
                tracing::debug!("kernel started");
                Ok(())
            }
            Err(error) => {
                self.active.store(false, Ordering::Release);
                Err(error)
            }
        }
    }

    pub fn stop(&mut self) {
        self.active.store(false, Ordering::Release);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::warn!("kernel worker panicked");
            }
            tracing::debug!("kernel stopped");
        }
    }

    /// Replace the worker with a fresh one, discarding every definition
    pub fn reset(&mut self) -> io::Result<()> {
        tracing::debug!("resetting kernel");
        self.stop();
        self.start()
    }

    pub fn is_active(&self) -> bool {
        self.worker.as_ref().is_some_and(|worker| !worker.is_finished())
    }

    pub fn submit(&self, program: impl Into<InputMessage>) {
        self.input.push(program.into());
    }

    pub fn try_recv(&self) -> Option<OutputMessage> {
        self.output.try_pop()
    }

    pub fn recv(&self) -> OutputMessage {
        self.output.wait_pop()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<OutputMessage> {
        self.output.wait_pop_timeout(timeout)
    }

    pub fn input(&self) -> &Arc<InputQueue> {
        &self.input
    }

    pub fn output(&self) -> &Arc<OutputQueue> {
        &self.output
    }

    /// Evaluate a single program on a fresh interpreter in its own thread,
    /// publishing the one response to `output`
    pub fn oneshot(program: impl Into<InputMessage>, output: Arc<OutputQueue>, config: &KernelConfig) -> io::Result<JoinHandle<()>> {
        let program = program.into();
        let config = config.clone();

        thread::Builder::new()
            .name("plotscript-oneshot".to_owned())
            .spawn(move || {
                let mut interpreter = prepared_interpreter(&config);
                output.push(respond(&mut interpreter, &program));
            })
    }
}

impl Drop for Kernel {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn started(config: KernelConfig) -> Kernel {
        let mut kernel = Kernel::new(config);
        kernel.start().unwrap();
        kernel
    }

    fn evaluate(kernel: &Kernel, program: &str) -> OutputMessage {
        kernel.submit(program);
        kernel.recv_timeout(TIMEOUT).expect("kernel did not answer")
    }

    #[test]
    fn answers_each_program() {
        let kernel = started(KernelConfig::default());
        assert!(kernel.is_active());
        assert_eq!(evaluate(&kernel, "(+ 1 2)"), OutputMessage::Expression(Expression::from(3.0)));
        assert_eq!(evaluate(&kernel, "(list 1 2)"), OutputMessage::Expression(Expression::list(vec![1.0.into(), 2.0.into()])));
    }

    #[test]
    fn responses_keep_submission_order() {
        let kernel = started(KernelConfig::default());
        for i in 0..20 {
            kernel.submit(format!("(+ {} 0)", i));
        }
        for i in 0..20 {
            assert_eq!(kernel.recv_timeout(TIMEOUT), Some(OutputMessage::Expression(Expression::from(i as f64))));
        }
    }

    #[test]
    fn errors_are_published_and_the_worker_survives() {
        let kernel = started(KernelConfig::default());

        let OutputMessage::Error(message) = evaluate(&kernel, "(f") else { panic!("expected a parse error") };
        assert!(message.starts_with("Invalid Expression. Could not parse"), "{}", message);

        let OutputMessage::Error(message) = evaluate(&kernel, "(undefined)") else { panic!("expected an evaluation error") };
        assert!(message.starts_with("Error during evaluation"), "{}", message);

        assert_eq!(evaluate(&kernel, "(+ 1 1)"), OutputMessage::Expression(Expression::from(2.0)));
    }

    #[test]
    fn reset_forgets_definitions() {
        let mut kernel = started(KernelConfig::default());
        evaluate(&kernel, "(define a 1)");
        assert_eq!(evaluate(&kernel, "(a)"), OutputMessage::Expression(Expression::from(1.0)));

        kernel.reset().unwrap();
        assert!(kernel.is_active());
        assert!(matches!(evaluate(&kernel, "(a)"), OutputMessage::Error(_)));
    }

    #[test]
    fn stopped_kernels_leave_input_queued() {
        let mut kernel = started(KernelConfig::default());
        kernel.stop();
        assert!(!kernel.is_active());

        kernel.submit("(* 2 3)");
        assert_eq!(kernel.recv_timeout(Duration::from_millis(50)), None);
        assert_eq!(kernel.input().len(), 1);

        kernel.start().unwrap();
        assert_eq!(kernel.recv_timeout(TIMEOUT), Some(OutputMessage::Expression(Expression::from(6.0))));
    }

    #[test]
    fn startup_program_runs_before_input() {
        let config = KernelConfig::default().with_startup_program("(define answer 42)");
        let kernel = started(config);
        assert_eq!(evaluate(&kernel, "(answer)"), OutputMessage::Expression(Expression::from(42.0)));
    }

    #[test]
    fn failed_startup_program_is_not_published() {
        let config = KernelConfig::default().with_startup_program("(define");
        let kernel = started(config);
        assert_eq!(evaluate(&kernel, "(+ 1 1)"), OutputMessage::Expression(Expression::from(2.0)));
        assert!(kernel.output().is_empty());
    }

    #[test]
    fn dead_worker_is_not_active() {
        let mut kernel = Kernel::new(KernelConfig::default());
        kernel.worker = Some(thread::spawn(|| panic!("worker died")));

        let deadline = std::time::Instant::now() + TIMEOUT;
        while kernel.is_active() && std::time::Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        assert!(!kernel.is_active());

        kernel.start().unwrap();
        assert!(kernel.is_active());
        assert_eq!(evaluate(&kernel, "(+ 2 2)"), OutputMessage::Expression(Expression::from(4.0)));
    }

    #[test]
    fn oneshot_publishes_one_response() {
        let output = Arc::new(OutputQueue::new());
        Kernel::oneshot("(* 6 7)", Arc::clone(&output), &KernelConfig::default())
            .unwrap()
            .join()
            .unwrap();

        assert_eq!(output.try_pop(), Some(OutputMessage::Expression(Expression::from(42.0))));
        assert!(output.is_empty());
    }

    #[test]
    fn shared_queues_are_visible_to_the_owner() {
        let input = Arc::new(InputQueue::new());
        let output = Arc::new(OutputQueue::new());
        let mut kernel = Kernel::with_queues(Arc::clone(&input), Arc::clone(&output), KernelConfig::default());
        kernel.start().unwrap();

        input.push("(sqrt 4)".to_owned());
        assert_eq!(output.wait_pop_timeout(TIMEOUT), Some(OutputMessage::Expression(Expression::from(2.0))));
    }
}
