use std::sync::Arc;

use plotscript::{Kernel, KernelConfig, OutputMessage, OutputQueue};

fn main() -> anyhow::Result<()> {
    let programs = [
        "(square 12)",
        "(map square (range 1 5 1))",
        "(begin (define r 10) (* pi (square r)))",
        "(sqrt (- (square 4)))",
        "(square (list 1 2))",
    ];

    let config = KernelConfig::default().with_startup_program("(define square (lambda (x) (* x x)))");

    // Every program gets its own interpreter, so they can all run at once
    let runs = programs.iter()
        .map(|program| {
            let output = Arc::new(OutputQueue::new());
            let handle = Kernel::oneshot(*program, Arc::clone(&output), &config)?;
            Ok((program, output, handle))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    for (program, output, handle) in runs {
        handle.join().map_err(|_| anyhow::anyhow!("interpreter thread panicked"))?;
        match output.wait_pop() {
            OutputMessage::Expression(expression) => println!("{} => {}", program, expression),
            OutputMessage::Error(message) => println!("{} => Error: {}", program, message),
        }
    }

    Ok(())
}
