use std::sync::Arc;

use plotscript::{repl::{InterruptToken, PROMPT}, Kernel, KernelConfig, OutputMessage};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt};

async fn query(stdout: &mut io::Stdout, lines: &mut io::Lines<io::BufReader<io::Stdin>>) -> io::Result<Option<String>> {
    stdout.write_all(PROMPT.as_bytes()).await?;
    stdout.flush().await?;
    lines.next_line().await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    plotscript::init_tracing();

    let mut kernel = Kernel::new(KernelConfig::default());
    kernel.start()?;

    // Ctrl-C twice in a row leaves, once only clears the current line
    let token = InterruptToken::new();
    let listener = token.clone();
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if listener.interrupt() { std::process::exit(1); }
        }
    });

    let mut lines = io::BufReader::new(io::stdin()).lines();
    let mut stdout = io::stdout();

    while let Some(line) = query(&mut stdout, &mut lines).await? {
        token.clear();
        if line.trim().is_empty() { continue; }

        kernel.submit(line);
        let output = Arc::clone(kernel.output());
        match tokio::task::spawn_blocking(move || output.wait_pop()).await? {
            OutputMessage::Expression(expression) => println!("{}", expression),
            OutputMessage::Error(message) => eprintln!("Error: {}", message),
        }
    }

    Ok(())
}
