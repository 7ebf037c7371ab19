use std::io::{self, BufRead, IsTerminal, Write};

use linework_engine::core::HarnessConfig;
use linework_engine::device::GpuInit;
use linework_engine::logging::{init_logging, LoggingConfig};
use linework_engine::window::{Runtime, RuntimeConfig};

fn main() {
    init_logging(LoggingConfig::default());

    // Program stages are read from the bundled shader files.
    let harness = HarnessConfig::default();

    match Runtime::run(RuntimeConfig::default(), harness, GpuInit::default()) {
        Ok(summary) => log::debug!("exited after {} frames", summary.frames),
        Err(err) => {
            eprintln!("{err}");
            wait_for_acknowledgment();
            std::process::exit(-1);
        }
    }
}

/// Keeps the diagnostic visible when started from a terminal.
fn wait_for_acknowledgment() {
    let stdin = io::stdin();
    if !stdin.is_terminal() {
        return;
    }

    eprint!("Press Enter to exit...");
    let _ = io::stderr().flush();

    let mut line = String::new();
    let _ = stdin.lock().read_line(&mut line);
}
