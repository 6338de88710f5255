use std::env;
use std::path::Path;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use dotenv::dotenv;
use file_logger::{debug, error, fatal, info, warning, ConsoleSink, Logger};

mod config;
use config::{Config, LogTarget};

const CONFIG_ENV: &str = "LOGGER_CONFIG";
const PAUSE: Duration = Duration::from_secs(1);

fn main() -> ExitCode {
    dotenv().ok();

    let path = env::var(CONFIG_ENV).unwrap_or_else(|_| "config.json".to_string());
    let cfg = match Config::load(Path::new(&path)) {
        Ok(cfg) => cfg,
        Err(config::ConfigError::Read { .. }) => {
            eprintln!("{} not found, using defaults", path);
            match Config::parse("{}") {
                Ok(cfg) => cfg,
                Err(err) => return fail(&err),
            }
        }
        Err(err) => return fail(&err),
    };

    let logger = match cfg.target {
        LogTarget::File => Logger::new(cfg.logger),
        LogTarget::Console => Logger::with_sink(cfg.logger, ConsoleSink),
    };
    let logger = match logger {
        Ok(logger) => logger,
        Err(err) => return fail(&err),
    };

    let diagnostics = logger.diagnostics();
    thread::spawn(move || {
        for diagnostic in diagnostics.iter() {
            eprintln!("logger diagnostic: {}", diagnostic);
        }
    });

    run(&logger, cfg.iterations);

    match logger.close() {
        Ok(report) => {
            println!("{:?}", report);
            ExitCode::SUCCESS
        }
        Err(err) => fail(&err),
    }
}

fn run(logger: &Logger,
       iterations: Option<u64>
) {
    let mut round = 0;
    while iterations.map_or(true, |limit| round < limit) {
        debug!(logger, "debug message");
        info!(logger, "info message");
        warning!(logger, "warning message");
        let id = 1000;
        let name = "hey hey";
        error!(logger, "error message, {}, {}", id, name);
        fatal!(logger, "fatal message");

        round += 1;
        thread::sleep(PAUSE);
    }
}

fn fail(err: &dyn std::error::Error) -> ExitCode {
    eprintln!("Error: {}", err);
    let mut source = err.source();
    while let Some(cause) = source {
        eprintln!("  caused by: {}", cause);
        source = cause.source();
    }
    ExitCode::FAILURE
}
