use anyhow::{Context, anyhow};
use argh::FromArgs;
use std::env;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use wish::Interpreter;

/// Environment variable holding the log filter; logging is off when unset.
const LOG_ENV: &str = "WISH_LOG";

#[derive(FromArgs)]
/// Run commands typed at the prompt, or read them from a batch file.
struct WishArgs {
    #[argh(positional)]
    /// script to execute instead of reading from the terminal.
    batch_file: Option<PathBuf>,
}

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!("{error:#}");
            wish::error::report_message(&mut io::stderr());
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<()> {
    let argv: Vec<String> = env::args_os()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();
    let (program, rest) = argv.split_first().context("empty argument list")?;
    let rest: Vec<&str> = rest.iter().map(String::as_str).collect();
    let args = WishArgs::from_args(&[program.as_str()], &rest)
        .map_err(|early| anyhow!("invalid arguments: {}", early.output.trim()))?;

    let mut sh = Interpreter::default();
    match args.batch_file {
        Some(path) => {
            let file = File::open(&path)
                .with_context(|| format!("cannot open batch file {}", path.display()))?;
            sh.run_script(BufReader::new(file))
                .with_context(|| format!("cannot read batch file {}", path.display()))?;
        }
        None => sh.repl().context("cannot read from the terminal")?,
    }
    Ok(())
}

fn init_tracing() {
    let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) else {
        return;
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .init();
}
