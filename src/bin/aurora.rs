use std::{
    fs, io,
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::{Parser, Subcommand};

use aurora::{
    Interpreter, Repl, Token,
    config::{Config, DEFAULT_CONFIG_FILE},
    diagnostics::{ErrorKind, Result, fatal},
    environment::SCRIPT,
    logging::{DEFAULT_LOG_FILE, LogLevels, Logger},
};

#[derive(Parser)]
#[command(author, version, about = "Aurora language interpreter")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
    /// Script to run when no subcommand is given
    script: Option<PathBuf>,
    /// Print verbose log messages
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Print debug log messages
    #[arg(short, long, global = true)]
    debug: bool,
    /// Print warning log messages
    #[arg(short = 'w', long = "warn", global = true)]
    warning: bool,
    /// Keep log messages out of the terminal
    #[arg(long, global = true)]
    no_console: bool,
    /// File the log messages are written to
    #[arg(long, global = true, value_name = "PATH")]
    logfile: Option<PathBuf>,
    /// Only enable the log levels named by flags, and treat every
    /// configurable error as fatal
    #[arg(short, long, global = true)]
    strict: bool,
    /// JSON configuration file
    #[arg(long, global = true, value_name = "PATH")]
    config_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Run an Aurora script file
    Run { script: PathBuf },
    /// Start an interactive REPL session
    Repl,
    /// Evaluate a single line of Aurora code
    Eval { line: String },
}

fn main() -> ExitCode {
    let args = Args::parse();
    match execute(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("[ERROR] {err}");
            ExitCode::FAILURE
        }
    }
}

fn execute(args: Args) -> Result<()> {
    let config = match &args.config_file {
        Some(path) => Config::load(path, true)?,
        None => Config::load(Path::new(DEFAULT_CONFIG_FILE), false)?,
    };
    let strict = args.strict || config.strict;
    install_logger(&args, &config, strict)?;

    let mut policy = config.policy();
    policy.strict = strict;
    let interpreter = Interpreter::new()
        .with_policy(policy)
        .with_max_depth(config.max_expression_depth)
        .with_max_string_length(config.max_string_length);

    match (args.command, args.script) {
        (Some(Command::Run { script }), _) | (None, Some(script)) => {
            run_script(interpreter, &script)
        }
        (Some(Command::Eval { line }), _) => {
            let mut interpreter = interpreter;
            let value = interpreter.run_line(&line)?;
            if value != Token::Null {
                println!("{}", value.repr());
            }
            Ok(())
        }
        (Some(Command::Repl), _) | (None, None) => Repl::with_interpreter(interpreter).run(),
    }
}

/// Nothing is installed, and no log file touched, when every level is off.
fn install_logger(args: &Args, config: &Config, strict: bool) -> Result<()> {
    let levels = LogLevels::resolve(
        args.debug || config.debug,
        args.verbose || config.verbose,
        args.warning || config.warning,
        strict,
    );
    if levels == LogLevels::default() {
        return Ok(());
    }
    let path = args
        .logfile
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));
    Logger::new(
        levels,
        &path,
        config.clear_log_file,
        args.no_console || config.no_console,
    )?
    .with_timestamps(config.show_timestamp)
    .install()?;
    log::debug!("log levels enabled: {levels:?}");
    Ok(())
}

fn run_script(mut interpreter: Interpreter, path: &Path) -> Result<()> {
    if path.extension().and_then(|ext| ext.to_str()) != Some("aur") {
        log::warn!(
            "'{}' does not have the .aur extension; running it anyway",
            path.display()
        );
    }
    let source = fs::read_to_string(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => fatal(
            ErrorKind::FileNotFound,
            format!("the script '{}' does not exist", path.display()),
        ),
        _ => err.into(),
    })?;
    interpreter
        .variables_mut()
        .define_system(SCRIPT, Token::string(path.display().to_string()));
    interpreter.run_source(&source)?;
    Ok(())
}
