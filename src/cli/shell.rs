use std::{env, fs};

use crate::cli::{commands, shell_context::ShellContext};
use crate::core::errors::CliError;

/// Entry point for the CLI binary. Returns the process exit code.
pub fn run_cli() -> i32 {
    let args: Vec<String> = env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {err}");
            1
        }
    }
}

fn run(args: &[String]) -> Result<(), CliError> {
    let mut ctx = ShellContext::bootstrap()?;
    if args.first().map(String::as_str) == Some("--script") {
        let path = args
            .get(1)
            .ok_or_else(|| CliError::Input("--script expects a file path".into()))?;
        run_script(&mut ctx, path)?;
    } else {
        commands::execute(&mut ctx, args)?;
    }
    ctx.persist()
}

/// Executes one command per script line. Blank lines and `#` comments are
/// ignored; the first failing line aborts the run.
fn run_script(ctx: &mut ShellContext, path: &str) -> Result<(), CliError> {
    let script = fs::read_to_string(path)
        .map_err(|err| CliError::Command(format!("cannot read script `{path}`: {err}")))?;
    for (number, line) in script.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let tokens = shell_words::split(line).map_err(|err| {
            CliError::Input(format!("line {}: unbalanced quoting: {err}", number + 1))
        })?;
        commands::execute(ctx, &tokens).map_err(|err| {
            CliError::Command(format!("line {} (`{line}`): {err}", number + 1))
        })?;
    }
    Ok(())
}
