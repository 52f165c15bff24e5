use anyhow::Context;
use std::path::PathBuf;

#[derive(Debug, Default)]
struct CliArgs {
    script: Option<PathBuf>,
    log: bool,
}

fn main() -> anyhow::Result<()> {
    let args = parse_args(std::env::args().skip(1).collect())?;
    teleprompt::telemetry::init_tracing(teleprompt::telemetry::logging_requested(args.log));

    let script = match &args.script {
        Some(path) => Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("failed to read script {}", path.display()))?,
        ),
        None => None,
    };

    teleprompt::app::run_with_startup(teleprompt::app::AppStartupOptions { script })
}

fn parse_args(args: Vec<String>) -> anyhow::Result<CliArgs> {
    let mut out = CliArgs::default();
    let mut index = 0;
    while index < args.len() {
        match args[index].as_str() {
            "--script" => {
                index += 1;
                let Some(value) = args.get(index) else {
                    anyhow::bail!("--script requires a file path");
                };
                if value.trim().is_empty() {
                    anyhow::bail!("--script cannot be empty");
                }
                out.script = Some(PathBuf::from(value.trim()));
            }
            "--log" => out.log = true,
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            other => anyhow::bail!("unknown argument {other}"),
        }
        index += 1;
    }
    Ok(out)
}

fn print_help() {
    println!("Teleprompt");
    println!("  --script <path>   Load a text file into the editor");
    println!("  --log             Write a JSON trace log (see TELEPROMPT_TRACE_LOG)");
}
