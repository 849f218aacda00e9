use std::process::ExitCode;

fn main() -> ExitCode {
    cli_lib::run_cli()
}
