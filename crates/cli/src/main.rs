use std::process::ExitCode;

fn main() -> ExitCode {
    stockwise_cli::run()
}
