use std::process::ExitCode;

fn main() -> ExitCode {
    salit_cli::run()
}
