use std::process::ExitCode;

fn main() -> ExitCode {
    homerent_cli::run()
}
