use std::process::ExitCode;

fn main() -> ExitCode {
    hembi_cli::run()
}
