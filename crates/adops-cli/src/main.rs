#![forbid(unsafe_code)]

fn main() -> std::process::ExitCode {
    adops_cli::main_entry()
}
