use std::process::ExitCode;

fn main() -> ExitCode {
    // Diagnostics go to stderr; `RUST_LOG=info` shows verdicts and Cp/Cpk.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match spc_capability::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}
