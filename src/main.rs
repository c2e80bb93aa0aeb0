use std::process::ExitCode;

fn main() -> ExitCode {
    match ledgerview::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("lv: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}
