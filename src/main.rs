use std::process::ExitCode;

fn main() -> ExitCode {
    mcserver_updater_lib::run()
}
