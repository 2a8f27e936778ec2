use dlms_client::SerialConnection;
use dlms_reader::error::{ReaderError, ReaderResult};
use dlms_reader::orchestrator::execute;
use dlms_reader::usage::diagnostic;

fn main() {
    env_logger::init_from_env(env_logger::Env::new().filter_or("DLMS_LOG_LEVEL", "warn"));

    match read() {
        Ok(line) => println!("{}", line),
        Err(e) => {
            log::debug!("Exiting with status {}", e.exit_code());
            eprint!("{}", diagnostic(&e));
            std::process::exit(e.exit_code());
        }
    }
}

fn read() -> ReaderResult<String> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| ReaderError::Transport(e.into()))?;
    runtime.block_on(execute(std::env::args_os(), SerialConnection::new))
}
