use exam_scheduler::config::ServerConfig;
use exam_scheduler::server;
use log::error;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = server::run_server(config).await {
        error!("Server stopped: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
