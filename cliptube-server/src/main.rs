use cliptube_server::{init_logger, run_server};
use colored::Colorize;
use log::error;

#[tokio::main]
async fn main() {
    init_logger();

    if let Err(error) = run_server().await {
        error!(
            "{} Read the error below to troubleshoot the issue.",
            "cliptube failed to start!".bold().red()
        );
        error!("{error}");
        error!("{}", format!("Hint: {}", error.hint()).dimmed().italic());
    }
}
