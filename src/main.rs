use anyhow::Result;
use tracing::{error, info};

use reportes_gps::config::{Command, Config};
use reportes_gps::{logging, web};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_args();

    // Handle version subcommand
    if let Some(Command::Version) = &config.command {
        println!(
            "reportes-gps {}, commit: {}, build_date: {}",
            env!("CARGO_PKG_VERSION"),
            option_env!("VERGEN_GIT_SHA").unwrap_or("unknown"),
            option_env!("VERGEN_BUILD_TIMESTAMP").unwrap_or("unknown"),
        );
        return Ok(());
    }

    logging::init(&config.log_format, &config.log_level);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        commit = option_env!("VERGEN_GIT_SHA").unwrap_or("unknown"),
        build_date = option_env!("VERGEN_BUILD_TIMESTAMP").unwrap_or("unknown"),
        "reportes-gps starting"
    );

    if let Err(e) = config.validate() {
        error!(error = %e, "Configuration validation failed");
        std::process::exit(1);
    }

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    let mut server = tokio::spawn(web::run(config, shutdown_rx));

    let interrupted = tokio::select! {
        result = &mut server => {
            exit_on_failure(result);
            false
        }
        _ = tokio::signal::ctrl_c() => true,
    };

    if interrupted {
        info!("Received shutdown signal");
        let _ = shutdown_tx.send(true);
        // Let in-flight requests finish
        exit_on_failure(server.await);
    }

    info!("Shutdown complete");
    Ok(())
}

fn exit_on_failure(result: Result<Result<()>, tokio::task::JoinError>) {
    match result {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            error!(error = %e, "Application error");
            std::process::exit(1);
        }
        Err(e) => {
            error!(error = %e, "Server task failed");
            std::process::exit(1);
        }
    }
}
