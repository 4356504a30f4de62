//! Stdio transport.
//!
//! Reads one JSON request per line from stdin and writes one JSON response per
//! line to stdout. Runs until stdin closes or a shutdown signal arrives, then
//! tears down every registered connection.

use crate::error::{DbError, DbResult};
use crate::service::AdapterService;
use crate::transport::Transport;
use crate::transport::request::handle_line;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::signal;
use tracing::{info, warn};

pub struct StdioTransport {
    service: AdapterService,
}

impl StdioTransport {
    pub fn new(service: AdapterService) -> Self {
        Self { service }
    }

    async fn serve(&self) -> DbResult<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();

        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| DbError::internal(format!("Failed to read stdin: {}", e)))?
        {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let response = handle_line(&self.service, line).await;
            let mut out = response.to_line();
            out.push('\n');
            stdout
                .write_all(out.as_bytes())
                .await
                .map_err(|e| DbError::internal(format!("Failed to write stdout: {}", e)))?;
            stdout
                .flush()
                .await
                .map_err(|e| DbError::internal(format!("Failed to flush stdout: {}", e)))?;
        }

        info!("Stdin closed");
        Ok(())
    }
}

impl Transport for StdioTransport {
    async fn run(&self) -> DbResult<()> {
        info!("Reading requests from stdin");

        let result = tokio::select! {
            result = self.serve() => result,
            _ = wait_for_signal() => {
                info!("Shutdown signal received");
                Ok(())
            }
        };

        info!("Closing all database connections");
        self.service.teardown(None).await?;
        result
    }

    fn name(&self) -> &'static str {
        "stdio"
    }
}

/// Wait for a shutdown signal (SIGINT or SIGTERM).
async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT");
        }
        _ = terminate => {
            info!("Received SIGTERM");
        }
    }
}
