//! Driver entry point: reads commands from stdin, prints results to stdout.

use app::driver::{self, Command, Output};
use app::{App, Config, LogFormat};
use domain::TicTacToe;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    // Logs go to stderr so they never interleave with command output.
    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

#[tokio::main]
async fn main() {
    // 1. Load configuration and initialize tracing
    let config = Config::from_env();
    init_tracing(&config);

    // 2. Install the Prometheus exporter, if asked to
    if let Some(addr) = config.metrics_addr {
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .expect("failed to install Prometheus exporter");
        tracing::info!(%addr, "serving metrics");
    }

    // 3. Start the runtime
    let app = App::new(TicTacToe).expect("failed to start application");

    // 4. Read commands until EOF, `quit` or Ctrl-C
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line,
            _ = signal::ctrl_c() => {
                tracing::info!("received SIGINT, shutting down");
                break;
            }
        };
        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(error) => {
                tracing::error!(%error, "failed to read stdin");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let result = match line.parse::<Command>() {
            Ok(command) => driver::execute(&app, command).await,
            Err(error) => Err(error),
        };
        match result {
            Ok(Output::Text(text)) => println!("{text}"),
            Ok(Output::Watch(mut watch)) => {
                println!("watching {} as {}", watch.aggregate_id, watch.token);
                tokio::spawn(async move {
                    let game = watch.aggregate_id.clone();
                    while let Some(signal) = watch.next().await {
                        println!("{game}: {signal}");
                    }
                });
            }
            Ok(Output::Quit) => break,
            Err(error) => println!("error: {error}"),
        }
    }

    // 5. Drain queued requests and stop the dispatcher
    if let Err(error) = app.shutdown().await {
        tracing::error!(%error, "shutdown failed");
    }
}
