mod cli;
mod commands;
mod output;

use clap::Parser;
use taskcamp::{Client, Settings, notify::Notification};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("taskcamp=info".parse().unwrap()),
        )
        .init();

    let cli = cli::Cli::parse();
    tracing::debug!(api_url = %cli.api_url, "starting taskcamp");

    let settings = Settings::new(&cli.api_url)?.with_session_file(&cli.session_file);
    let client = Client::new(settings).await?;

    // Print notifications the way the web UI would show toasts
    let mut notifications = client.notifications();
    let printer = tokio::spawn(async move {
        while let Ok(notification) = notifications.recv().await {
            match notification {
                Notification::Info(message) => eprintln!("✓ {message}"),
                Notification::Error(message) => eprintln!("✗ {message}"),
                Notification::SessionExpired => {
                    eprintln!("✗ Session expired, please login again.")
                }
            }
        }
    });

    let result = commands::run(&client, cli.command).await;

    // Closing the client closes the notification channel, which lets the
    // printer drain and exit.
    drop(client);
    let _ = printer.await;

    if let Err(err) = result {
        // API and session-expiry failures were already shown by the
        // notification printer; everything else still needs a line.
        if err.api_message().is_none() && !err.is_auth_expired() && !err.is_network_error() {
            eprintln!("Error: {err}");
        }
        std::process::exit(1);
    }
    Ok(())
}
