//! Command implementations.

mod auth;
mod health;
mod projects;
mod tasks;

use taskcamp::Client;

use crate::cli::Commands;

/// Dispatch a parsed command against the client.
pub async fn run(client: &Client, command: Commands) -> taskcamp::Result<()> {
    match command {
        Commands::Login(args) => auth::login(client, args).await,
        Commands::Logout => auth::logout(client).await,
        Commands::Whoami => auth::whoami(client).await,
        Commands::Health => health::check(client).await,
        Commands::Project(command) => projects::run(client, command).await,
        Commands::Task(command) => tasks::run(client, command).await,
    }
}
