//! Server health probe.

use taskcamp::Client;

use crate::output;

pub async fn check(client: &Client) -> taskcamp::Result<()> {
    match client.health().await {
        Ok(payload) => {
            println!("Server is healthy");
            output::print_json(&payload);
            Ok(())
        }
        Err(err) => {
            eprintln!("Server is unreachable: {err}");
            Err(err)
        }
    }
}
