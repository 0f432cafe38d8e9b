//! Login, logout, and whoami.

use taskcamp::Client;

use crate::cli::LoginArgs;

pub async fn login(client: &Client, args: LoginArgs) -> taskcamp::Result<()> {
    let user = client.auth().login(args.email, args.password).await?;
    println!("Logged in as {} <{}>", user.username, user.email);
    Ok(())
}

pub async fn logout(client: &Client) -> taskcamp::Result<()> {
    client.auth().logout().await?;
    println!("Logged out");
    Ok(())
}

pub async fn whoami(client: &Client) -> taskcamp::Result<()> {
    // Prefer the locally persisted session; fall back to the server when the
    // session file has no profile yet.
    let user = match client.session().current_user().await {
        Some(user) => user,
        None => client.auth().current_user().await?,
    };
    println!("{} <{}>", user.username, user.email);
    println!("  id:       {}", user.id);
    println!("  name:     {}", user.full_name);
    println!("  verified: {}", user.is_email_verified);
    Ok(())
}
