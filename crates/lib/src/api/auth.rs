//! Authentication and profile operations.
//!
//! Login and `current_user` keep the session store in sync with the server;
//! logout clears both the session and the whole cache so the next login
//! starts clean. Password-recovery and email-verification endpoints are
//! plain unauthenticated posts.

use super::{Client, types::*};
use crate::{
    Result,
    cache::QueryKey,
    http::{ApiRequest, FileUpload, MultipartSpec},
};

/// Cache key for the current-user profile.
pub fn current_user_key() -> QueryKey {
    QueryKey::new(["currentUser"])
}

/// Authentication operations, obtained via [`Client::auth`].
pub struct AuthApi<'a> {
    client: &'a Client,
}

impl<'a> AuthApi<'a> {
    pub(super) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Log in with email and password.
    ///
    /// On success the server sets the session cookies, the session store is
    /// marked authenticated, and the returned profile is the logged-in user.
    pub async fn login(&self, email: impl Into<String>, password: impl Into<String>) -> Result<User> {
        let body = LoginRequest {
            email: email.into(),
            password: password.into(),
        };
        let user: User = self
            .client
            .write(&[], ApiRequest::post("/auth/login").json(&body)?)
            .await?;
        self.client.session().set(user.clone()).await?;
        self.client.notifier().info("Logged in successfully!");
        tracing::info!(user = %user.username, "logged in");
        Ok(user)
    }

    /// Register a new account. The server sends a verification email.
    pub async fn register(&self, request: RegisterRequest) -> Result<()> {
        self.client
            .write_ack(&[], ApiRequest::post("/auth/register").json(&request)?)
            .await?;
        self.client.notifier().info("Registered successfully!");
        Ok(())
    }

    /// Log out and drop all local state derived from the session.
    pub async fn logout(&self) -> Result<()> {
        self.client
            .write_ack(&[], ApiRequest::post("/auth/logout"))
            .await?;
        self.client.session().clear().await?;
        self.client.cache().clear();
        self.client.notifier().info("Logged out successfully!");
        tracing::info!("logged out");
        Ok(())
    }

    /// Fetch the current user's profile, refreshing the session store.
    pub async fn current_user(&self) -> Result<User> {
        let user: User = self
            .client
            .read(current_user_key(), "/auth/current-user")
            .await?;
        self.client.session().set(user.clone()).await?;
        Ok(user)
    }

    /// Request a password-reset email.
    pub async fn forgot_password(&self, email: impl Into<String>) -> Result<()> {
        let body = serde_json::json!({ "email": email.into() });
        self.client
            .write_ack(&[], ApiRequest::post("/auth/forgot-password").json(&body)?)
            .await?;
        self.client
            .notifier()
            .info("Password reset link sent to your email!");
        Ok(())
    }

    /// Set a new password using a reset token from the email link.
    pub async fn reset_password(
        &self,
        reset_token: &str,
        new_password: impl Into<String>,
    ) -> Result<()> {
        let body = serde_json::json!({ "newPassword": new_password.into() });
        self.client
            .write_ack(
                &[],
                ApiRequest::post(format!("/auth/reset-password/{reset_token}")).json(&body)?,
            )
            .await
    }

    /// Change the password of the logged-in user.
    pub async fn change_password(&self, request: ChangePasswordRequest) -> Result<()> {
        self.client
            .write_ack(&[], ApiRequest::post("/auth/change-password").json(&request)?)
            .await?;
        self.client.notifier().info("Password changed successfully!");
        Ok(())
    }

    /// Upload a new profile picture (multipart).
    pub async fn update_avatar(&self, upload: FileUpload) -> Result<User> {
        let spec = MultipartSpec::new().file("avatar", upload);
        let user: User = self
            .client
            .write(
                &[current_user_key()],
                ApiRequest::patch("/auth/avatar").multipart(spec),
            )
            .await?;
        self.client.session().set(user.clone()).await?;
        self.client
            .notifier()
            .info("Profile picture updated successfully!");
        Ok(user)
    }

    /// Ask the server to resend the verification email.
    pub async fn resend_verification(&self, email: impl Into<String>) -> Result<()> {
        let body = serde_json::json!({ "email": email.into() });
        self.client
            .write_ack(
                &[],
                ApiRequest::post("/auth/resend-email-verification").json(&body)?,
            )
            .await
    }

    /// Verify an email address with the token from the verification link.
    pub async fn verify_email(&self, verification_token: &str) -> Result<()> {
        self.client
            .write_ack(
                &[],
                ApiRequest::get(format!("/auth/verify-email/{verification_token}")),
            )
            .await
    }
}
