//! Password prompt collaborator.

use async_trait::async_trait;
use zeroize::Zeroizing;

/// What the user did at a password prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordReply {
    Entered(Zeroizing<String>),
    Cancelled,
}

impl PasswordReply {
    /// Treat an empty entry as a cancelled prompt.
    pub fn from_input(input: String) -> Self {
        if input.is_empty() {
            Self::Cancelled
        } else {
            Self::Entered(Zeroizing::new(input))
        }
    }
}

/// Source of account passwords.
#[async_trait]
pub trait PasswordPrompt: Send + Sync {
    /// Ask for the password that will encrypt a new account.
    async fn prompt_new(&self) -> std::io::Result<PasswordReply>;

    /// Ask for the password of the existing account.
    async fn prompt_existing(&self) -> std::io::Result<PasswordReply>;
}

/// Reads passwords from the controlling terminal without echo.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl TerminalPrompt {
    async fn ask(label: &'static str) -> std::io::Result<PasswordReply> {
        let input = tokio::task::spawn_blocking(move || rpassword::prompt_password(label))
            .await
            .map_err(std::io::Error::other)??;
        Ok(PasswordReply::from_input(input))
    }
}

#[async_trait]
impl PasswordPrompt for TerminalPrompt {
    async fn prompt_new(&self) -> std::io::Result<PasswordReply> {
        Self::ask("New password for account: ").await
    }

    async fn prompt_existing(&self) -> std::io::Result<PasswordReply> {
        Self::ask("Password: ").await
    }
}
