//! Error types for the auth decorator.

/// Errors raised while configuring, initializing or logging out.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required setting was not present in the injected config map.
    #[error("missing setting: {0}")]
    MissingSetting(&'static str),

    /// A configured or stored URL could not be parsed.
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The HTTP request could not be sent or its body could not be read.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The configuration endpoint answered with a non-success status.
    #[error("configuration request failed with status {status}: {body}")]
    ConfigRequest { status: u16, body: String },

    /// The end-session POST was neither redirected nor successful.
    #[error("Logout failed, request returned an error code.")]
    LogoutFailed { status: u16 },

    /// The SQLite hint store failed.
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// The hint store's directory could not be created.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The injector handed back a value of the wrong kind for a key.
    #[error("injector returned {found} for {expected}")]
    Injection {
        expected: &'static str,
        found: &'static str,
    },

    /// The wrapped auth service failed.
    #[error(transparent)]
    Delegate(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
