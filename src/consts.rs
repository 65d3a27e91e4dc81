//! Project-wide constants.

use std::path::PathBuf;

/// Storage key holding the last identity provider hint.
pub const IDP_HINT_KEY: &str = "kcIdpHint";

/// Storage key holding the last identity management id.
pub const IDM_ID_KEY: &str = "idmId";

/// Storage key holding the URL the shell returns to after logout.
/// Its `idmId` query parameter wins over [`IDM_ID_KEY`].
pub const LOGOUT_REDIRECT_URL_KEY: &str = "logoutRedirectUrl";

/// Every key the decorator reads or writes.
pub const HINT_KEYS: &[&str] = &[IDP_HINT_KEY, IDM_ID_KEY, LOGOUT_REDIRECT_URL_KEY];

/// Query parameter carrying the identity management id.
pub const IDM_ID_PARAM: &str = "idmId";

/// Config map entry with the BFF base URL.
pub const BFF_URL_SETTING: &str = "AUTH_SERVICE_CUSTOM_BFF_URL";

/// Path of the configuration endpoint, relative to the BFF base URL.
pub const CONFIG_PATH: &str = "internal/config";

/// Default hint database path: `~/.shell-auth/hints.db`.
pub fn default_db_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".shell-auth")
        .join("hints.db")
}
