use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use shell_auth::auth::{AuthService, CustomAuthService, InitConfig, KeycloakInstance, LogoutOutcome};
use shell_auth::consts::{BFF_URL_SETTING, HINT_KEYS, default_db_path};
use shell_auth::host::{BrowserLocation, Host, RecordingLocation};
use shell_auth::storage::HintStore;
use shell_auth::storage::sqlite::SqliteHintStore;

#[derive(Parser)]
#[command(name = "shell-auth", version, about = "Drive the shell's auth decorator from a terminal.")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// SQLite database holding the hint cache (defaults to ~/.shell-auth/hints.db)
    #[arg(short, long, global = true, env = "SHELL_AUTH_DB")]
    db: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the configuration lookup and print what init would pass on
    Init {
        /// Base URL of the BFF
        #[arg(long, env = "AUTH_SERVICE_CUSTOM_BFF_URL")]
        bff_url: String,

        /// Page URL the shell is served from
        #[arg(long)]
        href: String,
    },
    /// Send an end-session POST to Keycloak
    Logout {
        /// Keycloak base URL, e.g. https://auth.example.com
        #[arg(long, env = "KEYCLOAK_URL")]
        auth_server_url: String,

        #[arg(long, env = "KEYCLOAK_REALM")]
        realm: String,

        #[arg(long, env = "KEYCLOAK_CLIENT_ID")]
        client_id: String,

        #[arg(long)]
        id_token: Option<String>,

        #[arg(long)]
        refresh_token: Option<String>,

        /// Where Keycloak should send the browser afterwards
        #[arg(long)]
        redirect_uri: String,
    },
    /// Show or clear the stored hints
    Hints {
        /// Remove every stored hint
        #[arg(long, default_value_t = false)]
        clear: bool,
    },
}

/// Terminal stand-in for the wrapped Keycloak client: prints what it is
/// asked to do.
struct DryRunAuthService {
    keycloak: Option<KeycloakInstance>,
}

#[async_trait]
impl AuthService for DryRunAuthService {
    async fn init(&self, config: Option<InitConfig>) -> shell_auth::Result<bool> {
        let config = config.unwrap_or_default();
        let json = serde_json::to_string_pretty(&config).map_err(anyhow::Error::from)?;
        println!("{json}");
        Ok(true)
    }

    fn header_values(&self) -> HashMap<String, String> {
        HashMap::new()
    }

    async fn logout(&self) -> shell_auth::Result<()> {
        println!("would log out via GET redirect");
        Ok(())
    }

    async fn update_token_if_needed(&self) -> shell_auth::Result<bool> {
        Ok(false)
    }

    fn keycloak(&self) -> Option<KeycloakInstance> {
        self.keycloak.clone()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("shell_auth=info")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let db_path = cli.db.unwrap_or_else(default_db_path);

    match cli.command {
        Command::Init { bff_url, href } => handle_init(&db_path, bff_url, &href).await,
        Command::Logout {
            auth_server_url,
            realm,
            client_id,
            id_token,
            refresh_token,
            redirect_uri,
        } => {
            let instance = KeycloakInstance {
                id_token,
                refresh_token,
                ..KeycloakInstance::new(auth_server_url, realm, client_id)
            };
            handle_logout(&db_path, instance, &redirect_uri).await
        }
        Command::Hints { clear } => handle_hints(&db_path, clear),
    }
}

fn open_store(db_path: &Path) -> anyhow::Result<Arc<SqliteHintStore>> {
    let store = SqliteHintStore::open(db_path)
        .with_context(|| format!("failed to open hint store at {}", db_path.display()))?;
    Ok(Arc::new(store))
}

async fn handle_init(db_path: &Path, bff_url: String, href: &str) -> anyhow::Result<()> {
    let host = Host::new(
        open_store(db_path)?,
        Arc::new(RecordingLocation::new(href).context("invalid --href")?),
    );
    let config = HashMap::from([(BFF_URL_SETTING.to_string(), bff_url)]);
    let service = CustomAuthService::new(Arc::new(DryRunAuthService { keycloak: None }), &config, host);

    service.init(None).await.context("init failed")?;
    Ok(())
}

async fn handle_logout(
    db_path: &Path,
    instance: KeycloakInstance,
    redirect_uri: &str,
) -> anyhow::Result<()> {
    let host = Host::new(
        open_store(db_path)?,
        Arc::new(BrowserLocation::new(redirect_uri).context("invalid --redirect-uri")?),
    );
    let delegate = Arc::new(DryRunAuthService {
        keycloak: Some(instance),
    });
    let service = CustomAuthService::new(delegate, &HashMap::new(), host);

    match service.logout_with_outcome().await.context("logout failed")? {
        LogoutOutcome::Redirected(url) => println!("✓ logged out, redirected to {url}"),
        LogoutOutcome::Reloaded => println!("✓ logged out"),
        LogoutOutcome::Delegated => println!("✓ logged out via GET"),
    }
    Ok(())
}

fn handle_hints(db_path: &Path, clear: bool) -> anyhow::Result<()> {
    let store = open_store(db_path)?;
    if clear {
        for key in HINT_KEYS {
            store.remove(key)?;
        }
        println!("✓ cleared stored hints");
        return Ok(());
    }

    let entries = store.entries()?;
    if entries.is_empty() {
        println!("no stored hints");
    }
    for (key, value) in entries {
        println!("{key} = {value}");
    }
    Ok(())
}
