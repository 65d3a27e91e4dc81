//! Builds a [`CustomAuthService`] from values supplied by the shell's injector.
//!
//! Injectors may hand values back immediately or as futures. The factory
//! stays synchronous when it can and only defers when it has to.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use futures::future::{self, BoxFuture, FutureExt};

use crate::auth::{AuthService, CustomAuthService};
use crate::error::{Error, Result};
use crate::host::Host;

/// Keys the factory asks the injector for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Injectable {
    KeycloakAuthService,
    Config,
}

impl Injectable {
    fn label(self) -> &'static str {
        match self {
            Injectable::KeycloakAuthService => "auth service",
            Injectable::Config => "config",
        }
    }
}

/// A value the injector resolved.
#[derive(Clone)]
pub enum Provided {
    AuthService(Arc<dyn AuthService>),
    Config(HashMap<String, String>),
}

impl Provided {
    fn label(&self) -> &'static str {
        match self {
            Provided::AuthService(_) => Injectable::KeycloakAuthService.label(),
            Provided::Config(_) => Injectable::Config.label(),
        }
    }

    fn into_auth_service(self) -> Result<Arc<dyn AuthService>> {
        match self {
            Provided::AuthService(service) => Ok(service),
            other => Err(Error::Injection {
                expected: Injectable::KeycloakAuthService.label(),
                found: other.label(),
            }),
        }
    }

    fn into_config(self) -> Result<HashMap<String, String>> {
        match self {
            Provided::Config(config) => Ok(config),
            other => Err(Error::Injection {
                expected: Injectable::Config.label(),
                found: other.label(),
            }),
        }
    }
}

/// What an injector returns for one key.
pub enum Injection {
    Ready(Provided),
    Pending(BoxFuture<'static, Provided>),
}

impl Injection {
    pub fn pending<F>(fut: F) -> Self
    where
        F: Future<Output = Provided> + Send + 'static,
    {
        Injection::Pending(fut.boxed())
    }

    fn into_future(self) -> BoxFuture<'static, Provided> {
        match self {
            Injection::Ready(value) => future::ready(value).boxed(),
            Injection::Pending(fut) => fut,
        }
    }
}

/// The factory's result: built now, or once the injector's futures settle.
pub enum Built {
    Ready(CustomAuthService),
    Pending(BoxFuture<'static, Result<CustomAuthService>>),
}

impl Built {
    pub fn is_ready(&self) -> bool {
        matches!(self, Built::Ready(_))
    }

    /// Wait for the service, whichever way it was built.
    pub async fn resolve(self) -> Result<CustomAuthService> {
        match self {
            Built::Ready(service) => Ok(service),
            Built::Pending(fut) => fut.await,
        }
    }
}

impl fmt::Debug for Built {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Built::Ready(_) => f.write_str("Built::Ready"),
            Built::Pending(_) => f.write_str("Built::Pending"),
        }
    }
}

/// Ask `injector` for the wrapped auth service and the config map and wrap
/// the former in a [`CustomAuthService`] running on `host`.
pub fn factory<F>(injector: F, host: Host) -> Result<Built>
where
    F: Fn(Injectable) -> Injection,
{
    let auth = injector(Injectable::KeycloakAuthService);
    let config = injector(Injectable::Config);

    match (auth, config) {
        (Injection::Ready(auth), Injection::Ready(config)) => {
            tracing::debug!("building auth service synchronously");
            let service = build(auth, config, host)?;
            Ok(Built::Ready(service))
        }
        (auth, config) => {
            tracing::debug!("deferring auth service until injected values resolve");
            let fut = future::join(auth.into_future(), config.into_future())
                .map(move |(auth, config)| build(auth, config, host));
            Ok(Built::Pending(fut.boxed()))
        }
    }
}

fn build(auth: Provided, config: Provided, host: Host) -> Result<CustomAuthService> {
    let auth = auth.into_auth_service()?;
    let config = config.into_config()?;
    Ok(CustomAuthService::new(auth, &config, host))
}
