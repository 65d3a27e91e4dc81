//! The page the shell is running in: its location and its hint storage.

use std::sync::{Arc, Mutex};

use url::Url;

use crate::error::Result;
use crate::storage::{HintStore, MemoryHintStore};

/// What the decorator can see and do with the current page location.
pub trait Location: Send + Sync {
    /// Full current URL.
    fn href(&self) -> String;

    /// Scheme, host and port of the current URL.
    fn origin(&self) -> String;

    /// Navigate to `url`.
    fn assign(&self, url: &str);

    /// Reload the current page.
    fn reload(&self);
}

/// A navigation performed through [`Location`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Assign(String),
    Reload,
}

/// Location that tracks `href` in memory and records every navigation.
#[derive(Debug)]
pub struct RecordingLocation {
    href: Mutex<Url>,
    history: Mutex<Vec<Navigation>>,
}

impl RecordingLocation {
    pub fn new(href: &str) -> Result<Self> {
        Ok(Self {
            href: Mutex::new(Url::parse(href)?),
            history: Mutex::new(Vec::new()),
        })
    }

    /// Navigations in the order they happened.
    pub fn history(&self) -> Vec<Navigation> {
        self.history.lock().unwrap().clone()
    }
}

impl Location for RecordingLocation {
    fn href(&self) -> String {
        self.href.lock().unwrap().to_string()
    }

    fn origin(&self) -> String {
        self.href.lock().unwrap().origin().ascii_serialization()
    }

    fn assign(&self, url: &str) {
        // Relative targets resolve against the current page, unparseable ones
        // are still recorded so callers can see what was attempted.
        {
            let mut href = self.href.lock().unwrap();
            if let Ok(next) = href.join(url) {
                *href = next;
            }
        }
        self.history
            .lock()
            .unwrap()
            .push(Navigation::Assign(url.to_string()));
    }

    fn reload(&self) {
        self.history.lock().unwrap().push(Navigation::Reload);
    }
}

/// Location for terminal use: navigations open the system browser.
#[derive(Debug)]
pub struct BrowserLocation {
    inner: RecordingLocation,
}

impl BrowserLocation {
    pub fn new(href: &str) -> Result<Self> {
        Ok(Self {
            inner: RecordingLocation::new(href)?,
        })
    }
}

impl Location for BrowserLocation {
    fn href(&self) -> String {
        self.inner.href()
    }

    fn origin(&self) -> String {
        self.inner.origin()
    }

    fn assign(&self, url: &str) {
        self.inner.assign(url);
        // Headless sessions have no browser, the URL is logged instead.
        if let Err(e) = open::that(url) {
            tracing::warn!(%url, error = %e, "could not open browser");
        }
    }

    fn reload(&self) {
        self.inner.reload();
        let href = self.inner.href();
        if let Err(e) = open::that(&href) {
            tracing::warn!(url = %href, error = %e, "could not open browser");
        }
    }
}

/// Storage and location handed to the decorator alongside the injected values.
#[derive(Clone)]
pub struct Host {
    pub storage: Arc<dyn HintStore>,
    pub location: Arc<dyn Location>,
}

impl Host {
    pub fn new(storage: Arc<dyn HintStore>, location: Arc<dyn Location>) -> Self {
        Self { storage, location }
    }

    /// Host with empty in-memory storage at `href`.
    pub fn in_memory(href: &str) -> Result<Self> {
        Ok(Self {
            storage: Arc::new(MemoryHintStore::new()),
            location: Arc::new(RecordingLocation::new(href)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_drops_path_and_query() {
        let loc = RecordingLocation::new("https://shell.example.com:8443/app/page?x=1").unwrap();
        assert_eq!(loc.origin(), "https://shell.example.com:8443");
    }

    #[test]
    fn assign_updates_href_and_records() {
        let loc = RecordingLocation::new("https://shell.example.com/app").unwrap();
        loc.assign("https://idp.example.com/logged-out");

        assert_eq!(loc.href(), "https://idp.example.com/logged-out");
        assert_eq!(
            loc.history(),
            vec![Navigation::Assign("https://idp.example.com/logged-out".into())]
        );
    }

    #[test]
    fn relative_assign_resolves_against_current_page() {
        let loc = RecordingLocation::new("https://shell.example.com/app/").unwrap();
        loc.assign("welcome");
        assert_eq!(loc.href(), "https://shell.example.com/app/welcome");
    }

    #[test]
    fn reload_keeps_href() {
        let loc = RecordingLocation::new("https://shell.example.com/app").unwrap();
        loc.reload();
        assert_eq!(loc.href(), "https://shell.example.com/app");
        assert_eq!(loc.history(), vec![Navigation::Reload]);
    }

    #[test]
    fn invalid_href_is_rejected() {
        assert!(RecordingLocation::new("not a url").is_err());
    }
}
