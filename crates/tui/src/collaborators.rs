//! Terminal-side implementations of the controller's outward collaborators.

use std::sync::Arc;

use arcade_core::{Launcher, Prompter};
use parking_lot::Mutex;
use tracing::{info, warn};

/// Slot shared between a collaborator and the app that renders it.
pub type Shared<T> = Arc<Mutex<Option<T>>>;

/// Opens game URLs in the system browser and remembers the last attempt for
/// the status line.
pub struct BrowserLauncher {
    last: Shared<String>,
}

impl BrowserLauncher {
    pub fn new(last: Shared<String>) -> Self {
        Self { last }
    }
}

impl Launcher for BrowserLauncher {
    fn launch(&mut self, url: &str) {
        let notice = match webbrowser::open(url) {
            Ok(_) => {
                info!(%url, "opened game in browser");
                format!("Opened {url}")
            }
            Err(err) => {
                warn!(%url, %err, "failed to open game");
                format!("Failed to open {url}: {err}")
            }
        };
        *self.last.lock() = Some(notice);
    }
}

/// Raises a modal that swallows input until dismissed.
pub struct ModalPrompter {
    slot: Shared<String>,
}

impl ModalPrompter {
    pub fn new(slot: Shared<String>) -> Self {
        Self { slot }
    }
}

impl Prompter for ModalPrompter {
    fn alert(&mut self, message: &str) {
        *self.slot.lock() = Some(message.to_string());
    }
}
