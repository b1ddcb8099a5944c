use crate::domain::ports::HostDocument;
use crate::utils::error::{BridgeError, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Host document kept in memory: element id → text content.
///
/// Elements must exist before they can be written, like nodes in a page.
#[derive(Debug, Default)]
pub struct MemoryDocument {
    elements: Mutex<HashMap<String, String>>,
    reloads: AtomicUsize,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_element(self, id: &str) -> Self {
        if let Ok(mut elements) = self.elements.lock() {
            elements.insert(id.to_string(), String::new());
        }
        self
    }

    pub fn text_content(&self, id: &str) -> Option<String> {
        self.elements
            .lock()
            .ok()
            .and_then(|elements| elements.get(id).cloned())
    }

    pub fn reload_count(&self) -> usize {
        self.reloads.load(Ordering::SeqCst)
    }

    pub fn reload_requested(&self) -> bool {
        self.reload_count() > 0
    }
}

impl HostDocument for MemoryDocument {
    fn set_text_content(&self, id: &str, text: &str) -> Result<()> {
        let mut elements = match self.elements.lock() {
            Ok(elements) => elements,
            Err(poisoned) => poisoned.into_inner(),
        };
        match elements.get_mut(id) {
            Some(content) => {
                content.clear();
                content.push_str(text);
                Ok(())
            }
            None => Err(BridgeError::MissingElement { id: id.to_string() }),
        }
    }

    fn reload(&self) {
        self.reloads.fetch_add(1, Ordering::SeqCst);
        tracing::info!("🔄 Host reload requested");
    }
}
