// crates/ido-daemon/src/vault.rs
//
// Outbox vault: hands escrow requests to the external custody service by
// appending them as JSON lines to a file that the service consumes. With no
// outbox configured, requests are only logged.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::sync::Mutex;

use ido_core::{EscrowRequest, IdoError, Vault};

/// `Vault` implementation writing to an append-only JSON-lines outbox.
pub struct OutboxVault {
    outbox: Option<Mutex<File>>,
}

impl OutboxVault {
    /// Open (or create) the outbox at `path`. An empty path means log only.
    pub fn open(path: &str) -> Result<Self, IdoError> {
        if path.is_empty() {
            return Ok(Self { outbox: None });
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| IdoError::Storage(format!("Failed to open outbox {}: {}", path, e)))?;
        tracing::info!("Escrow outbox: {}", path);
        Ok(Self {
            outbox: Some(Mutex::new(file)),
        })
    }
}

impl Vault for OutboxVault {
    fn submit(&self, request: &EscrowRequest) -> Result<(), IdoError> {
        tracing::info!("Escrow request: {:?}", request);

        if let Some(outbox) = &self.outbox {
            let mut line = serde_json::to_vec(request)?;
            line.push(b'\n');
            let mut file = outbox
                .lock()
                .map_err(|_| IdoError::Storage("Outbox lock poisoned".to_string()))?;
            file.write_all(&line)
                .and_then(|_| file.flush())
                .map_err(|e| IdoError::Storage(format!("Outbox write failed: {}", e)))?;
        }
        Ok(())
    }
}
