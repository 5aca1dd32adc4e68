//! JSON map documents

use std::path::Path;

use tilectx_core::{MapSnapshot, MapStorage};
use tracing::debug;

use crate::FormatError;

/// File extension used for map documents
pub const MAP_EXTENSION: &str = "map.json";

/// Stores maps as JSON documents on the local filesystem
///
/// Loading only parses the document; `MapData::load_data` validates it before use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonMapStorage {
    pretty: bool,
}

impl JsonMapStorage {
    /// Storage writing compact JSON
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage writing indented JSON
    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    pub fn with_pretty(pretty: bool) -> Self {
        Self { pretty }
    }

    pub fn is_pretty(&self) -> bool {
        self.pretty
    }
}

impl MapStorage for JsonMapStorage {
    type Error = FormatError;

    fn load(&self, path: &Path) -> Result<MapSnapshot, FormatError> {
        let bytes = std::fs::read(path)?;
        let snapshot = serde_json::from_slice(&bytes)?;
        debug!("Read {} bytes from {:?}", bytes.len(), path);
        Ok(snapshot)
    }

    fn save(&self, path: &Path, snapshot: &MapSnapshot) -> Result<(), FormatError> {
        let content = map_to_string(snapshot, self.pretty)?;
        std::fs::write(path, &content)?;
        debug!("Wrote {} bytes to {:?}", content.len(), path);
        Ok(())
    }
}

/// Parse and validate a map document from a string
pub fn load_map_from_str(json: &str) -> Result<MapSnapshot, FormatError> {
    load_map_from_bytes(json.as_bytes())
}

/// Parse and validate a map document from bytes
pub fn load_map_from_bytes(bytes: &[u8]) -> Result<MapSnapshot, FormatError> {
    let snapshot: MapSnapshot = serde_json::from_slice(bytes)?;
    snapshot.validate().map_err(FormatError::InvalidFormat)?;
    Ok(snapshot)
}

/// Serialize a map document
pub fn map_to_string(snapshot: &MapSnapshot, pretty: bool) -> Result<String, FormatError> {
    let content = if pretty {
        serde_json::to_string_pretty(snapshot)?
    } else {
        serde_json::to_string(snapshot)?
    };
    Ok(content)
}
