//! Save state (quick save / quick load) for the ST7789 simulator.
//!
//! Captures the full controller state to a file using bincode serialization
//! with deflate compression, so a session can be frozen mid-transfer and
//! resumed later (F5 save, F9 load in the frontend).
//!
//! ## File format
//!
//! ```text
//! +------------------+
//! | Magic "S789"     |  4 bytes
//! +------------------+
//! | Format version   |  u32 little-endian (currently 1)
//! +------------------+
//! | Compressed data  |  deflate-compressed bincode payload
//! +------------------+
//! ```
//!
//! The surface dimensions travel inside the payload;
//! [`Controller::load_state`](crate::Controller::load_state) rejects a state
//! captured from a differently sized panel.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Magic bytes identifying an st7789-sim save state file.
const MAGIC: &[u8; 4] = b"S789";
/// Current save state format version.
const FORMAT_VERSION: u32 = 1;

/// Complete serializable controller state.
#[derive(Serialize, Deserialize)]
pub struct ControllerState {
    pub width: u32,
    pub height: u32,
    pub framebuffer: Vec<u8>,
    /// True if the D/C line selected the data phase.
    pub mode_data: bool,
    pub ram_write: bool,
    pub cmd_code: u8,
    pub cmd_len: u8,
    pub cmd_index: u8,
    pub cmd_buf: [u8; 16],
    pub madctl: u8,
    pub col: u32,
    pub page: u32,
    pub col_start: u32,
    pub col_end: u32,
    pub page_start: u32,
    pub page_end: u32,
}

/// Save state to file with header and deflate compression.
pub fn save_to_file(state: &ControllerState, path: &Path) -> Result<(), String> {
    let payload = bincode::serialize(state).map_err(|e| format!("Serialize error: {}", e))?;

    let compressed = miniz_oxide::deflate::compress_to_vec(&payload, 6);

    let mut out = Vec::with_capacity(8 + compressed.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    out.extend_from_slice(&compressed);

    std::fs::write(path, &out).map_err(|e| format!("Write error: {}", e))
}

/// Load state from file, verifying magic and version.
pub fn load_from_file(path: &Path) -> Result<ControllerState, String> {
    let data = std::fs::read(path).map_err(|e| format!("Read error: {}", e))?;

    if data.len() < 8 {
        return Err("File too small".into());
    }
    if &data[0..4] != MAGIC {
        return Err("Invalid save state file (bad magic)".into());
    }
    let version = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
    if version != FORMAT_VERSION {
        return Err(format!(
            "Unsupported save state version {} (expected {})",
            version, FORMAT_VERSION
        ));
    }

    let decompressed = miniz_oxide::inflate::decompress_to_vec(&data[8..])
        .map_err(|e| format!("Decompress error: {:?}", e))?;

    bincode::deserialize(&decompressed).map_err(|e| format!("Deserialize error: {}", e))
}
