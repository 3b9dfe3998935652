//! # st7789-core
//!
//! Simulation core for an ST7789-class color TFT display controller driven
//! over a 4-wire serial bus (SPI data plus chip-select, data/command-select,
//! and reset lines).
//!
//! The simulated chip receives byte blocks of arbitrary size and interprets
//! them according to the D/C line: command codes in the command phase,
//! command arguments or RGB565 pixel payload in the data phase. Pixels are
//! mapped onto an internal RGBA framebuffer through a configurable write
//! window and scan direction (MADCTL), reproducing the addressing semantics
//! of the real part including axis swap, per-axis mirroring, and wrap-around
//! at the window edges.
//!
//! ## Architecture
//!
//! - [`St7789`] — Top-level simulated device: pin lines wired to a controller
//! - [`Controller`] — Command/data state machine and addressing engine
//! - [`commands`] — Command codes, argument-count table, MADCTL bits
//! - [`color`] — RGB565 → ARGB conversion
//! - [`png`] — Screenshot encoder for the framebuffer
//! - [`savestate`] — Save/load of the full controller state
//!
//! Everything is single-threaded and callback-driven: each pin edge or byte
//! block is processed to completion before the next arrives, so there is no
//! interior locking anywhere.

pub mod color;
pub mod commands;
pub mod controller;
pub mod png;
pub mod savestate;

pub use controller::{Controller, Mode};

/// Default panel width in pixels
pub const DEFAULT_WIDTH: u32 = 240;
/// Default panel height in pixels
pub const DEFAULT_HEIGHT: u32 = 240;

/// Simulated ST7789 device: the controller state machine behind its three
/// control lines.
///
/// Pin conventions follow the hardware: CS is active low (bytes are only
/// received while selected), D/C low selects the command phase and high the
/// data phase, and RST is active low (a falling edge performs a hardware
/// reset and clears the panel to black).
pub struct St7789 {
    pub controller: Controller,
    /// Chip-select line level (high = deselected).
    cs: bool,
    /// Data/command line level (high = data phase).
    dc: bool,
    /// Reset line level (low = in reset).
    rst: bool,
}

impl St7789 {
    /// Create a simulated device with the given panel dimensions.
    ///
    /// The device comes up deselected, in the command phase, out of reset,
    /// with the surface cleared to opaque black.
    pub fn new(width: u32, height: u32) -> Self {
        St7789 {
            controller: Controller::new(width, height),
            cs: true,
            dc: false,
            rst: true,
        }
    }

    /// Chip-select line change. Low begins byte reception; high suspends it.
    ///
    /// Deselecting never resets protocol state — a transfer can resume
    /// mid-argument after a reselect.
    pub fn pin_cs(&mut self, level: bool) {
        self.cs = level;
    }

    /// Data/command line change: low = command phase, high = data phase.
    ///
    /// Takes effect for subsequently received bytes; a change mid-transfer
    /// flushes partially accumulated command arguments.
    pub fn pin_dc(&mut self, level: bool) {
        self.dc = level;
        self.controller.set_mode(if level { Mode::Data } else { Mode::Command });
    }

    /// Reset line change (active low). The falling edge performs a full
    /// hardware reset: addressing state, orientation register, and the
    /// surface cleared to opaque black.
    pub fn pin_rst(&mut self, level: bool) {
        if self.rst && !level {
            self.controller.reset();
            self.controller.clear_surface();
        }
        self.rst = level;
    }

    /// Deliver a block of bus bytes. Ignored while deselected or in reset.
    pub fn spi_block(&mut self, bytes: &[u8]) {
        if self.cs || !self.rst {
            return;
        }
        self.controller.receive(bytes);
    }

    /// Save the controller state to a file.
    pub fn save_state_to(&self, path: &std::path::Path) -> Result<(), String> {
        savestate::save_to_file(&self.controller.save_state(), path)
    }

    /// Load the controller state from a file. Pin levels are external and
    /// are not part of the saved state.
    pub fn load_state_from(&mut self, path: &std::path::Path) -> Result<(), String> {
        let state = savestate::load_from_file(path)?;
        self.controller.load_state(state)
    }
}
