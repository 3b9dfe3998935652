//! ST7789 command/data protocol state machine.
//!
//! Processes command and data byte blocks received over the serial bus to
//! maintain addressing state (write window, cursor, scan direction) and an
//! RGBA framebuffer. Data-phase bytes are either arguments for the pending
//! command or, after RAMWR, a stream of big-endian RGB565 pixel values that
//! the addressing engine maps onto the framebuffer with wrap-around at the
//! window edges.
//!
//! Nothing here is fatal: unknown commands, short argument lists, and
//! out-of-range coordinates all degrade to no-ops, matching the best-effort
//! behavior of the real part.

use crate::color::rgb565_to_argb;
use crate::commands::{self, MADCTL_MV, MADCTL_MX, MADCTL_MY};
use crate::savestate::ControllerState;

/// Interpretation of incoming bus bytes, selected by the D/C line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Command,
    Data,
}

/// Largest argument list any command takes (the gamma tables).
pub const MAX_ARGS: usize = 16;

/// Lines the page window shifts up by when MADCTL MY is set. A quirk of the
/// emulated panel variant, applied unconditionally regardless of panel size.
const MY_PAGE_OFFSET: u32 = 32;

/// ST7789 display controller state machine.
pub struct Controller {
    /// RGBA framebuffer bytes, row-major, 4 bytes per pixel.
    pub framebuffer: Vec<u8>,
    width: u32,
    height: u32,
    /// Current bus phase (D/C line level).
    mode: Mode,
    /// True only while a RAMWR pixel payload is being streamed.
    ram_write: bool,
    /// Pending command code.
    cmd_code: u8,
    /// Argument bytes the pending command expects.
    cmd_len: usize,
    /// Argument bytes received so far.
    cmd_index: usize,
    cmd_buf: [u8; MAX_ARGS],
    /// MADCTL scan-direction register (MY/MX/MV bits).
    madctl: u8,
    /// Write cursor (pre-transform column and page).
    col: u32,
    page: u32,
    /// Write window bounds, inclusive.
    col_start: u32,
    col_end: u32,
    page_start: u32,
    page_end: u32,
    /// Whether the framebuffer has been updated since last render.
    pub dirty: bool,
    /// Enable diagnostic output (eprintln)
    pub debug: bool,
    /// Debug: command bytes received
    pub dbg_cmd_count: u32,
    /// Debug: data bytes received (arguments and pixels)
    pub dbg_data_count: u32,
}

impl Controller {
    /// Create a controller backed by a `width` × `height` surface, cleared
    /// to opaque black, with the write window spanning the full surface.
    pub fn new(width: u32, height: u32) -> Self {
        assert!(width > 0 && height > 0, "surface must be non-empty");
        let mut framebuffer = vec![0u8; (width * height * 4) as usize];
        for px in framebuffer.chunks_exact_mut(4) {
            px[3] = 0xFF;
        }
        Controller {
            framebuffer,
            width,
            height,
            mode: Mode::Command,
            ram_write: false,
            cmd_code: 0,
            cmd_len: 0,
            cmd_index: 0,
            cmd_buf: [0; MAX_ARGS],
            madctl: 0,
            col: 0,
            page: 0,
            col_start: 0,
            col_end: width - 1,
            page_start: 0,
            page_end: height - 1,
            dirty: false,
            debug: false,
            dbg_cmd_count: 0,
            dbg_data_count: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn ram_write(&self) -> bool {
        self.ram_write
    }

    /// Current MADCTL register value.
    pub fn madctl(&self) -> u8 {
        self.madctl
    }

    /// Write window as (col_start, col_end, page_start, page_end), inclusive.
    pub fn window(&self) -> (u32, u32, u32, u32) {
        (self.col_start, self.col_end, self.page_start, self.page_end)
    }

    /// Write cursor as (column, page), before orientation transform.
    pub fn cursor(&self) -> (u32, u32) {
        (self.col, self.page)
    }

    /// Framebuffer pixel at (x, y) as 0xAARRGGBB.
    ///
    /// # Panics
    ///
    /// Panics if (x, y) falls outside the surface.
    pub fn pixel_argb(&self, x: u32, y: u32) -> u32 {
        assert!(
            x < self.width && y < self.height,
            "pixel ({}, {}) outside {}x{} surface",
            x,
            y,
            self.width,
            self.height
        );
        let off = ((y * self.width + x) * 4) as usize;
        (u32::from(self.framebuffer[off + 3]) << 24)
            | (u32::from(self.framebuffer[off]) << 16)
            | (u32::from(self.framebuffer[off + 1]) << 8)
            | u32::from(self.framebuffer[off + 2])
    }

    /// Switch between command and data phase (D/C line change).
    ///
    /// A phase change abandons any partially accumulated arguments: a
    /// command is never executed with fewer bytes than it expects.
    pub fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            self.mode = mode;
            self.cmd_index = 0;
        }
    }

    /// Route one received byte block according to the current phase.
    ///
    /// Block boundaries carry no protocol meaning except that a data block
    /// in RAMWR state with a trailing odd byte drops that final byte.
    pub fn receive(&mut self, bytes: &[u8]) {
        match self.mode {
            Mode::Command => {
                for &code in bytes {
                    self.on_command_byte(code);
                }
            }
            Mode::Data => {
                if self.ram_write {
                    self.receive_pixels(bytes);
                } else {
                    for &b in bytes {
                        self.on_argument_byte(b);
                    }
                }
            }
        }
    }

    /// Handle a command byte (D/C low).
    ///
    /// Any command byte ends an active RAMWR stream; only RAMWR itself turns
    /// it back on. Commands without arguments execute immediately.
    pub fn on_command_byte(&mut self, code: u8) {
        self.dbg_cmd_count += 1;
        self.ram_write = false;
        self.cmd_code = code;
        self.cmd_len = commands::arg_count(code);
        self.cmd_index = 0;
        if self.cmd_len == 0 {
            self.execute();
        }
    }

    /// Handle an argument byte for the pending command (D/C high, RAMWR
    /// inactive). The command executes once its argument count is satisfied;
    /// further bytes without a new command byte restart the argument list
    /// for a fresh instance of the same command.
    pub fn on_argument_byte(&mut self, byte: u8) {
        self.dbg_data_count += 1;
        if self.cmd_index < self.cmd_len {
            self.cmd_buf[self.cmd_index] = byte;
            self.cmd_index += 1;
            if self.cmd_index == self.cmd_len {
                self.execute();
                self.cmd_index = 0;
            }
        }
    }

    /// Execute the pending command with its complete argument list.
    fn execute(&mut self) {
        match self.cmd_code {
            commands::NOP => {}

            commands::RAMWR => self.ram_write = true,

            commands::MADCTL => self.madctl = self.cmd_buf[0],

            commands::CASET | commands::RASET => self.set_window_axis(),

            // Software reset clears the orientation register as well.
            commands::SWRESET => self.reset(),

            // The generic power command resets addressing but keeps the
            // orientation register.
            commands::PWCTR1 => self.reset_addressing(),

            // Accepted but inert: sleep, display on/off, inversion, pixel
            // format, frame rate, power and gamma configuration.
            commands::SLPIN
            | commands::SLPOUT
            | commands::INVOFF
            | commands::INVON
            | commands::DISPOFF
            | commands::DISPON
            | commands::COLMOD
            | commands::VMCTR
            | commands::FRMCTR1
            | commands::FRMCTR2
            | commands::FRMCTR3
            | commands::INVCTR
            | commands::DISSET5
            | commands::PWCTR2
            | commands::PWCTR3
            | commands::PWCTR4
            | commands::PWCTR5
            | commands::GMCTRP1
            | commands::GMCTRN1 => {}

            code => {
                if self.debug {
                    eprintln!("st7789: unknown command 0x{:02X}", code);
                }
            }
        }
    }

    /// Apply a CASET/RASET argument list to the axis it resolves to.
    ///
    /// MADCTL MV swaps which physical axis each address command targets:
    /// with MV set, RASET updates the column axis and CASET the page axis.
    /// The page axis additionally shifts by [`MY_PAGE_OFFSET`] when MY is
    /// set, saturating at zero. Ranges that fall outside the surface are
    /// rejected without touching the window.
    fn set_window_axis(&mut self) {
        let start = u32::from(u16::from_be_bytes([self.cmd_buf[0], self.cmd_buf[1]]));
        let end = u32::from(u16::from_be_bytes([self.cmd_buf[2], self.cmd_buf[3]]));
        let row_cmd = self.cmd_code == commands::RASET;
        let set_page = if self.madctl & MADCTL_MV != 0 {
            !row_cmd
        } else {
            row_cmd
        };
        if set_page {
            let (mut s, mut e) = (start, end);
            if self.madctl & MADCTL_MY != 0 {
                s = s.saturating_sub(MY_PAGE_OFFSET);
                e = e.saturating_sub(MY_PAGE_OFFSET);
            }
            if s > e || e >= self.height {
                if self.debug {
                    eprintln!("st7789: page window {}..={} out of range, ignored", s, e);
                }
                return;
            }
            self.page_start = s;
            self.page_end = e;
            self.page = s;
        } else {
            if start > end || end >= self.width {
                if self.debug {
                    eprintln!(
                        "st7789: column window {}..={} out of range, ignored",
                        start, end
                    );
                }
                return;
            }
            self.col_start = start;
            self.col_end = end;
            self.col = start;
        }
    }

    /// Consume a RAMWR payload block: one pixel per big-endian 16-bit pair.
    fn receive_pixels(&mut self, bytes: &[u8]) {
        self.dbg_data_count += bytes.len() as u32;
        for pair in bytes.chunks_exact(2) {
            let value = u16::from_be_bytes([pair[0], pair[1]]);
            self.write_pixel(value);
        }
    }

    /// Write one RGB565 pixel at the cursor, then advance the cursor.
    ///
    /// The MY/MX mirror bits pair with opposite axes depending on MV. This
    /// cross-wiring matches the hardware register semantics and is a fixed
    /// behavioral contract, not a bug.
    ///
    /// Coordinates that land outside the surface are dropped, but the cursor
    /// still advances so the pixel stream never stalls.
    pub fn write_pixel(&mut self, value: u16) {
        let mirror = |v: u32, extent: u32| extent.wrapping_sub(1).wrapping_sub(v);
        let (x, y) = if self.madctl & MADCTL_MV != 0 {
            (
                if self.madctl & MADCTL_MX != 0 {
                    mirror(self.col, self.width)
                } else {
                    self.col
                },
                if self.madctl & MADCTL_MY != 0 {
                    mirror(self.page, self.height)
                } else {
                    self.page
                },
            )
        } else {
            (
                if self.madctl & MADCTL_MY != 0 {
                    mirror(self.col, self.width)
                } else {
                    self.col
                },
                if self.madctl & MADCTL_MX != 0 {
                    mirror(self.page, self.height)
                } else {
                    self.page
                },
            )
        };

        if x < self.width && y < self.height {
            let argb = rgb565_to_argb(value);
            let off = ((y * self.width + x) * 4) as usize;
            self.framebuffer[off] = (argb >> 16) as u8;
            self.framebuffer[off + 1] = (argb >> 8) as u8;
            self.framebuffer[off + 2] = argb as u8;
            self.framebuffer[off + 3] = (argb >> 24) as u8;
            self.dirty = true;
        }

        self.advance_cursor();
    }

    /// Advance the cursor one step: the fast axis increments every pixel
    /// and wraps to its window start at the window edge, carrying into the
    /// slow axis. MV selects the page axis as fast; otherwise the column
    /// axis is fast (standard raster order).
    fn advance_cursor(&mut self) {
        if self.madctl & MADCTL_MV != 0 {
            self.page += 1;
            if self.page > self.page_end {
                self.page = self.page_start;
                self.col += 1;
                if self.col > self.col_end {
                    self.col = self.col_start;
                }
            }
        } else {
            self.col += 1;
            if self.col > self.col_end {
                self.col = self.col_start;
                self.page += 1;
                if self.page > self.page_end {
                    self.page = self.page_start;
                }
            }
        }
    }

    /// Reset addressing state: RAM write off, window to the full surface,
    /// cursor to the origin. The orientation register is left alone.
    pub fn reset_addressing(&mut self) {
        self.ram_write = false;
        self.col = 0;
        self.page = 0;
        self.col_start = 0;
        self.col_end = self.width - 1;
        self.page_start = 0;
        self.page_end = self.height - 1;
    }

    /// Full software reset: addressing state plus the orientation register.
    /// The framebuffer is not touched (that only happens on a reset edge).
    pub fn reset(&mut self) {
        self.reset_addressing();
        self.madctl = 0;
    }

    /// Clear the framebuffer to opaque black.
    pub fn clear_surface(&mut self) {
        for px in self.framebuffer.chunks_exact_mut(4) {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            px[3] = 0xFF;
        }
        self.dirty = true;
    }

    /// Reset per-frame debug counters.
    pub fn dbg_reset_counters(&mut self) {
        self.dbg_cmd_count = 0;
        self.dbg_data_count = 0;
    }

    /// Convert the framebuffer to a u32 pixel array (0xRRGGBB for minifb).
    pub fn as_pixel_buffer(&self) -> Vec<u32> {
        let mut pixels = vec![0u32; (self.width * self.height) as usize];
        for (i, px) in self.framebuffer.chunks_exact(4).enumerate() {
            pixels[i] = (u32::from(px[0]) << 16) | (u32::from(px[1]) << 8) | u32::from(px[2]);
        }
        pixels
    }

    /// Capture the full controller state for a save state.
    pub fn save_state(&self) -> ControllerState {
        ControllerState {
            width: self.width,
            height: self.height,
            framebuffer: self.framebuffer.clone(),
            mode_data: self.mode == Mode::Data,
            ram_write: self.ram_write,
            cmd_code: self.cmd_code,
            cmd_len: self.cmd_len as u8,
            cmd_index: self.cmd_index as u8,
            cmd_buf: self.cmd_buf,
            madctl: self.madctl,
            col: self.col,
            page: self.page,
            col_start: self.col_start,
            col_end: self.col_end,
            page_start: self.page_start,
            page_end: self.page_end,
        }
    }

    /// Restore a previously captured state. Fails if the saved surface
    /// dimensions do not match this controller.
    pub fn load_state(&mut self, state: ControllerState) -> Result<(), String> {
        if state.width != self.width || state.height != self.height {
            return Err(format!(
                "Dimension mismatch: save={}x{} panel={}x{}",
                state.width, state.height, self.width, self.height
            ));
        }
        if state.framebuffer.len() != self.framebuffer.len() {
            return Err("Framebuffer size mismatch".into());
        }
        self.framebuffer = state.framebuffer;
        self.mode = if state.mode_data {
            Mode::Data
        } else {
            Mode::Command
        };
        self.ram_write = state.ram_write;
        self.cmd_code = state.cmd_code;
        self.cmd_len = (state.cmd_len as usize).min(MAX_ARGS);
        self.cmd_index = (state.cmd_index as usize).min(self.cmd_len);
        self.cmd_buf = state.cmd_buf;
        self.madctl = state.madctl;
        self.col = state.col;
        self.page = state.page;
        self.col_start = state.col_start;
        self.col_end = state.col_end;
        self.page_start = state.page_start;
        self.page_end = state.page_end;
        self.dirty = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(c: &mut Controller, code: u8) {
        c.set_mode(Mode::Command);
        c.receive(&[code]);
    }

    fn cmd_args(c: &mut Controller, code: u8, args: &[u8]) {
        cmd(c, code);
        c.set_mode(Mode::Data);
        c.receive(args);
    }

    #[test]
    fn test_defaults() {
        let c = Controller::new(240, 240);
        assert_eq!(c.mode(), Mode::Command);
        assert!(!c.ram_write());
        assert_eq!(c.madctl(), 0);
        assert_eq!(c.window(), (0, 239, 0, 239));
        assert_eq!(c.cursor(), (0, 0));
        // Surface starts opaque black
        assert_eq!(c.pixel_argb(0, 0), 0xFF000000);
        assert_eq!(c.pixel_argb(239, 239), 0xFF000000);
    }

    #[test]
    #[should_panic(expected = "outside 240x240 surface")]
    fn test_pixel_argb_rejects_out_of_range() {
        let c = Controller::new(240, 240);
        c.pixel_argb(240, 0);
    }

    #[test]
    fn test_caset_sets_column_window() {
        let mut c = Controller::new(240, 240);
        cmd_args(&mut c, commands::CASET, &[0x00, 0x0A, 0x00, 0x14]);
        assert_eq!(c.window(), (10, 20, 0, 239));
        assert_eq!(c.cursor(), (10, 0));
    }

    #[test]
    fn test_raset_sets_page_window() {
        let mut c = Controller::new(240, 240);
        cmd_args(&mut c, commands::RASET, &[0x00, 0x05, 0x00, 0x0F]);
        assert_eq!(c.window(), (0, 239, 5, 15));
        assert_eq!(c.cursor(), (0, 5));
    }

    #[test]
    fn test_axis_swap_crosses_address_commands() {
        let mut c = Controller::new(240, 240);
        cmd_args(&mut c, commands::MADCTL, &[commands::MADCTL_MV]);
        // With MV set, the nominal column command targets the page axis
        cmd_args(&mut c, commands::CASET, &[0x00, 0x0A, 0x00, 0x14]);
        assert_eq!(c.window(), (0, 239, 10, 20));
        assert_eq!(c.cursor(), (0, 10));
        // ...and the nominal row command targets the column axis
        cmd_args(&mut c, commands::RASET, &[0x00, 0x02, 0x00, 0x07]);
        assert_eq!(c.window(), (2, 7, 10, 20));
        assert_eq!(c.cursor(), (2, 10));
    }

    #[test]
    fn test_mirror_y_offsets_page_window() {
        let mut c = Controller::new(240, 240);
        cmd_args(&mut c, commands::MADCTL, &[commands::MADCTL_MY]);
        // start = 40, end = 100 → shifted by 32
        cmd_args(&mut c, commands::RASET, &[0x00, 0x28, 0x00, 0x64]);
        let (_, _, ps, pe) = c.window();
        assert_eq!(ps, 8);
        assert_eq!(pe, 68);
        assert_eq!(c.cursor().1, 8);
    }

    #[test]
    fn test_mirror_y_offset_saturates_at_zero() {
        let mut c = Controller::new(240, 240);
        cmd_args(&mut c, commands::MADCTL, &[commands::MADCTL_MY]);
        // start = 16 < 32 → clamps to 0, never negative
        cmd_args(&mut c, commands::RASET, &[0x00, 0x10, 0x00, 0x64]);
        let (_, _, ps, pe) = c.window();
        assert_eq!(ps, 0);
        assert_eq!(pe, 68);
    }

    #[test]
    fn test_column_offset_not_applied_without_page_axis() {
        let mut c = Controller::new(240, 240);
        cmd_args(&mut c, commands::MADCTL, &[commands::MADCTL_MY]);
        // The 32-line shift is a page-axis quirk; columns are unaffected
        cmd_args(&mut c, commands::CASET, &[0x00, 0x28, 0x00, 0x64]);
        let (cs, ce, _, _) = c.window();
        assert_eq!(cs, 40);
        assert_eq!(ce, 100);
    }

    #[test]
    fn test_invalid_window_rejected() {
        let mut c = Controller::new(240, 240);
        // end beyond the surface
        cmd_args(&mut c, commands::CASET, &[0x01, 0x00, 0x01, 0x2C]);
        assert_eq!(c.window(), (0, 239, 0, 239));
        // start > end
        cmd_args(&mut c, commands::CASET, &[0x00, 0x14, 0x00, 0x0A]);
        assert_eq!(c.window(), (0, 239, 0, 239));
    }

    #[test]
    fn test_red_pixel_write_and_cursor_advance() {
        let mut c = Controller::new(240, 240);
        cmd(&mut c, commands::RAMWR);
        assert!(c.ram_write());
        c.set_mode(Mode::Data);
        c.receive(&[0xF8, 0x00]);
        // Pure 5-6-5 red expands to full-scale red
        assert_eq!(c.pixel_argb(0, 0), 0xFFFF0000);
        assert_eq!(c.cursor(), (1, 0));
    }

    #[test]
    fn test_trailing_odd_byte_dropped() {
        let mut c = Controller::new(240, 240);
        cmd(&mut c, commands::RAMWR);
        c.set_mode(Mode::Data);
        c.receive(&[0xF8, 0x00, 0xAB]);
        assert_eq!(c.cursor(), (1, 0));
        // The dangling 0xAB does not pair with the next block
        c.receive(&[0x07, 0xE0]);
        assert_eq!(c.pixel_argb(1, 0), 0xFF00FF00);
        assert_eq!(c.cursor(), (2, 0));
    }

    #[test]
    fn test_wrap_at_window_edge() {
        let mut c = Controller::new(240, 240);
        cmd_args(&mut c, commands::CASET, &[0x00, 0x00, 0x00, 0x01]);
        cmd_args(&mut c, commands::RASET, &[0x00, 0x00, 0x00, 0x01]);
        cmd(&mut c, commands::RAMWR);
        c.set_mode(Mode::Data);
        // Three pixels into a 2×2 window: (0,0) (1,0) wrap (0,1)
        c.receive(&[0xF8, 0x00, 0xF8, 0x00, 0xF8, 0x00]);
        assert_eq!(c.pixel_argb(0, 0), 0xFFFF0000);
        assert_eq!(c.pixel_argb(1, 0), 0xFFFF0000);
        assert_eq!(c.pixel_argb(0, 1), 0xFFFF0000);
        assert_eq!(c.pixel_argb(1, 1), 0xFF000000);
        assert_eq!(c.cursor(), (1, 1));
        // Nothing leaked outside the window
        assert_eq!(c.pixel_argb(2, 0), 0xFF000000);
        assert_eq!(c.pixel_argb(0, 2), 0xFF000000);
    }

    #[test]
    fn test_slow_axis_wraps_to_window_start() {
        let mut c = Controller::new(240, 240);
        cmd_args(&mut c, commands::CASET, &[0x00, 0x00, 0x00, 0x01]);
        cmd_args(&mut c, commands::RASET, &[0x00, 0x00, 0x00, 0x01]);
        cmd(&mut c, commands::RAMWR);
        c.set_mode(Mode::Data);
        // Five pixels into a 2×2 window wraps fully back to (0,0)
        let px = [0x07, 0xE0];
        let mut stream = Vec::new();
        for _ in 0..5 {
            stream.extend_from_slice(&px);
        }
        c.receive(&stream);
        assert_eq!(c.cursor(), (1, 0));
    }

    #[test]
    fn test_axis_swap_makes_page_the_fast_axis() {
        let mut c = Controller::new(240, 240);
        cmd_args(&mut c, commands::MADCTL, &[commands::MADCTL_MV]);
        cmd(&mut c, commands::RAMWR);
        c.set_mode(Mode::Data);
        c.receive(&[0xF8, 0x00, 0x07, 0xE0]);
        // Column-major: second pixel lands one page down, same column
        assert_eq!(c.pixel_argb(0, 0), 0xFFFF0000);
        assert_eq!(c.pixel_argb(0, 1), 0xFF00FF00);
        assert_eq!(c.cursor(), (0, 2));
    }

    #[test]
    fn test_full_raster_covers_every_cell_once() {
        // 16 pixels into a 4×4 surface must visit every cell exactly once
        // for every orientation.
        for &madctl in &[
            0x00,
            commands::MADCTL_MV,
            commands::MADCTL_MX,
            commands::MADCTL_MY,
            commands::MADCTL_MX | commands::MADCTL_MY,
            commands::MADCTL_MV | commands::MADCTL_MX,
            commands::MADCTL_MV | commands::MADCTL_MY,
            commands::MADCTL_MV | commands::MADCTL_MX | commands::MADCTL_MY,
        ] {
            let mut c = Controller::new(4, 4);
            cmd_args(&mut c, commands::MADCTL, &[madctl]);
            cmd(&mut c, commands::RAMWR);
            c.set_mode(Mode::Data);
            let mut stream = Vec::new();
            for _ in 0..16 {
                stream.extend_from_slice(&[0xFF, 0xFF]);
            }
            c.receive(&stream);
            for y in 0..4 {
                for x in 0..4 {
                    assert_eq!(
                        c.pixel_argb(x, y),
                        0xFFFFFFFF,
                        "cell ({}, {}) missed with MADCTL 0x{:02X}",
                        x,
                        y,
                        madctl
                    );
                }
            }
            // A full raster leaves the cursor back at the window origin
            assert_eq!(c.cursor(), (0, 0), "MADCTL 0x{:02X}", madctl);
        }
    }

    #[test]
    fn test_mirror_bits_cross_wire_between_swap_modes() {
        // MV clear: MY mirrors the column axis (x), MX mirrors the page
        // axis (y) — deliberately cross-wired in the hardware.
        let mut c = Controller::new(4, 4);
        cmd_args(&mut c, commands::MADCTL, &[commands::MADCTL_MY]);
        cmd(&mut c, commands::RAMWR);
        c.set_mode(Mode::Data);
        c.receive(&[0xF8, 0x00]);
        assert_eq!(c.pixel_argb(3, 0), 0xFFFF0000);

        let mut c = Controller::new(4, 4);
        cmd_args(&mut c, commands::MADCTL, &[commands::MADCTL_MX]);
        cmd(&mut c, commands::RAMWR);
        c.set_mode(Mode::Data);
        c.receive(&[0xF8, 0x00]);
        assert_eq!(c.pixel_argb(0, 3), 0xFFFF0000);

        // MV set: MX mirrors x, MY mirrors y.
        let mut c = Controller::new(4, 4);
        cmd_args(
            &mut c,
            commands::MADCTL,
            &[commands::MADCTL_MV | commands::MADCTL_MX],
        );
        cmd(&mut c, commands::RAMWR);
        c.set_mode(Mode::Data);
        c.receive(&[0xF8, 0x00]);
        assert_eq!(c.pixel_argb(3, 0), 0xFFFF0000);
    }

    #[test]
    fn test_command_byte_ends_ram_write() {
        let mut c = Controller::new(240, 240);
        cmd(&mut c, commands::RAMWR);
        assert!(c.ram_write());
        cmd(&mut c, commands::NOP);
        assert!(!c.ram_write());
        // Data bytes are now argument bytes, not pixels
        cmd(&mut c, commands::CASET);
        c.set_mode(Mode::Data);
        c.receive(&[0x00, 0x0A, 0x00, 0x14]);
        assert_eq!(c.window().0, 10);
        assert_eq!(c.pixel_argb(0, 0), 0xFF000000);
    }

    #[test]
    fn test_mode_change_abandons_partial_arguments() {
        let mut c = Controller::new(240, 240);
        cmd(&mut c, commands::CASET);
        c.set_mode(Mode::Data);
        c.receive(&[0x00, 0x0A]);
        // Back to command phase with only 2 of 4 bytes: never executed
        c.set_mode(Mode::Command);
        assert_eq!(c.window(), (0, 239, 0, 239));
        // A fresh CASET with a complete argument list still works
        cmd_args(&mut c, commands::CASET, &[0x00, 0x05, 0x00, 0x09]);
        assert_eq!(c.window(), (5, 9, 0, 239));
    }

    #[test]
    fn test_repeated_arguments_rerun_pending_command() {
        // More data bytes in the same phase re-arm the pending command slot.
        let mut c = Controller::new(240, 240);
        cmd(&mut c, commands::CASET);
        c.set_mode(Mode::Data);
        c.receive(&[0x00, 0x0A, 0x00, 0x14, 0x00, 0x1E, 0x00, 0x28]);
        assert_eq!(c.window(), (30, 40, 0, 239));
    }

    #[test]
    fn test_excess_bytes_for_no_arg_command_ignored() {
        let mut c = Controller::new(240, 240);
        cmd(&mut c, commands::NOP);
        c.set_mode(Mode::Data);
        c.receive(&[0xAA, 0xBB, 0xCC]);
        assert_eq!(c.window(), (0, 239, 0, 239));
        assert_eq!(c.pixel_argb(0, 0), 0xFF000000);
    }

    #[test]
    fn test_unknown_command_is_inert() {
        let mut c = Controller::new(240, 240);
        cmd_args(&mut c, commands::MADCTL, &[commands::MADCTL_MV]);
        cmd(&mut c, 0x42);
        assert_eq!(c.madctl(), commands::MADCTL_MV);
        assert_eq!(c.window(), (0, 239, 0, 239));
    }

    #[test]
    fn test_swreset_clears_orientation_pwctr1_keeps_it() {
        let mut c = Controller::new(240, 240);
        cmd_args(&mut c, commands::MADCTL, &[commands::MADCTL_MV]);
        cmd_args(&mut c, commands::CASET, &[0x00, 0x0A, 0x00, 0x14]);

        // PWCTR1 resets addressing but preserves the orientation register
        cmd_args(&mut c, commands::PWCTR1, &[0x00, 0x00, 0x00]);
        assert_eq!(c.window(), (0, 239, 0, 239));
        assert_eq!(c.cursor(), (0, 0));
        assert_eq!(c.madctl(), commands::MADCTL_MV);

        // The no-argument software reset clears it too
        cmd(&mut c, commands::SWRESET);
        assert_eq!(c.madctl(), 0);
    }

    #[test]
    fn test_inert_commands_consume_their_arguments() {
        let mut c = Controller::new(240, 240);
        // Gamma table: 16 argument bytes, no state change
        cmd(&mut c, commands::GMCTRP1);
        c.set_mode(Mode::Data);
        c.receive(&[0u8; 16]);
        assert_eq!(c.window(), (0, 239, 0, 239));
        // COLMOD consumes its single argument
        cmd_args(&mut c, commands::COLMOD, &[0x55]);
        assert_eq!(c.window(), (0, 239, 0, 239));
        assert!(!c.ram_write());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let mut c = Controller::new(8, 8);
        cmd_args(&mut c, commands::MADCTL, &[commands::MADCTL_MV]);
        cmd_args(&mut c, commands::CASET, &[0x00, 0x01, 0x00, 0x05]);
        cmd(&mut c, commands::RAMWR);
        c.set_mode(Mode::Data);
        c.receive(&[0xF8, 0x00]);

        let state = c.save_state();
        let mut restored = Controller::new(8, 8);
        restored.load_state(state).unwrap();
        assert_eq!(restored.madctl(), c.madctl());
        assert_eq!(restored.window(), c.window());
        assert_eq!(restored.cursor(), c.cursor());
        assert_eq!(restored.mode(), Mode::Data);
        assert!(restored.ram_write());
        assert_eq!(restored.framebuffer, c.framebuffer);
    }

    #[test]
    fn test_load_state_rejects_dimension_mismatch() {
        let c = Controller::new(8, 8);
        let state = c.save_state();
        let mut other = Controller::new(16, 16);
        assert!(other.load_state(state).is_err());
    }
}
