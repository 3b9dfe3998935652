//! ST7789 simulator viewer.
//!
//! Plays the role of the host microcontroller: drives the simulated panel
//! through its pin and byte-block interface with a typical init sequence and
//! a demo scene, then shows the resulting framebuffer in a window.
//!
//! ## Keys
//!
//! - `S` — screenshot (PNG file in the working directory)
//! - `F5` / `F9` — save / load state
//! - `R` — hardware reset pulse and scene redraw
//! - `D` — toggle diagnostic output
//! - `Esc` — quit

use minifb::{Key, KeyRepeat, Scale, ScaleMode, Window, WindowOptions};
use st7789_core::{commands, png, St7789, DEFAULT_HEIGHT, DEFAULT_WIDTH};

const STATE_FILE: &str = "st7789.state";
const SCREENSHOT_FILE: &str = "st7789_screenshot.png";

// ─── Bus helpers (host side of the protocol) ────────────────────────────────

fn command(dev: &mut St7789, code: u8) {
    dev.pin_dc(false);
    dev.spi_block(&[code]);
}

fn command_args(dev: &mut St7789, code: u8, args: &[u8]) {
    command(dev, code);
    dev.pin_dc(true);
    dev.spi_block(args);
}

fn pack_range(start: u16, end: u16) -> [u8; 4] {
    [(start >> 8) as u8, start as u8, (end >> 8) as u8, end as u8]
}

/// Establish the write window: CASET for columns, RASET for rows.
fn set_window(dev: &mut St7789, x0: u16, x1: u16, y0: u16, y1: u16) {
    command_args(dev, commands::CASET, &pack_range(x0, x1));
    command_args(dev, commands::RASET, &pack_range(y0, y1));
}

/// Stream `count` copies of one RGB565 color as a RAMWR payload.
fn fill(dev: &mut St7789, color: u16, count: usize) {
    command(dev, commands::RAMWR);
    dev.pin_dc(true);
    let mut payload = Vec::with_capacity(count * 2);
    for _ in 0..count {
        payload.extend_from_slice(&color.to_be_bytes());
    }
    dev.spi_block(&payload);
}

fn rgb565(r: u8, g: u8, b: u8) -> u16 {
    (u16::from(r >> 3) << 11) | (u16::from(g >> 2) << 5) | u16::from(b >> 3)
}

// ─── Demo scene ─────────────────────────────────────────────────────────────

/// Typical host bring-up: reset pulse, sleep out, 16 bpp, default scan
/// direction, display on.
fn init_panel(dev: &mut St7789) {
    dev.pin_rst(false);
    dev.pin_rst(true);
    dev.pin_cs(false);
    command(dev, commands::SLPOUT);
    command_args(dev, commands::COLMOD, &[0x55]);
    command_args(dev, commands::MADCTL, &[0x00]);
    command(dev, commands::DISPON);
}

/// Color bars across the top, a gradient square in the middle, and one
/// windowed fill drawn with the axes swapped to exercise MADCTL.
fn draw_scene(dev: &mut St7789) {
    let w = dev.controller.width() as u16;

    // Eight color bars, top quarter of the panel
    let colors = [
        rgb565(255, 255, 255),
        rgb565(255, 255, 0),
        rgb565(0, 255, 255),
        rgb565(0, 255, 0),
        rgb565(255, 0, 255),
        rgb565(255, 0, 0),
        rgb565(0, 0, 255),
        rgb565(32, 32, 32),
    ];
    let bar = w / colors.len() as u16;
    for (i, &color) in colors.iter().enumerate() {
        let x0 = i as u16 * bar;
        set_window(dev, x0, x0 + bar - 1, 0, 59);
        fill(dev, color, usize::from(bar) * 60);
    }

    // Gradient square: red ramps with x, blue with y
    set_window(dev, 40, 199, 80, 199);
    command(dev, commands::RAMWR);
    dev.pin_dc(true);
    let mut payload = Vec::with_capacity(160 * 120 * 2);
    for y in 0u16..120 {
        for x in 0u16..160 {
            let color = rgb565((x * 255 / 159) as u8, 0, (y * 255 / 119) as u8);
            payload.extend_from_slice(&color.to_be_bytes());
        }
    }
    dev.spi_block(&payload);

    // Swap axes and paint a full-width band column-major to exercise
    // MADCTL. With MV set the nominal column window addresses rows.
    command_args(dev, commands::MADCTL, &[commands::MADCTL_MV]);
    set_window(dev, 64, 79, 0, w - 1);
    fill(dev, rgb565(255, 128, 0), 16 * usize::from(w));
    command_args(dev, commands::MADCTL, &[0x00]);
}

// ─── Main loop ──────────────────────────────────────────────────────────────

fn main() {
    let debug = std::env::args().any(|a| a == "--debug" || a == "-d");

    let mut dev = St7789::new(DEFAULT_WIDTH, DEFAULT_HEIGHT);
    dev.controller.debug = debug;
    if debug {
        eprintln!(
            "st7789-sim: {}x{} panel",
            dev.controller.width(),
            dev.controller.height()
        );
    }
    init_panel(&mut dev);
    draw_scene(&mut dev);

    let width = dev.controller.width() as usize;
    let height = dev.controller.height() as usize;
    let mut window = Window::new(
        "st7789-sim",
        width,
        height,
        WindowOptions {
            scale: Scale::X2,
            scale_mode: ScaleMode::AspectRatioStretch,
            resize: true,
            ..WindowOptions::default()
        },
    )
    .expect("Failed to create window");
    window.set_target_fps(60);

    // Animated sweep along the bottom strip, one column per frame
    let mut sweep: u16 = 0;

    while window.is_open() && !window.is_key_down(Key::Escape) {
        set_window(&mut dev, sweep, sweep, 232, 239);
        let hue = rgb565((sweep % 256) as u8, 255 - (sweep % 256) as u8, 128);
        fill(&mut dev, hue, 8);
        sweep = (sweep + 1) % DEFAULT_WIDTH as u16;

        if window.is_key_pressed(Key::S, KeyRepeat::No) {
            let shot = png::encode_png(
                dev.controller.width(),
                dev.controller.height(),
                &dev.controller.framebuffer,
            );
            match std::fs::write(SCREENSHOT_FILE, &shot) {
                Ok(()) => eprintln!("Screenshot saved to {}", SCREENSHOT_FILE),
                Err(e) => eprintln!("Screenshot failed: {}", e),
            }
        }
        if window.is_key_pressed(Key::F5, KeyRepeat::No) {
            match dev.save_state_to(std::path::Path::new(STATE_FILE)) {
                Ok(()) => eprintln!("State saved to {}", STATE_FILE),
                Err(e) => eprintln!("Save failed: {}", e),
            }
        }
        if window.is_key_pressed(Key::F9, KeyRepeat::No) {
            match dev.load_state_from(std::path::Path::new(STATE_FILE)) {
                Ok(()) => eprintln!("State loaded from {}", STATE_FILE),
                Err(e) => eprintln!("Load failed: {}", e),
            }
        }
        if window.is_key_pressed(Key::R, KeyRepeat::No) {
            init_panel(&mut dev);
            draw_scene(&mut dev);
            eprintln!("Hardware reset");
        }
        if window.is_key_pressed(Key::D, KeyRepeat::No) {
            dev.controller.debug = !dev.controller.debug;
            eprintln!(
                "Diagnostics {}",
                if dev.controller.debug { "on" } else { "off" }
            );
        }

        dev.controller.dirty = false;
        window
            .update_with_buffer(&dev.controller.as_pixel_buffer(), width, height)
            .expect("Failed to update window");
    }
}
