//! ST7789 command set.
//!
//! Command codes, their fixed argument counts, and the MADCTL scan-direction
//! bits. The controller has no multi-byte opcodes: every byte received in the
//! command phase is a complete command code, and the table below tells the
//! dispatcher how many data-phase bytes follow as arguments.

pub const NOP: u8 = 0x00;
pub const SWRESET: u8 = 0x01;
pub const SLPIN: u8 = 0x10;
pub const SLPOUT: u8 = 0x11;
pub const INVOFF: u8 = 0x20;
pub const INVON: u8 = 0x21;
pub const DISPOFF: u8 = 0x28;
pub const DISPON: u8 = 0x29;
/// Column address set
pub const CASET: u8 = 0x2A;
/// Row address set
pub const RASET: u8 = 0x2B;
/// Memory write (pixel stream follows in the data phase)
pub const RAMWR: u8 = 0x2C;
/// Memory access control (scan direction)
pub const MADCTL: u8 = 0x36;
/// Interface pixel format
pub const COLMOD: u8 = 0x3A;
pub const FRMCTR1: u8 = 0xB1;
pub const FRMCTR2: u8 = 0xB2;
pub const FRMCTR3: u8 = 0xB3;
pub const INVCTR: u8 = 0xB4;
pub const DISSET5: u8 = 0xB6;
pub const PWCTR1: u8 = 0xC0;
pub const PWCTR2: u8 = 0xC1;
pub const PWCTR3: u8 = 0xC2;
pub const PWCTR4: u8 = 0xC3;
pub const PWCTR5: u8 = 0xC4;
pub const VMCTR: u8 = 0xC5;
/// Positive gamma correction table
pub const GMCTRP1: u8 = 0xE0;
/// Negative gamma correction table
pub const GMCTRN1: u8 = 0xE1;

/// MADCTL bit: row address order (mirror Y)
pub const MADCTL_MY: u8 = 0b1000_0000;
/// MADCTL bit: column address order (mirror X)
pub const MADCTL_MX: u8 = 0b0100_0000;
/// MADCTL bit: row/column exchange (axis swap)
pub const MADCTL_MV: u8 = 0b0010_0000;

/// Number of argument bytes each command expects.
///
/// Unrecognized codes take no arguments and execute (as a no-op) immediately.
pub fn arg_count(code: u8) -> usize {
    match code {
        MADCTL | PWCTR2 | INVCTR | VMCTR | COLMOD => 1,
        PWCTR3 | PWCTR4 | PWCTR5 | DISSET5 => 2,
        FRMCTR1 | FRMCTR2 | PWCTR1 => 3,
        CASET | RASET => 4,
        FRMCTR3 => 6,
        GMCTRP1 | GMCTRN1 => 16,
        _ => 0,
    }
}
