/*!
This is a platform agnostic Rust driver for the FT24CxxA series of I2C serial EEPROM chips,
based on the [`embedded-hal`](https://github.com/rust-embedded/embedded-hal) traits.

This driver allows you to:

- Write an arbitrary amount of data starting at offset 0. See: `write()`.
- Read an N-byte array starting on a memory offset. See: `read_into()`.
- Enable and disable writes by managing the _WP_ (write-protect) pin. See: `enable_write()`.
- Compute the bus address of a chip from its address pin straps. See: `address_from_chip_select()`.

Writes are split into hardware pages. A trailing partial page is read back from the chip
and merged, so bytes past the end of the written data keep their previous contents.
Every page write blocks for the chip's write cycle time: a full 1 KB write takes ~320 ms.

# Supported devices

| Device   | Memory bytes | Memory bits | Page bytes | Offset bits in chip address |
|---------:|-------------:|------------:|-----------:|----------------------------:|
| FT24C02A |        256 B |      2 Kbit |          8 |                           0 |
| FT24C04A |        512 B |      4 Kbit |         16 |                           1 |
| FT24C08A |       1 KB   |      8 Kbit |         16 |                           2 |
| FT24C16A |       2 KB   |     16 Kbit |         16 |                           3 |

The chips take one byte of memory offset on the bus. Offset bits above bit 7 are carried
in the low bits of the I2C chip address, which are therefore not available as address
pin straps. This is a convention of this chip family, other families use two offset bytes.

# Usage

```ignore
use ft24cxxa::*;

// 1. Ensure i2c, write-protect pin and delay are defined (device specific)

// 2. Instantiate a FT24C08A with its A2 pin tied low. Writes are disabled from here on.
let address = address_from_chip_select(0);
let mut eeprom = Ft24cxxa::new(i2c, wp, delay, address, Config::FT24C08A).unwrap();

// 3. Write 20 bytes at offset 0: one full page and one merged partial page
eeprom.enable_write(true).unwrap();
eeprom.write(b"Planet Innovation!!!").unwrap();
eeprom.enable_write(false).unwrap();

// 4. Read them back
let mut data = [0u8; 20];
eeprom.read_into(&mut data, 0).unwrap();
assert_eq!(&data, b"Planet Innovation!!!");

// 5. Give the bus, pin and delay back
let (i2c, wp, delay) = eeprom.release();
```
*/
#![deny(unsafe_code)]
#![cfg_attr(not(test), no_std)]

extern crate bit_field;
extern crate embedded_hal as hal;

mod ft24cxxa;

/// Largest page of any supported device, in bytes
pub const MAX_PAGE_SIZE: usize = 16;

/// Largest capacity reachable with one offset byte and three chip address bits
pub const MAX_CAPACITY: usize = 2048;

/// Base pattern of the 7-bit I2C address of the FT24CxxA family
pub const BASE_ADDRESS: u8 = 0b101_0000;

/// FT24CxxA EEPROM driver
#[derive(Debug)]
pub struct Ft24cxxa<I2C, WP, D> {
    /// The concrete I2C bus implementation
    i2c: I2C,
    /// The write-protect pin, high disables writes
    wp: WP,
    /// Blocking delay used to wait out the write cycle
    delay: D,
    /// The 7-bit chip address, with the offset bits cleared
    chip_address: u8,
    /// The device geometry
    config: Config,
    /// Register offset byte followed by one page of data
    buffer: [u8; MAX_PAGE_SIZE + 1],
}

/// Geometry and timing of a device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    capacity: usize,
    page_size: usize,
    write_cycle_ms: u32,
}

impl Config {
    /// FT24C02A, 256 B (2 Kbit)
    pub const FT24C02A: Config = Config {
        capacity: 256,
        page_size: 8,
        write_cycle_ms: 5,
    };
    /// FT24C04A, 512 B (4 Kbit)
    pub const FT24C04A: Config = Config {
        capacity: 512,
        page_size: 16,
        write_cycle_ms: 5,
    };
    /// FT24C08A, 1 KB (8 Kbit)
    pub const FT24C08A: Config = Config {
        capacity: 1024,
        page_size: 16,
        write_cycle_ms: 5,
    };
    /// FT24C16A, 2 KB (16 Kbit)
    pub const FT24C16A: Config = Config {
        capacity: 2048,
        page_size: 16,
        write_cycle_ms: 5,
    };

    /// Describe a custom device.
    ///
    /// Returns `None` unless both sizes are powers of two, the page fits in
    /// `MAX_PAGE_SIZE` and the capacity fits in `MAX_CAPACITY`.
    pub const fn new(capacity: usize, page_size: usize, write_cycle_ms: u32) -> Option<Config> {
        if !capacity.is_power_of_two()
            || !page_size.is_power_of_two()
            || page_size > MAX_PAGE_SIZE
            || capacity > MAX_CAPACITY
            || capacity < page_size
        {
            None
        } else {
            Some(Config {
                capacity,
                page_size,
                write_cycle_ms,
            })
        }
    }

    /// Total addressable bytes
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes per atomic page write
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    /// Settle time after each page write
    pub const fn write_cycle_ms(&self) -> u32 {
        self.write_cycle_ms
    }

    /// Mask of the offset bits (shifted down by 8) that go into the chip address
    pub const fn offset_high_mask(&self) -> u8 {
        ((self.capacity - 1) >> 8) as u8
    }
}

/// All possible errors in this crate
#[derive(Debug)]
pub enum Error<E, P> {
    /// I2C bus error
    I2cError(E),
    /// Write-protect pin error
    PinError(P),
    /// Data does not fit in the device, the last byte is never written
    TooMuchData,
    /// A page write was given anything other than exactly one page
    InvalidPageLength,
    /// A page write did not start on a page boundary
    UnalignedOffset,
    /// Memory range is out of the device's capacity
    InvalidAddress,
    /// Chip address is wider than 7 bits or overlaps the offset bits
    InvalidChipAddress,
}

/// Construct the chip address of a device given the value of its address pin straps.
///
/// The strap value is shifted into bit 2, which is the FT24C08A layout: a single `A2` pin,
/// with `A1` and `A0` carrying offset bits. Other parts of the family strap different bits,
/// build their address from `BASE_ADDRESS` directly.
pub const fn address_from_chip_select(select_bits: u8) -> u8 {
    BASE_ADDRESS | (select_bits << 2)
}

type I2cRes<E, P> = Result<(), Error<E, P>>;
