use super::*;
use bit_field::BitField;
use hal::blocking::delay::DelayMs;
use hal::blocking::i2c::{Read, Write};
use hal::digital::v2::OutputPin;
use log::{debug, trace, warn};

impl<I2C, E, WP, P, D> Ft24cxxa<I2C, WP, D>
where
    I2C: Write<Error = E> + Read<Error = E>,
    WP: OutputPin<Error = P>,
    D: DelayMs<u32>,
{
    /// Initialize the EEPROM device and disable writes.
    ///
    /// `chip_address` must leave the bits used for the high offset bits clear,
    /// see `address_from_chip_select()`.
    pub fn new(
        i2c: I2C,
        wp: WP,
        delay: D,
        chip_address: u8,
        config: Config,
    ) -> Result<Self, Error<E, P>> {
        if chip_address > 0x7F || chip_address & config.offset_high_mask() != 0 {
            warn!("chip address {:#09b} is not usable", chip_address);
            return Err(Error::InvalidChipAddress);
        }
        let mut eeprom = Ft24cxxa {
            i2c,
            wp,
            delay,
            chip_address,
            config,
            buffer: [0; MAX_PAGE_SIZE + 1],
        };
        eeprom.enable_write(false)?;
        Ok(eeprom)
    }

    /// Destroy the driver and return the I2C bus, write-protect pin and delay
    pub fn release(self) -> (I2C, WP, D) {
        (self.i2c, self.wp, self.delay)
    }

    /// Enable or disable writes. The write-protect pin is high to disable writes.
    pub fn enable_write(&mut self, enable: bool) -> I2cRes<E, P> {
        if enable {
            self.wp.set_low().map_err(Error::PinError)
        } else {
            self.wp.set_high().map_err(Error::PinError)
        }
    }

    /// Write an arbitrary amount of data to the device, starting at offset 0.
    ///
    /// The data is written one page at a time, each page blocking for the write
    /// cycle time. A trailing partial page is merged with the current contents of
    /// that page. On a bus error the pages already written stay written.
    pub fn write(&mut self, data: &[u8]) -> I2cRes<E, P> {
        if data.len() >= self.config.capacity() {
            warn!(
                "write of {} bytes would overflow {} byte device",
                data.len(),
                self.config.capacity()
            );
            return Err(Error::TooMuchData);
        }
        let page_size = self.config.page_size();
        let mut pages = data.chunks_exact(page_size);
        let mut offset = 0;

        for page in &mut pages {
            self.write_page(offset, page)?;
            offset += page_size;
        }

        let remainder = pages.remainder();
        if !remainder.is_empty() {
            let mut page = [0; MAX_PAGE_SIZE];
            let page = &mut page[..page_size];
            self.read_into(page, offset)?;
            page[..remainder.len()].copy_from_slice(remainder);
            self.write_page(offset, page)?;
        }

        debug!(
            "wrote {} bytes in {} pages",
            data.len(),
            (data.len() + page_size - 1) / page_size
        );
        Ok(())
    }

    /// Read `buf.len()` bytes starting from a memory offset
    pub fn read_into(&mut self, buf: &mut [u8], offset: usize) -> I2cRes<E, P> {
        match offset.checked_add(buf.len()) {
            Some(end) if end <= self.config.capacity() => (),
            _ => {
                warn!("read of {} bytes at {} is out of range", buf.len(), offset);
                return Err(Error::InvalidAddress);
            }
        }
        self.set_address(offset)?;
        self.i2c
            .read(self.chip_address, buf)
            .map_err(Error::I2cError)
    }

    /// Chip address for a transaction at `offset`, with the high offset bits folded in
    fn compute_bus_address(&self, offset: usize) -> u8 {
        let mask = self.config.offset_high_mask();
        if mask == 0 {
            return self.chip_address;
        }
        let bits = 8 - mask.leading_zeros() as usize;
        self.chip_address | offset.get_bits(8..8 + bits) as u8
    }

    /// Empty write that latches the device's address pointer to `offset`
    fn set_address(&mut self, offset: usize) -> I2cRes<E, P> {
        let address = self.compute_bus_address(offset);
        let register = offset.get_bits(0..8) as u8;
        trace!("latch {:#04x}:{:#04x}", address, register);
        self.i2c
            .write(address, &[register])
            .map_err(Error::I2cError)
    }

    /// Write exactly one page starting on a page boundary and wait for the write cycle
    fn write_page(&mut self, offset: usize, page: &[u8]) -> I2cRes<E, P> {
        let page_size = self.config.page_size();
        if page.len() != page_size {
            warn!("page of {} bytes, expected {}", page.len(), page_size);
            return Err(Error::InvalidPageLength);
        }
        if offset % page_size != 0 {
            warn!("page offset {} is not on a page boundary", offset);
            return Err(Error::UnalignedOffset);
        }
        self.buffer[1..=page_size].copy_from_slice(page);
        let address = self.compute_bus_address(offset);
        self.buffer[0] = offset.get_bits(0..8) as u8;
        trace!("page {:#04x}:{:#04x}", address, self.buffer[0]);
        self.i2c
            .write(address, &self.buffer[..=page_size])
            .map_err(Error::I2cError)?;
        self.delay.delay_ms(self.config.write_cycle_ms());
        Ok(())
    }
}
