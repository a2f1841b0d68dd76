// Packet reassembly over a page sequence
//
// A segment shorter than 255 bytes ends a packet. A page ending in a 255 byte
// segment continues its last packet on the next page, which then carries the
// continuation flag.

use super::page::{OggPage, Pages};

use std::collections::VecDeque;
use std::io::Read;

/// Lazy, forward-only sequence of packets
///
/// Pages are only read when no complete packet is buffered, so taking the
/// first packets leaves the stream right after the page that completed them.
/// The sequence ends after the last page of the stream.
pub struct Packets<'a, R> {
    pages: Pages<'a, R>,
    pending: VecDeque<Vec<u8>>,
    partial: Option<Vec<u8>>,
    finished: bool,
    serial: Option<u32>,
    last_granule_position: Option<u64>,
}

impl<'a, R: Read> Packets<'a, R> {
    pub fn new(reader: &'a mut R) -> Self {
        Packets {
            pages: Pages::new(reader),
            pending: VecDeque::new(),
            partial: None,
            finished: false,
            serial: None,
            last_granule_position: None,
        }
    }

    /// Serial number of the first page read
    pub fn serial(&self) -> Option<u32> {
        self.serial
    }

    /// Granule position of the last page read that completed a packet
    pub fn last_granule_position(&self) -> Option<u64> {
        self.last_granule_position
    }

    fn absorb(&mut self, page: OggPage) {
        let serial = *self.serial.get_or_insert(page.header.bitstream_serial);
        if page.header.bitstream_serial == serial {
            if let Some(granule) = page.header.complete_granule_position() {
                self.last_granule_position = Some(granule);
            }
        }

        let continued = page.header.is_continuation();
        if !continued && self.partial.take().is_some() {
            log::debug!("Dropping packet left unfinished before page {}", page.header.page_sequence);
        }

        // The tail of a packet whose start was never seen
        let mut skipping = continued && self.partial.is_none();

        for segment in page.segments() {
            if !skipping {
                self.partial
                    .get_or_insert_with(Vec::new)
                    .extend_from_slice(segment);
            }

            if segment.len() < 255 {
                if let Some(packet) = self.partial.take() {
                    self.pending.push_back(packet);
                }
                skipping = false;
            }
        }

        if page.header.is_eos() {
            self.finished = true;
            if self.partial.take().is_some() {
                log::debug!("Last page ends inside a packet");
            }
        }
    }
}

impl<R: Read> Iterator for Packets<'_, R> {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(packet) = self.pending.pop_front() {
                return Some(packet);
            }

            if self.finished {
                return None;
            }

            match self.pages.next() {
                Some(page) => self.absorb(page),
                None => self.finished = true,
            }
        }
    }
}
