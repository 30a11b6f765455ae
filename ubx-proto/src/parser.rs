//! Streaming UBX parser state machine.
//!
//! The parser cycles through three states and never terminates:
//!
//! ```text
//!  Idle ──(byte available)──▶ Reading ──(frame complete)──▶ Parsing
//!   ▲                            │                             │
//!   └────────(sync mismatch / oversized)                       │
//!   └──────────────────────(payload fully parsed)──────────────┘
//! ```
//!
//! - **Reading** consumes one byte per step and validates it against its
//!   position in the frame. A wrong sync byte sends the parser straight
//!   back to Idle; there is no resynchronisation inside a frame.
//! - **Parsing** decodes one payload field per step using the tables in
//!   [`crate::fields`]. Unknown `(class, id)` pairs are skipped whole.
//!
//! The checksum is computed and reported but does not gate acceptance:
//! a frame with a bad checksum is still parsed.
//!
//! State survives across calls, so bytes may arrive in any chunking.

use crate::fields::layout_for;
use crate::frame::UbxFrame;
use crate::navigation::NavigationState;
use crate::{CHECKSUM_SIZE, CONNECTION_TIMEOUT_MS, HEADER_SIZE, MAX_FRAME_SIZE, SYNC1, SYNC2};
use serial_link::ByteSource;

#[cfg(feature = "defmt")]
use defmt::{debug, warn};

// Stub macros when defmt is not available
#[cfg(not(feature = "defmt"))]
macro_rules! debug {
    ($($arg:tt)*) => {{}};
}

#[cfg(not(feature = "defmt"))]
macro_rules! warn {
    ($($arg:tt)*) => {{}};
}

/// Parser state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParserState {
    /// Waiting for the first byte of a frame.
    Idle,
    /// Receiving header, payload and checksum bytes.
    Reading,
    /// Decoding payload fields of a complete frame.
    Parsing,
}

/// Something noteworthy happened while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UbxEvent {
    /// Sync bytes seen while the link was marked disconnected.
    Connected,
    /// No sync bytes seen within the connection timeout.
    Disconnected,
    /// Byte at `index` (0 or 1) was not the expected sync byte.
    SyncError {
        /// Frame index of the offending byte.
        index: u8,
    },
    /// Declared frame length does not fit in the frame buffer.
    Oversized {
        /// Declared payload length.
        payload_len: u16,
    },
    /// All bytes of a frame arrived.
    FrameReceived {
        /// Message class.
        class: u8,
        /// Message id.
        id: u8,
        /// Whether the received checksum matches the contents.
        checksum_ok: bool,
    },
    /// A known frame was fully decoded into the navigation state.
    FrameParsed {
        /// Message class.
        class: u8,
        /// Message id.
        id: u8,
    },
    /// A frame with an unsupported `(class, id)` was skipped.
    UnknownMessage {
        /// Message class.
        class: u8,
        /// Message id.
        id: u8,
    },
}

/// Running totals kept by the parser.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ParserStats {
    /// Frames received completely.
    pub frames_received: u32,
    /// Known frames decoded.
    pub frames_parsed: u32,
    /// Frames abandoned on a sync mismatch.
    pub sync_errors: u32,
    /// Frames abandoned because they would not fit the buffer.
    pub oversized: u32,
    /// Frames skipped because the message type is not supported.
    pub unknown_messages: u32,
    /// Frames accepted even though their checksum did not match.
    pub checksum_mismatches: u32,
}

/// Reason a byte ended the current frame early.
enum Reject {
    Sync,
    Oversized,
}

/// UBX navigation frame parser.
///
/// Owns the [`NavigationState`]: nothing else writes the decoded fields.
pub struct UbxParser {
    state: ParserState,
    frame: UbxFrame,
    nav: NavigationState,
    timeout_ms: u64,
    connected_until: u64,
    stats: ParserStats,
}

impl UbxParser {
    /// Create a parser with the default 5 s connection timeout.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_timeout(CONNECTION_TIMEOUT_MS)
    }

    /// Create a parser with a custom connection timeout.
    #[must_use]
    pub const fn with_timeout(timeout_ms: u64) -> Self {
        Self {
            state: ParserState::Idle,
            frame: UbxFrame::new(),
            nav: NavigationState::new(),
            timeout_ms,
            connected_until: 0,
            stats: ParserStats {
                frames_received: 0,
                frames_parsed: 0,
                sync_errors: 0,
                oversized: 0,
                unknown_messages: 0,
                checksum_mismatches: 0,
            },
        }
    }

    /// Current state.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> ParserState {
        self.state
    }

    /// Latest navigation data.
    #[inline]
    #[must_use]
    pub const fn navigation(&self) -> &NavigationState {
        &self.nav
    }

    /// Mutable navigation data, for changing error-correction settings.
    ///
    /// Decoded fields stay read-only outside this crate.
    #[inline]
    pub fn navigation_mut(&mut self) -> &mut NavigationState {
        &mut self.nav
    }

    /// Frame currently being assembled or parsed.
    #[inline]
    #[must_use]
    pub const fn frame(&self) -> &UbxFrame {
        &self.frame
    }

    /// Running totals.
    #[inline]
    #[must_use]
    pub const fn stats(&self) -> ParserStats {
        self.stats
    }

    /// Advance the state machine until input runs out or `max_steps` steps
    /// were taken, then run the connection timeout check.
    ///
    /// Returns the number of steps taken. Events are reported through
    /// `on_event` as they happen.
    pub fn poll<S, F>(&mut self, source: &mut S, now_ms: u64, max_steps: usize, mut on_event: F) -> usize
    where
        S: ByteSource + ?Sized,
        F: FnMut(UbxEvent),
    {
        let mut steps = 0;
        while steps < max_steps && self.step(source, now_ms, &mut on_event) {
            steps += 1;
        }

        if self.check_connection(now_ms) {
            on_event(UbxEvent::Disconnected);
        }

        steps
    }

    /// Take one step of the state machine.
    ///
    /// Returns `false` when no progress is possible until more bytes arrive.
    pub fn step<S, F>(&mut self, source: &mut S, now_ms: u64, on_event: &mut F) -> bool
    where
        S: ByteSource + ?Sized,
        F: FnMut(UbxEvent),
    {
        match self.state {
            ParserState::Idle => {
                if source.is_empty() {
                    return false;
                }
                self.start_read();
                true
            }
            ParserState::Reading => {
                let Some(byte) = source.pop() else {
                    return false;
                };

                match self.read_byte(byte, now_ms, on_event) {
                    Ok(()) if self.frame.is_complete() => self.start_parse(on_event),
                    Ok(()) => {}
                    Err(Reject::Sync) => {
                        self.stats.sync_errors += 1;
                        self.state = ParserState::Idle;
                    }
                    Err(Reject::Oversized) => {
                        self.stats.oversized += 1;
                        self.state = ParserState::Idle;
                    }
                }
                true
            }
            ParserState::Parsing => {
                self.parse_field(on_event);
                true
            }
        }
    }

    /// Clear the connected flag if the timeout since the last sync elapsed.
    ///
    /// Returns `true` if the link was connected and has just timed out.
    pub fn check_connection(&mut self, now_ms: u64) -> bool {
        if self.nav.is_connected() && now_ms >= self.connected_until {
            warn!("GPS connection timed out");
            self.nav.set_connected(false);
            true
        } else {
            false
        }
    }

    fn start_read(&mut self) {
        self.frame.reset();
        self.state = ParserState::Reading;
    }

    fn start_parse<F: FnMut(UbxEvent)>(&mut self, on_event: &mut F) {
        let checksum_ok = self.frame.checksum_matches();
        self.stats.frames_received += 1;
        if !checksum_ok {
            self.stats.checksum_mismatches += 1;
        }
        on_event(UbxEvent::FrameReceived {
            class: self.frame.class(),
            id: self.frame.id(),
            checksum_ok,
        });

        self.frame.set_cursor(HEADER_SIZE);
        self.state = ParserState::Parsing;
    }

    fn set_connected<F: FnMut(UbxEvent)>(&mut self, now_ms: u64, on_event: &mut F) {
        if !self.nav.is_connected() {
            debug!("GPS connected");
            on_event(UbxEvent::Connected);
        }
        self.nav.set_connected(true);
        self.connected_until = now_ms.saturating_add(self.timeout_ms);
    }

    /// Store and validate the byte at the current frame index.
    fn read_byte<F: FnMut(UbxEvent)>(
        &mut self,
        byte: u8,
        now_ms: u64,
        on_event: &mut F,
    ) -> Result<(), Reject> {
        let index = self.frame.cursor();
        self.frame.store(byte);

        match index {
            0 => {
                if byte != SYNC1 {
                    on_event(UbxEvent::SyncError { index: 0 });
                    return Err(Reject::Sync);
                }
            }
            1 => {
                if byte != SYNC2 {
                    on_event(UbxEvent::SyncError { index: 1 });
                    return Err(Reject::Sync);
                }
                self.set_connected(now_ms, on_event);
            }
            2 => self.frame.set_class(byte),
            3 => self.frame.set_id(byte),
            4 => {}
            5 => {
                let raw = self.frame.raw();
                let payload_len = u16::from_le_bytes([raw[4], raw[5]]);
                let total = usize::from(payload_len) + HEADER_SIZE + CHECKSUM_SIZE;
                if total > MAX_FRAME_SIZE {
                    warn!("UBX frame too long: {=u16} byte payload", payload_len);
                    on_event(UbxEvent::Oversized { payload_len });
                    return Err(Reject::Oversized);
                }
                self.frame.set_total_length(total);
            }
            _ => {
                // Payload and checksum bytes are only stored here
                if index >= self.frame.total_length() - 1 {
                    self.frame.mark_complete();
                }
            }
        }

        self.frame.advance(1);
        Ok(())
    }

    /// Decode the payload field at the cursor and advance past it.
    fn parse_field<F: FnMut(UbxEvent)>(&mut self, on_event: &mut F) {
        let class = self.frame.class();
        let id = self.frame.id();
        let end = self.frame.total_length() - CHECKSUM_SIZE;
        let cursor = self.frame.cursor();

        if cursor < end {
            match layout_for(class, id) {
                None => {
                    debug!("Skipping UBX message {=u8:#x}/{=u8:#x}", class, id);
                    self.stats.unknown_messages += 1;
                    on_event(UbxEvent::UnknownMessage { class, id });
                    self.frame.set_cursor(self.frame.total_length());
                    self.state = ParserState::Idle;
                    return;
                }
                Some(layout) => match layout.field_at(cursor - HEADER_SIZE) {
                    Some(spec) if cursor + spec.width <= end => {
                        let bytes = &self.frame.raw()[cursor..cursor + spec.width];
                        spec.field.apply(bytes, &mut self.nav);
                        self.frame.advance(spec.width);
                    }
                    // Field runs past the declared payload
                    Some(_) => self.frame.set_cursor(end),
                    None => self.frame.advance(1),
                },
            }
        }

        if self.frame.cursor() >= end {
            self.stats.frames_parsed += 1;
            on_event(UbxEvent::FrameParsed { class, id });
            self.state = ParserState::Idle;
        }
    }
}

impl Default for UbxParser {
    fn default() -> Self {
        Self::new()
    }
}
