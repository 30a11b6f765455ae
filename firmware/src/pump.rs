//! UART byte pumps.
//!
//! Each pump owns one end of a link queue and never touches protocol
//! state. Receive pumps push every byte the UART delivers; the transmit
//! pump drains the outbound queue in chunks whenever it is kicked.

use defmt::warn;
use embassy_rp::uart::{Async, Error as UartError, UartRx, UartTx};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use serial_link::{Channel, QueueReader, QueueWriter};

/// Largest write handed to the UART at once.
pub const TX_CHUNK: usize = 64;

fn error_name(e: UartError) -> &'static str {
    match e {
        UartError::Framing => "framing",
        UartError::Overrun => "overrun",
        UartError::Parity => "parity",
        UartError::Break => "break",
        _ => "unknown",
    }
}

/// Move bytes from `rx` into `inbound` forever.
///
/// UART errors and full queues are logged and the byte is lost; the
/// protocol layers resynchronize on their own.
pub async fn receive_into<const N: usize>(
    channel: Channel,
    rx: &mut UartRx<'_, Async>,
    inbound: &mut QueueWriter<'_, N>,
) -> ! {
    let mut byte = [0u8; 1];
    loop {
        if let Err(e) = rx.read(&mut byte).await {
            warn!("{} UART {} error", channel, error_name(e));
            continue;
        }
        if !inbound.push(byte[0]) {
            warn!(
                "{} inbound queue full ({=u32} bytes lost)",
                channel,
                inbound.overflow_count()
            );
        }
    }
}

/// Write everything queued in `outbound` each time `kick` fires.
pub async fn transmit_from<const N: usize>(
    tx: &mut UartTx<'_, Async>,
    outbound: &mut QueueReader<'_, N>,
    kick: &Signal<CriticalSectionRawMutex, ()>,
) -> ! {
    let mut chunk = [0u8; TX_CHUNK];
    loop {
        kick.wait().await;
        loop {
            let mut len = 0;
            while len < chunk.len() {
                match outbound.pop() {
                    Some(b) => {
                        chunk[len] = b;
                        len += 1;
                    }
                    None => break,
                }
            }
            if len == 0 {
                break;
            }
            if let Err(e) = tx.write(&chunk[..len]).await {
                warn!("radio UART {} error, {=usize} bytes lost", error_name(e), len);
            }
        }
    }
}
