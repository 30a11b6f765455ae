#![no_std]
#![no_main]

use defmt::info;
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::{UART0, UART1};
use embassy_rp::uart::{Async, Config as UartConfig, Uart, UartRx, UartTx};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Instant, Ticker};
use rescue_boat_firmware::{
    receive_into, split_link, transmit_from, ByteQueue, Channel, Config, Controller, LinkDriver,
    LogEvents, QueueReader, QueueWriter, RescueMission, GPS_BAUDRATE, QUEUE_SIZE, RADIO_BAUDRATE,
    TICK_MS,
};
use static_cell::StaticCell;

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

bind_interrupts!(struct Irqs {
    UART0_IRQ => embassy_rp::uart::InterruptHandler<UART0>;
    UART1_IRQ => embassy_rp::uart::InterruptHandler<UART1>;
});

/// Link queues. Each one has exactly one producer and one consumer.
static GPS_RX: StaticCell<ByteQueue<QUEUE_SIZE>> = StaticCell::new();
static GPS_TX: StaticCell<ByteQueue<QUEUE_SIZE>> = StaticCell::new();
static RADIO_RX: StaticCell<ByteQueue<QUEUE_SIZE>> = StaticCell::new();
static RADIO_TX: StaticCell<ByteQueue<QUEUE_SIZE>> = StaticCell::new();

/// Wakes the radio transmit pump when the controller queued bytes.
static RADIO_KICK: StaticCell<Signal<CriticalSectionRawMutex, ()>> = StaticCell::new();

/// Ticks between position log lines.
const NAV_LOG_TICKS: u32 = 100;

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Rescue boat starting...");

    let p = embassy_rp::init(embassy_rp::config::Config::default());

    let kick = RADIO_KICK.init(Signal::new());

    let (gps, gps_irq) = split_link(GPS_RX.init(ByteQueue::new()), GPS_TX.init(ByteQueue::new()));
    let (radio, radio_irq) = split_link(
        RADIO_RX.init(ByteQueue::new()),
        RADIO_TX.init(ByteQueue::new()),
    );
    let links = LinkDriver::new(gps, radio);

    // Nothing is sent to the GPS; its outbound queue stays empty
    let (gps_inbound, _gps_outbound) = gps_irq.into_parts();
    let (radio_inbound, radio_outbound) = radio_irq.into_parts();

    // --- GPS UART ---
    let mut gps_config = UartConfig::default();
    gps_config.baudrate = GPS_BAUDRATE;
    let gps_rx = UartRx::new(
        p.UART0,
        p.PIN_1, // RX
        Irqs,
        p.DMA_CH0,
        gps_config,
    );

    // --- Radio UART ---
    let mut radio_config = UartConfig::default();
    radio_config.baudrate = RADIO_BAUDRATE;
    let radio_uart = Uart::new(
        p.UART1,
        p.PIN_8, // TX
        p.PIN_9, // RX
        Irqs,
        p.DMA_CH1,
        p.DMA_CH2,
        radio_config,
    );
    let (radio_tx, radio_rx) = radio_uart.split();
    info!(
        "GPS on UART0 at {=u32} baud, radio on UART1 at {=u32} baud",
        GPS_BAUDRATE, RADIO_BAUDRATE
    );

    let controller = Controller::new(Config::default(), RescueMission::new(), LogEvents);

    // Spawn tasks (unwrap the SpawnToken, then spawn)
    spawner.spawn(rx_task(Channel::Gps, gps_rx, gps_inbound).unwrap());
    spawner.spawn(rx_task(Channel::Radio, radio_rx, radio_inbound).unwrap());
    spawner.spawn(tx_task(radio_tx, radio_outbound, kick).unwrap());
    spawner.spawn(control_task(controller, links, kick).unwrap());

    info!("Rescue boat initialized, waiting for GPS...");
}

/// Receive pump, one instance per UART.
#[embassy_executor::task(pool_size = 2)]
async fn rx_task(
    channel: Channel,
    mut rx: UartRx<'static, Async>,
    mut inbound: QueueWriter<'static, QUEUE_SIZE>,
) {
    receive_into(channel, &mut rx, &mut inbound).await
}

/// Radio transmit pump.
#[embassy_executor::task]
async fn tx_task(
    mut tx: UartTx<'static, Async>,
    mut outbound: QueueReader<'static, QUEUE_SIZE>,
    kick: &'static Signal<CriticalSectionRawMutex, ()>,
) {
    transmit_from(&mut tx, &mut outbound, kick).await
}

/// Scheduler loop. Owns all protocol state.
#[embassy_executor::task]
async fn control_task(
    mut controller: Controller<RescueMission, LogEvents>,
    mut links: LinkDriver<'static, QUEUE_SIZE>,
    kick: &'static Signal<CriticalSectionRawMutex, ()>,
) {
    let mut ticker = Ticker::every(Duration::from_millis(TICK_MS));
    let mut ticks: u32 = 0;

    loop {
        controller.tick(&mut links, Instant::now().as_millis());

        if links.stats(Channel::Radio).tx_pending > 0 {
            kick.signal(());
        }

        ticks = ticks.wrapping_add(1);
        let nav = controller.navigation();
        if ticks % NAV_LOG_TICKS == 0 && nav.has_position() {
            info!(
                "position lat={} lon={} alt={}m fix={=bool}",
                nav.latitude(),
                nav.longitude(),
                nav.altitude(),
                nav.has_fix()
            );
        }

        ticker.next().await;
    }
}
