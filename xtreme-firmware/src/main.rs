//! Xtreme - Atari STe companion controller firmware
//!
//! Runs on an STM32F103C8 sitting between the machine's mainboard and a
//! 16x2 character LCD. The host talks to it over I2C as if it were an LCD
//! backpack or a floppy-emulator OSD; a local configuration menu driven from
//! the ST keyboard selects the ROM bank, sound mode and boot drive.

#![no_std]
#![no_main]

mod board;
mod bus;
mod config;
mod controller;

use defmt::*;
use embassy_executor::Spawner;
use embassy_stm32::i2c::{self as i2c_master, I2c};
use embassy_stm32::peripherals::USART2;
use embassy_stm32::time::Hertz;
use embassy_stm32::usart::{self, BufferedUart};
use embassy_stm32::wdg::IndependentWatchdog;
use embassy_stm32::{bind_interrupts, Config};
use embassy_time::{Delay, Duration, Instant, Ticker};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use xtreme_core::config::{ConfigStore, LoadOutcome};
use xtreme_core::input::{ButtonDebouncer, LiveOutputs};
use xtreme_core::session::ConfigSession;
use xtreme_display::{Compositor, DisplayFrame};
use xtreme_drivers::keyboard::StKeyboard;
use xtreme_drivers::lcd::Hd44780;
use xtreme_hal_stm32f1::flash::ConfigPage;
use xtreme_hal_stm32f1::gpio::strap_fitted;
use xtreme_hal_stm32f1::i2c::I2cSlave;
use xtreme_hal_stm32f1::uart::{KeyboardRx, KEYBOARD_BAUD};
use xtreme_protocol::{
    BusLink, BusRings, Decoder, Protocol, StatusBlock, BOUNDARY_RING_SIZE, DATA_RING_SIZE,
};

use crate::board::Board;
use crate::controller::{Controller, Tick};

bind_interrupts!(struct Irqs {
    USART2 => usart::BufferedInterruptHandler<USART2>;
});

/// APB1 clock feeding I2C1 (72 MHz system clock, APB1 divided by 2)
const PCLK1_MHZ: u8 = 36;

/// Initial bus frame geometry; the OSD host may change it
const BUS_COLS: u8 = 16;
const BUS_ROWS: u8 = 2;

// Static cells for state shared with the I2C interrupt (must live forever)
static RINGS: StaticCell<BusRings<DATA_RING_SIZE, BOUNDARY_RING_SIZE>> = StaticCell::new();
static STATUS: StaticCell<StatusBlock> = StaticCell::new();

// Keyboard receive buffers
static KEY_TX_BUF: StaticCell<[u8; 8]> = StaticCell::new();
static KEY_RX_BUF: StaticCell<[u8; 64]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!(
        "Xtreme firmware {}.{} starting...",
        config::FW_MAJOR,
        config::FW_MINOR
    );

    let mut p = embassy_stm32::init(clock_config());

    // Straps are probed once, before their pins are reused
    let osd_strap = strap_fitted(p.PA0.reborrow(), p.PA1.reborrow());
    let reset_strap = strap_fitted(p.PA2.reborrow(), p.PA1.reborrow());
    let protocol = Protocol::from_strap(osd_strap);
    info!("Host protocol: {}, reset strap: {}", protocol, reset_strap);

    // Settings
    let mut store = match ConfigStore::new(ConfigPage::new(p.FLASH), config::factory_record()) {
        Ok(store) => store,
        Err(e) => {
            error!("Settings page unusable: {}", e);
            park();
        }
    };
    let loaded = store.load(reset_strap);
    match loaded.outcome {
        LoadOutcome::Stored => info!("Settings loaded"),
        LoadOutcome::ResetRequested => info!("Settings reset to defaults by strap"),
        LoadOutcome::Corrupt(reason) => warn!("Stored settings rejected: {}", reason),
        LoadOutcome::Unreadable(e) => warn!("Settings page unreadable: {}", e),
    }
    if let Some(e) = loaded.persist_error {
        warn!("Defaults not persisted: {}", e);
    }
    let record = loaded.record;

    // Machine outputs, applied with the machine held in reset
    let live = LiveOutputs::from_record(&record);
    let mut board = Board::new(p.PB5, p.PB4, p.PB0, p.PC13, p.PB3);
    board.hold_reset();
    board.apply(&live);
    board.release_reset();
    info!("Outputs: {}", live);

    // Host bus
    let rings = RINGS.init(BusRings::new());
    let status: &'static StatusBlock =
        STATUS.init(StatusBlock::new(config::FW_MAJOR, config::FW_MINOR));
    let (producer, consumer) = rings.split();
    let address = config::bus_address(protocol);
    let slave = I2cSlave::new(p.I2C1, p.PB6, p.PB7, address, PCLK1_MHZ);
    bus::install(slave, BusLink::new(producer, status.reader()));
    info!("Host bus slave at {=u8:#x}", address);

    // Keyboard (receive only; the transmit pin stays idle)
    let mut uart_config = usart::Config::default();
    uart_config.baudrate = KEYBOARD_BAUD;
    let uart = match BufferedUart::new(
        p.USART2,
        p.PA3,
        p.PA2,
        KEY_TX_BUF.init([0; 8]),
        KEY_RX_BUF.init([0; 64]),
        Irqs,
        uart_config,
    ) {
        Ok(uart) => uart,
        Err(e) => {
            error!("Keyboard UART setup failed: {}", e);
            park();
        }
    };
    let (_key_tx, key_rx) = uart.split();
    let keyboard = StKeyboard::new(KeyboardRx::new(key_rx));

    // Local LCD
    let mut i2c_config = i2c_master::Config::default();
    i2c_config.timeout = Duration::from_millis(10);
    let i2c = I2c::new_blocking(p.I2C2, p.PB10, p.PB11, i2c_config);
    let mut lcd = Hd44780::new(i2c, config::DISPLAY_ADDRESS);
    match lcd.init(&mut Delay) {
        Ok(()) => info!("LCD initialized"),
        Err(e) => warn!("LCD init failed: {}", e),
    }

    let mut controller = Controller {
        keyboard,
        debouncer: ButtonDebouncer::new(config::debounce_config()),
        session: ConfigSession::new(),
        record,
        store,
        live,
        board,
        status,
        decoder: Decoder::new(protocol),
        consumer,
        bus_frame: DisplayFrame::new(BUS_COLS, BUS_ROWS),
        host_mask: 0,
        compositor: Compositor::new(lcd, config::first_row(protocol), config::NOTIFY_MS),
        display_failed: false,
    };

    // Watchdog is started last; it cannot be stopped after this point
    let mut watchdog = IndependentWatchdog::new(p.IWDG, config::WATCHDOG_MS * 1000);
    watchdog.unleash();
    info!("Watchdog armed: timeout={=u32}ms", config::WATCHDOG_MS);

    info!("Main loop");
    let start = Instant::now();
    let mut ticker = Ticker::every(Duration::from_millis(config::TICK_MS));
    loop {
        watchdog.pet();
        let now_ms = start.elapsed().as_millis();
        if controller.tick(now_ms) == Tick::Halt {
            halt();
        }
        ticker.next().await;
    }
}

/// 72 MHz from the 8 MHz crystal
fn clock_config() -> Config {
    use embassy_stm32::rcc::*;

    let mut config = embassy_stm32::Config::default();
    config.rcc.hse = Some(Hse {
        freq: Hertz(8_000_000),
        mode: HseMode::Oscillator,
    });
    config.rcc.pll = Some(Pll {
        src: PllSource::HSE,
        prediv: PllPreDiv::DIV1,
        mul: PllMul::MUL9,
    });
    config.rcc.sys = Sysclk::PLL1_P;
    config.rcc.ahb_pre = AHBPrescaler::DIV1;
    config.rcc.apb1_pre = APBPrescaler::DIV2;
    config.rcc.apb2_pre = APBPrescaler::DIV1;
    config
}

/// Stop feeding the watchdog and wait for it to restart the controller
fn halt() -> ! {
    info!("Waiting for watchdog reset");
    park()
}

fn park() -> ! {
    loop {
        cortex_m::asm::wfi();
    }
}
