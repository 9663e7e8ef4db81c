//! keypresser command-line entry point.
//!
//! # Usage
//!
//! ```text
//! keypresser detect [--verbose]
//! keypresser run [--config PATH] [--port NAME] [--baud N] [--select-delay SECS]
//! keypresser tap <KEY> [--modifiers PRESET] [--hold-ms MS] [--port NAME]
//! keypresser type <TEXT> [--port NAME]
//! keypresser init-config [--path PATH] [--force]
//! ```
//!
//! `run` wires everything together:
//!
//! ```text
//! main()
//!  └─ load settings (TOML)
//!  └─ InputDriver::ensure_connected()  -- discovery, then the configured port
//!  └─ bind the foreground window after --select-delay
//!  └─ Scheduler::start()
//!  └─ TimedTaskPoller::spawn()         -- 1 s wall-clock check
//!  └─ loop
//!       ├─ trigger hotkey pressed  -> Scheduler::toggle()
//!       └─ Ctrl-C                  -> Scheduler::stop(), exit
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use keypresser::application::{InputDriver, Scheduler, SchedulerConfig, TimedTaskPoller};
use keypresser::infrastructure::device_locator::system::{SystemPortEnumerator, SystemPortProber};
use keypresser::infrastructure::device_locator::DeviceLocator;
use keypresser::infrastructure::hotkey::HotkeyEvent;
use keypresser::infrastructure::serial::SerialTransport;
use keypresser::infrastructure::storage::{self, AppConfig};
use keypresser::infrastructure::window_binder::WindowBinder;
use keypresser_core::keymap::{key_code, ModifierPreset};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Scheduled hardware key presses through an Arduino Leonardo.
#[derive(Debug, Parser)]
#[command(name = "keypresser", version)]
struct Cli {
    /// Settings file.  Defaults to the platform config directory.
    #[arg(long, global = true, env = "KEYPRESSER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Find the Leonardo's serial port and print it.
    Detect {
        /// Log every probe at info level.
        #[arg(long)]
        verbose: bool,
    },

    /// Connect, bind the foreground window, and run the emitters until Ctrl-C.
    Run {
        /// Serial port; skips discovery.
        #[arg(long, env = "KEYPRESSER_PORT")]
        port: Option<String>,

        /// Baud rate; overrides the settings file.
        #[arg(long)]
        baud: Option<u32>,

        /// Seconds to wait before binding the foreground window.
        #[arg(long, default_value_t = 3)]
        select_delay: u64,
    },

    /// Press one key (optionally with a modifier preset) and exit.
    Tap {
        /// Key name, e.g. `F1`, `A`, `Page Up`.
        key: String,

        /// Modifier preset, e.g. `Ctrl` or `Shift+Alt`.
        #[arg(long, default_value = "")]
        modifiers: String,

        /// Hold time for a single key.
        #[arg(long, default_value_t = 100)]
        hold_ms: u64,

        #[arg(long, env = "KEYPRESSER_PORT")]
        port: Option<String>,
    },

    /// Type a string and exit.
    Type {
        text: String,

        #[arg(long, env = "KEYPRESSER_PORT")]
        port: Option<String>,
    },

    /// Write a default settings file.
    InitConfig {
        /// Destination; defaults to the platform config file.
        #[arg(long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => storage::load_config_from(path),
        None => storage::load_config(),
    };
    let (config, config_error) = match loaded {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    // RUST_LOG wins; otherwise the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level)),
        )
        .init();

    if let Some(e) = config_error {
        warn!(error = %e, "settings could not be loaded, using defaults");
    }

    match cli.command {
        Command::Detect { verbose } => detect(&config, verbose),
        Command::Run {
            port,
            baud,
            select_delay,
        } => run(config, port, baud, Duration::from_secs(select_delay)).await,
        Command::Tap {
            key,
            modifiers,
            hold_ms,
            port,
        } => tap(&config, &key, &modifiers, Duration::from_millis(hold_ms), port),
        Command::Type { text, port } => {
            let driver = connect(&config, port)?;
            driver.type_string(&text).context("typing failed")?;
            Ok(())
        }
        Command::InitConfig { path, force } => init_config(path.or(cli.config), force),
    }
}

// ── Subcommands ───────────────────────────────────────────────────────────────

fn locator(verbose: bool) -> DeviceLocator<SystemPortEnumerator, SystemPortProber> {
    DeviceLocator::new(SystemPortEnumerator, SystemPortProber).with_verbose(verbose)
}

fn new_driver(config: &AppConfig) -> InputDriver {
    InputDriver::new(
        Box::new(SerialTransport::new()),
        Arc::new(locator(config.serial.verbose_discovery)),
    )
}

fn connect(config: &AppConfig, port: Option<String>) -> anyhow::Result<InputDriver> {
    let driver = new_driver(config);
    let port = port.or_else(|| config.serial.port.clone());
    driver
        .connect(port.as_deref(), config.serial.baud_rate)
        .context("could not connect to the Leonardo")?;
    Ok(driver)
}

fn detect(config: &AppConfig, verbose: bool) -> anyhow::Result<()> {
    match locator(verbose || config.serial.verbose_discovery).locate() {
        Some(port) => {
            println!("{port}");
            Ok(())
        }
        None => anyhow::bail!("no Arduino Leonardo found; pass --port to choose one manually"),
    }
}

fn tap(
    config: &AppConfig,
    key: &str,
    modifiers: &str,
    hold: Duration,
    port: Option<String>,
) -> anyhow::Result<()> {
    let code = key_code(key).with_context(|| format!("unknown key name: {key:?}"))?;
    let preset: ModifierPreset = modifiers.parse()?;
    let driver = connect(config, port)?;

    if preset.codes().is_empty() {
        driver.send_key_code(code, hold)?;
    } else {
        let mut codes = preset.codes().to_vec();
        codes.push(code);
        driver.press_combination_codes(&codes)?;
    }
    Ok(())
}

fn init_config(path: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    let path = match path {
        Some(p) => p,
        None => storage::config::config_file_path()?,
    };
    if path.exists() && !force {
        anyhow::bail!("{} already exists; use --force to overwrite", path.display());
    }
    storage::save_config_to(&AppConfig::default(), &path)?;
    println!("wrote {}", path.display());
    Ok(())
}

async fn run(
    config: AppConfig,
    port: Option<String>,
    baud: Option<u32>,
    select_delay: Duration,
) -> anyhow::Result<()> {
    info!("keypresser starting");

    let table = config.emitter_table().context("invalid key settings")?;
    let baud = baud.unwrap_or(config.serial.baud_rate);

    let driver = Arc::new(new_driver(&config));
    let fallback_port = config.serial.port.clone();
    let connect_driver = Arc::clone(&driver);
    tokio::task::spawn_blocking(move || match port {
        Some(port) => connect_driver.connect(Some(&port), baud).map(|_| ()),
        None => connect_driver.ensure_connected(fallback_port.as_deref(), baud),
    })
    .await?
    .context("could not connect to the Leonardo")?;

    info!(
        delay_secs = select_delay.as_secs(),
        "focus the target window now"
    );
    tokio::time::sleep(select_delay).await;
    let binder = select_target_window();

    let scheduler = Arc::new(Scheduler::new(
        Arc::clone(&driver),
        binder,
        table,
        SchedulerConfig {
            mode: config.general.trigger_mode,
            keep_topmost: config.general.keep_topmost,
            press_duration: Duration::from_millis(config.serial.press_duration_ms),
        },
    ));

    let poller = Arc::new(TimedTaskPoller::new(
        Arc::clone(&scheduler),
        config.timed_window(),
    ));
    let poll_task = poller.spawn();

    let (_hotkey_watcher, mut hotkey_rx) = spawn_hotkey_watcher(&config);

    scheduler
        .start()
        .await
        .context("scheduler refused to start")?;

    loop {
        tokio::select! {
            Some(HotkeyEvent::Pressed(_)) = hotkey_rx.recv() => {
                if let Err(e) = scheduler.toggle().await {
                    error!(error = %e, "toggle failed");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown signal received");
                break;
            }
        }
    }

    poll_task.abort();
    scheduler.stop().await;
    driver.disconnect();
    Ok(())
}

// ── Platform wiring ───────────────────────────────────────────────────────────

#[cfg(target_os = "windows")]
fn select_target_window() -> Arc<dyn WindowBinder> {
    use keypresser::infrastructure::window_binder::windows::Win32WindowBinder;

    let binder = Win32WindowBinder::new();
    match binder.bind_foreground() {
        Some(hwnd) => info!(?hwnd, "target window bound"),
        None => warn!("no foreground window to bind"),
    }
    Arc::new(binder)
}

#[cfg(not(target_os = "windows"))]
fn select_target_window() -> Arc<dyn WindowBinder> {
    use keypresser::infrastructure::window_binder::headless::HeadlessWindowBinder;
    use keypresser::infrastructure::window_binder::WindowHandle;

    warn!("window control is only available on Windows; window requests are ignored");
    Arc::new(HeadlessWindowBinder::bound_to(WindowHandle(1)))
}

type HotkeyParts = (
    Option<keypresser::infrastructure::hotkey::HotkeyWatcher>,
    mpsc::UnboundedReceiver<HotkeyEvent>,
);

#[cfg(target_os = "windows")]
fn spawn_hotkey_watcher(config: &AppConfig) -> HotkeyParts {
    use keypresser::infrastructure::hotkey::{windows::AsyncKeyState, HotkeyWatcher, POLL_INTERVAL};

    let vk = match config.trigger_hotkey_vk() {
        Ok(vk) => vk,
        Err(e) => {
            warn!(error = %e, "trigger hotkey disabled");
            return idle_hotkey();
        }
    };
    match HotkeyWatcher::spawn(AsyncKeyState, vk, POLL_INTERVAL) {
        Ok((watcher, rx)) => (Some(watcher), rx),
        Err(e) => {
            warn!(error = %e, "trigger hotkey disabled");
            idle_hotkey()
        }
    }
}

#[cfg(not(target_os = "windows"))]
fn spawn_hotkey_watcher(_config: &AppConfig) -> HotkeyParts {
    info!("trigger hotkey is only watched on Windows");
    idle_hotkey()
}

/// A receiver that never yields; its sender is dropped at once.
fn idle_hotkey() -> HotkeyParts {
    let (_tx, rx) = mpsc::unbounded_channel();
    (None, rx)
}
