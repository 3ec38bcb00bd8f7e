//! Entry point for the **tpswitcher-relay** daemon.
//!
//! Reads phase-tagged swipe samples from a Unix socket, quantizes them and
//! broadcasts `TouchpadEvent(fingers, direction)` on the session bus.  Exits
//! on `Q()`, on Ctrl-C, or right away if another relay already owns the
//! bus name.

use log::{debug, error, info, warn};
use std::sync::{mpsc, Arc};
use tokio::sync::{mpsc as async_mpsc, Notify};
use tpswitcher::action::InputEvent;
use tpswitcher::config::{config_dir, Config};
use tpswitcher::ipc::listener::UnixSocketListener;
use tpswitcher::ipc::relay::SwipeRelay;
use tpswitcher::ipc::service;
use tpswitcher::traits::EventSource;

/// Try `$XDG_CONFIG_HOME/tpswitcher/config.json`, falling back to
/// compiled-in defaults.
fn load_config() -> Config {
    let path = config_dir().join("config.json");
    if !path.exists() {
        info!("no config file at {}, using defaults", path.display());
        return Config::default();
    }
    match Config::load(&path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) => {
            error!("{}; using defaults", e);
            Config::default()
        }
    }
}

fn main() {
    env_logger::init();
    let config = load_config();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            error!("failed to create tokio runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run(config)) {
        error!("relay error: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> zbus::Result<()> {
    let quit = Arc::new(Notify::new());
    let connection = match service::serve(&config.ipc, quit.clone()).await {
        Ok(c) => c,
        Err(zbus::Error::NameTaken) => {
            info!("{} is already owned, not serving", config.ipc.bus_name);
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    let socket_path = config.relay.socket_path();
    let mut tuples = spawn_pipeline(&config, socket_path.clone());

    loop {
        tokio::select! {
            _ = quit.notified() => break,
            res = tokio::signal::ctrl_c() => {
                if let Err(e) = res {
                    warn!("ctrl-c handler: {}", e);
                }
                break;
            }
            tuple = tuples.recv() => match tuple {
                Some((fingers, direction)) => {
                    debug!("TouchpadEvent({}, {})", fingers, direction);
                    if let Err(e) =
                        service::emit(&connection, &config.ipc.object_path, fingers, direction).await
                    {
                        warn!("emit failed: {}", e);
                    }
                }
                None => {
                    info!("input source closed");
                    break;
                }
            },
        }
    }

    let _ = std::fs::remove_file(&socket_path);
    info!("relay exiting");
    Ok(())
}

/// Socket listener and relay on their own threads.  The receiver yields
/// `(fingers, direction)` tuples ready to broadcast.
fn spawn_pipeline(
    config: &Config,
    socket_path: std::path::PathBuf,
) -> async_mpsc::UnboundedReceiver<(u32, u32)> {
    let (event_tx, event_rx) = mpsc::channel::<InputEvent>();
    let (tuple_tx, tuple_rx) = async_mpsc::unbounded_channel();

    std::thread::spawn(move || {
        let mut source = UnixSocketListener::new(&socket_path);
        if let Err(e) = source.run(event_tx) {
            error!("socket listener error: {}", e);
        }
    });

    let mut relay = SwipeRelay::new(&config.relay);
    std::thread::spawn(move || {
        for event in event_rx {
            let tuple = match event {
                InputEvent::Motion(sample) => relay.on_sample(&sample),
                InputEvent::Remote { fingers, direction } => Some((fingers, direction.code())),
            };
            if let Some(tuple) = tuple {
                if tuple_tx.send(tuple).is_err() {
                    break;
                }
            }
        }
    });

    tuple_rx
}
