//! Session-bus subscriber for relayed touchpad events.
//!
//! [`IpcBridge::spawn`] starts a thread running a current-thread tokio
//! runtime that connects to the bus, subscribes to `TouchpadEvent` and
//! forwards every decoded tuple as a [`BridgeMessage`].  Connecting never
//! blocks the caller: success or failure shows up later on the channel.
//!
//! [`IpcBridge::stop`] drops the signal stream (which removes the match rule
//! on the bus) and joins the thread, so no event is delivered after it
//! returns.

use super::IpcConfig;
use crate::action::{Direction, InputEvent};
use futures_util::StreamExt;
use log::{debug, info, warn};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use tokio::runtime::Builder;
use tokio::sync::oneshot;
use zbus::Connection;

#[zbus::proxy(
    interface = "com.gonzaarcr.tpgesture",
    default_service = "com.gonzaarcr.tpgesture",
    default_path = "/com/gonzaarcr/tpgesture"
)]
trait Touchpad {
    /// Ask the service to re-emit `(fingers, direction)` as a signal.
    fn echo_signal(&self, fingers: u32, direction: u32) -> zbus::Result<()>;

    #[zbus(signal)]
    fn touchpad_event(&self, fingers: u32, direction: u32) -> zbus::Result<()>;
}

/// What the bridge thread reports.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeMessage {
    /// Subscribed; events may follow.
    Connected,
    /// The bus or the remote service could not be reached.  Nothing will
    /// be delivered.
    Unavailable(String),
    Event(InputEvent),
}

/// Decode a `TouchpadEvent(fingers, direction)` payload.
///
/// `fingers == 0` closes the gesture whatever the direction code says.
/// Other tuples with an unknown direction code are dropped.
pub fn decode_signal(fingers: u32, code: u32) -> Option<InputEvent> {
    if fingers == 0 {
        return Some(InputEvent::Remote {
            fingers,
            direction: Direction::from_code(code).unwrap_or(Direction::Right),
        });
    }
    Direction::from_code(code).map(|direction| InputEvent::Remote { fingers, direction })
}

/// Handle to the bridge thread.
pub struct IpcBridge {
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl IpcBridge {
    /// Start the bridge thread.  Only thread creation can fail here.
    pub fn spawn(config: IpcConfig, sink: mpsc::Sender<BridgeMessage>) -> std::io::Result<Self> {
        let (shutdown, shutdown_rx) = oneshot::channel();
        let thread = thread::Builder::new()
            .name("tpswitcher-ipc".into())
            .spawn(move || {
                let runtime = match Builder::new_current_thread().enable_all().build() {
                    Ok(rt) => rt,
                    Err(e) => {
                        let _ = sink.send(BridgeMessage::Unavailable(e.to_string()));
                        return;
                    }
                };
                runtime.block_on(async {
                    tokio::select! {
                        _ = shutdown_rx => debug!("ipc bridge shutting down"),
                        res = listen(&config, &sink) => {
                            if let Err(e) = res {
                                warn!("ipc bridge unavailable: {}", e);
                                let _ = sink.send(BridgeMessage::Unavailable(e.to_string()));
                            }
                        }
                    }
                });
            })?;
        Ok(Self {
            shutdown: Some(shutdown),
            thread: Some(thread),
        })
    }

    pub fn is_running(&self) -> bool {
        self.thread.is_some()
    }

    /// Unsubscribe and join the bridge thread.  Idempotent.
    pub fn stop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("ipc bridge thread panicked");
            }
        }
    }
}

impl Drop for IpcBridge {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn listen(config: &IpcConfig, sink: &mpsc::Sender<BridgeMessage>) -> zbus::Result<()> {
    let connection = Connection::session().await?;
    let proxy = TouchpadProxy::builder(&connection)
        .destination(config.bus_name.as_str())?
        .path(config.object_path.as_str())?
        .build()
        .await?;
    let mut events = proxy.receive_touchpad_event().await?;
    info!(
        "subscribed to TouchpadEvent on {} {}",
        config.bus_name, config.object_path
    );
    if sink.send(BridgeMessage::Connected).is_err() {
        return Ok(());
    }

    while let Some(signal) = events.next().await {
        let args = signal.args()?;
        let (fingers, code) = (*args.fingers(), *args.direction());
        match decode_signal(fingers, code) {
            Some(event) => {
                if sink.send(BridgeMessage::Event(event)).is_err() {
                    debug!("bridge sink closed");
                    break;
                }
            }
            None => debug!("ignoring TouchpadEvent({}, {})", fingers, code),
        }
    }
    Ok(())
}
