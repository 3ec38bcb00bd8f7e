//! The relay's bus-side object.
//!
//! Owns the well-known name, re-emits `EchoSignal(fingers, direction)` calls
//! as `TouchpadEvent` signals and stops the daemon on `Q()`.

use super::IpcConfig;
use log::info;
use std::sync::Arc;
use tokio::sync::Notify;
use zbus::{connection, Connection, SignalContext};

/// D-Bus object served at [`IpcConfig::object_path`].
pub struct TouchpadService {
    quit: Arc<Notify>,
}

impl TouchpadService {
    /// `quit` is notified when a client calls `Q()`.
    pub fn new(quit: Arc<Notify>) -> Self {
        Self { quit }
    }
}

#[zbus::interface(name = "com.gonzaarcr.tpgesture")]
impl TouchpadService {
    async fn echo_signal(
        &self,
        #[zbus(signal_context)] ctxt: SignalContext<'_>,
        fingers: u32,
        direction: u32,
    ) -> zbus::fdo::Result<()> {
        Self::touchpad_event(&ctxt, fingers, direction).await?;
        Ok(())
    }

    #[zbus(name = "Q")]
    async fn quit(&self) {
        info!("quit requested over the bus");
        self.quit.notify_one();
    }

    #[zbus(signal)]
    async fn touchpad_event(
        ctxt: &SignalContext<'_>,
        fingers: u32,
        direction: u32,
    ) -> zbus::Result<()>;
}

/// Claim the bus name and serve [`TouchpadService`].
///
/// Fails with [`zbus::Error::NameTaken`] when another relay already owns
/// the name.
pub async fn serve(config: &IpcConfig, quit: Arc<Notify>) -> zbus::Result<Connection> {
    let connection = connection::Builder::session()?
        .name(config.bus_name.as_str())?
        .serve_at(config.object_path.as_str(), TouchpadService::new(quit))?
        .build()
        .await?;
    info!("serving {} at {}", config.bus_name, config.object_path);
    Ok(connection)
}

/// Broadcast one `TouchpadEvent(fingers, direction)`.
pub async fn emit(
    connection: &Connection,
    object_path: &str,
    fingers: u32,
    direction: u32,
) -> zbus::Result<()> {
    let ctxt = SignalContext::new(connection, object_path)?;
    TouchpadService::touchpad_event(&ctxt, fingers, direction).await
}
