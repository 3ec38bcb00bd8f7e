//! Unix-socket [`EventSource`] implementation.
//!
//! Binds a Unix stream socket and accepts one connection at a time.
//! Each line received is parsed as a JSON-encoded [`InputEvent`].
//!
//! # Wire format
//!
//! Every message is a single line of JSON followed by `\n`:
//!
//! ```json
//! {"Motion":{"dx":0.0,"dy":0.0,"phase":"Begin","fingers":3}}
//! {"Motion":{"dx":14.5,"dy":-2.0,"phase":"Update","fingers":3}}
//! {"Motion":{"dx":0.0,"dy":0.0,"phase":"End","fingers":3}}
//! {"Remote":{"fingers":4,"direction":"Left"}}
//! ```

use crate::action::InputEvent;
use crate::traits::EventSource;
use log::{debug, error, info};
use std::io::{BufRead, BufReader};
use std::os::unix::net::UnixListener;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

/// An [`EventSource`] that listens on a Unix stream socket for
/// JSON-encoded input events.
///
/// Each accepted connection can send many newline-delimited events.  When
/// the connection closes, the listener waits for the next one.
pub struct UnixSocketListener {
    path: PathBuf,
}

/// Errors produced by the Unix socket listener.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl UnixSocketListener {
    /// The socket file is created when [`run`](EventSource::run) is called.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Parse one wire line.  Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<InputEvent>, ListenerError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(line)?))
}

impl EventSource for UnixSocketListener {
    type Error = ListenerError;

    /// Bind the socket and accept connections.  Blocks; run it on a
    /// dedicated thread.
    fn run(&mut self, sink: mpsc::Sender<InputEvent>) -> Result<(), Self::Error> {
        // Stale socket from a previous run.
        let _ = std::fs::remove_file(&self.path);

        let listener = UnixListener::bind(&self.path)?;
        info!("listening on {}", self.path.display());

        for stream in listener.incoming() {
            let stream = match stream {
                Ok(s) => s,
                Err(e) => {
                    error!("accept error: {}", e);
                    continue;
                }
            };
            debug!("client connected");
            for line in BufReader::new(stream).lines() {
                let text = match line {
                    Ok(t) => t,
                    Err(e) => {
                        error!("read error: {}", e);
                        break;
                    }
                };
                match parse_line(&text) {
                    Ok(None) => {}
                    Ok(Some(event)) => {
                        if sink.send(event).is_err() {
                            info!("sink closed, shutting down");
                            return Ok(());
                        }
                    }
                    Err(e) => error!("bad event {:?}: {}", text, e),
                }
            }
            debug!("client disconnected");
        }
        Ok(())
    }
}
