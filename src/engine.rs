//! The single owned engine instance.
//!
//! [`GestureEngine`] joins the two input pipelines (local capture and the
//! bus bridge) onto one [`GestureStateMachine`] and one [`Dispatcher`].
//! Everything runs on the caller's thread: local samples go through
//! [`handle_motion`](GestureEngine::handle_motion) and bridge traffic is
//! drained by [`pump`](GestureEngine::pump).

use crate::action::{Gesture, InputEvent, MotionSample, Propagation};
use crate::dispatcher::{DispatchError, Dispatcher};
use crate::gesture::{GestureConfig, GestureStateMachine, Transition};
use crate::ipc::bridge::{BridgeMessage, IpcBridge};
use crate::ipc::IpcConfig;
use crate::traits::{Overview, SwitcherController, WindowManager};
use log::{debug, info, warn};
use std::sync::mpsc;
use std::time::Instant;

/// Errors from starting the engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to spawn ipc bridge: {0}")]
    Spawn(#[from] std::io::Error),
}

pub struct GestureEngine<W: WindowManager, O: Overview, S: SwitcherController> {
    machine: GestureStateMachine,
    dispatcher: Dispatcher<W, O, S>,
    ipc: IpcConfig,
    bridge: Option<IpcBridge>,
    bridge_rx: Option<mpsc::Receiver<BridgeMessage>>,
    capturing: bool,
}

impl<W: WindowManager, O: Overview, S: SwitcherController> GestureEngine<W, O, S> {
    pub fn new(gestures: GestureConfig, ipc: IpcConfig, dispatcher: Dispatcher<W, O, S>) -> Self {
        Self {
            machine: GestureStateMachine::new(gestures),
            dispatcher,
            ipc,
            bridge: None,
            bridge_rx: None,
            capturing: false,
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher<W, O, S> {
        &self.dispatcher
    }

    pub fn machine(&self) -> &GestureStateMachine {
        &self.machine
    }

    pub fn is_running(&self) -> bool {
        self.capturing
    }

    /// Arm local capture and, if enabled, start the bus bridge.  Calling it
    /// on a running engine does nothing.
    pub fn start(&mut self) -> Result<(), EngineError> {
        if self.capturing {
            return Ok(());
        }
        if self.ipc.enabled {
            let (tx, rx) = mpsc::channel();
            self.bridge = Some(IpcBridge::spawn(self.ipc.clone(), tx)?);
            self.bridge_rx = Some(rx);
        }
        self.capturing = true;
        info!("gesture engine started");
        Ok(())
    }

    /// Unsubscribe the bridge, disarm capture and force-close any open
    /// switcher.  Windows hidden by show-desktop stay hidden.  Idempotent.
    pub fn stop(&mut self) {
        if let Some(mut bridge) = self.bridge.take() {
            bridge.stop();
        }
        self.bridge_rx = None;
        if !self.capturing {
            return;
        }
        self.capturing = false;
        self.machine.reset();
        if self.dispatcher.has_session() {
            if let Err(e) = self.dispatcher.close_switcher() {
                warn!("closing switcher on stop: {}", e);
            }
        }
        info!("gesture engine stopped");
    }

    /// Entry point for the local-capture hook.  The return value tells the
    /// hook whether to pass the event further down the host's stack.
    pub fn handle_motion(&mut self, sample: &MotionSample) -> Propagation {
        self.handle_at(InputEvent::Motion(*sample), Instant::now())
    }

    pub fn handle(&mut self, event: InputEvent) -> Propagation {
        self.handle_at(event, Instant::now())
    }

    /// Like [`handle`](Self::handle) with an explicit clock reading.
    pub fn handle_at(&mut self, event: InputEvent, now: Instant) -> Propagation {
        if !self.capturing {
            return Propagation::Propagate;
        }
        let transition = match event {
            InputEvent::Motion(sample) => self.machine.on_sample(&sample, now),
            InputEvent::Remote { fingers, direction } => {
                self.machine.on_remote(fingers, direction, now)
            }
        };
        self.apply(transition, now)
    }

    /// Drain bridge messages.  Returns how many events were handled.
    pub fn pump(&mut self) -> usize {
        let messages: Vec<BridgeMessage> = match &self.bridge_rx {
            Some(rx) => rx.try_iter().collect(),
            None => return 0,
        };
        let mut handled = 0;
        for message in messages {
            match message {
                BridgeMessage::Connected => info!("ipc bridge connected"),
                BridgeMessage::Unavailable(reason) => {
                    debug!("ipc bridge unavailable: {}", reason)
                }
                BridgeMessage::Event(event) => {
                    self.handle(event);
                    handled += 1;
                }
            }
        }
        handled
    }

    /// A fired gesture stops propagation only when it resolves to an action.
    /// Vertical swipes start the cooldown at that point, not before.
    fn apply(&mut self, transition: Transition, now: Instant) -> Propagation {
        match transition {
            Transition::Fired(gesture) => match self.dispatcher.resolve(gesture) {
                Some(action) => {
                    if let Gesture::Swipe(direction) = gesture {
                        if direction.is_vertical() {
                            self.machine.stamp_vertical(now);
                        }
                    }
                    info!("{}", action);
                    match self.dispatcher.dispatch(action) {
                        Ok(()) => {}
                        Err(DispatchError::PreconditionUnmet(why)) => {
                            debug!("{} skipped: {}", action, why)
                        }
                        Err(e) => warn!("{} failed: {}", action, e),
                    }
                }
                None => {
                    debug!("no action for {:?}", gesture);
                    return Propagation::Propagate;
                }
            },
            Transition::Suppressed(direction) => {
                debug!("vertical swipe {} suppressed by cooldown", direction)
            }
            Transition::Ignored | Transition::Pending => {}
        }
        transition.propagation()
    }
}

impl<W: WindowManager, O: Overview, S: SwitcherController> Drop for GestureEngine<W, O, S> {
    fn drop(&mut self) {
        self.stop();
    }
}
