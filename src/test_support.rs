//! Recording test doubles for the host capability traits.

use crate::traits::{Overview, SwitcherController, WindowManager};
use std::cell::{Cell, RefCell};
use std::collections::HashSet;

#[derive(Debug, thiserror::Error)]
#[error("mock host error")]
pub struct MockError;

/// Windows `1..=n` on the active workspace of `count` workspaces.
#[derive(Debug, Default)]
pub struct RecorderWm {
    pub windows: RefCell<Vec<u32>>,
    pub hidden: RefCell<HashSet<u32>>,
    pub active: Cell<usize>,
    pub count: Cell<usize>,
    pub activations: RefCell<Vec<usize>>,
    pub unminimized: RefCell<Vec<u32>>,
}

impl RecorderWm {
    pub fn new(windows: u32, workspaces: usize) -> Self {
        Self {
            windows: RefCell::new((1..=windows).collect()),
            count: Cell::new(workspaces),
            ..Default::default()
        }
    }
}

impl WindowManager for RecorderWm {
    type Window = u32;
    type Error = MockError;

    fn list_windows(&self) -> Result<Vec<u32>, MockError> {
        Ok(self.windows.borrow().clone())
    }

    fn is_hidden(&self, window: &u32) -> bool {
        self.hidden.borrow().contains(window)
    }

    fn minimize(&self, window: &u32) -> Result<(), MockError> {
        self.hidden.borrow_mut().insert(*window);
        Ok(())
    }

    fn unminimize(&self, window: &u32) -> Result<(), MockError> {
        self.hidden.borrow_mut().remove(window);
        self.unminimized.borrow_mut().push(*window);
        Ok(())
    }

    fn active_workspace_index(&self) -> usize {
        self.active.get()
    }

    fn workspace_count(&self) -> usize {
        self.count.get()
    }

    fn activate_workspace(&self, index: usize) -> Result<(), MockError> {
        if index >= self.count.get() {
            return Err(MockError);
        }
        self.active.set(index);
        self.activations.borrow_mut().push(index);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverviewCall {
    Show,
    Hide,
    Navigate(usize, bool),
    Activate(usize),
}

#[derive(Debug, Default)]
pub struct RecorderOverview {
    pub visible: Cell<bool>,
    pub chain_len: Cell<usize>,
    pub calls: RefCell<Vec<OverviewCall>>,
}

impl RecorderOverview {
    pub fn with_chain(len: usize) -> Self {
        Self {
            chain_len: Cell::new(len),
            ..Default::default()
        }
    }
}

impl Overview for RecorderOverview {
    type Error = MockError;

    fn is_visible(&self) -> bool {
        self.visible.get()
    }

    fn show(&self) -> Result<(), MockError> {
        self.visible.set(true);
        self.calls.borrow_mut().push(OverviewCall::Show);
        Ok(())
    }

    fn hide(&self) -> Result<(), MockError> {
        self.visible.set(false);
        self.calls.borrow_mut().push(OverviewCall::Hide);
        Ok(())
    }

    fn navigate_focus(&self, index: usize, forward: bool) -> Result<(), MockError> {
        self.calls
            .borrow_mut()
            .push(OverviewCall::Navigate(index, forward));
        Ok(())
    }

    fn focus_chain_length(&self) -> usize {
        self.chain_len.get()
    }

    fn activate_focused(&self, index: usize) -> Result<(), MockError> {
        self.visible.set(false);
        self.calls.borrow_mut().push(OverviewCall::Activate(index));
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitcherCall {
    Open(u32),
    Advance(u32, i32),
    Close(u32),
}

/// Sessions are numbered from 1 in open order.
#[derive(Debug, Default)]
pub struct RecorderSwitcher {
    pub calls: RefCell<Vec<SwitcherCall>>,
    pub opened: Cell<u32>,
    pub decline: Cell<bool>,
}

impl SwitcherController for RecorderSwitcher {
    type Session = u32;
    type Error = MockError;

    fn open(&self) -> Result<Option<u32>, MockError> {
        if self.decline.get() {
            return Ok(None);
        }
        let id = self.opened.get() + 1;
        self.opened.set(id);
        self.calls.borrow_mut().push(SwitcherCall::Open(id));
        Ok(Some(id))
    }

    fn advance(&self, session: &mut u32, step: i32) -> Result<(), MockError> {
        self.calls
            .borrow_mut()
            .push(SwitcherCall::Advance(*session, step));
        Ok(())
    }

    fn close(&self, session: u32) -> Result<(), MockError> {
        self.calls.borrow_mut().push(SwitcherCall::Close(session));
        Ok(())
    }
}
