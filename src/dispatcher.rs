//! Resolves recognised gestures into [`Action`]s and carries them out
//! against the host.
//!
//! [`Dispatcher`] owns the host collaborators, the single optional switcher
//! session and the overview focus cursor.  Every action checks its guard
//! first; an unmet guard is a no-op reported as
//! [`DispatchError::PreconditionUnmet`] so callers can log it.

use crate::action::{Action, Direction, Gesture, WorkspaceStep};
use crate::desktop::DesktopEffector;
use crate::traits::{Overview, SwitcherController, WindowManager};
use log::{debug, info};

/// Why an action did nothing.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// A guard failed; the action was skipped.
    #[error("precondition unmet: {0}")]
    PreconditionUnmet(&'static str),
    /// A host collaborator returned an error.
    #[error("host error: {0}")]
    Host(String),
}

fn host_err(e: impl std::fmt::Display) -> DispatchError {
    DispatchError::Host(e.to_string())
}

/// Maps actions onto the switcher, the overview, the desktop effector and
/// workspace navigation.
pub struct Dispatcher<W: WindowManager, O: Overview, S: SwitcherController> {
    wm: W,
    overview: O,
    switcher: S,
    desktop: Box<dyn DesktopEffector<W>>,
    session: Option<S::Session>,
    overview_focus: Option<usize>,
}

impl<W: WindowManager, O: Overview, S: SwitcherController> Dispatcher<W, O, S> {
    pub fn new(wm: W, overview: O, switcher: S, desktop: Box<dyn DesktopEffector<W>>) -> Self {
        Self {
            wm,
            overview,
            switcher,
            desktop,
            session: None,
            overview_focus: None,
        }
    }

    pub fn window_manager(&self) -> &W {
        &self.wm
    }

    pub fn overview(&self) -> &O {
        &self.overview
    }

    pub fn switcher(&self) -> &S {
        &self.switcher
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Current overview focus cursor, if navigation started.
    pub fn overview_focus(&self) -> Option<usize> {
        self.overview_focus
    }

    /// Pick the action for a gesture given the current host state.
    ///
    /// Vertical swipes do nothing while a switcher session is open.
    pub fn resolve(&self, gesture: Gesture) -> Option<Action> {
        match gesture {
            Gesture::Finish => Some(Action::CloseSwitcher),
            Gesture::Workspace(dir) => {
                Some(Action::ChangeWorkspace(WorkspaceStep::from_direction(dir)))
            }
            Gesture::Swipe(Direction::Right) => Some(Action::MoveRight),
            Gesture::Swipe(Direction::Left) => Some(Action::MoveLeft),
            Gesture::Swipe(dir) => {
                if self.session.is_some() {
                    debug!("swipe {} ignored while the switcher is open", dir);
                    return None;
                }
                let overview_visible = self.overview.is_visible();
                match dir {
                    Direction::Up if overview_visible => None,
                    Direction::Up if self.desktop.can_unshow_desktop(&self.wm) => {
                        Some(Action::UnshowDesktop)
                    }
                    Direction::Up => Some(Action::ShowOverview),
                    Direction::Down if overview_visible => Some(Action::HideOverview),
                    _ => Some(Action::ShowDesktop),
                }
            }
        }
    }

    /// Carry out `action`.
    pub fn dispatch(&mut self, action: Action) -> Result<(), DispatchError> {
        // The host may have closed the overview since the last dispatch.
        if !self.overview.is_visible() {
            self.overview_focus = None;
        }
        match action {
            Action::MoveRight => self.move_selection(true),
            Action::MoveLeft => self.move_selection(false),
            Action::CloseSwitcher => self.close_switcher(),
            Action::ShowDesktop => {
                if self.overview.is_visible() {
                    return Err(DispatchError::PreconditionUnmet("overview is visible"));
                }
                if !self.desktop.can_show_desktop(&self.wm) {
                    return Err(DispatchError::PreconditionUnmet("no visible window"));
                }
                self.desktop.show_desktop(&self.wm).map_err(host_err)
            }
            Action::UnshowDesktop => {
                if self.overview.is_visible() {
                    return Err(DispatchError::PreconditionUnmet("overview is visible"));
                }
                if !self.desktop.can_unshow_desktop(&self.wm) {
                    return Err(DispatchError::PreconditionUnmet("desktop is not shown"));
                }
                self.desktop.unshow_desktop(&self.wm).map_err(host_err)
            }
            Action::ShowOverview => {
                if self.overview.is_visible() {
                    return Err(DispatchError::PreconditionUnmet("overview already visible"));
                }
                self.overview_focus = None;
                self.overview.show().map_err(host_err)
            }
            Action::HideOverview => {
                if !self.overview.is_visible() {
                    return Err(DispatchError::PreconditionUnmet("overview already hidden"));
                }
                match self.overview_focus.take() {
                    Some(index) => {
                        debug!("activating overview entry {}", index);
                        self.overview.activate_focused(index).map_err(host_err)
                    }
                    None => self.overview.hide().map_err(host_err),
                }
            }
            Action::ChangeWorkspace(step) => {
                let current = self.wm.active_workspace_index() as i64;
                let target = current + step.delta();
                let count = self.wm.workspace_count() as i64;
                if target < 0 || target >= count {
                    return Err(DispatchError::PreconditionUnmet("no adjacent workspace"));
                }
                info!("workspace {} -> {}", current, target);
                self.wm.activate_workspace(target as usize).map_err(host_err)
            }
        }
    }

    /// Force-close the switcher if a session is open.
    pub fn close_switcher(&mut self) -> Result<(), DispatchError> {
        let session = self
            .session
            .take()
            .ok_or(DispatchError::PreconditionUnmet("no switcher session"))?;
        self.switcher.close(session).map_err(host_err)
    }

    /// Step the switcher, or the overview focus when the overview is up.
    fn move_selection(&mut self, forward: bool) -> Result<(), DispatchError> {
        if self.overview.is_visible() {
            return self.navigate_overview(forward);
        }

        match self.session.as_mut() {
            Some(session) => {
                let step = if forward { 1 } else { -1 };
                self.switcher.advance(session, step).map_err(host_err)
            }
            None => match self.switcher.open().map_err(host_err)? {
                Some(session) => {
                    debug!("switcher opened");
                    self.session = Some(session);
                    Ok(())
                }
                None => Err(DispatchError::PreconditionUnmet("switcher declined to open")),
            },
        }
    }

    fn navigate_overview(&mut self, forward: bool) -> Result<(), DispatchError> {
        let len = self.overview.focus_chain_length();
        if len == 0 {
            return Err(DispatchError::PreconditionUnmet("nothing to focus in overview"));
        }
        let next = match (self.overview_focus, forward) {
            (None, true) => 0,
            (None, false) => len - 1,
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
        };
        self.overview.navigate_focus(next, forward).map_err(host_err)?;
        self.overview_focus = Some(next);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desktop::MinimizeDesktop;
    use crate::test_support::{
        OverviewCall, RecorderOverview, RecorderSwitcher, RecorderWm, SwitcherCall,
    };

    type TestDispatcher = Dispatcher<RecorderWm, RecorderOverview, RecorderSwitcher>;

    fn make_dispatcher(windows: u32, workspaces: usize) -> TestDispatcher {
        Dispatcher::new(
            RecorderWm::new(windows, workspaces),
            RecorderOverview::with_chain(3),
            RecorderSwitcher::default(),
            Box::new(MinimizeDesktop::new(None)),
        )
    }

    fn is_unmet(res: Result<(), DispatchError>) -> bool {
        matches!(res, Err(DispatchError::PreconditionUnmet(_)))
    }

    #[test]
    fn first_move_opens_then_advances() {
        let mut d = make_dispatcher(2, 1);
        d.dispatch(Action::MoveRight).unwrap();
        assert!(d.has_session());
        d.dispatch(Action::MoveRight).unwrap();
        d.dispatch(Action::MoveLeft).unwrap();
        assert_eq!(
            *d.switcher.calls.borrow(),
            vec![
                SwitcherCall::Open(1),
                SwitcherCall::Advance(1, 1),
                SwitcherCall::Advance(1, -1),
            ]
        );
    }

    #[test]
    fn move_left_also_opens() {
        let mut d = make_dispatcher(2, 1);
        d.dispatch(Action::MoveLeft).unwrap();
        assert_eq!(*d.switcher.calls.borrow(), vec![SwitcherCall::Open(1)]);
    }

    #[test]
    fn close_switcher_finishes_and_clears() {
        let mut d = make_dispatcher(2, 1);
        d.dispatch(Action::MoveRight).unwrap();
        d.dispatch(Action::CloseSwitcher).unwrap();
        assert!(!d.has_session());
        assert!(is_unmet(d.dispatch(Action::CloseSwitcher)));
        assert_eq!(
            *d.switcher.calls.borrow(),
            vec![SwitcherCall::Open(1), SwitcherCall::Close(1)]
        );

        // A new gesture gets a fresh session.
        d.dispatch(Action::MoveRight).unwrap();
        assert_eq!(d.switcher.calls.borrow().last(), Some(&SwitcherCall::Open(2)));
    }

    #[test]
    fn declined_open_leaves_no_session() {
        let mut d = make_dispatcher(0, 1);
        d.switcher.decline.set(true);
        assert!(is_unmet(d.dispatch(Action::MoveRight)));
        assert!(!d.has_session());
    }

    #[test]
    fn moves_navigate_overview_when_visible() {
        let mut d = make_dispatcher(2, 1);
        d.overview.visible.set(true);
        for _ in 0..4 {
            d.dispatch(Action::MoveRight).unwrap();
        }
        d.dispatch(Action::MoveLeft).unwrap();
        assert!(!d.has_session(), "switcher untouched while overview is up");
        assert_eq!(
            *d.overview.calls.borrow(),
            vec![
                OverviewCall::Navigate(0, true),
                OverviewCall::Navigate(1, true),
                OverviewCall::Navigate(2, true),
                OverviewCall::Navigate(0, true),
                OverviewCall::Navigate(2, false),
            ]
        );
        assert_eq!(d.overview_focus(), Some(2));
    }

    #[test]
    fn move_left_in_overview_starts_at_end() {
        let mut d = make_dispatcher(2, 1);
        d.overview.visible.set(true);
        d.dispatch(Action::MoveLeft).unwrap();
        assert_eq!(d.overview_focus(), Some(2));
    }

    #[test]
    fn empty_overview_chain_is_noop() {
        let mut d = make_dispatcher(0, 1);
        d.overview.visible.set(true);
        d.overview.chain_len.set(0);
        assert!(is_unmet(d.dispatch(Action::MoveRight)));
        assert!(d.overview.calls.borrow().is_empty());
    }

    #[test]
    fn hide_overview_activates_focused_entry() {
        let mut d = make_dispatcher(2, 1);
        d.overview.visible.set(true);
        d.dispatch(Action::MoveRight).unwrap();
        d.dispatch(Action::MoveRight).unwrap();
        d.dispatch(Action::HideOverview).unwrap();
        assert_eq!(
            d.overview.calls.borrow().last(),
            Some(&OverviewCall::Activate(1))
        );
        assert_eq!(d.overview_focus(), None);
        assert!(!d.overview.visible.get());
    }

    #[test]
    fn focus_is_dropped_when_host_closes_overview() {
        let mut d = make_dispatcher(2, 3);
        d.overview.visible.set(true);
        d.dispatch(Action::MoveRight).unwrap();
        assert_eq!(d.overview_focus(), Some(0));

        // Closed by the host, then a dispatch that never touches the overview.
        d.overview.visible.set(false);
        d.dispatch(Action::ChangeWorkspace(WorkspaceStep::Next)).unwrap();
        assert_eq!(d.overview_focus(), None);

        d.overview.visible.set(true);
        d.dispatch(Action::HideOverview).unwrap();
        assert_eq!(d.overview.calls.borrow().last(), Some(&OverviewCall::Hide));
    }

    #[test]
    fn hide_overview_without_focus_just_hides() {
        let mut d = make_dispatcher(2, 1);
        d.dispatch(Action::ShowOverview).unwrap();
        d.dispatch(Action::HideOverview).unwrap();
        assert_eq!(
            *d.overview.calls.borrow(),
            vec![OverviewCall::Show, OverviewCall::Hide]
        );
        assert!(is_unmet(d.dispatch(Action::HideOverview)));
    }

    #[test]
    fn show_overview_twice_is_noop() {
        let mut d = make_dispatcher(2, 1);
        d.dispatch(Action::ShowOverview).unwrap();
        assert!(is_unmet(d.dispatch(Action::ShowOverview)));
    }

    #[test]
    fn show_then_unshow_desktop() {
        let mut d = make_dispatcher(3, 1);
        d.dispatch(Action::ShowDesktop).unwrap();
        assert_eq!(d.wm.hidden.borrow().len(), 3);
        d.dispatch(Action::UnshowDesktop).unwrap();
        assert!(d.wm.hidden.borrow().is_empty());
    }

    #[test]
    fn show_desktop_guards() {
        let mut d = make_dispatcher(0, 1);
        assert!(is_unmet(d.dispatch(Action::ShowDesktop)));

        let mut d = make_dispatcher(2, 1);
        d.overview.visible.set(true);
        assert!(is_unmet(d.dispatch(Action::ShowDesktop)));
        assert!(d.wm.hidden.borrow().is_empty());
    }

    #[test]
    fn unshow_desktop_guards() {
        let mut d = make_dispatcher(2, 1);
        // Hidden by someone else: not ours to restore.
        d.wm.hidden.borrow_mut().extend([1, 2]);
        assert!(is_unmet(d.dispatch(Action::UnshowDesktop)));
        assert_eq!(d.wm.hidden.borrow().len(), 2);
    }

    #[test]
    fn resolve_horizontal_and_finish() {
        let d = make_dispatcher(1, 1);
        assert_eq!(d.resolve(Gesture::Swipe(Direction::Right)), Some(Action::MoveRight));
        assert_eq!(d.resolve(Gesture::Swipe(Direction::Left)), Some(Action::MoveLeft));
        assert_eq!(d.resolve(Gesture::Finish), Some(Action::CloseSwitcher));
    }

    #[test]
    fn resolve_up() {
        let mut d = make_dispatcher(2, 1);
        assert_eq!(d.resolve(Gesture::Swipe(Direction::Up)), Some(Action::ShowOverview));

        d.dispatch(Action::ShowDesktop).unwrap();
        assert_eq!(d.resolve(Gesture::Swipe(Direction::Up)), Some(Action::UnshowDesktop));

        d.overview.visible.set(true);
        assert_eq!(d.resolve(Gesture::Swipe(Direction::Up)), None);
    }

    #[test]
    fn resolve_down() {
        let d = make_dispatcher(2, 1);
        assert_eq!(d.resolve(Gesture::Swipe(Direction::Down)), Some(Action::ShowDesktop));
        d.overview.visible.set(true);
        assert_eq!(d.resolve(Gesture::Swipe(Direction::Down)), Some(Action::HideOverview));
    }

    #[test]
    fn resolve_vertical_ignored_while_switcher_open() {
        let mut d = make_dispatcher(2, 1);
        d.dispatch(Action::MoveRight).unwrap();
        assert_eq!(d.resolve(Gesture::Swipe(Direction::Up)), None);
        assert_eq!(d.resolve(Gesture::Swipe(Direction::Down)), None);
    }

    #[test]
    fn resolve_workspace_gesture() {
        let d = make_dispatcher(1, 3);
        assert_eq!(
            d.resolve(Gesture::Workspace(Direction::Left)),
            Some(Action::ChangeWorkspace(WorkspaceStep::Next))
        );
        assert_eq!(
            d.resolve(Gesture::Workspace(Direction::Right)),
            Some(Action::ChangeWorkspace(WorkspaceStep::Previous))
        );
    }

    #[test]
    fn change_workspace_stops_at_edges() {
        let mut d = make_dispatcher(1, 3);
        assert!(is_unmet(d.dispatch(Action::ChangeWorkspace(WorkspaceStep::Previous))));
        d.dispatch(Action::ChangeWorkspace(WorkspaceStep::Next)).unwrap();
        d.dispatch(Action::ChangeWorkspace(WorkspaceStep::Next)).unwrap();
        assert!(is_unmet(d.dispatch(Action::ChangeWorkspace(WorkspaceStep::Next))));
        assert_eq!(*d.wm.activations.borrow(), vec![1, 2]);
        d.dispatch(Action::ChangeWorkspace(WorkspaceStep::Previous)).unwrap();
        assert_eq!(d.wm.active.get(), 1);
    }

    #[test]
    fn change_workspace_bypasses_switcher() {
        let mut d = make_dispatcher(1, 2);
        d.dispatch(Action::ChangeWorkspace(WorkspaceStep::Next)).unwrap();
        assert!(d.switcher.calls.borrow().is_empty());
        assert!(!d.has_session());
    }
}
