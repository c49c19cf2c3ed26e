// ABOUTME: State machine for close requests at terminal, tab, and window granularity.
// ABOUTME: A close either completes fully or leaves everything untouched.

use crate::SessionId;

pub const CONFIRM_TITLE: &str = "Exit Confirmation?";
pub const CONFIRM_CLOSE_PANES: &str = "Are you sure you want to close all session panes?";
pub const CONFIRM_CLOSE_WINDOW: &str = "Are you sure you want to close all the sessions?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseGranularity {
    Terminal,
    Tab,
    Window,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CloseState {
    #[default]
    Idle,
    CloseRequested(CloseGranularity),
    ConfirmPending(CloseGranularity),
    Closing(CloseGranularity),
}

/// What a close request ended in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseOutcome {
    /// These sessions were closed and detached
    Closed(Vec<SessionId>),
    /// Declined, by the user or by the session itself; nothing changed
    Cancelled,
}

impl CloseOutcome {
    pub fn is_closed(&self) -> bool {
        matches!(self, CloseOutcome::Closed(_))
    }
}

#[derive(Debug, Default)]
pub(crate) struct CloseCascade {
    state: CloseState,
}

impl CloseCascade {
    pub(crate) fn state(&self) -> CloseState {
        self.state
    }

    pub(crate) fn request(&mut self, granularity: CloseGranularity) {
        self.advance(CloseState::CloseRequested(granularity));
    }

    pub(crate) fn await_confirmation(&mut self) {
        let granularity = self.granularity();
        self.advance(CloseState::ConfirmPending(granularity));
    }

    pub(crate) fn begin_closing(&mut self) {
        let granularity = self.granularity();
        self.advance(CloseState::Closing(granularity));
    }

    pub(crate) fn finish(&mut self) {
        self.advance(CloseState::Idle);
    }

    fn granularity(&self) -> CloseGranularity {
        match self.state {
            CloseState::CloseRequested(g) | CloseState::ConfirmPending(g) | CloseState::Closing(g) => g,
            CloseState::Idle => panic!("close cascade is idle"),
        }
    }

    fn advance(&mut self, next: CloseState) {
        use CloseState::*;
        let legal = matches!(
            (self.state, next),
            (Idle, CloseRequested(_))
                | (CloseRequested(_), ConfirmPending(_))
                | (CloseRequested(_), Closing(_))
                | (CloseRequested(_), Idle)
                | (ConfirmPending(_), Closing(_))
                | (ConfirmPending(_), Idle)
                | (Closing(_), Idle)
        );
        assert!(legal, "illegal close transition {:?} -> {:?}", self.state, next);
        tracing::debug!("Close cascade {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmed_cycle_returns_to_idle() {
        let mut cascade = CloseCascade::default();
        cascade.request(CloseGranularity::Tab);
        cascade.await_confirmation();
        assert_eq!(cascade.state(), CloseState::ConfirmPending(CloseGranularity::Tab));
        cascade.begin_closing();
        assert_eq!(cascade.state(), CloseState::Closing(CloseGranularity::Tab));
        cascade.finish();
        assert_eq!(cascade.state(), CloseState::Idle);
    }

    #[test]
    fn declined_confirmation_returns_to_idle() {
        let mut cascade = CloseCascade::default();
        cascade.request(CloseGranularity::Window);
        cascade.await_confirmation();
        cascade.finish();
        assert_eq!(cascade.state(), CloseState::Idle);
    }

    #[test]
    #[should_panic(expected = "illegal close transition")]
    fn nested_request_panics() {
        let mut cascade = CloseCascade::default();
        cascade.request(CloseGranularity::Terminal);
        cascade.request(CloseGranularity::Tab);
    }
}
