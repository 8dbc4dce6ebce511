//! Chooser Module
//!
//! Interactive window selection: grab the pointer, wait for a click on a
//! window, then run a pre-bound action against it. A key press cancels.

use thiserror::Error;
use tracing::{debug, info};

use crate::wm::action::{run_action, ActionBinding, ActionContext, ActionExecutor, WindowId};

/// Button that selects a window
pub const PRIMARY_BUTTON: u8 = 1;

/// Events the chooser reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChooseEvent {
    /// `target` is the native window under the pointer, if any
    ButtonPress { button: u8, target: Option<WindowId> },
    KeyPress,
    Other,
}

/// Pointer grab and blocking event source for window selection
pub trait SelectionPointer {
    fn grab_for_selection(&mut self) -> anyhow::Result<()>;
    fn ungrab_pointer(&mut self);
    fn wait_for_event(&mut self) -> anyhow::Result<ChooseEvent>;
}

/// Maps native windows to managed clients
pub trait WindowRegistry {
    fn resolve_window_at(&self, handle: WindowId) -> Option<WindowId>;
}

/// How a selection ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChooseOutcome {
    /// Button pressed; the managed window hit, if any
    Resolved(Option<WindowId>),
    /// Key pressed
    Cancelled,
}

#[derive(Debug, Error)]
pub enum ChooseError {
    #[error("failed to grab the pointer for window selection")]
    Grab(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
    #[error("event stream failed during window selection")]
    Events(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
    #[error("action failed on window 0x{window:x}")]
    Action {
        window: WindowId,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

/// Held pointer grab, released on drop
struct PointerGrab<'p> {
    pointer: &'p mut dyn SelectionPointer,
}

impl<'p> PointerGrab<'p> {
    fn acquire(pointer: &'p mut dyn SelectionPointer) -> Result<Self, ChooseError> {
        pointer
            .grab_for_selection()
            .map_err(|e| ChooseError::Grab(e.into()))?;
        Ok(Self { pointer })
    }

    fn next_event(&mut self) -> Result<ChooseEvent, ChooseError> {
        self.pointer
            .wait_for_event()
            .map_err(|e| ChooseError::Events(e.into()))
    }
}

impl Drop for PointerGrab<'_> {
    fn drop(&mut self) {
        self.pointer.ungrab_pointer();
    }
}

/// Let the user pick a window and run `binding` against it
///
/// Blocks until a button or key press. The grab is released on every
/// path out once it has been acquired.
pub fn choose_window(
    pointer: &mut dyn SelectionPointer,
    registry: &dyn WindowRegistry,
    context: &ActionContext<'_>,
    binding: &ActionBinding,
    executor: &mut dyn ActionExecutor,
) -> Result<ChooseOutcome, ChooseError> {
    let mut grab = PointerGrab::acquire(pointer)?;
    debug!("Choosing window for {:?}", binding.kind());

    loop {
        match grab.next_event()? {
            ChooseEvent::ButtonPress { button, target } => {
                if button != PRIMARY_BUTTON {
                    debug!("Button {} ended window selection", button);
                    return Ok(ChooseOutcome::Resolved(None));
                }

                let Some(window) = target.and_then(|t| registry.resolve_window_at(t)) else {
                    debug!("No managed window under pointer ({:?})", target);
                    return Ok(ChooseOutcome::Resolved(None));
                };

                info!("Chose window 0x{:x} for {:?}", window, binding.kind());
                run_action(&context.with_window(window), binding, executor).map_err(|e| {
                    ChooseError::Action {
                        window,
                        source: e.into(),
                    }
                })?;
                return Ok(ChooseOutcome::Resolved(Some(window)));
            }
            ChooseEvent::KeyPress => {
                debug!("Window selection cancelled");
                return Ok(ChooseOutcome::Cancelled);
            }
            ChooseEvent::Other => continue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wm::action::ActionKind;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    struct ScriptedPointer {
        events: VecDeque<anyhow::Result<ChooseEvent>>,
        grab_ok: bool,
        log: Log,
    }

    impl ScriptedPointer {
        fn new(events: Vec<ChooseEvent>, log: &Log) -> Self {
            Self {
                events: events.into_iter().map(Ok).collect(),
                grab_ok: true,
                log: log.clone(),
            }
        }
    }

    impl SelectionPointer for ScriptedPointer {
        fn grab_for_selection(&mut self) -> anyhow::Result<()> {
            self.log.borrow_mut().push("grab".into());
            if self.grab_ok {
                Ok(())
            } else {
                anyhow::bail!("AlreadyGrabbed")
            }
        }

        fn ungrab_pointer(&mut self) {
            self.log.borrow_mut().push("ungrab".into());
        }

        fn wait_for_event(&mut self) -> anyhow::Result<ChooseEvent> {
            self.log.borrow_mut().push("wait".into());
            self.events
                .pop_front()
                .unwrap_or_else(|| Err(anyhow::anyhow!("connection closed")))
        }
    }

    /// Frames 0x100.. map to clients 0x10..
    struct Frames;

    impl WindowRegistry for Frames {
        fn resolve_window_at(&self, handle: WindowId) -> Option<WindowId> {
            (handle >= 0x100).then(|| handle >> 4)
        }
    }

    struct LoggingExecutor {
        log: Log,
        fail: bool,
    }

    impl ActionExecutor for LoggingExecutor {
        fn execute(&mut self, window: WindowId, binding: &ActionBinding) -> anyhow::Result<()> {
            self.log
                .borrow_mut()
                .push(format!("{:?} 0x{:x}", binding.kind(), window));
            if self.fail {
                anyhow::bail!("BadWindow");
            }
            Ok(())
        }
    }

    fn run(
        events: Vec<ChooseEvent>,
        grab_ok: bool,
        fail: bool,
    ) -> (Result<ChooseOutcome, ChooseError>, Vec<String>) {
        let log: Log = Rc::default();
        let mut pointer = ScriptedPointer::new(events, &log);
        pointer.grab_ok = grab_ok;
        let mut executor = LoggingExecutor {
            log: log.clone(),
            fail,
        };
        let noop = |_: WindowId, _: i32, _: i32| -> anyhow::Result<()> { Ok(()) };
        let context = ActionContext::new(0, 0, 0, &noop, &noop);
        let binding = ActionBinding::plain(ActionKind::Close);

        let result = choose_window(&mut pointer, &Frames, &context, &binding, &mut executor);
        let calls = log.borrow().clone();
        (result, calls)
    }

    fn press(button: u8, target: Option<WindowId>) -> ChooseEvent {
        ChooseEvent::ButtonPress { button, target }
    }

    fn ungrabs(calls: &[String]) -> usize {
        calls.iter().filter(|c| *c == "ungrab").count()
    }

    #[test]
    fn test_click_runs_action_on_target() {
        let (result, calls) = run(
            vec![ChooseEvent::Other, ChooseEvent::Other, press(PRIMARY_BUTTON, Some(0x120))],
            true,
            false,
        );

        assert_eq!(result.unwrap(), ChooseOutcome::Resolved(Some(0x12)));
        assert_eq!(
            calls,
            vec!["grab", "wait", "wait", "wait", "Close 0x12", "ungrab"]
        );
    }

    #[test]
    fn test_key_press_cancels() {
        let (result, calls) = run(vec![ChooseEvent::KeyPress], true, false);

        assert_eq!(result.unwrap(), ChooseOutcome::Cancelled);
        assert_eq!(calls, vec!["grab", "wait", "ungrab"]);
    }

    #[test]
    fn test_click_on_unmanaged_window_ends_without_action() {
        let (result, calls) = run(vec![press(PRIMARY_BUTTON, Some(0x20))], true, false);
        assert_eq!(result.unwrap(), ChooseOutcome::Resolved(None));
        assert_eq!(calls, vec!["grab", "wait", "ungrab"]);

        let (result, calls) = run(vec![press(PRIMARY_BUTTON, None)], true, false);
        assert_eq!(result.unwrap(), ChooseOutcome::Resolved(None));
        assert_eq!(ungrabs(&calls), 1);
    }

    #[test]
    fn test_other_button_ends_without_action() {
        let (result, calls) = run(vec![press(3, Some(0x120))], true, false);
        assert_eq!(result.unwrap(), ChooseOutcome::Resolved(None));
        assert_eq!(calls, vec!["grab", "wait", "ungrab"]);
    }

    #[test]
    fn test_grab_failure_never_ungrabs() {
        let (result, calls) = run(vec![ChooseEvent::KeyPress], false, false);
        assert!(matches!(result, Err(ChooseError::Grab(_))));
        assert_eq!(calls, vec!["grab"]);
    }

    #[test]
    fn test_event_error_still_ungrabs_once() {
        let (result, calls) = run(vec![ChooseEvent::Other], true, false);
        assert!(matches!(result, Err(ChooseError::Events(_))));
        assert_eq!(calls, vec!["grab", "wait", "wait", "ungrab"]);
    }

    #[test]
    fn test_action_error_still_ungrabs_once() {
        let (result, calls) = run(vec![press(PRIMARY_BUTTON, Some(0x150))], true, true);
        match result {
            Err(ChooseError::Action { window, .. }) => assert_eq!(window, 0x15),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(ungrabs(&calls), 1);
        assert_eq!(calls.last().map(String::as_str), Some("ungrab"));
    }
}
