//! Apply parsed input to the session.

use handset_core::shell::ShellAction;

use crate::app_state::AppState;
use crate::input::{HELP, Input, map_event};

/// Whether the session loop keeps going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

fn dispatch(state: &mut AppState, action: ShellAction) {
    let locked = state.shell.is_locked();
    let is_tick = matches!(action, ShellAction::Tick);
    let honored = state.shell.dispatch(action);
    if locked && !honored && !is_tick {
        state.say("The device is locked. :unlock first");
    }
}

/// Apply one line's worth of input, then run any queued fetches.
pub fn apply(state: &mut AppState, input: Input) -> Flow {
    match input {
        Input::Actions(actions) => {
            for action in actions {
                dispatch(state, action);
            }
        },
        Input::Event(event) => {
            match map_event(&event, state.shell.is_locked()) {
                Some(action) => dispatch(state, action),
                None => log::debug!("No shell action for {event:?}"),
            }
        },
        Input::Help => {
            for line in HELP {
                state.say(*line);
            }
        },
        Input::State => {
            let s = state.shell.state();
            let order: Vec<&str> = s.app_order.iter().map(|id| id.label()).collect();
            state.say(format!(
                "locked={} active={} editing={}",
                s.locked,
                s.active_app.map(|id| id.label()).unwrap_or("none"),
                s.is_editing_layout
            ));
            state.say(format!("order: {}", order.join(", ")));
        },
        Input::Quit => return Flow::Quit,
        Input::Nothing => {},
    }
    let delivered = state.shell.pump();
    if delivered > 0 {
        log::debug!("Delivered {delivered} fetch results");
    }
    Flow::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::parse_line;
    use handset_core::config::HandsetConfig;
    use handset_core::platform::{Collaborators, DesktopPlatform, MemoryStorage};
    use handset_core::registry::AppId;
    use handset_core::shell::DeviceShell;

    fn state() -> AppState {
        let config = HandsetConfig::default();
        let shell = DeviceShell::new(
            &config,
            Box::new(DesktopPlatform::new()),
            Box::new(MemoryStorage::new()),
            Collaborators::in_memory(),
        );
        AppState::new(config, shell)
    }

    fn run(state: &mut AppState, line: &str) -> Flow {
        let geometry = state.shell.geometry();
        apply(state, parse_line(line, geometry).unwrap())
    }

    #[test]
    fn session_script() {
        let mut s = state();
        run(&mut s, ":key power");
        assert!(!s.shell.is_locked());
        run(&mut s, ":open calculator");
        run(&mut s, "press 6 x 7 =");
        assert!(s.shell.applet_view().iter().any(|l| l.trim() == "42"));
        run(&mut s, ":home");
        run(&mut s, ":edit");
        run(&mut s, ":drag 0 3");
        run(&mut s, ":edit");
        assert_eq!(s.shell.state().app_order[3], AppId::Phone);
        run(&mut s, ":lock");
        let state = s.shell.state();
        assert!(state.locked);
        assert_eq!(state.active_app, None);
        assert_eq!(run(&mut s, ":quit"), Flow::Quit);
    }

    #[test]
    fn huge_drag_target_appends() {
        let mut s = state();
        run(&mut s, ":unlock");
        run(&mut s, ":edit");
        run(&mut s, ":drag 0 1000000000");
        let order = s.shell.state().app_order;
        assert_eq!(order.last(), Some(&AppId::Phone));
        assert_eq!(order[0], AppId::ALL[1]);
    }

    #[test]
    fn locked_input_is_reported() {
        let mut s = state();
        run(&mut s, ":open notes");
        assert!(s.messages.iter().any(|m| m.contains("locked")));
        assert_eq!(s.shell.active_app(), None);
    }

    #[test]
    fn fetches_run_after_each_line() {
        let mut s = state();
        s.shell
            .services_mut()
            .kv
            .set("contacts", "Grace", "555 0199")
            .unwrap();
        run(&mut s, ":unlock");
        run(&mut s, ":open contacts");
        assert_eq!(s.shell.pending_fetches(), 0);
        assert!(s.shell.applet_view().iter().any(|l| l.contains("Grace")));
    }

    #[test]
    fn state_and_help_print_messages() {
        let mut s = state();
        run(&mut s, ":state");
        assert!(s.messages[0].starts_with("locked=true"));
        s.messages.clear();
        run(&mut s, ":help");
        assert_eq!(s.messages.len(), HELP.len());
    }
}
