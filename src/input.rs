use crate::session::Session;
use crossterm::event::{poll, read, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal;
use std::collections::HashMap;
use std::io;
use std::ops::ControlFlow;
use std::time::Duration;
use tracing::{debug, warn};

/// the buttons and switches on the board, plus a way out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    TogglePower,
    Reset,
    ResetDigits,
    ToggleClockSource,
    Pulse,
    Quit,
}

impl Command {
    /// press the button on a running session. Breaks when it's time to stop
    /// drawing; the caller still owns the shutdown.
    pub fn apply(self, session: &Session) -> ControlFlow<()> {
        match self {
            Command::TogglePower => session.toggle_power(),
            Command::Reset => session.reset(),
            Command::ResetDigits => session.reset_digits(),
            Command::ToggleClockSource => session.toggle_clock_source(),
            Command::Pulse => {
                session.pulse();
            }
            Command::Quit => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }
}

/// printable keys; Enter, Esc and ctrl-c are handled separately
const BOARD_KEYMAP: [(char, Command); 8] = [
    ('r', Command::Reset),
    ('R', Command::Reset),
    ('d', Command::ResetDigits),
    ('D', Command::ResetDigits),
    ('x', Command::ToggleClockSource),
    (' ', Command::Pulse),
    ('0', Command::Quit),
    ('q', Command::Quit),
];

/// reads button presses
pub trait Input {
    /// everything pressed since the last call, oldest first. Never blocks.
    fn read_commands(&mut self) -> Result<Vec<Command>, io::Error>;
}

/// keyboard in a raw-mode terminal, via crossterm
pub struct KeyboardInput {
    keymap: HashMap<char, Command>,
}

impl KeyboardInput {
    pub fn new() -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(KeyboardInput {
            keymap: HashMap::from(BOARD_KEYMAP),
        })
    }

    fn map_key(&self, key: KeyEvent) -> Option<Command> {
        match key.code {
            KeyCode::Enter => Some(Command::TogglePower),
            KeyCode::Esc => Some(Command::Quit),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Command::Quit)
            }
            KeyCode::Char(c) => {
                let cmd = self.keymap.get(&c).copied();
                if cmd.is_none() {
                    debug!(key = %c, "unmapped key");
                }
                cmd
            }
            other => {
                debug!(key = ?other, "unmapped key");
                None
            }
        }
    }
}

impl Drop for KeyboardInput {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            warn!(error = %e, "couldn't leave raw mode");
        }
    }
}

impl Input for KeyboardInput {
    fn read_commands(&mut self) -> Result<Vec<Command>, io::Error> {
        let mut commands = Vec::new();
        while poll(Duration::from_millis(0))? {
            match read()? {
                Event::Key(key) => commands.extend(self.map_key(key)),
                Event::Resize(..) => {}
                other => debug!(event = ?other, "ignored terminal event"),
            }
        }
        Ok(commands)
    }
}

/// canned Input implementation for testing: hands out one batch per call
pub struct DummyInput {
    batches: Vec<Vec<Command>>,
}

impl DummyInput {
    pub fn new(batches: &[&[Command]]) -> Self {
        DummyInput {
            batches: batches.iter().rev().map(|b| b.to_vec()).collect(),
        }
    }
}

impl Input for DummyInput {
    fn read_commands(&mut self) -> Result<Vec<Command>, io::Error> {
        Ok(self.batches.pop().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoardConfig;
    use crate::error::BoardError;
    use crate::session::{ClockSource, LoopState};

    fn keyboard() -> KeyboardInput {
        // skip raw mode, there's no terminal under the test runner
        KeyboardInput {
            keymap: HashMap::from(BOARD_KEYMAP),
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_keymap() {
        let k = keyboard();
        assert_eq!(k.map_key(key(KeyCode::Enter)), Some(Command::TogglePower));
        assert_eq!(k.map_key(key(KeyCode::Char('r'))), Some(Command::Reset));
        assert_eq!(k.map_key(key(KeyCode::Char('d'))), Some(Command::ResetDigits));
        assert_eq!(k.map_key(key(KeyCode::Char('x'))), Some(Command::ToggleClockSource));
        assert_eq!(k.map_key(key(KeyCode::Char(' '))), Some(Command::Pulse));
        assert_eq!(k.map_key(key(KeyCode::Char('0'))), Some(Command::Quit));
        assert_eq!(k.map_key(key(KeyCode::Esc)), Some(Command::Quit));
        assert_eq!(
            k.map_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Command::Quit)
        );
        assert_eq!(k.map_key(key(KeyCode::Char('z'))), None);
        assert_eq!(k.map_key(key(KeyCode::Tab)), None);
    }

    #[test]
    fn test_dummy_input_batches() -> Result<(), io::Error> {
        let mut i = DummyInput::new(&[&[Command::TogglePower], &[], &[Command::Quit]]);
        assert_eq!(i.read_commands()?, [Command::TogglePower]);
        assert!(i.read_commands()?.is_empty());
        assert_eq!(i.read_commands()?, [Command::Quit]);
        assert!(i.read_commands()?.is_empty());
        Ok(())
    }

    #[test]
    fn test_apply_commands() -> Result<(), BoardError> {
        // ten second HIGH: the 555 stays out of the way for the whole test
        let cfg = BoardConfig {
            r1: 1.0,
            r2: 1.0,
            c: 5.0 / std::f64::consts::LN_2,
            ..BoardConfig::default()
        };
        let s = Session::start(&cfg)?;
        assert_eq!(Command::ToggleClockSource.apply(&s), ControlFlow::Continue(()));
        assert_eq!(s.clock_source(), ClockSource::External);
        assert_eq!(Command::TogglePower.apply(&s), ControlFlow::Continue(()));
        assert_eq!(s.state(), LoopState::Active);
        assert_eq!(Command::Pulse.apply(&s), ControlFlow::Continue(()));
        assert_eq!(Command::Pulse.apply(&s), ControlFlow::Continue(()));
        assert_eq!(s.snapshot().count(), 2);
        assert_eq!(s.snapshot().ring_mask, 0b1000);
        assert_eq!(Command::ResetDigits.apply(&s), ControlFlow::Continue(()));
        assert_eq!(s.snapshot().count(), 0);
        assert_eq!(Command::Pulse.apply(&s), ControlFlow::Continue(()));
        assert_eq!(Command::Reset.apply(&s), ControlFlow::Continue(()));
        assert_eq!(s.snapshot().count(), 0);
        assert_eq!(s.snapshot().ring_mask, 0b1000);
        assert_eq!(Command::Quit.apply(&s), ControlFlow::Break(()));
        // quitting the panel doesn't stop the board by itself
        assert_eq!(s.state(), LoopState::Active);
        Ok(())
    }
}
