//! The observer side: read the buttons, press them on the session, draw a
//! frame, wait for the next one. Runs on the caller's thread and never
//! holds the board lock for longer than a snapshot.
use crate::display::{BoardView, Display};
use crate::input::Input;
use crate::session::Session;
use spin_sleep::LoopHelper;
use std::io;
use tracing::info;

/// drive the panel until a Quit comes in; returns how many frames were drawn
pub fn run_panel(
    session: &Session,
    input: &mut dyn Input,
    display: &mut dyn Display,
    fps: u32,
) -> Result<u64, io::Error> {
    let mut pacer = LoopHelper::builder().build_with_target_rate(f64::from(fps.max(1)));
    let mut frames = 0;
    loop {
        pacer.loop_start();
        for command in input.read_commands()? {
            if command.apply(session).is_break() {
                info!(frames, "panel closed");
                return Ok(frames);
            }
        }
        display.draw(&BoardView::capture(session))?;
        frames += 1;
        pacer.loop_sleep();
    }
}
