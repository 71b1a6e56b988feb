use std::error::Error;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use applejuice::config::{self, BoardConfig};
use applejuice::display::{Display, LineDisplay, TermDisplay};
use applejuice::input::KeyboardInput;
use applejuice::panel::run_panel;
use applejuice::session::Session;

/// Apple Juice board simulator: a 555 clocking a 4017 lamp chaser and a
/// chain of 4026 counters
#[derive(Parser, Debug)]
#[command(name = "applejuice", version)]
struct Args {
    /// lamps on the 4017 (1-10)
    #[arg(long, default_value_t = config::DEFAULT_RING_SPAN)]
    span: u8,

    /// 555 R1 in ohms
    #[arg(long, default_value_t = config::DEFAULT_R1)]
    r1: f64,

    /// 555 R2 in ohms
    #[arg(long, default_value_t = config::DEFAULT_R2)]
    r2: f64,

    /// 555 timing capacitor in farads; bigger is slower
    #[arg(long, default_value_t = config::DEFAULT_C)]
    c: f64,

    /// 4026 digits in the display chain
    #[arg(long, default_value_t = config::DEFAULT_DIGITS)]
    digits: usize,

    /// print a line per change instead of drawing the full panel
    #[arg(long)]
    plain: bool,

    /// panel refresh rate
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// tracing filter, e.g. "debug" or "applejuice=trace"; RUST_LOG wins
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    // stderr, so the panel on stdout stays clean
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&args.log_level)?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // initialise; a bad parameter stops us here, before any thread exists
    let session = Session::start(&BoardConfig {
        ring_span: args.span,
        r1: args.r1,
        r2: args.r2,
        c: args.c,
        digits: args.digits,
    })?;

    {
        let mut input = KeyboardInput::new()?;
        let mut display: Box<dyn Display> = if args.plain {
            Box::new(LineDisplay::stdout())
        } else {
            Box::new(TermDisplay::new()?)
        };
        run_panel(&session, &mut input, display.as_mut(), args.fps)?;
        // display and keyboard drop here, handing the terminal back
    }

    session.shutdown();
    Ok(())
}
