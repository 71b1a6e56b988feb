use crate::board::CounterSnapshot;
use crate::decade::{SEG_A, SEG_B, SEG_C, SEG_D, SEG_E, SEG_F, SEG_G};
use crate::session::{ClockSource, Session};
use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use std::io::{self, Write};
use tui::backend::CrosstermBackend;
use tui::layout::{Constraint, Direction, Layout};
use tui::style::{Color, Modifier, Style};
use tui::text::{Span, Spans};
use tui::widgets::{Block, Borders, Paragraph};
use tui::Terminal;
use tracing::warn;

/// everything a front panel shows, gathered in one go so a frame never mixes
/// two different instants of the counters
#[derive(Debug, Clone, PartialEq)]
pub struct BoardView {
    pub counters: CounterSnapshot,
    pub powered: bool,
    pub clock_high: bool,
    pub clock_source: ClockSource,
    pub frequency_hz: f64,
    pub period_s: f64,
}

impl BoardView {
    pub fn capture(session: &Session) -> BoardView {
        BoardView {
            counters: session.snapshot(),
            powered: session.is_powered(),
            clock_high: session.clock_level(),
            clock_source: session.clock_source(),
            frequency_hz: session.frequency_hz(),
            period_s: session.period_seconds(),
        }
    }
}

/// Display is what the front panel draws the board on. The session doesn't
/// know or care which one is attached.
pub trait Display {
    fn draw(&mut self, view: &BoardView) -> Result<(), io::Error>;
}

fn status_text(view: &BoardView) -> String {
    let source = match view.clock_source {
        ClockSource::Internal => "555",
        ClockSource::External => "external",
    };
    format!(
        "Status: {}  |  clock: {}",
        if view.powered { "ON" } else { "OFF" },
        source
    )
}

fn timing_text(view: &BoardView) -> String {
    format!("555: f={:.2} Hz | T={:.3} s", view.frequency_hz, view.period_s)
}

fn lamp_text(counters: &CounterSnapshot) -> String {
    counters
        .lamps()
        .map(|on| if on { "●" } else { "○" })
        .collect::<Vec<_>>()
        .join(" ")
}

/// the ring mask as the row of lamps would read it, msb first
pub fn mask_to_binary(mask: u32, span: u8) -> String {
    format!("{:0width$b}", mask, width = span as usize)
}

/// three text rows drawing one seven-segment digit
fn seven_segment_rows(segments: u8) -> [String; 3] {
    let lit = |seg: u8, c: char| if segments & seg != 0 { c } else { ' ' };
    [
        format!(" {} ", lit(SEG_A, '_')),
        format!("{}{}{}", lit(SEG_F, '|'), lit(SEG_G, '_'), lit(SEG_B, '|')),
        format!("{}{}{}", lit(SEG_E, '|'), lit(SEG_D, '_'), lit(SEG_C, '|')),
    ]
}

/// the whole digit chain, most significant digit on the left
fn digit_rows(counters: &CounterSnapshot) -> [String; 3] {
    let mut rows = [String::new(), String::new(), String::new()];
    for (i, digit) in counters.digits.iter().rev().enumerate() {
        for (row, part) in rows.iter_mut().zip(seven_segment_rows(digit.segments)) {
            if i > 0 {
                row.push(' ');
            }
            row.push_str(&part);
        }
    }
    rows
}

const HELP_TEXT: &str =
    "ENTER power | r reset all | d reset display | x clock source | space pulse | 0 quit";

/// full-screen panel in the terminal, rendered using TUI and crossterm
pub struct TermDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TermDisplay {
    pub fn new() -> Result<TermDisplay, io::Error> {
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, Hide)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        Ok(TermDisplay { terminal })
    }
}

impl Drop for TermDisplay {
    fn drop(&mut self) {
        if let Err(e) = execute!(io::stdout(), Show, LeaveAlternateScreen) {
            warn!(error = %e, "couldn't restore the terminal");
        }
    }
}

impl Display for TermDisplay {
    fn draw(&mut self, view: &BoardView) -> Result<(), io::Error> {
        let dim = Style::default().fg(Color::Gray);
        let clk = if view.clock_high {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::Red)
        };
        let lamp_style = Style::default()
            .fg(Color::LightGreen)
            .add_modifier(Modifier::BOLD);

        let header = vec![
            Spans::from(vec![
                Span::raw(status_text(view)),
                Span::raw("   "),
                Span::styled("●", clk),
                Span::styled(" CLK", dim),
            ]),
            Spans::from(Span::styled(timing_text(view), dim)),
        ];
        let lamps = vec![
            Spans::from(Span::styled(lamp_text(&view.counters), lamp_style)),
            Spans::from(Span::styled(
                (1..=view.counters.ring_span)
                    .map(|n| format!("L{}", n))
                    .collect::<Vec<_>>()
                    .join(" "),
                dim,
            )),
        ];
        let digits: Vec<Spans> = digit_rows(&view.counters)
            .iter()
            .map(|row| Spans::from(Span::styled(row.clone(), lamp_style)))
            .collect();

        self.terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints(
                    [
                        Constraint::Length(4),
                        Constraint::Length(4),
                        Constraint::Length(5),
                        Constraint::Min(1),
                    ]
                    .as_ref(),
                )
                .split(f.size());

            f.render_widget(
                Paragraph::new(header).block(
                    Block::default()
                        .title("APPLE JUICE")
                        .borders(Borders::ALL),
                ),
                chunks[0],
            );
            f.render_widget(
                Paragraph::new(lamps).block(Block::default().title("4017").borders(Borders::ALL)),
                chunks[1],
            );
            f.render_widget(
                Paragraph::new(digits).block(Block::default().title("4026").borders(Borders::ALL)),
                chunks[2],
            );
            f.render_widget(Paragraph::new(Span::styled(HELP_TEXT, dim)), chunks[3]);
        })?;
        Ok(())
    }
}

/// plain console output: one line each time the lamps or digits change, the
/// lamp row written out in binary
pub struct LineDisplay<W: Write> {
    out: W,
    last: Option<(u32, u64, bool)>,
}

impl LineDisplay<io::Stdout> {
    pub fn stdout() -> Self {
        LineDisplay::new(io::stdout())
    }
}

impl<W: Write> LineDisplay<W> {
    pub fn new(out: W) -> Self {
        LineDisplay { out, last: None }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Display for LineDisplay<W> {
    fn draw(&mut self, view: &BoardView) -> Result<(), io::Error> {
        let c = &view.counters;
        let key = (c.ring_mask, c.count(), view.powered);
        if self.last == Some(key) {
            return Ok(());
        }
        self.last = Some(key);
        // raw mode is usually on, so carriage returns are ours to write
        write!(
            self.out,
            "{} {:0width$} [{}]\r\n",
            mask_to_binary(c.ring_mask, c.ring_span),
            c.count(),
            if view.powered { "on" } else { "off" },
            width = c.digits.len()
        )?;
        self.out.flush()
    }
}

/// useful for testing the front panel loop
#[derive(Default)]
pub struct DummyDisplay {
    pub frames: Vec<BoardView>,
}

impl DummyDisplay {
    pub fn new() -> Self {
        DummyDisplay::default()
    }
}

impl Display for DummyDisplay {
    fn draw(&mut self, view: &BoardView) -> Result<(), io::Error> {
        self.frames.push(view.clone());
        Ok(())
    }
}
