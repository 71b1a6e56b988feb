/// What every counter IC on the board can do. The board clocks and resets
/// its chips through this, without caring which part it is talking to.
pub trait Chip {
    /// react to one clock edge
    fn advance(&mut self);

    /// put the chip back into its power-on state
    fn reset(&mut self);

    /// the chip's raw output pins, as an integer
    fn value(&self) -> u32;

    /// clock the chip `edges` times
    fn advance_by(&mut self, edges: usize) {
        for _ in 0..edges {
            self.advance();
        }
    }
}
