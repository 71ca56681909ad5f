/// Sizing hints for the buffers owned by the lexer and the parser.
///
/// Both are initial capacities only; the buffers grow on demand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Initial capacity of the buffer the lexer accumulates token text in.
    pub value_capacity: usize,
    /// Initial capacity of each of the two token slots of the parser.
    pub slot_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            value_capacity: 32,
            slot_capacity: 20,
        }
    }
}
