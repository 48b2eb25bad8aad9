//! Source-location tracking. The diagnostics protocol this compiler speaks
//! is line-indexed, not range-indexed, so `Span` is kept deliberately thin:
//! a single 1-based line number, the unit the scanner/parser contract hands
//! the core (see the driver contract).

/// A 1-based source line number.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Span {
    line: u32,
}

impl Span {
    pub const DUMMY: Span = Span { line: 0 };

    pub fn new(line: u32) -> Self {
        Span { line }
    }

    pub fn line(self) -> u32 {
        self.line
    }

    pub fn is_dummy(self) -> bool {
        self.line == 0
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "L#{}", self.line)
    }
}
