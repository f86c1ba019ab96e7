//! Run-scoped code synthesis for rows without a natural key.

/// A monotonic counter producing codes like `ART0001`.
///
/// One sequence is kept per entity for the whole run, so codes synthesized
/// for a second legacy source continue where the first left off instead of
/// colliding with it.
#[derive(Debug, Clone)]
pub struct CodeSequence {
    prefix: &'static str,
    width: usize,
    next: u64,
}

impl CodeSequence {
    /// Creates a sequence starting at 1.
    #[must_use]
    pub const fn new(prefix: &'static str, width: usize) -> Self {
        Self {
            prefix,
            width,
            next: 1,
        }
    }

    /// Sequence for product codes (`ART0001`).
    #[must_use]
    pub const fn products() -> Self {
        Self::new("ART", 4)
    }

    /// Sequence for invoice numbers (`INV000001`).
    #[must_use]
    pub const fn invoices() -> Self {
        Self::new("INV", 6)
    }

    /// Returns the next code and advances the counter.
    pub fn next_code(&mut self) -> String {
        let code = format!("{}{:0width$}", self.prefix, self.next, width = self.width);
        self.next += 1;
        code
    }
}
