/// Controls how strictly a block-table decode treats malformed entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeOptions {
    /// Skip malformed table entries with a warning instead of failing the
    /// whole sprite. Structural errors inside a kept entry still propagate.
    pub lenient: bool,
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lenient(mut self, lenient: bool) -> Self {
        self.lenient = lenient;
        self
    }
}
