//! Indentation-aware source text builder.
//!
//! [`CodeWriter`] owns the current indentation level so that generated files
//! never depend on hand-counted leading spaces. Nested constructs are written
//! through [`CodeWriter::block`] and [`CodeWriter::braced`], which restore the
//! indentation level when the body returns.

/// Builds generated source text line by line.
#[derive(Debug)]
pub struct CodeWriter {
    buf: String,
    level: usize,
    unit: &'static str,
}

impl CodeWriter {
    /// Creates a writer that indents each level with `unit`.
    pub fn new(unit: &'static str) -> Self {
        Self {
            buf: String::new(),
            level: 0,
            unit,
        }
    }

    /// Appends one line at the current indentation level.
    ///
    /// An empty `text` produces a bare newline with no trailing whitespace.
    pub fn line(&mut self, text: impl AsRef<str>) -> &mut Self {
        let text = text.as_ref();
        if !text.is_empty() {
            for _ in 0..self.level {
                self.buf.push_str(self.unit);
            }
            self.buf.push_str(text);
        }
        self.buf.push('\n');
        self
    }

    /// Appends an empty line.
    pub fn blank(&mut self) -> &mut Self {
        self.line("")
    }

    /// Writes `header`, then `body` one level deeper (Python-style block).
    pub fn block(&mut self, header: impl AsRef<str>, body: impl FnOnce(&mut Self)) -> &mut Self {
        self.line(header);
        self.nested(body)
    }

    /// Writes `open`, then `body` one level deeper, then `close` at the
    /// original level (brace-delimited block).
    pub fn braced(
        &mut self,
        open: impl AsRef<str>,
        close: impl AsRef<str>,
        body: impl FnOnce(&mut Self),
    ) -> &mut Self {
        self.line(open);
        self.nested(body);
        self.line(close)
    }

    fn nested(&mut self, body: impl FnOnce(&mut Self)) -> &mut Self {
        self.level += 1;
        body(self);
        self.level -= 1;
        self
    }

    /// Consumes the writer and returns the generated text.
    pub fn finish(self) -> String {
        self.buf
    }
}
