//! Indented text sink for generated source

/// Accumulates generated lines at the current indentation depth.
#[derive(Debug, Default)]
pub struct Printer {
    out: String,
    indent: usize,
}

impl Printer {
    const INDENT: &'static str = "    ";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn indent(&mut self) {
        self.indent += 1;
    }

    pub fn outdent(&mut self) {
        debug_assert!(self.indent > 0, "outdent below column zero");
        self.indent = self.indent.saturating_sub(1);
    }

    /// Write one or more lines at the current depth. Empty lines stay empty.
    pub fn line(&mut self, text: impl AsRef<str>) {
        for line in text.as_ref().split('\n') {
            if !line.is_empty() {
                for _ in 0..self.indent {
                    self.out.push_str(Self::INDENT);
                }
                self.out.push_str(line);
            }
            self.out.push('\n');
        }
    }

    pub fn blank(&mut self) {
        self.out.push('\n');
    }

    pub fn finish(self) -> String {
        self.out
    }
}
