use super::CodeSink;

const INDENT: &str = "    ";

/// Text-rendering sink.
///
/// Blocks render as `header {` ... `}` with four-space indentation. Blank
/// lines carry no trailing whitespace.
#[derive(Debug, Clone, Default)]
pub struct CodeWriter {
    out: String,
    depth: usize,
}

impl CodeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current indentation depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn finish(self) -> String {
        self.out
    }

    fn push_line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }
}

impl CodeSink for CodeWriter {
    fn line(&mut self, text: &str) {
        if text.is_empty() {
            self.blank();
        } else {
            self.push_line(text);
        }
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn open(&mut self, header: &str) {
        if header.is_empty() {
            self.push_line("{");
        } else {
            self.push_line(&format!("{} {{", header));
        }
        self.indent();
    }

    fn close(&mut self) {
        self.close_with("");
    }

    fn close_with(&mut self, trailer: &str) {
        self.dedent();
        self.push_line(&format!("}}{}", trailer));
    }

    fn indent(&mut self) {
        self.depth += 1;
    }

    fn dedent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_blocks() {
        let mut writer = CodeWriter::new();
        writer.block("impl Leaf", |w| {
            w.block("pub fn value(&self) -> i32", |w| {
                w.line("*self.value.borrow()");
            });
        });

        insta::assert_snapshot!(writer.finish(), @r###"
        impl Leaf {
            pub fn value(&self) -> i32 {
                *self.value.borrow()
            }
        }
        "###);
    }

    #[test]
    fn test_dedent_saturates() {
        let mut writer = CodeWriter::new();
        writer.dedent();
        writer.line("x");
        assert_eq!(writer.depth(), 0);
        assert_eq!(writer.finish(), "x\n");
    }

    #[test]
    fn test_empty_header_opens_bare_block() {
        let mut writer = CodeWriter::new();
        writer.open("");
        writer.line("let a = 1;");
        writer.close();
        assert_eq!(writer.finish(), "{\n    let a = 1;\n}\n");
    }
}
