//! Structural emission.
//!
//! The synthesizer never formats text itself. It describes structure through
//! a [`CodeSink`]: lines, blank lines, blocks opened with a header and closed
//! with an optional trailer, and explicit indentation changes.
//!
//! [`Emission`] records the instructions for inspection or replay;
//! [`CodeWriter`] renders them to source text.

mod writer;

pub use writer::CodeWriter;

/// Receiver of structural emission instructions.
pub trait CodeSink {
    /// Emit one line at the current indentation.
    fn line(&mut self, text: &str);

    fn blank(&mut self);

    /// Open a block introduced by `header`.
    fn open(&mut self, header: &str);

    fn close(&mut self);

    /// Close the current block, appending `trailer` to the closing line.
    fn close_with(&mut self, trailer: &str);

    fn indent(&mut self);

    fn dedent(&mut self);

    /// Emit `header`, run `body` inside the block, then close it.
    fn block(&mut self, header: &str, body: impl FnOnce(&mut Self))
    where
        Self: Sized,
    {
        self.open(header);
        body(self);
        self.close();
    }
}

/// One recorded instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmitOp {
    Line(String),
    Blank,
    Open(String),
    Close,
    CloseWith(String),
    Indent,
    Dedent,
}

/// Recording sink.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Emission {
    ops: Vec<EmitOp>,
}

impl Emission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[EmitOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<EmitOp> {
        self.ops
    }

    /// Feed every recorded instruction into `sink`, in order.
    pub fn replay<S: CodeSink + ?Sized>(&self, sink: &mut S) {
        for op in &self.ops {
            match op {
                EmitOp::Line(text) => sink.line(text),
                EmitOp::Blank => sink.blank(),
                EmitOp::Open(header) => sink.open(header),
                EmitOp::Close => sink.close(),
                EmitOp::CloseWith(trailer) => sink.close_with(trailer),
                EmitOp::Indent => sink.indent(),
                EmitOp::Dedent => sink.dedent(),
            }
        }
    }

    /// Render through a fresh [`CodeWriter`].
    pub fn render(&self) -> String {
        let mut writer = CodeWriter::new();
        self.replay(&mut writer);
        writer.finish()
    }

    /// Headers of every opened block, in emission order.
    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            EmitOp::Open(header) => Some(header.as_str()),
            _ => None,
        })
    }
}

impl CodeSink for Emission {
    fn line(&mut self, text: &str) {
        self.ops.push(EmitOp::Line(text.to_string()));
    }

    fn blank(&mut self) {
        self.ops.push(EmitOp::Blank);
    }

    fn open(&mut self, header: &str) {
        self.ops.push(EmitOp::Open(header.to_string()));
    }

    fn close(&mut self) {
        self.ops.push(EmitOp::Close);
    }

    fn close_with(&mut self, trailer: &str) {
        self.ops.push(EmitOp::CloseWith(trailer.to_string()));
    }

    fn indent(&mut self) {
        self.ops.push(EmitOp::Indent);
    }

    fn dedent(&mut self) {
        self.ops.push(EmitOp::Dedent);
    }
}
