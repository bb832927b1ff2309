use crate::errors::{Diagnostic, DiagnosticsCollection};

/// Diagnostic sink - anything that can collect diagnostics for later display.
pub trait DiagnosticSink {
    fn emit(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for () {
    fn emit(&mut self, _: Diagnostic) {}
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn emit(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

impl DiagnosticSink for DiagnosticsCollection {
    fn emit(&mut self, diagnostic: Diagnostic) {
        self.add(diagnostic);
    }
}

/// Drains every diagnostic from `source` into `sink`.
pub fn drain_diagnostics_into<I>(source: I, sink: &mut dyn DiagnosticSink)
where
    I: IntoIterator<Item = Diagnostic>,
{
    for diagnostic in source {
        sink.emit(diagnostic);
    }
}
