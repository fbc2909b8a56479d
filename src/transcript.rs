use crate::shared_utils::{page_header, sheet_header};

const BLOCK_SEPARATOR: &str = "\n\n";

/// A unit's header line followed by its body
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedBlock {
    header: String,
    body: String,
}

impl RenderedBlock {
    pub fn sheet(name: &str, body: String) -> Self {
        Self {
            header: sheet_header(name),
            body,
        }
    }

    pub fn page(page_number: usize, body: String) -> Self {
        Self {
            header: page_header(page_number),
            body,
        }
    }

    fn render(&self) -> String {
        if self.body.is_empty() {
            self.header.clone()
        } else {
            format!("{}\n{}", self.header, self.body)
        }
    }
}

/// What processing one unit produced.
///
/// Each unit step returns one of these by value; the assembler merges them,
/// so no flag is shared between iterations.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitOutcome {
    pub name: Option<String>,
    pub block: RenderedBlock,
    pub truncated: bool,
}

/// The assembled text plus what was learned while building it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    pub text: String,
    pub unit_names: Vec<String>,
    pub unit_count: usize,
    pub page_count: Option<usize>,
    pub truncated: bool,
}

/// Joins rendered blocks in encounter order.
#[derive(Debug, Default)]
pub struct TranscriptAssembler {
    segments: Vec<String>,
    unit_names: Vec<String>,
    unit_count: usize,
    page_count: Option<usize>,
    truncated: bool,
}

impl TranscriptAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one unit's outcome
    pub fn absorb(&mut self, outcome: UnitOutcome) {
        self.segments.push(outcome.block.render());
        if let Some(name) = outcome.name {
            self.unit_names.push(name);
        }
        self.unit_count += 1;
        self.truncated |= outcome.truncated;
    }

    /// Count a page, whether or not it produced a block
    pub fn record_page(&mut self) {
        *self.page_count.get_or_insert(0) += 1;
    }

    /// Append a free-standing note after everything absorbed so far
    pub fn append_note(&mut self, note: String) {
        self.segments.push(note);
    }

    pub fn mark_truncated(&mut self) {
        self.truncated = true;
    }

    /// Join everything with one blank line and trim the result once
    pub fn finish(self) -> Transcript {
        let text = self.segments.join(BLOCK_SEPARATOR).trim().to_string();

        Transcript {
            text,
            unit_names: self.unit_names,
            unit_count: self.unit_count,
            page_count: self.page_count,
            truncated: self.truncated,
        }
    }
}
