// Dotlanth
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Source text writer used by every emitter

/// Line-oriented writer holding one artifact's output buffer and indentation cursor
#[derive(Debug, Clone)]
pub struct SourceWriter {
    buffer: String,
    depth: usize,
    indent_width: usize,
}

impl Default for SourceWriter {
    fn default() -> Self {
        Self::new(4)
    }
}

impl SourceWriter {
    /// Create a new writer indenting by `indent_width` spaces per level
    pub fn new(indent_width: usize) -> Self {
        Self {
            buffer: String::new(),
            depth: 0,
            indent_width,
        }
    }

    /// Current indentation depth
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Get the current size of the buffer
    pub fn size(&self) -> usize {
        self.buffer.len()
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    /// Take ownership of the buffer
    pub fn into_string(self) -> String {
        self.buffer
    }

    /// Clear the buffer and reset indentation
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.depth = 0;
    }

    /// Write one line at the current depth
    pub fn line(&mut self, text: impl AsRef<str>) {
        self.line_at(self.depth, text);
    }

    /// Write one line at an explicit depth
    pub fn line_at(&mut self, depth: usize, text: impl AsRef<str>) {
        let text = text.as_ref();
        if !text.is_empty() {
            self.buffer.extend(std::iter::repeat_n(' ', depth * self.indent_width));
            self.buffer.push_str(text);
        }
        self.buffer.push('\n');
    }

    pub fn blank(&mut self) {
        self.buffer.push('\n');
    }

    pub fn indent(&mut self) {
        self.depth += 1;
    }

    pub fn dedent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Write `header {` and indent
    pub fn open(&mut self, header: impl AsRef<str>) {
        let header = header.as_ref();
        if header.is_empty() {
            self.line("{");
        } else {
            self.line(format!("{header} {{"));
        }
        self.indent();
    }

    /// Dedent and write `}` followed by `suffix`
    pub fn close(&mut self, suffix: &str) {
        self.dedent();
        self.line(format!("}}{suffix}"));
    }

    /// Write a `//` comment, one line per input line
    pub fn comment(&mut self, text: &str) {
        for line in text.lines() {
            if line.is_empty() {
                self.line("//");
            } else {
                self.line(format!("// {line}"));
            }
        }
    }

    /// Append already formatted text verbatim
    pub fn raw(&mut self, text: &str) {
        self.buffer.push_str(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indentation() {
        let mut writer = SourceWriter::new(2);
        writer.open("struct IlBuilder");
        writer.line("void * _impl;");
        writer.close(";");
        assert_eq!(writer.as_str(), "struct IlBuilder {\n  void * _impl;\n};\n");
        assert_eq!(writer.depth(), 0);
    }

    #[test]
    fn test_blank_lines_carry_no_indentation() {
        let mut writer = SourceWriter::default();
        writer.indent();
        writer.line("");
        writer.blank();
        assert_eq!(writer.as_str(), "\n\n");
    }

    #[test]
    fn test_comment_and_dedent_saturates() {
        let mut writer = SourceWriter::default();
        writer.dedent();
        writer.comment("first\n\nsecond");
        assert_eq!(writer.into_string(), "// first\n//\n// second\n");
    }
}
