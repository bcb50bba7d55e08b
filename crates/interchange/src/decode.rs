use crate::Record;

/// The outcome of decoding interchange text.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Decoded {
    /// Complete records, in file order.
    pub records: Vec<Record>,
    /// Non-blank lines that were discarded because a field came out empty.
    pub dropped: usize,
}

/// Parses interchange text back into records.
///
/// The first line is the header and is skipped without inspection. Every
/// following non-blank line contributes two fields, each either quoted
/// (doubled quotes unescape to one) or bare (read verbatim up to the next
/// comma or line end). Anything after the second field is ignored. Records
/// with an empty label or path are dropped and counted, never raised.
///
/// A quoted field may span line breaks, but only when its closing quote is
/// properly followed by a comma or a line end. Otherwise the field is
/// treated as malformed and confined to its own physical line, so a stray
/// quote cannot swallow the lines after it.
pub fn decode(text: &str) -> Decoded {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut scanner = Scanner { text, pos: 0 };
    scanner.skip_line();

    let mut decoded = Decoded::default();
    while let Some((label, path)) = scanner.next_row() {
        let record = Record { label, path };
        if record.is_complete() {
            decoded.records.push(record);
        } else {
            tracing::trace!(label = %record.label, path = %record.path, "Dropping incomplete interchange line");
            decoded.dropped += 1;
        }
    }
    decoded
}

struct Scanner<'a> {
    text: &'a str,
    pos: usize,
}
impl<'a> Scanner<'a> {
    fn rest(&self) -> &'a str {
        let text = self.text;
        &text[self.pos..]
    }

    fn at_line_end(&self) -> bool {
        let rest = self.rest();
        rest.is_empty() || rest.starts_with('\n') || rest.starts_with("\r\n") || rest == "\r"
    }

    /// Moves past the next line break (or to the end of input).
    fn skip_line(&mut self) {
        self.pos = match self.rest().find('\n') {
            Some(offset) => self.pos + offset + 1,
            None => self.text.len(),
        };
    }

    fn next_row(&mut self) -> Option<(String, String)> {
        while self.pos < self.text.len() && self.at_line_end() {
            self.skip_line();
        }
        if self.pos >= self.text.len() {
            return None;
        }
        let label = self.field();
        let path = self.field();
        self.skip_line();
        Some((label, path))
    }

    fn field(&mut self) -> String {
        if self.at_line_end() {
            return String::new();
        }
        let field = match self.rest().starts_with('"') {
            true => self.quoted(),
            false => self.bare(),
        };
        if self.rest().starts_with(',') {
            self.pos += 1;
        }
        field
    }

    fn bare(&mut self) -> String {
        let rest = self.rest();
        let end = rest.find([',', '\n']).unwrap_or(rest.len());
        let mut field = &rest[..end];
        if !rest[end..].starts_with(',') {
            field = field.strip_suffix('\r').unwrap_or(field);
        }
        self.pos += field.len();
        field.to_string()
    }

    fn quoted(&mut self) -> String {
        let start = self.pos + 1;
        let text = self.text;
        let rest = &text[start..];
        if let Some(end) = closing_quote(rest)
            && is_field_boundary(&rest[end + 1..])
        {
            self.pos = start + end + 1;
            return unescape(&rest[..end]);
        }
        // Malformed: stay on this physical line.
        let line = &rest[..rest.find('\n').unwrap_or(rest.len())];
        match closing_quote(line) {
            Some(end) => {
                self.pos = start + end + 1;
                unescape(&line[..end])
            },
            None => {
                let line = line.strip_suffix('\r').unwrap_or(line);
                self.pos = start + line.len();
                unescape(line)
            },
        }
    }
}

/// Byte offset of the first quote that is not part of a doubled pair.
fn closing_quote(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'"' {
            if bytes.get(i + 1) == Some(&b'"') {
                i += 2;
                continue;
            }
            return Some(i);
        }
        i += 1;
    }
    None
}

fn is_field_boundary(after: &str) -> bool {
    after.is_empty() || after.starts_with([',', '\n']) || after.starts_with("\r\n") || after == "\r"
}

fn unescape(s: &str) -> String {
    s.replace("\"\"", "\"")
}
