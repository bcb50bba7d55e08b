use crate::Record;
use crate::error::{ErrorKind, Result};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use exn::ResultExt;

/// Header name of the first (group label) column.
pub const GROUP_COLUMN: &str = "Person";
/// Header name of the second (source path) column.
pub const PATH_COLUMN: &str = "Photo Path";

/// Serializes records into interchange text.
///
/// Emits the `Person,Photo Path` header (unquoted) and then one line per
/// record, in the order given. Both fields are always wrapped in double quotes
/// and any quote inside a field is doubled; nothing else is escaped, so commas
/// and line breaks survive inside the quotes untouched.
pub fn encode<'a>(records: impl IntoIterator<Item = &'a Record>) -> Result<String> {
    let mut out = format!("{GROUP_COLUMN},{PATH_COLUMN}\n").into_bytes();
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(&mut out);
    for record in records {
        writer.write_record([record.label.as_str(), record.path.as_str()]).or_raise(|| ErrorKind::Serialize)?;
    }
    writer.flush().or_raise(|| ErrorKind::Serialize)?;
    drop(writer);
    String::from_utf8(out).or_raise(|| ErrorKind::Serialize)
}
