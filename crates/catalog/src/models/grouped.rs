use facesort_interchange::Record;

/// One `(label, path)` row of the grouped records query.
///
/// Both columns are nullable as far as SQLite is concerned: a tag can be
/// stored as NULL by hand, and the path comes through a join.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct GroupedRow {
    label: Option<String>,
    path: Option<String>,
}
impl GroupedRow {
    /// Rows with a missing label or path are skipped, not raised.
    pub(crate) fn into_record(self) -> Option<Record> {
        Some(Record::new(self.label?, self.path?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_to_record() {
        let row = GroupedRow { label: Some("Alice".to_string()), path: Some("C:/p/a.jpg".to_string()) };
        assert_eq!(row.into_record(), Some(Record::new("Alice", "C:/p/a.jpg")));
    }

    #[test]
    fn test_null_columns_are_skipped() {
        assert_eq!(GroupedRow { label: None, path: Some("a.jpg".to_string()) }.into_record(), None);
        assert_eq!(GroupedRow { label: Some("Alice".to_string()), path: None }.into_record(), None);
    }
}
