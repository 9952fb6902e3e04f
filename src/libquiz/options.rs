//! Storage form of a multiple-choice option list.
//!
//! Options are joined with `,` into the single `options` column. There is no
//! escaping, so an option that itself contains a comma comes back split in two.
//! An empty list is stored as the empty string, which also means a list holding
//! only one empty option cannot be told apart from no options at all.

pub const SEPARATOR: &str = ",";

pub fn encode<S: AsRef<str>>(options: &[S]) -> String {
    options
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<&str>>()
        .join(SEPARATOR)
}

pub fn decode(column: &str) -> Vec<String> {
    if column.is_empty() {
        return Vec::new();
    }
    column.split(SEPARATOR).map(String::from).collect()
}
