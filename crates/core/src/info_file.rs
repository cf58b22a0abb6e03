//! Export a poster as an info text file in the bulk upload format.

use crate::bulk_upload::{needs_escape, DESCRIPTION_ESCAPE};
use crate::poster::PosterRecord;

/// Render the `Key: value` text that [`crate::bulk_upload::parse_info`] reads.
///
/// Description continuation lines that look like a key are escaped.
pub fn render_info_file(poster: &PosterRecord) -> String {
    [
        ("Name", poster.name.clone()),
        ("Description", escape_description(&poster.description)),
        ("Starring", poster.starring.clone()),
        ("Director", poster.director.clone()),
        ("Runtime", poster.runtime.clone()),
        ("Genre", poster.genre.clone()),
        ("Rating", poster.rating.clone()),
    ]
    .iter()
    .map(|(key, value)| format!("{key}: {value}"))
    .collect::<Vec<_>>()
    .join("\n")
}

fn escape_description(description: &str) -> String {
    description
        .lines()
        .enumerate()
        .map(|(i, line)| {
            if i > 0 && needs_escape(line) {
                format!("{DESCRIPTION_ESCAPE}{line}")
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `Blade Runner` -> `Blade_Runner_info.txt`.
pub fn info_file_name(name: &str) -> String {
    let stem = name.split_whitespace().collect::<Vec<_>>().join("_");
    format!("{stem}_info.txt")
}
