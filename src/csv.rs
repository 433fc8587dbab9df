//! CSV interchange codec
//!
//! Exports the collection as comma-separated rows with double-quote
//! escaping, and parses the same dialect back: `"` toggles quote state,
//! a doubled `""` inside quotes is a literal quote, `,` outside quotes
//! ends the field, and every field is trimmed on flush. Tags are a
//! multi-valued field using `;` inside one column. A document missing
//! the required columns is rejected whole; malformed rows are counted
//! and skipped without aborting the rest of the import.

use chrono::{DateTime, Local, LocalResult, NaiveDate, TimeZone, Utc};
use tracing::warn;

use crate::error::LibraryError;
use crate::models::{Prompt, DEFAULT_TAG, FAVORITE_TAG};

/// The fixed header row. `Title` and `Prompt Text` are required on
/// import; the rest default when absent.
pub const CSV_HEADER: &str = "Title,Tags,Prompt Text,Is Favorite,Created Date,Modified Date";

/// Counts reported by a finished import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
}

impl ImportReport {
    pub fn summary(&self) -> String {
        format!("Imported: {}, Skipped: {}", self.imported, self.skipped)
    }
}

/// One row of an import after field decoding, before the library
/// assigns an id and registers tags.
#[derive(Debug, Clone)]
pub(crate) struct ImportedRow {
    pub title: String,
    pub text: String,
    pub tags: Vec<String>,
    pub is_favorite: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Serialize the collection. The header comes first, then one row per
/// prompt in collection order; no trailing newline.
pub fn export_csv(prompts: &[Prompt]) -> String {
    let mut out = String::from(CSV_HEADER);
    for prompt in prompts {
        out.push('\n');
        out.push_str(&export_row(prompt));
    }
    out
}

fn export_row(prompt: &Prompt) -> String {
    format!(
        "{},{},{},{},{},{}",
        quote(&prompt.title),
        quote(&prompt.tags.join("; ")),
        quote(&prompt.text),
        if prompt.is_favorite { "Yes" } else { "No" },
        prompt.created_at.map(format_date).unwrap_or_default(),
        prompt.updated_at.map(format_date).unwrap_or_default(),
    )
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Split one line into fields, honoring double-quote escaping. Fields
/// are trimmed as they are flushed.
pub fn parse_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                if in_quotes && chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }

    fields.push(current.trim().to_string());
    fields
}

/// Parse a whole CSV document into decoded rows plus the count of rows
/// skipped for being malformed.
///
/// Rejects the document before looking at any data row when `Title` or
/// `Prompt Text` is not among the headers. A data row is skipped when
/// it has fewer fields than the header or either required value is
/// empty. `now` fills in for absent or unparseable dates.
pub(crate) fn parse_import(
    text: &str,
    now: i64,
) -> Result<(Vec<ImportedRow>, usize), LibraryError> {
    let mut lines = text.split('\n');
    let headers = parse_csv_line(lines.next().unwrap_or_default());

    let column = |name: &str| headers.iter().position(|h| h == name);
    let (title_col, text_col) = match (column("Title"), column("Prompt Text")) {
        (Some(t), Some(x)) => (t, x),
        _ => {
            return Err(LibraryError::CsvFormat(
                "missing required Title or Prompt Text column".to_string(),
            ))
        }
    };
    let tags_col = column("Tags");
    let favorite_col = column("Is Favorite");
    let created_col = column("Created Date");
    let modified_col = column("Modified Date");

    let mut rows = Vec::new();
    let mut skipped = 0;

    for (line_no, line) in lines.enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let fields = parse_csv_line(line);
        if fields.len() < headers.len() {
            warn!(line = line_no + 2, "row has too few fields, skipping");
            skipped += 1;
            continue;
        }

        let field = |col: Option<usize>| col.and_then(|i| fields.get(i)).map(String::as_str);
        let title = field(Some(title_col)).unwrap_or_default();
        let text = field(Some(text_col)).unwrap_or_default();
        if title.is_empty() || text.is_empty() {
            warn!(line = line_no + 2, "row is missing title or text, skipping");
            skipped += 1;
            continue;
        }

        let tags = match field(tags_col) {
            None | Some("") => vec![DEFAULT_TAG.to_string()],
            Some(raw) => raw
                .split(';')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
        };
        let is_favorite = field(favorite_col)
            .map(|v| v.eq_ignore_ascii_case("yes"))
            .unwrap_or(false)
            || tags.iter().any(|t| t == FAVORITE_TAG);

        rows.push(ImportedRow {
            title: title.to_string(),
            text: text.to_string(),
            tags,
            is_favorite,
            created_at: field(created_col).and_then(parse_date).unwrap_or(now),
            updated_at: field(modified_col).and_then(parse_date).unwrap_or(now),
        });
    }

    Ok((rows, skipped))
}

// Local date rendering, M/D/YYYY without padding, matching what the
// export has always produced.
fn format_date(ms: i64) -> String {
    match Local.timestamp_millis_opt(ms) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => {
            dt.format("%-m/%-d/%Y").to_string()
        }
        LocalResult::None => String::new(),
    }
}

fn parse_date(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp_millis());
    }

    for format in ["%m/%d/%Y", "%m/%d/%y", "%Y-%m-%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            let midnight = date.and_hms_opt(0, 0, 0)?;
            return Local
                .from_local_datetime(&midnight)
                .earliest()
                .map(|dt| dt.timestamp_millis());
        }
    }
    None
}

/// A ready-to-edit example document, unchanged from the one earlier
/// releases offered for download.
pub fn csv_template() -> String {
    [
        CSV_HEADER,
        r#""Example Writing Prompt","Writing; Creative","Write a compelling story about...",No,1/1/2024,1/1/2024"#,
        r#""Code Review Checklist","Coding; Business","Please review this code for...",Yes,1/1/2024,1/1/2024"#,
        r#""Research Assistant","Research; General","Help me research the topic of...",No,1/1/2024,1/1/2024"#,
    ]
    .join("\n")
}

/// Dated default name for an exported file.
pub fn export_file_name() -> String {
    format!("prompt-box-export-{}.csv", Utc::now().format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt(title: &str, text: &str, tags: &[&str], favorite: bool) -> Prompt {
        Prompt {
            id: 1,
            title: title.to_string(),
            text: text.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            is_favorite: favorite,
            created_at: None,
            updated_at: None,
            category: None,
        }
    }

    #[test]
    fn test_parse_line_plain_fields() {
        assert_eq!(parse_csv_line("a,b,c"), vec!["a", "b", "c"]);
        assert_eq!(parse_csv_line("a, b ,c "), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parse_line_quoted_fields() {
        assert_eq!(
            parse_csv_line(r#""hello, world",plain"#),
            vec!["hello, world", "plain"]
        );
        assert_eq!(
            parse_csv_line(r#""she said ""hi""",x"#),
            vec![r#"she said "hi""#, "x"]
        );
        assert_eq!(parse_csv_line(""), vec![""]);
    }

    #[test]
    fn test_export_row_shape() {
        let p = prompt("My \"Best\" Prompt", "Do X, then Y", &["Writing", "Creative"], true);
        let csv = export_csv(&[p]);
        let mut lines = csv.lines();

        assert_eq!(lines.next().unwrap(), CSV_HEADER);
        assert_eq!(
            lines.next().unwrap(),
            r#""My ""Best"" Prompt","Writing; Creative","Do X, then Y",Yes,,"#
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_import_missing_required_column_rejects_document() {
        let text = "Title,Tags,Is Favorite\n\"A\",\"General\",No";
        let err = parse_import(text, 0).unwrap_err();
        assert!(matches!(err, LibraryError::CsvFormat(_)));
    }

    #[test]
    fn test_import_skips_malformed_rows_but_continues() {
        let text = [
            CSV_HEADER,
            r#""Good","Writing","Body",No,,"#,
            r#""Too,short"#,
            r#""","General","No title here",No,,"#,
            "",
            r#""Also good","","Second body",no,,"#,
        ]
        .join("\n");

        let (rows, skipped) = parse_import(&text, 5).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(skipped, 2);
        assert_eq!(rows[0].title, "Good");
        // An empty Tags field defaults to General.
        assert_eq!(rows[1].tags, vec![DEFAULT_TAG]);
    }

    #[test]
    fn test_import_favorite_from_flag_or_tag() {
        let text = [
            CSV_HEADER,
            r#""A","Writing; Research","Do X",Yes,1/1/2024,1/1/2024"#,
            r#""B","Favorite","Do Y",No,,"#,
            r#""C","Coding","Do Z",No,,"#,
        ]
        .join("\n");

        let (rows, skipped) = parse_import(&text, 0).unwrap();
        assert_eq!(skipped, 0);
        assert_eq!(rows[0].tags, vec!["Writing", "Research"]);
        assert!(rows[0].is_favorite);
        assert!(rows[1].is_favorite);
        assert!(!rows[2].is_favorite);
    }

    #[test]
    fn test_import_dates_default_to_now_when_unparseable() {
        let text = [CSV_HEADER, r#""A","General","Body",No,not a date,"#].join("\n");

        let (rows, _) = parse_import(&text, 777).unwrap();
        assert_eq!(rows[0].created_at, 777);
        assert_eq!(rows[0].updated_at, 777);
    }

    #[test]
    fn test_import_separator_only_tags_field_yields_no_tags() {
        let text = [CSV_HEADER, r#""A","; ;","Body",No,,"#].join("\n");

        let (rows, _) = parse_import(&text, 0).unwrap();
        assert!(rows[0].tags.is_empty());
    }

    #[test]
    fn test_date_roundtrip_through_export_format() {
        let ms = parse_date("1/1/2024").unwrap();
        assert_eq!(format_date(ms), "1/1/2024");
        assert_eq!(parse_date(""), None);
        assert!(parse_date("2024-03-05").is_some());
    }

    #[test]
    fn test_export_then_import_preserves_content() {
        let prompts = vec![
            prompt("Plain", "Body text", &["General"], false),
            prompt("Commas, quotes \"\"", "Line with, commas", &["Writing", "Creative"], false),
            prompt("Starred", "Fav body", &["Coding", FAVORITE_TAG], true),
        ];

        let (rows, skipped) = parse_import(&export_csv(&prompts), 0).unwrap();
        assert_eq!(skipped, 0);
        assert_eq!(rows.len(), prompts.len());
        for (row, original) in rows.iter().zip(&prompts) {
            assert_eq!(row.title, original.title);
            assert_eq!(row.text, original.text);
            assert_eq!(row.tags, original.tags);
            assert_eq!(row.is_favorite, original.is_favorite);
        }
    }

    #[test]
    fn test_template_parses_with_own_parser() {
        let (rows, skipped) = parse_import(&csv_template(), 0).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(skipped, 0);
        assert!(rows[1].is_favorite);
    }

    #[test]
    fn test_export_file_name_shape() {
        let name = export_file_name();
        assert!(name.starts_with("prompt-box-export-"));
        assert!(name.ends_with(".csv"));
    }
}
