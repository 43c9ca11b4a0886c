use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::domain::{BookQuery, PipelineError, ResolvedMetadata, non_empty};

/// An input line that could not be turned into a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    pub line: u64,
    pub reason: String,
}

/// A `#` comment line, kept so a rewrite can put it back in place
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentLine {
    /// Number of queries that precede the comment
    pub before: usize,
    pub text: String,
}

#[derive(Debug, Default)]
pub struct ParsedBookList {
    pub queries: Vec<BookQuery>,
    pub skipped: Vec<SkippedLine>,
    pub comments: Vec<CommentLine>,
}

/// Parse `author, title[, isbn]` lines.
///
/// Blank lines and `#` comments are ignored. A field may be double-quoted so
/// a title can contain commas; the quote must directly follow the comma.
pub fn parse_book_list(content: &[u8]) -> ParsedBookList {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(content);

    let mut parsed = ParsedBookList::default();
    let mut query_lines: Vec<u64> = Vec::new();

    for result in rdr.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or_default();
                parsed.skipped.push(SkippedLine {
                    line,
                    reason: format!("CSV parse error: {}", e),
                });
                continue;
            }
        };
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        if record.iter().all(str::is_empty) {
            continue;
        }

        match record.len() {
            2 | 3 => {
                let author = record.get(0).unwrap_or_default();
                let title = record.get(1).unwrap_or_default();
                if author.is_empty() || title.is_empty() {
                    parsed.skipped.push(SkippedLine {
                        line,
                        reason: "author and title must not be empty".to_string(),
                    });
                    continue;
                }

                let mut query = BookQuery::new(author, title);
                query.isbn = non_empty(record.get(2).map(str::to_string));
                parsed.queries.push(query);
                query_lines.push(line);
            }
            n => parsed.skipped.push(SkippedLine {
                line,
                reason: format!("expected 2 or 3 fields, found {}", n),
            }),
        }
    }

    parsed.comments = comment_lines(content)
        .map(|(line, text)| CommentLine {
            before: query_lines.partition_point(|&q| q < line),
            text,
        })
        .collect();

    parsed
}

/// 1-based line numbers and text of lines the csv reader treats as comments
fn comment_lines(content: &[u8]) -> impl Iterator<Item = (u64, String)> + '_ {
    content
        .split(|b| *b == b'\n')
        .enumerate()
        .filter(|(_, line)| line.first() == Some(&b'#'))
        .map(|(i, line)| {
            let text = String::from_utf8_lossy(line).trim_end().to_string();
            (i as u64 + 1, text)
        })
}

/// Rewrite the book list with discovered ISBNs so a re-run can look them up
/// directly. Comment lines stay where they were; skipped lines are dropped.
///
/// The list is written to `<name>.tmp` next to the input, then renamed over
/// it. The temporary file is removed if anything fails.
pub fn rewrite_book_list(
    path: &Path,
    list: &ParsedBookList,
    records: &[ResolvedMetadata],
) -> Result<(), PipelineError> {
    let tmp_path = temp_path_for(path)?;

    let result = write_book_list(&tmp_path, list, records)
        .and_then(|()| std::fs::rename(&tmp_path, path).map_err(|e| PipelineError::io(path, e)));
    if result.is_err()
        && tmp_path.exists()
        && let Err(e) = std::fs::remove_file(&tmp_path)
    {
        tracing::warn!("Failed to remove {}: {}", tmp_path.display(), e);
    }

    result
}

fn temp_path_for(path: &Path) -> Result<PathBuf, PipelineError> {
    let mut name = path
        .file_name()
        .ok_or_else(|| {
            PipelineError::io(path, io::Error::new(io::ErrorKind::InvalidInput, "not a file path"))
        })?
        .to_os_string();
    name.push(".tmp");
    Ok(path.with_file_name(name))
}

fn write_book_list(
    tmp_path: &Path,
    list: &ParsedBookList,
    records: &[ResolvedMetadata],
) -> Result<(), PipelineError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(tmp_path)?;
    let mut comments = list.comments.iter().peekable();

    for (index, (query, record)) in list.queries.iter().zip(records).enumerate() {
        while let Some(comment) = comments.next_if(|c| c.before <= index) {
            write_comment(&mut wtr, &comment.text).map_err(|e| PipelineError::io(tmp_path, e))?;
        }
        match record.isbn.as_deref().or(query.isbn.as_deref()) {
            Some(isbn) => wtr.write_record([query.author.as_str(), query.title.as_str(), isbn])?,
            None => wtr.write_record([query.author.as_str(), query.title.as_str()])?,
        }
    }
    for comment in comments {
        write_comment(&mut wtr, &comment.text).map_err(|e| PipelineError::io(tmp_path, e))?;
    }

    wtr.flush().map_err(|e| PipelineError::io(tmp_path, e))
}

// Comments bypass csv quoting, so pending records are flushed first
fn write_comment(wtr: &mut csv::Writer<File>, text: &str) -> io::Result<()> {
    wtr.flush()?;
    let mut out = wtr.get_ref();
    out.write_all(text.as_bytes())?;
    out.write_all(b"\n")
}
