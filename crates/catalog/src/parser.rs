//! Parser for the goodbooks-10k CSV files.
//!
//! This module handles parsing the four source tables:
//! - books.csv: one row per book, header-addressed columns
//! - ratings.csv: user_id,book_id,rating
//! - tags.csv: tag_id,tag_name
//! - book_tags.csv: goodreads_book_id,tag_id,count (count is ignored)
//!
//! The files are plain RFC-4180-style CSV: fields may be quoted, quoted
//! fields may contain commas, and a doubled quote inside a quoted field is
//! a literal quote. Columns are resolved by header name so extra columns
//! (isbn, language_code, ...) are skipped without being declared.

use crate::error::{LoadError, Result};
use crate::types::*;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Read a file into lines, distinguishing "not found" from other I/O errors
fn read_lines(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            LoadError::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            LoadError::IoError(e)
        }
    })?;
    Ok(content.lines().map(|s| s.to_string()).collect())
}

/// Split one CSV record into fields, honoring quotes.
///
/// A doubled quote inside a quoted field produces a literal quote.
/// Records never span lines in this dataset.
fn split_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

/// Column positions resolved from a header row
struct Columns {
    file: String,
    index: HashMap<String, usize>,
}

impl Columns {
    fn from_header(file: &str, header: &str) -> Self {
        let index = split_record(header)
            .into_iter()
            .enumerate()
            .map(|(i, name)| (name.trim().to_string(), i))
            .collect();
        Self {
            file: file.to_string(),
            index,
        }
    }

    /// Position of a required column, or `MissingColumn`
    fn require(&self, column: &str) -> Result<usize> {
        self.index
            .get(column)
            .copied()
            .ok_or_else(|| LoadError::MissingColumn {
                file: self.file.clone(),
                column: column.to_string(),
            })
    }
}

/// Fetch a field from a split record with line context
fn field<'a>(record: &'a [String], idx: usize, file: &str, line: usize) -> Result<&'a str> {
    record
        .get(idx)
        .map(|s| s.trim())
        .ok_or_else(|| LoadError::ParseError {
            file: file.to_string(),
            line,
            reason: format!("record has only {} fields, need index {}", record.len(), idx),
        })
}

/// Parse a numeric field, reporting the offending value on failure
fn parse_num<T: std::str::FromStr>(value: &str, file: &str, line: usize, column: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e| LoadError::ParseError {
        file: file.to_string(),
        line,
        reason: format!("invalid {column} '{value}': {e}"),
    })
}

/// Publication years come in as "2004.0", "2004", "" or "-720.0" (BC).
/// Empty means unknown; anything non-numeric is a parse error.
fn parse_year(value: &str, file: &str, line: usize) -> Result<Option<i32>> {
    if value.is_empty() {
        return Ok(None);
    }
    let year: f64 = parse_num(value, file, line, "original_publication_year")?;
    Ok(Some(year as i32))
}

/// Parse books.csv
///
/// Required columns: book_id, goodreads_book_id, title, authors,
/// original_publication_year, average_rating, ratings_count,
/// work_text_reviews_count, image_url. Everything else is ignored.
pub fn parse_books(path: &Path) -> Result<Vec<Book>> {
    const FILE: &str = "books.csv";
    let lines = read_lines(path)?;
    let mut rows = lines.iter();

    let header = rows.next().ok_or_else(|| LoadError::ParseError {
        file: FILE.to_string(),
        line: 1,
        reason: "file is empty, expected a header row".to_string(),
    })?;
    let columns = Columns::from_header(FILE, header);

    let col_id = columns.require("book_id")?;
    let col_gr = columns.require("goodreads_book_id")?;
    let col_title = columns.require("title")?;
    let col_authors = columns.require("authors")?;
    let col_year = columns.require("original_publication_year")?;
    let col_avg = columns.require("average_rating")?;
    let col_count = columns.require("ratings_count")?;
    let col_reviews = columns.require("work_text_reviews_count")?;
    let col_image = columns.require("image_url")?;

    let mut books = Vec::new();
    for (idx, line) in rows.enumerate() {
        let line_no = idx + 2; // 1-based, after the header
        if line.trim().is_empty() {
            continue; // Skip empty lines
        }
        let record = split_record(line);

        let book = Book {
            id: parse_num(field(&record, col_id, FILE, line_no)?, FILE, line_no, "book_id")?,
            goodreads_id: parse_num(
                field(&record, col_gr, FILE, line_no)?,
                FILE,
                line_no,
                "goodreads_book_id",
            )?,
            title: field(&record, col_title, FILE, line_no)?.to_string(),
            authors: field(&record, col_authors, FILE, line_no)?.to_string(),
            original_publication_year: parse_year(
                field(&record, col_year, FILE, line_no)?,
                FILE,
                line_no,
            )?,
            average_rating: parse_num(
                field(&record, col_avg, FILE, line_no)?,
                FILE,
                line_no,
                "average_rating",
            )?,
            ratings_count: parse_num(
                field(&record, col_count, FILE, line_no)?,
                FILE,
                line_no,
                "ratings_count",
            )?,
            work_text_reviews_count: parse_num(
                field(&record, col_reviews, FILE, line_no)?,
                FILE,
                line_no,
                "work_text_reviews_count",
            )?,
            image_url: field(&record, col_image, FILE, line_no)?.to_string(),
        };

        books.push(book);
    }

    Ok(books)
}

/// Parse ratings.csv
///
/// Ratings are integers on the fixed 1..=5 scale; anything else is
/// rejected as `InvalidValue`.
pub fn parse_ratings(path: &Path) -> Result<Vec<Rating>> {
    const FILE: &str = "ratings.csv";
    let lines = read_lines(path)?;
    let mut rows = lines.iter();

    let header = rows.next().ok_or_else(|| LoadError::ParseError {
        file: FILE.to_string(),
        line: 1,
        reason: "file is empty, expected a header row".to_string(),
    })?;
    let columns = Columns::from_header(FILE, header);

    let col_user = columns.require("user_id")?;
    let col_book = columns.require("book_id")?;
    let col_rating = columns.require("rating")?;

    let mut ratings = Vec::new();
    for (idx, line) in rows.enumerate() {
        let line_no = idx + 2;
        if line.trim().is_empty() {
            continue;
        }
        let record = split_record(line);

        let value = field(&record, col_rating, FILE, line_no)?;
        let rating: u8 = parse_num(value, FILE, line_no, "rating")?;
        if !(1..=5).contains(&rating) {
            return Err(LoadError::InvalidValue {
                field: "rating".to_string(),
                value: value.to_string(),
            });
        }

        ratings.push(Rating {
            user_id: parse_num(field(&record, col_user, FILE, line_no)?, FILE, line_no, "user_id")?,
            book_id: parse_num(field(&record, col_book, FILE, line_no)?, FILE, line_no, "book_id")?,
            rating,
        });
    }

    Ok(ratings)
}

/// Parse tags.csv
pub fn parse_tags(path: &Path) -> Result<Vec<Tag>> {
    const FILE: &str = "tags.csv";
    let lines = read_lines(path)?;
    let mut rows = lines.iter();

    let header = rows.next().ok_or_else(|| LoadError::ParseError {
        file: FILE.to_string(),
        line: 1,
        reason: "file is empty, expected a header row".to_string(),
    })?;
    let columns = Columns::from_header(FILE, header);

    let col_id = columns.require("tag_id")?;
    let col_name = columns.require("tag_name")?;

    let mut tags = Vec::new();
    for (idx, line) in rows.enumerate() {
        let line_no = idx + 2;
        if line.trim().is_empty() {
            continue;
        }
        let record = split_record(line);

        tags.push(Tag {
            id: parse_num(field(&record, col_id, FILE, line_no)?, FILE, line_no, "tag_id")?,
            name: field(&record, col_name, FILE, line_no)?.to_string(),
        });
    }

    Ok(tags)
}

/// Parse book_tags.csv
///
/// The per-pair usage count column is present in the data but not loaded:
/// tag-bags are built from the set of tags, not the multiset.
pub fn parse_book_tags(path: &Path) -> Result<Vec<BookTagLink>> {
    const FILE: &str = "book_tags.csv";
    let lines = read_lines(path)?;
    let mut rows = lines.iter();

    let header = rows.next().ok_or_else(|| LoadError::ParseError {
        file: FILE.to_string(),
        line: 1,
        reason: "file is empty, expected a header row".to_string(),
    })?;
    let columns = Columns::from_header(FILE, header);

    let col_gr = columns.require("goodreads_book_id")?;
    let col_tag = columns.require("tag_id")?;

    let mut links = Vec::new();
    for (idx, line) in rows.enumerate() {
        let line_no = idx + 2;
        if line.trim().is_empty() {
            continue;
        }
        let record = split_record(line);

        links.push(BookTagLink {
            goodreads_id: parse_num(
                field(&record, col_gr, FILE, line_no)?,
                FILE,
                line_no,
                "goodreads_book_id",
            )?,
            tag_id: parse_num(field(&record, col_tag, FILE, line_no)?, FILE, line_no, "tag_id")?,
        });
    }

    Ok(links)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_split_record_plain() {
        assert_eq!(split_record("1,2,3"), vec!["1", "2", "3"]);
        assert_eq!(split_record("a,,c"), vec!["a", "", "c"]);
    }

    #[test]
    fn test_split_record_quoted() {
        assert_eq!(
            split_record(r#"1,"The Hobbit, or There and Back Again",Tolkien"#),
            vec!["1", "The Hobbit, or There and Back Again", "Tolkien"]
        );
        assert_eq!(
            split_record(r#""say ""hello""",x"#),
            vec![r#"say "hello""#, "x"]
        );
    }

    #[test]
    fn test_parse_year_variants() {
        assert_eq!(parse_year("2004.0", "t", 1).unwrap(), Some(2004));
        assert_eq!(parse_year("1997", "t", 1).unwrap(), Some(1997));
        assert_eq!(parse_year("", "t", 1).unwrap(), None);
        assert!(parse_year("n/a", "t", 1).is_err());
    }

    fn write_temp(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_parse_books_resolves_columns_by_name() {
        let path = write_temp(
            "catalog_test_books.csv",
            "book_id,goodreads_book_id,isbn,title,authors,original_publication_year,average_rating,ratings_count,work_text_reviews_count,image_url\n\
             1,2767052,439023483,\"The Hunger Games\",\"Suzanne Collins\",2008.0,4.34,4780653,155254,https://images.example/1.jpg\n",
        );
        let books = parse_books(&path).unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].id, 1);
        assert_eq!(books[0].goodreads_id, 2767052);
        assert_eq!(books[0].title, "The Hunger Games");
        assert_eq!(books[0].original_publication_year, Some(2008));
        assert_eq!(books[0].ratings_count, 4780653);
    }

    #[test]
    fn test_parse_books_missing_column() {
        let path = write_temp(
            "catalog_test_books_bad.csv",
            "book_id,title\n1,Something\n",
        );
        let err = parse_books(&path).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn { .. }));
    }

    #[test]
    fn test_parse_ratings_rejects_out_of_scale() {
        let path = write_temp(
            "catalog_test_ratings_bad.csv",
            "user_id,book_id,rating\n1,1,6\n",
        );
        let err = parse_ratings(&path).unwrap_err();
        assert!(matches!(err, LoadError::InvalidValue { .. }));
    }

    #[test]
    fn test_parse_ratings() {
        let path = write_temp(
            "catalog_test_ratings.csv",
            "user_id,book_id,rating\n1,258,5\n2,4081,4\n",
        );
        let ratings = parse_ratings(&path).unwrap();
        assert_eq!(ratings.len(), 2);
        assert_eq!(ratings[0].user_id, 1);
        assert_eq!(ratings[0].book_id, 258);
        assert_eq!(ratings[0].rating, 5);
    }

    #[test]
    fn test_missing_file() {
        let err = parse_tags(Path::new("/nonexistent/tags.csv")).unwrap_err();
        assert!(matches!(err, LoadError::FileNotFound { .. }));
    }
}
