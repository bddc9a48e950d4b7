use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
};

use pcd_core::pointcloud::table::Table;

use super::{Parser, ParserProvider};
use crate::error::ParseError;

/// A line holding only this word ends the point list.
const END_MARKER: &str = "end";
const COMMENT: char = '#';

pub struct TextParserProvider {
    pub filename: PathBuf,
}

impl ParserProvider for TextParserProvider {
    fn get_parser(&self) -> Box<dyn Parser> {
        Box::new(TextParser {
            filename: self.filename.clone(),
        })
    }
}

/// Parser for whitespace-delimited numeric text, one point per line.
pub struct TextParser {
    pub filename: PathBuf,
}

impl Parser for TextParser {
    fn parse(&self) -> Result<Table, ParseError> {
        let start = std::time::Instant::now();
        let file = File::open(&self.filename).map_err(|source| ParseError::Io {
            path: self.filename.clone(),
            source,
        })?;
        let table = parse_reader(BufReader::new(file), &self.filename)?;
        log::debug!(
            "parsed {} rows x {} columns from {:?} in {:?}",
            table.len(),
            table.columns(),
            self.filename,
            start.elapsed()
        );
        Ok(table)
    }
}

/// Parses text read from `reader`. `path` is only used to label I/O errors.
pub fn parse_reader<R: BufRead>(reader: R, path: &Path) -> Result<Table, ParseError> {
    let mut builder = TableBuilder::default();
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| match source.kind() {
            io::ErrorKind::InvalidData => ParseError::InvalidText { line: index + 1 },
            _ => ParseError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;
        if builder.push_line(index + 1, &line)? == Flow::Stop {
            break;
        }
    }
    builder.finish()
}

pub fn parse_str(text: &str) -> Result<Table, ParseError> {
    let mut builder = TableBuilder::default();
    for (index, line) in text.lines().enumerate() {
        if builder.push_line(index + 1, line)? == Flow::Stop {
            break;
        }
    }
    builder.finish()
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

#[derive(Default)]
struct TableBuilder {
    values: Vec<f64>,
    columns: Option<usize>,
}

impl TableBuilder {
    fn push_line(&mut self, line_number: usize, line: &str) -> Result<Flow, ParseError> {
        let content = match line.find(COMMENT) {
            Some(index) => &line[..index],
            None => line,
        }
        .trim();

        if content.is_empty() {
            return Ok(Flow::Continue);
        }
        if content == END_MARKER {
            return Ok(Flow::Stop);
        }

        let start = self.values.len();
        for (index, token) in content.split_whitespace().enumerate() {
            let value = token
                .parse::<f64>()
                .map_err(|_| ParseError::InvalidNumber {
                    line: line_number,
                    column: index + 1,
                    token: token.to_string(),
                })?;
            self.values.push(value);
        }
        let found = self.values.len() - start;

        match self.columns {
            None => self.columns = Some(found),
            Some(expected) if expected != found => {
                return Err(ParseError::Ragged {
                    line: line_number,
                    expected,
                    found,
                })
            }
            Some(_) => {}
        }

        Ok(Flow::Continue)
    }

    fn finish(self) -> Result<Table, ParseError> {
        let columns = self.columns.ok_or(ParseError::Empty)?;
        Ok(Table::from_flat(self.values, columns)?)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;

    #[test]
    fn parses_rectangular_table() {
        let table = parse_str("1 2 3\n4 5 6\n").unwrap();
        assert_eq!(table.columns(), 3);
        assert_eq!(table.len(), 2);
        assert_eq!(table.row(0), Some(&[1.0, 2.0, 3.0][..]));
        assert_eq!(table.row(1), Some(&[4.0, 5.0, 6.0][..]));
    }

    #[test]
    fn accepts_mixed_whitespace_and_float_notation() {
        let table = parse_str("  1.5\t-2e3   +3.25e-1 \r\n.5 6. 7\n").unwrap();
        assert_eq!(table.row(0), Some(&[1.5, -2000.0, 0.325][..]));
        assert_eq!(table.row(1), Some(&[0.5, 6.0, 7.0][..]));
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let text = "# x y z\n\n1 2 3 # first\n   \n#4 5 6\n7 8 9\n";
        let table = parse_str(text).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.row(1), Some(&[7.0, 8.0, 9.0][..]));
    }

    #[test]
    fn end_marker_stops_reading() {
        let table = parse_str("1 2 3\nend\nnot numbers at all\n").unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn ragged_rows_report_the_line() {
        let err = parse_str("1 2 3\n# comment\n4 5\n").unwrap_err();
        match err {
            ParseError::Ragged {
                line,
                expected,
                found,
            } => {
                assert_eq!(line, 3);
                assert_eq!(expected, 3);
                assert_eq!(found, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_numeric_token_is_rejected() {
        let err = parse_str("1 2 3\n4 five 6\n").unwrap_err();
        match err {
            ParseError::InvalidNumber {
                line,
                column,
                token,
            } => {
                assert_eq!(line, 2);
                assert_eq!(column, 2);
                assert_eq!(token, "five");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn invalid_utf8_reports_the_line() {
        let bytes: &[u8] = b"1 2 3\n4 \xff 6\n";
        let err = parse_reader(bytes, Path::new("test.cloud")).unwrap_err();
        assert!(matches!(err, ParseError::InvalidText { line: 2 }));
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(parse_str(""), Err(ParseError::Empty)));
        assert!(matches!(parse_str("# only\n\n"), Err(ParseError::Empty)));
        assert!(matches!(parse_str("end\n1 2 3\n"), Err(ParseError::Empty)));
    }

    #[test]
    fn parses_file_through_provider() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "0 0 0").unwrap();
        writeln!(file, "1 1 1").unwrap();
        file.flush().unwrap();

        let provider = TextParserProvider {
            filename: file.path().to_path_buf(),
        };
        let table = provider.get_parser().parse().unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.columns(), 3);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let parser = TextParser {
            filename: dir.path().join("missing.cloud"),
        };
        assert!(matches!(parser.parse(), Err(ParseError::Io { .. })));
    }
}
