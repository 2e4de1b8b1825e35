// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

//! Turning the fields of one MovieLens line into a record ready to insert.

use crate::models::{movies::NewMovie, ratings::NewRating, users::NewUser};
use chrono::NaiveDate;
use config::TitleSuffix;
use std::borrow::Cow;
use thiserror::Error as DError;

pub const USER_FIELDS: usize = 5;
pub const MOVIE_FIELDS: usize = 5;
pub const RATING_FIELDS: usize = 4;

/// Length of the " (YEAR)" annotation at the end of a title
const YEAR_SUFFIX_LEN: usize = 7;
const RELEASE_DATE_FORMAT: &str = "%d-%b-%Y";

#[derive(Debug, Clone, PartialEq, Eq, DError)]
pub enum ParseError {
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("expected at least {expected} fields, found {found}")]
    TooFewFields { expected: usize, found: usize },

    #[error("{field} isn't an integer ({value:?})")]
    Integer { field: &'static str, value: String },

    #[error("release date {0:?} isn't formatted as DD-Mon-YYYY")]
    Date(String),
}

fn integer(field: &'static str, value: &str) -> Result<i32, ParseError> {
    value.parse().map_err(|_| ParseError::Integer {
        field,
        value: value.to_owned(),
    })
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_owned())
    }
}

/// Fields are UTF-8 when they can be, the MovieLens 100k files are Latin-1
pub fn decode_field(raw: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(raw) {
        Ok(field) => Cow::Borrowed(field),
        Err(_) => Cow::Owned(raw.iter().map(|&byte| char::from(byte)).collect()),
    }
}

/// Trailing whitespace (line endings included) is dropped before splitting,
/// so an empty line comes back as a single empty field
pub fn split_line(raw: &[u8], delimiter: u8) -> Vec<Cow<'_, str>> {
    let end = raw
        .iter()
        .rposition(|byte| !byte.is_ascii_whitespace())
        .map_or(0, |last| last + 1);

    raw[..end]
        .split(|&byte| byte == delimiter)
        .map(decode_field)
        .collect()
}

/// `user_id|age|gender|occupation|zipcode`, gender and occupation are dropped
pub fn parse_user(fields: &[&str]) -> Result<NewUser, ParseError> {
    match *fields {
        [id, age, _gender, _occupation, zipcode] => Ok(NewUser {
            id: integer("user_id", id)?,
            age: Some(integer("age", age)?),
            zipcode: Some(zipcode.to_owned()),
        }),

        _ => Err(ParseError::FieldCount {
            expected: USER_FIELDS,
            found: fields.len(),
        }),
    }
}

/// `movie_id|title (YEAR)|release_date|unused|imdb_url|...`
///
/// The store assigns movie ids, so the leading id is not kept. Everything
/// after the fifth field (the genre flags) is ignored.
pub fn parse_movie(fields: &[&str], suffix: TitleSuffix) -> Result<NewMovie, ParseError> {
    match *fields {
        [_id, title, released_at, _unused, imdb_url, ..] => Ok(NewMovie {
            title: strip_title(title, suffix).to_owned(),
            released_at: parse_release_date(released_at)?,
            imdb_url: non_empty(imdb_url),
        }),

        _ => Err(ParseError::TooFewFields {
            expected: MOVIE_FIELDS,
            found: fields.len(),
        }),
    }
}

/// `user_id\tmovie_id\tscore\ttimestamp`, the timestamp is never kept
pub fn parse_rating(fields: &[&str]) -> Result<NewRating, ParseError> {
    match *fields {
        [user_id, movie_id, score, _timestamp] => Ok(NewRating {
            user_id: integer("user_id", user_id)?,
            movie_id: integer("movie_id", movie_id)?,
            score: integer("score", score)?,
        }),

        _ => Err(ParseError::FieldCount {
            expected: RATING_FIELDS,
            found: fields.len(),
        }),
    }
}

pub fn strip_title(title: &str, suffix: TitleSuffix) -> &str {
    match suffix {
        TitleSuffix::Year => strip_year(title),
        TitleSuffix::FixedWidth => {
            let keep = title.chars().count().saturating_sub(YEAR_SUFFIX_LEN);
            match title.char_indices().nth(keep) {
                Some((end, _)) => &title[..end],
                None => title,
            }
        }
    }
}

fn strip_year(title: &str) -> &str {
    let bytes = title.as_bytes();

    let start = match bytes.len().checked_sub(YEAR_SUFFIX_LEN) {
        Some(start) => start,
        None => return title,
    };

    // The suffix is all ASCII, so `start` is on a char boundary when it matches
    match bytes[start..] {
        [b' ', b'(', a, b, c, d, b')'] if [a, b, c, d].iter().all(u8::is_ascii_digit) => {
            &title[..start]
        }
        _ => title,
    }
}

/// Empty means unknown, anything else must look like `01-Jan-1995`
pub fn parse_release_date(text: &str) -> Result<Option<NaiveDate>, ParseError> {
    if text.is_empty() {
        return Ok(None);
    }

    let well_shaped = match *text.as_bytes() {
        [d1, d2, b'-', m1, m2, m3, b'-', y1, y2, y3, y4] => {
            [d1, d2, y1, y2, y3, y4].iter().all(u8::is_ascii_digit)
                && [m1, m2, m3].iter().all(u8::is_ascii_alphabetic)
        }
        _ => false,
    };

    if !well_shaped {
        return Err(ParseError::Date(text.to_owned()));
    }

    NaiveDate::parse_from_str(text, RELEASE_DATE_FORMAT)
        .map(Some)
        .map_err(|_| ParseError::Date(text.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(line: &str, delimiter: char) -> Vec<&str> {
        line.split(delimiter).collect()
    }

    #[test]
    fn user_keeps_id_age_and_zipcode() -> Result<(), ParseError> {
        let user = parse_user(&fields("1|24|M|technician|85711", '|'))?;

        assert_eq!(
            user,
            NewUser {
                id: 1,
                age: Some(24),
                zipcode: Some("85711".into()),
            }
        );

        Ok(())
    }

    #[test]
    fn user_with_wrong_field_count() {
        let err = parse_user(&fields("1|24|M|85711", '|')).unwrap_err();
        assert_eq!(
            err,
            ParseError::FieldCount {
                expected: 5,
                found: 4
            }
        );

        let err = parse_user(&fields("1|24|M|technician|85711|extra", '|')).unwrap_err();
        assert_eq!(
            err,
            ParseError::FieldCount {
                expected: 5,
                found: 6
            }
        );
    }

    #[test]
    fn user_with_non_integer_age() {
        let err = parse_user(&fields("7|old|M|writer|10003", '|')).unwrap_err();
        assert_eq!(
            err,
            ParseError::Integer {
                field: "age",
                value: "old".into()
            }
        );
    }

    #[test]
    fn movie_from_full_line() -> Result<(), ParseError> {
        let line = "1|Toy Story (1995)|01-Jan-1995||http://us.imdb.com/M/title-exact?Toy%20Story%20(1995)|0|0|0|1|1|1|0|0|0|0|0|0|0|0|0|0|0|0|0";
        let movie = parse_movie(&fields(line, '|'), TitleSuffix::Year)?;

        assert_eq!(movie.title, "Toy Story");
        assert_eq!(movie.released_at, NaiveDate::from_ymd_opt(1995, 1, 1));
        assert_eq!(
            movie.imdb_url.as_deref(),
            Some("http://us.imdb.com/M/title-exact?Toy%20Story%20(1995)")
        );

        Ok(())
    }

    #[test]
    fn movie_without_release_date_or_url() -> Result<(), ParseError> {
        let movie = parse_movie(&fields("267|unknown||||0|0", '|'), TitleSuffix::Year)?;

        assert_eq!(movie.title, "unknown");
        assert_eq!(movie.released_at, None);
        assert_eq!(movie.imdb_url, None);

        Ok(())
    }

    #[test]
    fn movie_with_too_few_fields() {
        let err = parse_movie(&fields("1|Toy Story (1995)|01-Jan-1995", '|'), TitleSuffix::Year)
            .unwrap_err();

        assert_eq!(
            err,
            ParseError::TooFewFields {
                expected: 5,
                found: 3
            }
        );
    }

    #[test]
    fn year_suffix_only_removed_when_present() {
        let year = TitleSuffix::Year;

        assert_eq!(strip_title("Shawshank Redemption, The (1994)", year), "Shawshank Redemption, The");
        assert_eq!(strip_title("Heat", year), "Heat");
        assert_eq!(strip_title("", year), "");
        assert_eq!(strip_title("Brazil (film)", year), "Brazil (film)");
        assert_eq!(strip_title("Misérables, Les (1995)", year), "Misérables, Les");
        assert_eq!(strip_title("Nadja (1994) ", year), "Nadja (1994) ");
    }

    #[test]
    fn fixed_width_strip_matches_legacy_loads() {
        let fixed = TitleSuffix::FixedWidth;

        assert_eq!(strip_title("Toy Story (1995)", fixed), "Toy Story");
        assert_eq!(strip_title("Heat", fixed), "");
        assert_eq!(strip_title("Brazil (film)", fixed), "Brazil");
        assert_eq!(strip_title("Misérables, Les (1995)", fixed), "Misérables, Les");
    }

    #[test]
    fn release_dates() {
        assert_eq!(parse_release_date(""), Ok(None));
        assert_eq!(
            parse_release_date("01-Jan-1995"),
            Ok(NaiveDate::from_ymd_opt(1995, 1, 1))
        );
        assert_eq!(
            parse_release_date("14-Mar-1997"),
            Ok(NaiveDate::from_ymd_opt(1997, 3, 14))
        );

        for bad in &["1-Jan-1995", "01-January-1995", "1995-01-01", "32-Jan-1995", "01-Foo-1995"] {
            assert_eq!(parse_release_date(bad), Err(ParseError::Date(bad.to_string())));
        }
    }

    #[test]
    fn rating_drops_timestamp() -> Result<(), ParseError> {
        let rating = parse_rating(&fields("196\t242\t3\t881250949", '\t'))?;

        assert_eq!(
            rating,
            NewRating {
                user_id: 196,
                movie_id: 242,
                score: 3,
            }
        );

        Ok(())
    }

    #[test]
    fn rating_with_bad_fields() {
        let err = parse_rating(&fields("196\t242\t3", '\t')).unwrap_err();
        assert_eq!(
            err,
            ParseError::FieldCount {
                expected: 4,
                found: 3
            }
        );

        let err = parse_rating(&fields("196\t242\tfive\t881250949", '\t')).unwrap_err();
        assert_eq!(
            err,
            ParseError::Integer {
                field: "score",
                value: "five".into()
            }
        );
    }

    #[test]
    fn lines_are_right_trimmed_then_split() {
        assert_eq!(
            split_line(b"1|24|M|technician|85711 \r", b'|'),
            vec!["1", "24", "M", "technician", "85711"]
        );
        assert_eq!(split_line(b"196\t242\t3\t881250949\r", b'\t').len(), 4);
        assert_eq!(split_line(b"267|unknown||||0", b'|')[4], "");
        assert_eq!(split_line(b"", b'|'), vec![""]);
        assert_eq!(split_line(b"  \t", b'\t'), vec![""]);
    }

    #[test]
    fn blank_line_is_a_field_count_error() {
        let blank = split_line(b"", b'\t');
        let fields: Vec<&str> = blank.iter().map(|field| &**field).collect();

        assert_eq!(
            parse_rating(&fields),
            Err(ParseError::FieldCount {
                expected: 4,
                found: 1
            })
        );
    }

    #[test]
    fn latin1_fields_are_decoded() {
        assert_eq!(decode_field(b"Toy Story"), "Toy Story");
        assert_eq!(decode_field(b"Mis\xe9rables, Les"), "Misérables, Les");
    }
}
