// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use crate::records::ParseError;
use thiserror::Error as DError;

#[derive(Debug, DError)]
pub enum ErrorKind {
    #[error("Malformed record at line {line}: {source}")]
    Format {
        line: u64,
        #[source]
        source: ParseError,
    },

    #[error("Rating at line {line} references a missing user({user_id}) or movie({movie_id})")]
    OrphanRating {
        line: u64,
        user_id: i32,
        movie_id: i32,
    },

    #[error("Table {0} is empty, nothing to reconcile")]
    EmptyTable(&'static str),

    #[error("Identifier sequence of {0} can't go past i32::MAX")]
    SequenceExhausted(&'static str),

    #[error("Database error: {0}")]
    Persistence(#[from] diesel::result::Error),

    #[error("Couldn't connect to the database: {0}")]
    Connection(#[from] diesel::ConnectionError),

    #[error("Couldn't read input: {0}")]
    Io(#[from] std::io::Error),
}

impl ErrorKind {
    pub fn is_format(&self) -> bool {
        matches!(self, ErrorKind::Format { .. })
    }
}
