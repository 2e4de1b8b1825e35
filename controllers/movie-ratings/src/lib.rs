// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

pub mod backend;
pub mod error;
pub mod loader;
pub mod models;
pub mod progress;
pub mod records;
pub mod schema;

pub use backend::{DbConnection, IdSequence, SchemaSetup};
pub use error::ErrorKind;
pub use loader::{
    create_user, load_movies, load_movies_from, load_ratings, load_ratings_from, load_users,
    load_users_from, reconcile_user_sequence, seed, LoadSummary, SeedSummary,
};
pub use progress::{LogProgress, Progress, Silent};

use diesel::prelude::*;

pub type Result<T> = std::result::Result<T, ErrorKind>;

pub fn establish_connection(url: &str) -> Result<DbConnection> {
    Ok(DbConnection::establish(url)?)
}
