// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

//! Seeding the database from the MovieLens 100k files.
//!
//! Every load reads its file sequentially, stages the parsed rows and commits
//! them in batches of `commit_every` rows (one commit for the whole file when
//! it's not set). A malformed line stops the load right there: batches that
//! were already committed stay, staged rows are dropped.

use crate::backend::{DbConnection, IdSequence, SchemaSetup};
use crate::error::ErrorKind;
use crate::models::{
    movies::NewMovie,
    ratings::NewRating,
    users::{NewAccount, NewUser, User},
};
use crate::progress::Progress;
use crate::records::{self, ParseError};
use crate::schema::{movies, ratings, users};
use crate::Result;
use config::{Config, MoviesConfig, OrphanPolicy, RatingsConfig, UsersConfig};
use diesel::dsl::max;
use diesel::{delete, insert_into, prelude::*};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::num::{NonZeroU64, NonZeroUsize};
use std::path::Path;

/// Upper bound of rows sent in a single INSERT statement
pub const INSERT_CHUNK: usize = 500;

const PIPE: u8 = b'|';
const TAB: u8 = b'\t';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    pub table: &'static str,
    pub read: u64,
    pub inserted: u64,
    pub skipped: u64,
    pub commits: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: LoadSummary,
    pub movies: LoadSummary,
    pub ratings: LoadSummary,
    pub next_user_id: i32,
}

trait Staged: Sized {
    const TABLE: &'static str;

    fn clear(conn: &mut DbConnection) -> QueryResult<usize>;

    fn insert_all(conn: &mut DbConnection, rows: &[Self]) -> QueryResult<usize>;
}

impl Staged for NewUser {
    const TABLE: &'static str = "users";

    fn clear(conn: &mut DbConnection) -> QueryResult<usize> {
        delete(users::table).execute(conn)
    }

    fn insert_all(conn: &mut DbConnection, rows: &[Self]) -> QueryResult<usize> {
        insert_into(users::table).values(rows).execute(conn)
    }
}

impl Staged for NewMovie {
    const TABLE: &'static str = "movies";

    fn clear(conn: &mut DbConnection) -> QueryResult<usize> {
        delete(movies::table).execute(conn)
    }

    fn insert_all(conn: &mut DbConnection, rows: &[Self]) -> QueryResult<usize> {
        insert_into(movies::table).values(rows).execute(conn)
    }
}

impl Staged for NewRating {
    const TABLE: &'static str = "ratings";

    fn clear(conn: &mut DbConnection) -> QueryResult<usize> {
        delete(ratings::table).execute(conn)
    }

    fn insert_all(conn: &mut DbConnection, rows: &[Self]) -> QueryResult<usize> {
        insert_into(ratings::table).values(rows).execute(conn)
    }
}

#[derive(Debug, Clone, Copy)]
struct Plan {
    commit_every: Option<NonZeroUsize>,
    progress_every: Option<NonZeroU64>,
    clear: bool,
}

/// Rows staged but not committed yet
struct Batch<T> {
    rows: Vec<T>,
    commit_every: Option<NonZeroUsize>,
    clear_pending: bool,
    inserted: u64,
    commits: u64,
}

impl<T: Staged> Batch<T> {
    fn new(plan: &Plan) -> Self {
        let capacity = plan.commit_every.map_or(0, NonZeroUsize::get);

        Self {
            rows: Vec::with_capacity(capacity),
            commit_every: plan.commit_every,
            clear_pending: plan.clear,
            inserted: 0,
            commits: 0,
        }
    }

    fn stage(&mut self, conn: &mut DbConnection, row: T) -> Result<()> {
        self.rows.push(row);

        if let Some(every) = self.commit_every {
            if self.rows.len() >= every.get() {
                self.commit(conn)?;
            }
        }

        Ok(())
    }

    // The clear goes in the same transaction as the first rows
    fn commit(&mut self, conn: &mut DbConnection) -> Result<()> {
        if self.rows.is_empty() && !self.clear_pending {
            return Ok(());
        }

        let clear = self.clear_pending;
        let rows = &self.rows;

        conn.transaction::<_, ErrorKind, _>(|conn| {
            if clear {
                let removed = T::clear(conn)?;
                log::debug!("Cleared {} rows from {}", removed, T::TABLE);
            }

            for chunk in rows.chunks(INSERT_CHUNK) {
                T::insert_all(conn, chunk)?;
            }

            Ok(())
        })?;

        self.clear_pending = false;
        self.inserted += self.rows.len() as u64;
        self.commits += 1;
        self.rows.clear();

        Ok(())
    }
}

fn format_error(line: u64) -> impl FnOnce(ParseError) -> ErrorKind {
    move |source| ErrorKind::Format { line, source }
}

fn open(path: &Path) -> Result<File> {
    log::info!("Reading {}", path.display());
    Ok(File::open(path)?)
}

fn load<T, R, P>(
    conn: &mut DbConnection,
    source: R,
    delimiter: u8,
    plan: Plan,
    progress: &mut dyn Progress,
    mut parse: P,
) -> Result<LoadSummary>
where
    T: Staged,
    R: Read,
    P: FnMut(u64, &[&str]) -> Result<Option<T>>,
{
    let mut batch = Batch::<T>::new(&plan);
    let mut read = 0;
    let mut skipped = 0;

    // Every line is a record, a blank one included
    for raw in BufReader::new(source).split(b'\n') {
        let raw = raw?;
        read += 1;
        let line = read;

        let decoded = records::split_line(&raw, delimiter);
        let fields: Vec<&str> = decoded.iter().map(|field| &**field).collect();

        match parse(line, &fields)? {
            Some(row) => batch.stage(conn, row)?,
            None => skipped += 1,
        }

        if let Some(every) = plan.progress_every {
            if read % every.get() == 0 {
                progress.tick(T::TABLE, read);
            }
        }
    }

    batch.commit(conn)?;

    let summary = LoadSummary {
        table: T::TABLE,
        read,
        inserted: batch.inserted,
        skipped,
        commits: batch.commits,
    };

    progress.finish(&summary);
    Ok(summary)
}

pub fn load_users(
    conn: &mut DbConnection,
    config: &UsersConfig,
    progress: &mut dyn Progress,
) -> Result<LoadSummary> {
    let file = open(&config.path)?;
    load_users_from(conn, file, config, progress)
}

/// Replaces every stored user with the ones in `source`
pub fn load_users_from<R: Read>(
    conn: &mut DbConnection,
    source: R,
    config: &UsersConfig,
    progress: &mut dyn Progress,
) -> Result<LoadSummary> {
    let plan = Plan {
        commit_every: config.commit_every,
        progress_every: config.progress_every,
        clear: true,
    };

    load(conn, source, PIPE, plan, progress, |line, fields| {
        let user = records::parse_user(fields).map_err(format_error(line))?;
        Ok(Some(user))
    })
}

pub fn load_movies(
    conn: &mut DbConnection,
    config: &MoviesConfig,
    progress: &mut dyn Progress,
) -> Result<LoadSummary> {
    let file = open(&config.path)?;
    load_movies_from(conn, file, config, progress)
}

/// Appends the movies in `source` unless `clear` is set
pub fn load_movies_from<R: Read>(
    conn: &mut DbConnection,
    source: R,
    config: &MoviesConfig,
    progress: &mut dyn Progress,
) -> Result<LoadSummary> {
    let plan = Plan {
        commit_every: config.commit_every,
        progress_every: config.progress_every,
        clear: config.clear,
    };
    let suffix = config.title_suffix;

    load(conn, source, PIPE, plan, progress, |line, fields| {
        let movie = records::parse_movie(fields, suffix).map_err(format_error(line))?;
        Ok(Some(movie))
    })
}

pub fn load_ratings(
    conn: &mut DbConnection,
    config: &RatingsConfig,
    progress: &mut dyn Progress,
) -> Result<LoadSummary> {
    let file = open(&config.path)?;
    load_ratings_from(conn, file, config, progress)
}

/// Appends the ratings in `source` unless `clear` is set
pub fn load_ratings_from<R: Read>(
    conn: &mut DbConnection,
    source: R,
    config: &RatingsConfig,
    progress: &mut dyn Progress,
) -> Result<LoadSummary> {
    let plan = Plan {
        commit_every: config.commit_every,
        progress_every: config.progress_every,
        clear: config.clear,
    };
    let policy = config.orphans;

    let known = match policy {
        OrphanPolicy::Allow => None,
        OrphanPolicy::Skip | OrphanPolicy::Reject => Some(KnownIds::fetch(conn)?),
    };

    load(conn, source, TAB, plan, progress, move |line, fields| {
        let rating = records::parse_rating(fields).map_err(format_error(line))?;

        match &known {
            Some(known) if !known.contains(&rating) => {
                if policy == OrphanPolicy::Reject {
                    return Err(ErrorKind::OrphanRating {
                        line,
                        user_id: rating.user_id,
                        movie_id: rating.movie_id,
                    });
                }

                log::debug!("Skipping orphan rating at line {}", line);
                Ok(None)
            }

            _ => Ok(Some(rating)),
        }
    })
}

/// Ids present in the store when the ratings load starts
struct KnownIds {
    users: HashSet<i32>,
    movies: HashSet<i32>,
}

impl KnownIds {
    fn fetch(conn: &mut DbConnection) -> QueryResult<Self> {
        let users = users::table.select(users::id).load::<i32>(conn)?;
        let movies = movies::table.select(movies::id).load::<i32>(conn)?;

        Ok(Self {
            users: users.into_iter().collect(),
            movies: movies.into_iter().collect(),
        })
    }

    fn contains(&self, rating: &NewRating) -> bool {
        self.users.contains(&rating.user_id) && self.movies.contains(&rating.movie_id)
    }
}

/// Moves the user id sequence past the ids that came from the seed file,
/// returns the id the next created user will get. Only meaningful after a
/// non-empty user load, an empty table is an error.
pub fn reconcile_user_sequence(conn: &mut DbConnection) -> Result<i32> {
    let max_id: Option<i32> = users::table.select(max(users::id)).first(conn)?;
    let next = max_id
        .ok_or(ErrorKind::EmptyTable(NewUser::TABLE))?
        .checked_add(1)
        .ok_or(ErrorKind::SequenceExhausted(NewUser::TABLE))?;

    conn.advance_sequence(NewUser::TABLE, next)?;
    log::info!("Next user id will be {}", next);

    Ok(next)
}

/// Create a user with a store-assigned id
pub fn create_user(conn: &mut DbConnection, account: &NewAccount<'_>) -> Result<User> {
    let user = insert_into(users::table)
        .values(account)
        .get_result(conn)?;

    Ok(user)
}

/// Create the tables, load users, movies and ratings, then fix the user sequence
pub fn seed(
    conn: &mut DbConnection,
    config: &Config,
    progress: &mut dyn Progress,
) -> Result<SeedSummary> {
    conn.create_tables()?;

    let users = load_users(conn, &config.users, progress)?;
    let next_user_id = reconcile_user_sequence(conn)?;
    let movies = load_movies(conn, &config.movies, progress)?;
    let ratings = load_ratings(conn, &config.ratings, progress)?;

    Ok(SeedSummary {
        users,
        movies,
        ratings,
        next_user_id,
    })
}
