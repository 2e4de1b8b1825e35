// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

//! Storage-engine specific pieces: the connection type used by the loader,
//! the DDL for the three tables and the identifier sequence primitive.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{Integer, Text};
use diesel::sqlite::SqliteConnection;

#[cfg(feature = "postgres")]
use diesel::pg::PgConnection;
#[cfg(feature = "postgres")]
use diesel::sql_types::BigInt;

#[cfg(not(feature = "postgres"))]
pub type DbConnection = SqliteConnection;

#[cfg(feature = "postgres")]
pub type DbConnection = PgConnection;

/// Create the tables if they aren't there yet, existing tables are left untouched
pub trait SchemaSetup {
    fn create_tables(&mut self) -> QueryResult<()>;
}

/// Control over the identifier handed out to rows inserted without an id
pub trait IdSequence {
    /// After this call the next generated identifier for `table` is `next`
    fn advance_sequence(&mut self, table: &'static str, next: i32) -> QueryResult<()>;
}

const SQLITE_TABLES: &str = "
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
        email VARCHAR(64),
        password VARCHAR(64),
        age INTEGER,
        zipcode VARCHAR(15)
    );

    CREATE TABLE IF NOT EXISTS movies (
        id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
        title TEXT NOT NULL,
        released_at DATE,
        imdb_url TEXT
    );

    CREATE TABLE IF NOT EXISTS ratings (
        id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
        movie_id INTEGER NOT NULL,
        user_id INTEGER NOT NULL,
        score INTEGER NOT NULL
    );
";

impl SchemaSetup for SqliteConnection {
    fn create_tables(&mut self) -> QueryResult<()> {
        self.batch_execute(SQLITE_TABLES)
    }
}

impl IdSequence for SqliteConnection {
    // AUTOINCREMENT hands out max(seq, max(rowid)) + 1
    fn advance_sequence(&mut self, table: &'static str, next: i32) -> QueryResult<()> {
        let last = next - 1;

        let updated = sql_query("UPDATE sqlite_sequence SET seq = ? WHERE name = ?")
            .bind::<Integer, _>(last)
            .bind::<Text, _>(table)
            .execute(self)?;

        if updated == 0 {
            sql_query("INSERT INTO sqlite_sequence (name, seq) VALUES (?, ?)")
                .bind::<Text, _>(table)
                .bind::<Integer, _>(last)
                .execute(self)?;
        }

        Ok(())
    }
}

#[cfg(feature = "postgres")]
const POSTGRES_TABLES: &str = "
    CREATE TABLE IF NOT EXISTS users (
        id SERIAL PRIMARY KEY,
        email VARCHAR(64),
        password VARCHAR(64),
        age INTEGER,
        zipcode VARCHAR(15)
    );

    CREATE TABLE IF NOT EXISTS movies (
        id SERIAL PRIMARY KEY,
        title VARCHAR NOT NULL,
        released_at DATE,
        imdb_url VARCHAR
    );

    CREATE TABLE IF NOT EXISTS ratings (
        id SERIAL PRIMARY KEY,
        movie_id INTEGER NOT NULL,
        user_id INTEGER NOT NULL,
        score INTEGER NOT NULL
    );
";

#[cfg(feature = "postgres")]
impl SchemaSetup for PgConnection {
    fn create_tables(&mut self) -> QueryResult<()> {
        self.batch_execute(POSTGRES_TABLES)
    }
}

#[cfg(feature = "postgres")]
impl IdSequence for PgConnection {
    // is_called = false, so nextval returns exactly `next`
    fn advance_sequence(&mut self, table: &'static str, next: i32) -> QueryResult<()> {
        sql_query("SELECT setval(pg_get_serial_sequence($1, 'id')::regclass, $2, false)")
            .bind::<Text, _>(table)
            .bind::<BigInt, _>(i64::from(next))
            .execute(self)?;

        Ok(())
    }
}
