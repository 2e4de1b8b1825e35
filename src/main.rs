// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

mod utils;

use anyhow::{Context, Error};
use clap::{App, Arg};
use config::Config;
use movie_ratings::establish_connection;
use utils::Spinner;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFAULT_DATA_DIR: &str = "seed_data";

fn main() -> Result<(), Error> {
    let matches = App::new("ratings")
        .version(VERSION)
        .about("Seeds the ratings database with the MovieLens 100k files")
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("FILE")
                .takes_value(true)
                .help("TOML file with the paths and batch settings"),
        )
        .arg(
            Arg::with_name("data-dir")
                .short("d")
                .long("data-dir")
                .value_name("DIR")
                .takes_value(true)
                .conflicts_with("config")
                .help("Directory with u.user, u.item and u.data (default: seed_data)"),
        )
        .arg(
            Arg::with_name("database-url")
                .long("database-url")
                .value_name("URL")
                .takes_value(true)
                .help("Overrides the config file and DATABASE_URL"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .help("More logging, repeat for even more"),
        )
        .arg(
            Arg::with_name("quiet")
                .short("q")
                .long("quiet")
                .conflicts_with("verbose")
                .help("Only warnings and errors"),
        )
        .get_matches();

    utils::init_logging(matches.occurrences_of("verbose"), matches.is_present("quiet"))?;

    let config = match matches.value_of("config") {
        Some(path) => {
            Config::load(path).with_context(|| format!("Couldn't load config from {}", path))?
        }
        None => Config::with_data_dir(matches.value_of("data-dir").unwrap_or(DEFAULT_DATA_DIR)),
    };

    let url = utils::database_url(matches.value_of("database-url"), &config);
    let mut conn = establish_connection(&url)?;
    log::info!("Connected to DB");

    let summary = movie_ratings::seed(&mut conn, &config, &mut Spinner::default())
        .context("Seeding failed")?;

    log::info!(
        "Seeded {} users, {} movies and {} ratings, next user id is {}",
        summary.users.inserted,
        summary.movies.inserted,
        summary.ratings.inserted,
        summary.next_user_id
    );

    Ok(())
}
