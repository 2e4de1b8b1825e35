// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use anyhow::Error;
use config::Config;
use indicatif::ProgressBar;
use log::LevelFilter;
use movie_ratings::{LoadSummary, LogProgress, Progress};
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

#[cfg(not(feature = "postgres"))]
const DEFAULT_DATABASE_URL: &str = "ratings.db";

#[cfg(feature = "postgres")]
const DEFAULT_DATABASE_URL: &str = "postgres://postgres:@localhost/ratings";

pub(crate) fn init_logging(verbosity: u64, quiet: bool) -> Result<(), Error> {
    let level = match (quiet, verbosity) {
        (true, _) => LevelFilter::Warn,
        (false, 0) => LevelFilter::Info,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    };

    let config = ConfigBuilder::new()
        .add_filter_allow_str("ratings")
        .add_filter_allow_str("movie_ratings")
        .build();

    TermLogger::init(level, config, TerminalMode::Mixed, ColorChoice::Auto)?;
    Ok(())
}

/// Command line first, then the config file, then `DATABASE_URL` (.env included)
pub(crate) fn database_url(cli: Option<&str>, config: &Config) -> String {
    if let Some(url) = cli {
        return url.to_owned();
    }

    if let Some(url) = &config.database.url {
        return url.clone();
    }

    dotenv::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_owned())
}

/// A spinner per table while loading, summaries still go to the log
#[derive(Default)]
pub(crate) struct Spinner {
    bar: Option<ProgressBar>,
}

impl Progress for Spinner {
    fn tick(&mut self, table: &'static str, records: u64) {
        let bar = self.bar.get_or_insert_with(|| {
            let bar = ProgressBar::new_spinner();
            bar.set_message(table);
            bar
        });

        bar.set_position(records);
    }

    fn finish(&mut self, summary: &LoadSummary) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }

        LogProgress.finish(summary);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_url_wins() {
        let mut config = Config::with_data_dir("seed_data");
        config.database.url = Some("from-config.db".into());

        assert_eq!(database_url(Some("from-cli.db"), &config), "from-cli.db");
        assert_eq!(database_url(None, &config), "from-config.db");
    }

    #[test]
    fn environment_is_the_last_resort() {
        std::env::set_var("DATABASE_URL", "from-env.db");

        let mut config = Config::with_data_dir("seed_data");
        config.database.url = None;
        assert_eq!(database_url(None, &config), "from-env.db");

        config.database.url = Some("from-config.db".into());
        assert_eq!(database_url(None, &config), "from-config.db");

        std::env::remove_var("DATABASE_URL");
    }
}
