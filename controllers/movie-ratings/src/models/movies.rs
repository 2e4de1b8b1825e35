use crate::schema::movies;
use chrono::NaiveDate;
use diesel::prelude::*;

#[derive(Debug, Clone, PartialEq, Identifiable, Queryable)]
#[diesel(table_name = movies)]
pub struct Movie {
    pub id: i32,
    pub title: String,
    pub released_at: Option<NaiveDate>,
    pub imdb_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = movies)]
#[diesel(treat_none_as_default_value = false)]
pub struct NewMovie {
    pub title: String,
    pub released_at: Option<NaiveDate>,
    pub imdb_url: Option<String>,
}
