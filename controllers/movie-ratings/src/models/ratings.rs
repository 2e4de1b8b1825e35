use super::movies::Movie;
use super::users::User;
use crate::schema::ratings;
use diesel::prelude::*;

// To query data from the database
#[derive(Debug, Clone, PartialEq, Identifiable, Queryable, Associations)]
#[diesel(table_name = ratings)]
#[diesel(belongs_to(Movie))]
#[diesel(belongs_to(User))]
pub struct Rating {
    pub id: i32,
    pub movie_id: i32,
    pub user_id: i32,
    pub score: i32,
}

// To insert a new rating into the database
#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = ratings)]
pub struct NewRating {
    pub movie_id: i32,
    pub user_id: i32,
    pub score: i32,
}
