// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use crate::schema::users;
use diesel::prelude::*;

// To query data from the database
#[derive(Debug, Clone, PartialEq, Identifiable, Queryable)]
#[diesel(table_name = users)]
pub struct User {
    pub id: i32,
    pub email: Option<String>,
    pub password: Option<String>,
    pub age: Option<i32>,
    pub zipcode: Option<String>,
}

// A user coming from the seed file, the id is the one in the file
#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_default_value = false)]
pub struct NewUser {
    pub id: i32,
    pub age: Option<i32>,
    pub zipcode: Option<String>,
}

// A user created after seeding, the store picks the id
#[derive(Debug, Clone, Default, PartialEq, Insertable)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_default_value = false)]
pub struct NewAccount<'a> {
    pub email: Option<&'a str>,
    pub password: Option<&'a str>,
    pub age: Option<i32>,
    pub zipcode: Option<&'a str>,
}
