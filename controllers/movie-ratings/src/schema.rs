diesel::table! {
    movies (id) {
        id -> Integer,
        title -> Text,
        released_at -> Nullable<Date>,
        imdb_url -> Nullable<Text>,
    }
}

diesel::table! {
    ratings (id) {
        id -> Integer,
        movie_id -> Integer,
        user_id -> Integer,
        score -> Integer,
    }
}

diesel::table! {
    users (id) {
        id -> Integer,
        email -> Nullable<Text>,
        password -> Nullable<Text>,
        age -> Nullable<Integer>,
        zipcode -> Nullable<Text>,
    }
}

diesel::joinable!(ratings -> movies (movie_id));
diesel::joinable!(ratings -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    movies,
    ratings,
    users,
);
