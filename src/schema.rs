table! {
    users (id) {
        id -> Varchar,
        username -> Varchar,
        pass_hash -> Varchar,
        pass_salt -> Varchar,
        display_name -> Nullable<Varchar>,
    }
}

table! {
    blogs (id) {
        id -> Varchar,
        title -> Varchar,
        image_url -> Varchar,
        body -> Varchar,
        author_id -> Varchar,
        author_username -> Varchar,
        author_display_name -> Nullable<Varchar>,
        created_at -> Timestamp,
        comments -> Array<Text>,
    }
}

table! {
    comments (id) {
        id -> Varchar,
        content -> Varchar,
        author_id -> Varchar,
        author_username -> Varchar,
        author_display_name -> Nullable<Varchar>,
        created_at -> Timestamp,
    }
}

allow_tables_to_appear_in_same_query!(
    users,
    blogs,
    comments,
);
