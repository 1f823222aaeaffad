use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::User;
use crate::{
    app::AppError,
    database::DbConnection,
    schema::{self, comments},
};

/// A comment. Which post it belongs to is recorded only in that
/// post's comment id list, the row itself has no back-reference.
#[derive(Debug, Queryable, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub content: String,
    pub author_id: String,
    pub author_username: String,
    pub author_display_name: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[table_name = "comments"]
struct CommentInsert {
    id: String,
    content: String,
    author_id: String,
    author_username: String,
    author_display_name: Option<String>,
    created_at: NaiveDateTime,
}

impl Comment {
    /** Creates a comment row, author stamped from the session user */
    pub fn new(conn: &DbConnection, author: &User, content_in: &str) -> Result<Comment, AppError> {
        let to_insert = CommentInsert {
            id: Uuid::new_v4().to_string(),
            content: content_in.to_string(),
            author_id: author.id.clone(),
            author_username: author.username.clone(),
            author_display_name: author.display_name.clone(),
            created_at: Utc::now().naive_utc(),
        };

        let ret_comment: Comment = diesel::insert_into(schema::comments::table)
            .values(&to_insert)
            .get_result(conn)?;

        Ok(ret_comment)
    }

    pub fn find_by_id(conn: &DbConnection, comment_id: &str) -> Result<Comment, AppError> {
        use crate::schema::comments::dsl::*;

        Ok(comments.filter(id.eq(comment_id)).first::<Comment>(conn)?)
    }

    /// Expands a post's comment id list into full records, keeping the
    /// list order. Ids that no longer resolve to a row are skipped.
    pub fn find_by_ids(conn: &DbConnection, ids: &[String]) -> Result<Vec<Comment>, AppError> {
        use crate::schema::comments::dsl::*;

        let loaded = comments
            .filter(id.eq_any(ids))
            .load::<Comment>(conn)?;

        Ok(in_list_order(ids, loaded))
    }

    pub fn edit(&mut self, conn: &DbConnection, content_in: &str) -> Result<(), AppError> {
        use crate::schema::comments::dsl::*;

        self.content = content_in.to_string();

        diesel::update(comments.filter(id.eq(&self.id)))
            .set(content.eq(&self.content))
            .execute(conn)?;

        Ok(())
    }

    /** Deletes a comment row. The owning post's list is maintained separately. */
    pub fn delete(conn: &DbConnection, comment_id: &str) -> Result<(), AppError> {
        use crate::schema::comments::dsl::*;

        diesel::delete(schema::comments::table)
            .filter(id.eq(comment_id))
            .execute(conn)?;

        Ok(())
    }
}

fn in_list_order(ids: &[String], mut loaded: Vec<Comment>) -> Vec<Comment> {
    let mut ordered = Vec::with_capacity(loaded.len());
    for wanted in ids {
        if let Some(pos) = loaded.iter().position(|c| &c.id == wanted) {
            ordered.push(loaded.remove(pos));
        }
    }
    ordered
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn comment(id: &str) -> Comment {
        Comment {
            id: id.to_string(),
            content: String::from("text"),
            author_id: String::from("u1"),
            author_username: String::from("alice"),
            author_display_name: None,
            created_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn expansion_keeps_list_order() {
        let ids = vec![
            String::from("c"),
            String::from("a"),
            String::from("b"),
        ];
        let loaded = vec![comment("a"), comment("b"), comment("c")];

        let ordered = in_list_order(&ids, loaded);
        let got: Vec<&str> = ordered.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(got, vec!["c", "a", "b"]);
    }

    #[test]
    fn dangling_ids_are_skipped() {
        let ids = vec![String::from("a"), String::from("gone")];
        let loaded = vec![comment("a")];

        let ordered = in_list_order(&ids, loaded);
        assert_eq!(ordered.len(), 1);
        assert_eq!(ordered[0].id, "a");
    }
}
