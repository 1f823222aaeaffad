use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{comment::Comment, user::User};
use crate::{
    app::AppError,
    database::DbConnection,
    schema::{self, blogs},
};

/// Shown when the author leaves the image field empty.
pub const DEFAULT_IMAGE_URL: &str = "https://images.unsplash.com/photo-1521335751419-603f61523713?ixlib=rb-0.3.5&ixid=eyJhcHBfaWQiOjEyMDd9&s=da93af6c8bb9ba6b964fbb102f1f44f3&auto=format&fit=crop&w=800&q=60";

/// A blog post. The author columns are a snapshot taken at creation
/// time, not a live foreign key, and are never touched by edits. The
/// `comments` column is the ordered list of comment ids belonging to
/// this post; the comment rows themselves carry no back-reference.
#[derive(Debug, Queryable, Clone, Serialize, Deserialize)]
pub struct Blog {
    pub id: String,
    pub title: String,
    pub image_url: String,
    pub body: String,
    pub author_id: String,
    pub author_username: String,
    pub author_display_name: Option<String>,
    pub created_at: NaiveDateTime,
    pub comments: Vec<String>,
}

#[derive(Insertable)]
#[table_name = "blogs"]
struct BlogInsert {
    id: String,
    title: String,
    image_url: String,
    body: String,
    author_id: String,
    author_username: String,
    author_display_name: Option<String>,
    created_at: NaiveDateTime,
    comments: Vec<String>,
}

pub(crate) fn resolve_image_url(image_url: Option<&str>) -> String {
    match image_url {
        Some(url) if !url.trim().is_empty() => url.to_string(),
        _ => DEFAULT_IMAGE_URL.to_string(),
    }
}

/// Drops the first occurrence of `comment_id` from the list. Returns
/// whether anything was removed.
pub(crate) fn list_remove(comments: &mut Vec<String>, comment_id: &str) -> bool {
    match comments.iter().position(|c| c == comment_id) {
        Some(index) => {
            comments.remove(index);
            true
        }
        None => false,
    }
}

impl Blog {
    /// Inserts a new post. Author fields are stamped from the session
    /// user passed in here, never from request input.
    pub fn new(
        conn: &DbConnection,
        author: &User,
        title_in: &str,
        body_in: &str,
        image_url_in: Option<&str>,
    ) -> Result<Blog, AppError> {
        let to_insert = BlogInsert {
            id: Uuid::new_v4().to_string(),
            title: title_in.to_string(),
            image_url: resolve_image_url(image_url_in),
            body: body_in.to_string(),
            author_id: author.id.clone(),
            author_username: author.username.clone(),
            author_display_name: author.display_name.clone(),
            created_at: Utc::now().naive_utc(),
            comments: Vec::new(),
        };

        let ret_blog: Blog = diesel::insert_into(schema::blogs::table)
            .values(&to_insert)
            .get_result(conn)?;

        Ok(ret_blog)
    }

    /// All posts in storage order, no explicit sort.
    pub fn all(conn: &DbConnection) -> Result<Vec<Blog>, AppError> {
        use crate::schema::blogs::dsl::*;

        Ok(blogs.load::<Blog>(conn)?)
    }

    pub fn find_by_id(conn: &DbConnection, blog_id: &str) -> Result<Blog, AppError> {
        use crate::schema::blogs::dsl::*;

        Ok(blogs.filter(id.eq(blog_id)).first::<Blog>(conn)?)
    }

    /// Updates title, body and image. The author snapshot stays as it
    /// was at creation.
    pub fn edit(
        &mut self,
        conn: &DbConnection,
        title_in: &str,
        body_in: &str,
        image_url_in: &str,
    ) -> Result<(), AppError> {
        use crate::schema::blogs::dsl::*;

        self.title = title_in.to_string();
        self.body = body_in.to_string();
        self.image_url = image_url_in.to_string();

        diesel::update(blogs.filter(id.eq(&self.id)))
            .set((
                title.eq(&self.title),
                body.eq(&self.body),
                image_url.eq(&self.image_url),
            ))
            .execute(conn)?;

        Ok(())
    }

    /// Deletes the post, then every comment it referenced. Each
    /// comment deletion is attempted independently; a failure is
    /// logged and does not abort the rest or bring the post back.
    pub fn delete(self, conn: &DbConnection) -> Result<(), AppError> {
        use crate::schema::blogs::dsl::*;

        diesel::delete(schema::blogs::table)
            .filter(id.eq(&self.id))
            .execute(conn)?;

        for comment_id in &self.comments {
            if let Err(err) = Comment::delete(conn, comment_id) {
                log::warn!(
                    "failed to delete comment {} of deleted blog {}: {}",
                    comment_id,
                    self.id,
                    err
                );
            }
        }

        Ok(())
    }

    /// Appends a comment id to the post's list. Callers insert the
    /// comment row first; the two writes are not atomic.
    pub fn push_comment(&mut self, conn: &DbConnection, comment_id: &str) -> Result<(), AppError> {
        use crate::schema::blogs::dsl::*;

        self.comments.push(comment_id.to_string());

        diesel::update(blogs.filter(id.eq(&self.id)))
            .set(comments.eq(&self.comments))
            .execute(conn)?;

        Ok(())
    }

    /// Removes a comment id from the post's list by position. When the
    /// id is absent the whole call is a no-op rather than an error.
    pub fn remove_comment(&mut self, conn: &DbConnection, comment_id: &str) -> Result<(), AppError> {
        use crate::schema::blogs::dsl::*;

        if !list_remove(&mut self.comments, comment_id) {
            return Ok(());
        }

        diesel::update(blogs.filter(id.eq(&self.id)))
            .set(comments.eq(&self.comments))
            .execute(conn)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn empty_image_url_falls_back_to_placeholder() {
        assert_eq!(resolve_image_url(None), DEFAULT_IMAGE_URL);
        assert_eq!(resolve_image_url(Some("")), DEFAULT_IMAGE_URL);
        assert_eq!(resolve_image_url(Some("   ")), DEFAULT_IMAGE_URL);
        assert_eq!(
            resolve_image_url(Some("https://example.com/cat.png")),
            "https://example.com/cat.png"
        );
    }

    #[test]
    fn removing_an_absent_comment_id_changes_nothing() {
        let mut ids = vec![String::from("c1"), String::from("c2")];

        assert!(!list_remove(&mut ids, "c3"));
        assert_eq!(ids, vec![String::from("c1"), String::from("c2")]);
    }

    #[test]
    fn removing_a_present_comment_id_takes_only_that_one() {
        let mut ids = vec![String::from("c1"), String::from("c2"), String::from("c3")];

        assert!(list_remove(&mut ids, "c2"));
        assert_eq!(ids, vec![String::from("c1"), String::from("c3")]);
    }
}
