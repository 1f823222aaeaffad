use actix_web::{
    delete, get, post, put,
    web::{Data, Form},
    HttpRequest, HttpResponse,
};
use serde::{Deserialize, Serialize};

use super::{html, see_other};
use crate::{
    app::{AppError, AppState},
    auth::guards,
    database::models::{blog::Blog, comment::Comment},
    sanitize::sanitize,
    views,
};

#[derive(Deserialize, Serialize)]
pub struct CommentForm {
    pub content: String,
}

#[get("/blogs/{id}/comments/new")]
pub async fn new_comment_form(
    req: HttpRequest,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    guards::require_login(&req, &app_state)?;
    let blog_id = req.match_info().query("id").to_string();

    let conn = app_state.psql_pool.get()?;
    let blog = Blog::find_by_id(&conn, &blog_id)?;

    Ok(html(views::new_comment_form(&blog)))
}

/// Pipe for creating a comment against an existing post
/// - url: `{domain}/blogs/{id}/comments`
///
/// # HTTP request requirements
/// ## header
/// - cookie named `token` containing the session token
/// ## body
/// - form field `content`
///
/// The content is sanitized and the author stamped from the session.
/// The comment row is inserted first, then its id appended to the
/// post's list; the two writes are not atomic.
///
/// # Response
/// ## Ok
/// - redirect to the post's page
/// ## Error
/// - anonymous requests are redirected to `/login`
/// - Not found when the post id does not resolve
#[post("/blogs/{id}/comments")]
pub async fn create_comment(
    req: HttpRequest,
    form: Form<CommentForm>,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user = guards::require_login(&req, &app_state)?;
    let blog_id = req.match_info().query("id").to_string();

    let conn = app_state.psql_pool.get()?;
    let mut blog = Blog::find_by_id(&conn, &blog_id)?;

    let content = sanitize(&form.into_inner().content);
    let comment = Comment::new(&conn, &user, &content)?;
    blog.push_comment(&conn, &comment.id)?;

    Ok(see_other(&format!("/blogs/{}", blog_id)))
}

#[get("/blogs/{id}/comments/{comment_id}/edit")]
pub async fn edit_comment_form(
    req: HttpRequest,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user = guards::require_login(&req, &app_state)?;
    let blog_id = req.match_info().query("id").to_string();
    let comment_id = req.match_info().query("comment_id").to_string();

    let conn = app_state.psql_pool.get()?;
    let comment = Comment::find_by_id(&conn, &comment_id)?;
    guards::require_comment_author(&user, &comment)?;

    Ok(html(views::edit_comment_form(&blog_id, &comment)))
}

/// Pipe for updating a comment; only its recorded author may do so.
#[put("/blogs/{id}/comments/{comment_id}")]
pub async fn update_comment(
    req: HttpRequest,
    form: Form<CommentForm>,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user = guards::require_login(&req, &app_state)?;
    let blog_id = req.match_info().query("id").to_string();
    let comment_id = req.match_info().query("comment_id").to_string();

    let conn = app_state.psql_pool.get()?;
    let mut comment = Comment::find_by_id(&conn, &comment_id)?;
    guards::require_comment_author(&user, &comment)?;

    let content = sanitize(&form.into_inner().content);
    comment.edit(&conn, &content)?;

    Ok(see_other(&format!("/blogs/{}", blog_id)))
}

/// Pipe for deleting a comment
/// - url: `{domain}/blogs/{id}/comments/{comment_id}`
///
/// Deletes the comment row, then removes its id from the owning
/// post's list. When the id is already absent from the list, the
/// removal step is a no-op rather than an error.
#[delete("/blogs/{id}/comments/{comment_id}")]
pub async fn delete_comment(
    req: HttpRequest,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user = guards::require_login(&req, &app_state)?;
    let blog_id = req.match_info().query("id").to_string();
    let comment_id = req.match_info().query("comment_id").to_string();

    let conn = app_state.psql_pool.get()?;
    let mut blog = Blog::find_by_id(&conn, &blog_id)?;
    let comment = Comment::find_by_id(&conn, &comment_id)?;
    guards::require_comment_author(&user, &comment)?;

    Comment::delete(&conn, &comment.id)?;
    blog.remove_comment(&conn, &comment.id)?;

    Ok(see_other(&format!("/blogs/{}", blog_id)))
}
