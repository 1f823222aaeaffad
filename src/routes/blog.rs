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
pub struct BlogForm {
    pub title: String,
    pub image_url: Option<String>,
    pub body: String,
}

#[get("/")]
pub async fn home() -> HttpResponse {
    see_other("/blogs")
}

/// Pipe for listing every post
/// - url: `{domain}/blogs`
///
/// Posts come out in storage order; no sort is applied.
#[get("/blogs")]
pub async fn list_blogs(app_state: Data<AppState>) -> Result<HttpResponse, AppError> {
    let conn = app_state.psql_pool.get()?;
    let blogs = Blog::all(&conn)?;

    Ok(html(views::index(&blogs)))
}

#[get("/blogs/new")]
pub async fn new_blog_form(
    req: HttpRequest,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    guards::require_login(&req, &app_state)?;

    Ok(html(views::new_blog_form()))
}

/// Pipe for creating a new post
/// - url: `{domain}/blogs`
///
/// # HTTP request requirements
/// ## header
/// - cookie named `token` containing the session token
/// ## body
/// - form fields `title`, `body` and optional `image_url`
///
/// The body is sanitized before storage, a blank image url falls back
/// to the placeholder, and the author fields are stamped from the
/// session, never from the request.
///
/// # Response
/// ## Ok
/// - redirect to `/blogs`
/// ## Error
/// - anonymous requests are redirected to `/login`
#[post("/blogs")]
pub async fn create_blog(
    req: HttpRequest,
    form: Form<BlogForm>,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user = guards::require_login(&req, &app_state)?;

    let conn = app_state.psql_pool.get()?;
    let form = form.into_inner();
    let body = sanitize(&form.body);

    Blog::new(&conn, &user, &form.title, &body, form.image_url.as_deref())?;

    Ok(see_other("/blogs"))
}

/// Pipe for showing a single post with its comments expanded from the
/// id list to full records, in list order.
#[get("/blogs/{id}")]
pub async fn show_blog(
    req: HttpRequest,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let blog_id = req.match_info().query("id").to_string();

    let conn = app_state.psql_pool.get()?;
    let blog = Blog::find_by_id(&conn, &blog_id)?;
    let comments = Comment::find_by_ids(&conn, &blog.comments)?;

    Ok(html(views::show_blog(&blog, &comments)))
}

#[get("/blogs/{id}/edit")]
pub async fn edit_blog_form(
    req: HttpRequest,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user = guards::require_login(&req, &app_state)?;
    let blog_id = req.match_info().query("id").to_string();

    let conn = app_state.psql_pool.get()?;
    let blog = Blog::find_by_id(&conn, &blog_id)?;
    guards::require_blog_author(&user, &blog)?;

    Ok(html(views::edit_blog_form(&blog)))
}

/// Pipe for updating a post
/// - url: `{domain}/blogs/{id}`
///
/// Only the recorded author may update; the body is sanitized and the
/// author snapshot is left untouched.
#[put("/blogs/{id}")]
pub async fn update_blog(
    req: HttpRequest,
    form: Form<BlogForm>,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user = guards::require_login(&req, &app_state)?;
    let blog_id = req.match_info().query("id").to_string();

    let conn = app_state.psql_pool.get()?;
    let mut blog = Blog::find_by_id(&conn, &blog_id)?;
    guards::require_blog_author(&user, &blog)?;

    let form = form.into_inner();
    let body = sanitize(&form.body);
    blog.edit(
        &conn,
        &form.title,
        &body,
        form.image_url.as_deref().unwrap_or(""),
    )?;

    Ok(see_other(&format!("/blogs/{}", blog_id)))
}

/// Pipe for deleting a post together with the comments its list
/// references. Comment deletions are attempted independently; a
/// failed one is logged and skipped, never rolled back.
#[delete("/blogs/{id}")]
pub async fn delete_blog(
    req: HttpRequest,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user = guards::require_login(&req, &app_state)?;
    let blog_id = req.match_info().query("id").to_string();

    let conn = app_state.psql_pool.get()?;
    let blog = Blog::find_by_id(&conn, &blog_id)?;
    guards::require_blog_author(&user, &blog)?;

    blog.delete(&conn)?;

    Ok(see_other("/blogs"))
}
