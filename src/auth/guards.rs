use actix_web::HttpRequest;

use crate::{
    app::{AppError, AppState},
    auth::token::Token,
    database::models::{blog::Blog, comment::Comment, user::User},
};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "token";

/// Resolves the request's session cookie to a user. Requests without
/// a cookie, with an expired token, or whose user row is gone are all
/// treated as anonymous.
pub fn session_user(req: &HttpRequest, app_state: &AppState) -> Result<Option<User>, AppError> {
    let token = match req.cookie(SESSION_COOKIE) {
        Some(cookie) => cookie.value().to_string(),
        None => return Ok(None),
    };

    let mut redis_conn = app_state.redis_pool.get()?;
    // a missing key is an anonymous visitor; a failed round trip to
    // the store is not and surfaces as a storage error
    let user_id = match Token::find(&mut redis_conn, &token)? {
        Some(user_id) => user_id,
        None => return Ok(None),
    };

    let conn = app_state.psql_pool.get()?;
    match User::find_by_id(&conn, &user_id) {
        Ok(user) => Ok(Some(user)),
        Err(AppError::NotFound) => Ok(None),
        Err(err) => Err(err),
    }
}

/// Short-circuits anonymous requests with a redirect to the login
/// page that remembers the originally requested path.
pub fn require_login(req: &HttpRequest, app_state: &AppState) -> Result<User, AppError> {
    session_user(req, app_state)?.ok_or_else(|| AppError::LoginRequired(req.path().to_string()))
}

/// Only the author recorded on the post at creation may mutate it.
pub fn require_blog_author(user: &User, blog: &Blog) -> Result<(), AppError> {
    if blog.author_id != user.id {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

/// Same check against a comment's recorded author.
pub fn require_comment_author(user: &User, comment: &Comment) -> Result<(), AppError> {
    if comment.author_id != user.id {
        return Err(AppError::Forbidden);
    }
    Ok(())
}
