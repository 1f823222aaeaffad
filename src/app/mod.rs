use std::{fmt::Display, sync::Arc};

use actix_web::{
    cookie::Cookie,
    dev::ServiceRequest,
    http::{header, Method, StatusCode},
    HttpResponse, ResponseError,
};
use diesel::{
    r2d2::{ConnectionManager, Pool},
    PgConnection,
};
use r2d2_redis::{redis::RedisError, RedisConnectionManager};

use crate::database::db_utils::{psql_connect_to_db, redis_connect_to_db};

/// Cookie set by the login guard so a successful login can send the
/// user back to the page they originally asked for.
pub const RETURN_TO_COOKIE: &str = "return_to";

/** Used for storing the database connections when handling requests */
pub struct AppState {
    pub psql_pool: Arc<Pool<ConnectionManager<PgConnection>>>,
    pub redis_pool: Arc<Pool<RedisConnectionManager>>,
}

impl AppState {
    pub fn new(db_url: Option<&str>) -> Self {
        Self {
            psql_pool: psql_connect_to_db(db_url),
            redis_pool: redis_connect_to_db(None),
        }
    }
}

impl Clone for AppState {
    fn clone(&self) -> Self {
        Self {
            psql_pool: self.psql_pool.clone(),
            redis_pool: self.redis_pool.clone(),
        }
    }
}

/// HTML forms can only submit GET and POST, so the edit and delete
/// forms post with a `_method` query parameter naming the real verb.
/// This hook rewrites such a POST before routing; only PUT and DELETE
/// may be forged this way.
pub fn override_method(req: &mut ServiceRequest) {
    if req.method() != Method::POST {
        return;
    }

    let target = req.query_string().split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        if key != "_method" {
            return None;
        }
        match value.to_ascii_uppercase().as_str() {
            "PUT" => Some(Method::PUT),
            "DELETE" => Some(Method::DELETE),
            _ => None,
        }
    });

    if let Some(method) = target {
        req.head_mut().method = method;
    }
}

/** Holds the errors we will use during request processing */
#[derive(Debug)]
pub enum AppError {
    /// Registration with a username that already has an account
    DuplicateUsername,
    /// Unknown username or wrong password at login
    InvalidCredentials,
    /// Missing post or comment id
    NotFound,
    /// No session; carries the path the client originally requested
    LoginRequired(String),
    /// Session user is not the author of the resource
    Forbidden,
    /// Underlying database failure
    Storage(String),
}

impl Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::DuplicateUsername => f.write_str("Error registering new user: username is already taken."),
            AppError::InvalidCredentials => f.write_str("Invalid username or password."),
            AppError::NotFound => f.write_str("The requested record was not found."),
            AppError::LoginRequired(_) => f.write_str("Login required."),
            AppError::Forbidden => f.write_str("You are not the author of this resource."),
            AppError::Storage(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::DuplicateUsername => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::LoginRequired(_) => StatusCode::SEE_OTHER,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            // Guard failures redirect instead of erroring; the original
            // path rides along in a cookie so the login route can
            // bounce the user back afterwards.
            AppError::LoginRequired(path) => {
                let cookie = Cookie::build(RETURN_TO_COOKIE, path.clone()).path("/").finish();
                HttpResponse::SeeOther()
                    .append_header((header::LOCATION, "/login"))
                    .cookie(cookie)
                    .finish()
            }
            _ => HttpResponse::build(self.status_code())
                .content_type("text/plain; charset=utf-8")
                .body(self.to_string()),
        }
    }
}

impl From<diesel::result::Error> for AppError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => AppError::NotFound,
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            ) => AppError::DuplicateUsername,
            other => {
                log::error!("storage error: {}", other);
                AppError::Storage(other.to_string())
            }
        }
    }
}

impl From<r2d2_redis::r2d2::Error> for AppError {
    fn from(err: r2d2_redis::r2d2::Error) -> Self {
        log::error!("connection pool error: {}", err);
        AppError::Storage(err.to_string())
    }
}

impl From<RedisError> for AppError {
    fn from(err: RedisError) -> Self {
        log::error!("session store error: {}", err);
        AppError::Storage(err.to_string())
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_required_redirects_and_remembers_path() {
        let err = AppError::LoginRequired(String::from("/blogs/new"));
        let resp = err.error_response();

        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/login");

        let set_cookie = resp.headers().get(header::SET_COOKIE).unwrap();
        let cookie = Cookie::parse(set_cookie.to_str().unwrap().to_string()).unwrap();
        assert_eq!(cookie.name(), RETURN_TO_COOKIE);
        assert_eq!(cookie.value(), "/blogs/new");
    }

    #[test]
    fn forbidden_is_plain_text() {
        let resp = AppError::Forbidden.error_response();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );
    }

    #[test]
    fn not_found_maps_from_diesel() {
        let err: AppError = diesel::result::Error::NotFound.into();
        assert!(matches!(err, AppError::NotFound));
    }

    #[actix_rt::test]
    async fn post_with_method_param_becomes_the_named_verb() {
        use actix_web::test;

        let mut req = test::TestRequest::post()
            .uri("/blogs/b1?_method=PUT")
            .to_srv_request();
        override_method(&mut req);
        assert_eq!(req.method(), Method::PUT);

        let mut req = test::TestRequest::post()
            .uri("/blogs/b1/comments/c1?_method=DELETE")
            .to_srv_request();
        override_method(&mut req);
        assert_eq!(req.method(), Method::DELETE);
    }

    #[actix_rt::test]
    async fn only_posts_and_known_verbs_are_overridden() {
        use actix_web::test;

        let mut req = test::TestRequest::get()
            .uri("/blogs?_method=DELETE")
            .to_srv_request();
        override_method(&mut req);
        assert_eq!(req.method(), Method::GET);

        let mut req = test::TestRequest::post()
            .uri("/blogs?_method=PATCH")
            .to_srv_request();
        override_method(&mut req);
        assert_eq!(req.method(), Method::POST);
    }
}
