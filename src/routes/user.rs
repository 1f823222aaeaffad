use actix_web::{
    cookie::Cookie,
    get,
    http::header,
    post,
    web::{Data, Form},
    HttpRequest, HttpResponse,
};
use serde::{Deserialize, Serialize};

use super::{html, see_other};
use crate::{
    app::{AppError, AppState, RETURN_TO_COOKIE},
    auth::{self, guards::SESSION_COOKIE, token::Token},
    views,
};

#[derive(Deserialize, Serialize)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
    pub display_name: Option<String>,
}

#[derive(Deserialize, Serialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token).path("/").finish()
}

#[get("/register")]
pub async fn register_form() -> HttpResponse {
    html(views::register_form())
}

/// Pipe for creating an account
/// - url: `{domain}/register`
///
/// # HTTP request requirements
/// ## body
/// - form fields `username`, `password` and optional `display_name`
///
/// # Response
/// ## Ok
/// - the new user is logged in and redirected to `/blogs`
/// ## Error
/// - Bad request with the underlying message, e.g. when the username
///   is already taken
#[post("/register")]
pub async fn register(
    form: Form<RegisterForm>,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let conn = app_state.psql_pool.get()?;
    let form = form.into_inner();

    let display_name = form
        .display_name
        .as_deref()
        .filter(|name| !name.trim().is_empty());
    let user = auth::register(&conn, form.username.trim(), &form.password, display_name)?;

    // registration doubles as the first login
    let mut redis_conn = app_state.redis_pool.get()?;
    let token = Token::new(&mut redis_conn, &user.id)?;

    Ok(HttpResponse::SeeOther()
        .append_header((header::LOCATION, "/blogs"))
        .cookie(session_cookie(token))
        .finish())
}

#[get("/login")]
pub async fn login_form() -> HttpResponse {
    html(views::login_form())
}

/// Pipe for logging in
/// - url: `{domain}/login`
///
/// # HTTP request requirements
/// ## body
/// - form fields `username` and `password`
///
/// # Response
/// ## Ok
/// - set cookie header containing the session token, then a redirect
///   to the page the login guard remembered, or `/blogs`
/// ## Error
/// - wrong credentials redirect back to `/login`
#[post("/login")]
pub async fn login(
    req: HttpRequest,
    form: Form<LoginForm>,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let conn = app_state.psql_pool.get()?;
    let mut redis_conn = app_state.redis_pool.get()?;
    let form = form.into_inner();

    let token = match auth::login(&conn, &mut redis_conn, form.username.trim(), &form.password) {
        Ok((_user, token)) => token,
        Err(AppError::InvalidCredentials) => return Ok(see_other("/login")),
        Err(err) => return Err(err),
    };

    let destination = req
        .cookie(RETURN_TO_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .unwrap_or_else(|| String::from("/blogs"));

    let mut response = HttpResponse::SeeOther()
        .append_header((header::LOCATION, destination))
        .cookie(session_cookie(token))
        .finish();

    if let Some(mut return_to) = req.cookie(RETURN_TO_COOKIE) {
        return_to.set_path("/");
        let _res = response.add_removal_cookie(&return_to);
    }

    Ok(response)
}

/// Pipe for logging out; the session is invalidated server-side and
/// the cookie removed.
#[get("/logout")]
pub async fn logout(
    req: HttpRequest,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        let mut redis_conn = app_state.redis_pool.get()?;
        auth::logout(&mut redis_conn, cookie.value());
    }

    let mut response = see_other("/");
    let removal = Cookie::build(SESSION_COOKIE, "").path("/").finish();
    let _res = response.add_removal_cookie(&removal);

    Ok(response)
}

#[cfg(test)]
mod tests {
    use actix_web::{
        http::StatusCode,
        test::{self, call_service},
        App,
    };
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::database::models::user::User;

    #[actix_rt::test]
    async fn register_page_renders() {
        let app = test::init_service(App::new().service(super::register_form)).await;

        let req = test::TestRequest::get().uri("/register").to_request();
        let resp = call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_rt::test]
    async fn login_page_renders() {
        let app = test::init_service(App::new().service(super::login_form)).await;

        let req = test::TestRequest::get().uri("/login").to_request();
        let resp = call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_rt::test]
    #[ignore = "requires local postgres and redis"]
    async fn register_then_login_establishes_session() {
        let app_state = AppState::new(None);

        let app = test::init_service(
            App::new()
                .app_data(actix_web::web::Data::new(app_state.clone()))
                .service(super::register)
                .service(super::login),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/register")
            .set_form(RegisterForm {
                username: String::from("fresh_username"),
                password: String::from("test_password123"),
                display_name: Some(String::from("Fresh")),
            })
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);

        let req = test::TestRequest::post()
            .uri("/login")
            .set_form(LoginForm {
                username: String::from("fresh_username"),
                password: String::from("test_password123"),
            })
            .to_request();
        let resp = call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/blogs");
        let set_cookie = resp.headers().get(header::SET_COOKIE).unwrap();
        assert!(set_cookie.to_str().unwrap().starts_with(SESSION_COOKIE));
    }

    #[actix_rt::test]
    #[ignore = "requires local postgres and redis"]
    async fn login_lands_on_the_remembered_page() {
        let app_state = AppState::new(None);

        let app = test::init_service(
            App::new()
                .app_data(actix_web::web::Data::new(app_state.clone()))
                .service(super::register)
                .service(super::login),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/register")
            .set_form(RegisterForm {
                username: String::from("returning_username"),
                password: String::from("test_password123"),
                display_name: None,
            })
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);

        // the cookie a guard redirect would have set
        let req = test::TestRequest::post()
            .uri("/login")
            .cookie(Cookie::new(RETURN_TO_COOKIE, "/blogs/new"))
            .set_form(LoginForm {
                username: String::from("returning_username"),
                password: String::from("test_password123"),
            })
            .to_request();
        let resp = call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/blogs/new");

        // the marker cookie is cleared alongside the redirect
        let cleared = resp
            .headers()
            .get_all(header::SET_COOKIE)
            .filter_map(|v| v.to_str().ok())
            .any(|v| v.starts_with(RETURN_TO_COOKIE) && v.contains("Max-Age=0"));
        assert!(cleared);
    }

    #[actix_rt::test]
    #[ignore = "requires local postgres and redis"]
    async fn duplicate_username_is_rejected_once() {
        let app_state = AppState::new(None);

        let app = test::init_service(
            App::new()
                .app_data(actix_web::web::Data::new(app_state.clone()))
                .service(super::register),
        )
        .await;

        let form = RegisterForm {
            username: String::from("taken_username"),
            password: String::from("test_password123"),
            display_name: None,
        };

        let req = test::TestRequest::post()
            .uri("/register")
            .set_form(&form)
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);

        let req = test::TestRequest::post()
            .uri("/register")
            .set_form(&form)
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        // still exactly one row for the name
        let conn = app_state.psql_pool.get().unwrap();
        assert!(User::find_by_username(&conn, "taken_username")
            .unwrap()
            .is_some());
    }

    #[actix_rt::test]
    #[ignore = "requires local postgres and redis"]
    async fn bad_credentials_redirect_to_login() {
        let app_state = AppState::new(None);

        let app = test::init_service(
            App::new()
                .app_data(actix_web::web::Data::new(app_state.clone()))
                .service(super::login),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/login")
            .set_form(LoginForm {
                username: String::from("nobody_here"),
                password: String::from("whatever12345"),
            })
            .to_request();
        let resp = call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/login");
    }
}
