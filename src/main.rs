#[macro_use]
extern crate diesel;

pub mod app;
pub mod database;
pub mod sanitize;
pub mod schema;
pub mod views;

mod auth;
mod routes;

use actix_web::{dev::Service as _, App, HttpServer};

use app::AppState;
use database::db_utils::listen_port;
use routes::{blog::*, comment::*, user::*};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    let app_state = AppState::new(None);
    let port = listen_port();

    log::info!("server listening on port {}", port);
    HttpServer::new(move || {
        App::new()
            .app_data(actix_web::web::Data::new(app_state.clone()))
            //Form submits only carry GET/POST, `_method` names the real verb
            .wrap_fn(|mut req, srv| {
                app::override_method(&mut req);
                srv.call(req)
            })
            //User routes
            .service(register_form)
            .service(register)
            .service(login_form)
            .service(login)
            .service(logout)
            //Blog routes; /blogs/new has to land before /blogs/{id}
            .service(home)
            .service(list_blogs)
            .service(new_blog_form)
            .service(create_blog)
            .service(edit_blog_form)
            .service(update_blog)
            .service(delete_blog)
            .service(show_blog)
            //Comment routes
            .service(new_comment_form)
            .service(create_comment)
            .service(edit_comment_form)
            .service(update_comment)
            .service(delete_comment)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
