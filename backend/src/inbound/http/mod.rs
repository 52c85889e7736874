//! HTTP inbound adapter: page views, form posts and image transfer.
//!
//! Handlers resolve the caller from the session, call a driving port and
//! either render a JSON view model or redirect with a flash notice.

pub mod admin;
pub mod auth;
pub mod care_records;
pub mod csrf;
pub mod dashboard;
pub mod error;
pub mod flash;
pub mod health;
pub mod images;
pub mod pages;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;

use actix_web::web;

pub use error::ApiResult;

/// Register every page and form route.
///
/// The caller wraps the app in the session middleware; health probes are
/// registered separately so they work without a session. Undecodable form
/// bodies are turned into a redirect with a notice.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use carelog::inbound::http::configure;
///
/// let _app = App::new().configure(configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::FormConfig::default().error_handler(error::form_error_handler))
        .service(pages::index)
        .service(auth::login_page)
        .service(auth::login)
        .service(auth::register_page)
        .service(auth::register)
        .service(auth::logout)
        .service(dashboard::dashboard)
        .service(care_records::add_care_event)
        .service(care_records::add_note)
        .service(images::upload_image)
        .service(images::serve_image)
        .service(images::delete_image)
        .service(admin::user_management)
        .service(admin::delete_user);
}
