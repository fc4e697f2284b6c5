use actix_files::NamedFile;
use actix_identity::Identity;
use actix_web::{
    get,
    http::{Method, StatusCode},
    web, Either, HttpResponse, Responder,
};
use tera::Context;

use crate::{
    errors::AppError,
    structs::{Building, GenerateBill, Location, Owner, Room, Tenant},
    AppState, TEMPLATES,
};

pub mod auth;
pub mod building;
pub mod crud;
pub mod generate_bill;
pub mod location;
pub mod owner;
pub mod room;
pub mod tenant;

pub const NOT_FOUND_ROUTE: &str = "/404";

pub fn render(template: &str, context: &Context) -> Result<HttpResponse, AppError> {
    let rendered = TEMPLATES.render(template, context).map_err(|e| {
        log::error!("Failed to render template {}: {}", template, e);
        AppError::TemplateError(e)
    })?;

    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(rendered))
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .append_header(("Location", location))
        .finish()
}

pub fn login_redirect() -> HttpResponse {
    redirect("/login")
}

pub fn not_found_redirect() -> HttpResponse {
    redirect(NOT_FOUND_ROUTE)
}

/// Registers every page of the admin UI.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(favicon_handler)
        .service(index_handler)
        .service(not_found_handler)
        .service(auth::login_handler)
        .service(auth::login_form_handler)
        .service(auth::logout_handler)
        .service(crud::scope::<Building>())
        .service(crud::scope::<Room>())
        .service(crud::scope::<Location>())
        .service(
            crud::scope::<Tenant>()
                .route("/{id}/document", web::get().to(tenant::document_handler)),
        )
        .service(crud::scope::<Owner>())
        .service(crud::scope::<GenerateBill>());
}

#[get("/")]
pub async fn index_handler(identity: Option<Identity>) -> Result<HttpResponse, AppError> {
    let Some(identity) = identity else {
        return Ok(login_redirect());
    };

    let mut context = Context::new();
    context.insert("title", "Rent management");
    context.insert("identity", &identity.id()?);
    context.insert("version", env!("CARGO_PKG_VERSION"));
    context.insert(
        "entities",
        &[
            ("building", "Buildings"),
            ("room", "Rooms"),
            ("location", "Locations"),
            ("tenant", "Tenants"),
            ("owner", "Owners"),
            ("generate-bill", "Bills"),
        ],
    );
    render("home.html", &context)
}

fn not_found_page() -> Result<impl Responder, AppError> {
    Ok(NamedFile::open("static/404.html")?
        .customize()
        .with_status(StatusCode::NOT_FOUND))
}

#[get("/404")]
pub async fn not_found_handler() -> Result<impl Responder, AppError> {
    not_found_page()
}

pub async fn default_handler(req_method: Method) -> Result<impl Responder, AppError> {
    match req_method {
        Method::GET => Ok(Either::Left(not_found_page()?)),
        _ => Ok(Either::Right(HttpResponse::MethodNotAllowed().finish())),
    }
}

#[get("/favicon.ico")]
pub async fn favicon_handler() -> Result<impl Responder, AppError> {
    Ok(NamedFile::open("static/favicon.ico")?)
}

/// Shared state shortcut for handlers.
pub type State = web::Data<AppState>;

#[cfg(test)]
pub(crate) mod testing {
    //! Helpers to drive the full app against a mocked backend.

    use actix_web::cookie::Cookie;

    pub const ADMIN_EMAIL: &str = "admin@example.com";
    pub const ADMIN_PASSWORD: &str = "a long password 1!";

    pub fn session_key() -> actix_web::cookie::Key {
        actix_web::cookie::Key::from(&[7u8; 64])
    }

    pub async fn state(api_url: &str) -> crate::AppState {
        let pool = crate::db::test_pool().await;
        crate::db::create_user(&pool, ADMIN_EMAIL, ADMIN_PASSWORD)
            .await
            .unwrap();
        crate::AppState {
            db_pool: pool,
            api: crate::gateway::ApiClient::new(api_url, None).unwrap(),
        }
    }

    /// Builds the service with identity and cookie sessions, like `main`.
    #[macro_export]
    macro_rules! test_app {
        ($state:expr) => {
            actix_web::test::init_service(
                actix_web::App::new()
                    .wrap(actix_identity::IdentityMiddleware::default())
                    .wrap(actix_session::SessionMiddleware::new(
                        actix_session::storage::CookieSessionStore::default(),
                        $crate::routes::testing::session_key(),
                    ))
                    .app_data(actix_web::web::Data::new($state))
                    .configure($crate::routes::configure),
            )
            .await
        };
    }

    /// Logs in as the seeded admin and returns the session cookie.
    #[macro_export]
    macro_rules! login {
        ($app:expr) => {{
            let req = actix_web::test::TestRequest::post()
                .uri("/login")
                .set_form([
                    ("email", $crate::routes::testing::ADMIN_EMAIL),
                    ("password", $crate::routes::testing::ADMIN_PASSWORD),
                ])
                .to_request();
            let resp = actix_web::test::call_service(&$app, req).await;
            assert_eq!(resp.status(), actix_web::http::StatusCode::SEE_OTHER);
            $crate::routes::testing::session_cookie(&resp)
        }};
    }

    pub fn session_cookie<B>(resp: &actix_web::dev::ServiceResponse<B>) -> Cookie<'static> {
        resp.response()
            .cookies()
            .next()
            .map(|c| c.into_owned())
            .expect("login sets a session cookie")
    }

    pub fn location<B>(resp: &actix_web::dev::ServiceResponse<B>) -> String {
        resp.headers()
            .get("Location")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_owned()
    }
}
