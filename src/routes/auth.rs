use actix_identity::Identity;
use actix_web::{
    get, post,
    web::{self, Data},
    HttpMessage, HttpRequest, HttpResponse, Responder,
};
use serde::Deserialize;
use tera::Context;

use crate::{db, errors::AppError, AppState};

use super::{redirect, render};

#[derive(Deserialize)]
pub struct Login {
    email: String,
    password: String,
}

fn login_page(error: Option<&str>, email: &str) -> Result<HttpResponse, AppError> {
    let mut context = Context::new();
    context.insert("title", "Sign in");
    context.insert("error", &error);
    context.insert("email", email);
    render("login.html", &context)
}

#[get("/login")]
pub async fn login_handler(identity: Option<Identity>) -> Result<impl Responder, AppError> {
    if identity.is_some() {
        return Ok(redirect("/"));
    }
    login_page(None, "")
}

#[post("/login")]
pub async fn login_form_handler(
    web::Form(form): web::Form<Login>,
    state: Data<AppState>,
    request: HttpRequest,
) -> Result<impl Responder, AppError> {
    if form.email.is_empty() || form.password.is_empty() {
        return login_page(Some("All fields are required"), &form.email);
    }
    if !form.email.contains('@') {
        return login_page(Some("Invalid email address"), &form.email);
    }

    match db::authenticate(&state.db_pool, &form.email, &form.password).await? {
        Some(user) => {
            Identity::login(&request.extensions(), user.id.to_string())?;
            log::info!("User {} signed in", user.email);
            Ok(redirect("/"))
        }
        None => {
            let mut resp = login_page(Some("Invalid credentials"), &form.email)?;
            *resp.status_mut() = actix_web::http::StatusCode::UNAUTHORIZED;
            Ok(resp)
        }
    }
}

#[post("/logout")]
pub async fn logout_handler(user: Option<Identity>) -> impl Responder {
    if let Some(user) = user {
        user.logout();
    }
    redirect("/login")
}
