//! Pages shared by every entity: list, detail, create/edit forms and the
//! delete confirmation. Entity specifics come in through [`EditView`].

use actix_identity::Identity;
use actix_web::{http::StatusCode, web, HttpResponse, Scope};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tera::Context;

use crate::{
    entity::Entity,
    errors::AppError,
    forms::{select_options, FormErrors, SelectOption},
    gateway::{ApiClient, QueryOptions},
    reconcile::reconcile,
    resolver::{resolve, Resolved},
};

use super::{login_redirect, not_found_redirect, redirect, render, State};

/// How an entity is edited through its HTML form.
#[async_trait(?Send)]
pub trait EditView: Entity {
    type Form: Serialize + DeserializeOwned + Default + 'static;

    fn to_form(&self) -> Self::Form;

    fn from_form(form: &Self::Form, id: Option<i64>) -> Result<Self, FormErrors>;

    /// Options of the relationship selects, keyed by template variable.
    /// `current` is the entity being edited when one is at hand; otherwise
    /// the selection is taken from the posted form.
    async fn relationship_options(
        _api: &ApiClient,
        _form: &Self::Form,
        _current: Option<&Self>,
    ) -> Vec<(&'static str, Vec<SelectOption>)> {
        Vec::new()
    }
}

/// Queries the candidates of a relationship select and makes sure the
/// entity currently referenced is among them. A failed query only empties
/// this one select.
pub async fn load_options<E: Entity>(
    api: &ApiClient,
    query: QueryOptions,
    current: Option<E>,
    selected: &str,
) -> Vec<SelectOption> {
    let candidates = match api.repository::<E>().query(&query).await {
        Ok(list) => list,
        Err(e) => {
            log::warn!("Failed to load {} options: {}", E::TITLE, e);
            Vec::new()
        }
    };
    select_options(&reconcile(candidates, [current]), selected)
}

pub fn scope<E: EditView>() -> Scope {
    web::scope(&format!("/{}", E::ROUTE))
        .route("", web::get().to(list::<E>))
        .route("/new", web::get().to(new_form::<E>))
        .route("/new", web::post().to(create::<E>))
        .route("/{id}/view", web::get().to(view::<E>))
        .route("/{id}/edit", web::get().to(edit_form::<E>))
        .route("/{id}/edit", web::post().to(update::<E>))
        .route("/{id}/delete", web::get().to(delete_confirm::<E>))
        .route("/{id}/delete", web::post().to(delete::<E>))
}

fn page_context<E: Entity>() -> Context {
    let mut context = Context::new();
    context.insert("title", E::TITLE);
    context.insert("route", E::ROUTE);
    context
}

fn list_url<E: Entity>() -> String {
    format!("/{}", E::ROUTE)
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    deleted: bool,
}

pub async fn list<E: EditView>(
    state: State,
    identity: Option<Identity>,
    params: web::Query<ListParams>,
) -> Result<HttpResponse, AppError> {
    if identity.is_none() {
        return Ok(login_redirect());
    }

    let (entities, load_error) = match state
        .api
        .repository::<E>()
        .query(&QueryOptions::default())
        .await
    {
        Ok(list) => (list, None),
        Err(e) => {
            log::error!("Failed to load {} list: {}", E::TITLE, e);
            (Vec::new(), Some(e.to_string()))
        }
    };

    let mut context = page_context::<E>();
    context.insert("entities", &entities);
    context.insert("deleted", &params.deleted);
    context.insert("load_error", &load_error);
    render(&format!("{}/list.html", E::ROUTE), &context)
}

pub async fn view<E: EditView>(
    state: State,
    identity: Option<Identity>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    if identity.is_none() {
        return Ok(login_redirect());
    }

    let Resolved::Found(entity) = resolve(&state.api.repository::<E>(), Some(*path)).await? else {
        return Ok(not_found_redirect());
    };

    let mut context = page_context::<E>();
    context.insert("label", &entity.label());
    context.insert("entity", &entity);
    render(&format!("{}/detail.html", E::ROUTE), &context)
}

async fn render_form<E: EditView>(
    api: &ApiClient,
    id: Option<i64>,
    form: &E::Form,
    current: Option<&E>,
    errors: &FormErrors,
    save_error: Option<String>,
) -> Result<HttpResponse, AppError> {
    let options = E::relationship_options(api, form, current).await;

    let mut context = page_context::<E>();
    context.insert("id", &id);
    context.insert("form", form);
    context.insert("errors", errors);
    context.insert("save_error", &save_error);
    for (name, list) in options {
        context.insert(name, &list);
    }
    render(&format!("{}/update.html", E::ROUTE), &context)
}

async fn show_form<E: EditView>(state: &State, id: Option<i64>) -> Result<HttpResponse, AppError> {
    let Resolved::Found(entity) = resolve(&state.api.repository::<E>(), id).await? else {
        return Ok(not_found_redirect());
    };
    render_form(
        &state.api,
        id,
        &entity.to_form(),
        Some(&entity),
        &FormErrors::default(),
        None,
    )
    .await
}

pub async fn new_form<E: EditView>(
    state: State,
    identity: Option<Identity>,
) -> Result<HttpResponse, AppError> {
    if identity.is_none() {
        return Ok(login_redirect());
    }
    show_form::<E>(&state, None).await
}

pub async fn edit_form<E: EditView>(
    state: State,
    identity: Option<Identity>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    if identity.is_none() {
        return Ok(login_redirect());
    }
    show_form::<E>(&state, Some(*path)).await
}

async fn save<E: EditView>(
    state: &State,
    id: Option<i64>,
    form: E::Form,
) -> Result<HttpResponse, AppError> {
    let entity = match E::from_form(&form, id) {
        Ok(entity) => entity,
        Err(errors) => {
            let mut resp = render_form::<E>(&state.api, id, &form, None, &errors, None).await?;
            *resp.status_mut() = StatusCode::UNPROCESSABLE_ENTITY;
            return Ok(resp);
        }
    };

    let repository = state.api.repository::<E>();
    let result = if entity.id().is_some() {
        repository.update(&entity).await
    } else {
        repository.create(&entity).await
    };

    match result {
        Ok(saved) => {
            log::info!("{} saved: {}", E::TITLE, saved.label());
            Ok(redirect(&list_url::<E>()))
        }
        Err(e) => {
            log::error!("Failed to save {}: {}", E::TITLE, e);
            let mut resp = render_form(
                &state.api,
                id,
                &form,
                Some(&entity),
                &FormErrors::default(),
                Some(e.to_string()),
            )
            .await?;
            *resp.status_mut() = StatusCode::BAD_GATEWAY;
            Ok(resp)
        }
    }
}

pub async fn create<E: EditView>(
    state: State,
    identity: Option<Identity>,
    form: web::Form<E::Form>,
) -> Result<HttpResponse, AppError> {
    if identity.is_none() {
        return Ok(login_redirect());
    }
    save::<E>(&state, None, form.into_inner()).await
}

pub async fn update<E: EditView>(
    state: State,
    identity: Option<Identity>,
    path: web::Path<i64>,
    form: web::Form<E::Form>,
) -> Result<HttpResponse, AppError> {
    if identity.is_none() {
        return Ok(login_redirect());
    }
    save::<E>(&state, Some(*path), form.into_inner()).await
}

/// What the confirmation page was closed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeleteOutcome {
    Deleted,
    Dismissed,
}

#[derive(Debug, Deserialize)]
pub struct DeleteForm {
    outcome: DeleteOutcome,
}

fn delete_page<E: Entity>(entity: &E, error: Option<String>) -> Result<HttpResponse, AppError> {
    let mut context = page_context::<E>();
    context.insert("id", &entity.id());
    context.insert("label", &entity.label());
    context.insert("error", &error);
    render("delete.html", &context)
}

pub async fn delete_confirm<E: EditView>(
    state: State,
    identity: Option<Identity>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    if identity.is_none() {
        return Ok(login_redirect());
    }
    match resolve(&state.api.repository::<E>(), Some(*path)).await? {
        Resolved::Found(entity) => delete_page(&entity, None),
        Resolved::NotFound => Ok(not_found_redirect()),
    }
}

pub async fn delete<E: EditView>(
    state: State,
    identity: Option<Identity>,
    path: web::Path<i64>,
    web::Form(form): web::Form<DeleteForm>,
) -> Result<HttpResponse, AppError> {
    if identity.is_none() {
        return Ok(login_redirect());
    }
    let id = path.into_inner();

    if form.outcome == DeleteOutcome::Dismissed {
        return Ok(redirect(&list_url::<E>()));
    }

    match state.api.repository::<E>().delete(id).await {
        Ok(()) => Ok(redirect(&format!("{}?deleted=true", list_url::<E>()))),
        Err(e) => {
            log::error!("Failed to delete {} {}: {}", E::TITLE, id, e);
            let mut resp = delete_page(&E::reference(id), Some(e.to_string()))?;
            *resp.status_mut() = StatusCode::BAD_GATEWAY;
            Ok(resp)
        }
    }
}
