use actix_identity::Identity;
use actix_web::{web, HttpResponse};
use async_trait::async_trait;

use crate::{
    errors::AppError,
    forms::{self, FormErrors, SelectOption, TenantForm},
    gateway::{ApiClient, QueryOptions},
    resolver::resolve,
    structs::{Location, Tenant},
    utils,
};

use super::{
    crud::{load_options, EditView},
    login_redirect, not_found_redirect, State,
};

#[async_trait(?Send)]
impl EditView for Tenant {
    type Form = TenantForm;

    fn to_form(&self) -> TenantForm {
        TenantForm::to_form(self)
    }

    fn from_form(form: &TenantForm, id: Option<i64>) -> Result<Self, FormErrors> {
        form.from_form(id)
    }

    async fn relationship_options(
        api: &ApiClient,
        form: &TenantForm,
        current: Option<&Self>,
    ) -> Vec<(&'static str, Vec<SelectOption>)> {
        let location = current
            .and_then(|t| t.location.clone())
            .or_else(|| forms::selected::<Location>(&form.location));
        let locations = load_options(
            api,
            QueryOptions::unclaimed_by("tenant"),
            location,
            &form.location,
        )
        .await;
        vec![("locations", locations)]
    }
}

/// Serves the tenant's identity document with its stored content type.
pub async fn document_handler(
    state: State,
    identity: Option<Identity>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    if identity.is_none() {
        return Ok(login_redirect());
    }

    let Some(tenant) = resolve(&state.api.repository::<Tenant>(), Some(*path))
        .await?
        .found()
    else {
        return Ok(not_found_redirect());
    };
    let Some(data) = tenant.address_proof.as_deref() else {
        return Err(AppError::NotFound);
    };

    let bytes = utils::decode_document(data).map_err(|e| {
        log::error!("Tenant {} has an undecodable document: {}", *path, e);
        AppError::InvalidDocument(e)
    })?;
    let content_type = tenant
        .address_proof_content_type
        .unwrap_or_else(|| forms::DEFAULT_CONTENT_TYPE.to_owned());

    Ok(HttpResponse::Ok().content_type(content_type).body(bytes))
}
