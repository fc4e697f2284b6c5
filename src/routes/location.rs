use async_trait::async_trait;

use crate::{
    forms::{country_options, FormErrors, LocationForm, SelectOption},
    gateway::ApiClient,
    structs::Location,
};

use super::crud::EditView;

#[async_trait(?Send)]
impl EditView for Location {
    type Form = LocationForm;

    fn to_form(&self) -> LocationForm {
        LocationForm::to_form(self)
    }

    fn from_form(form: &LocationForm, id: Option<i64>) -> Result<Self, FormErrors> {
        form.from_form(id)
    }

    async fn relationship_options(
        _api: &ApiClient,
        form: &LocationForm,
        _current: Option<&Self>,
    ) -> Vec<(&'static str, Vec<SelectOption>)> {
        vec![("countries", country_options(&form.country))]
    }
}
