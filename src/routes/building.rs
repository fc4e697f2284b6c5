use async_trait::async_trait;

use crate::{
    forms::{self, BuildingForm, FormErrors, SelectOption},
    gateway::{ApiClient, QueryOptions},
    structs::{Building, Location},
};

use super::crud::{load_options, EditView};

#[async_trait(?Send)]
impl EditView for Building {
    type Form = BuildingForm;

    fn to_form(&self) -> BuildingForm {
        BuildingForm::to_form(self)
    }

    fn from_form(form: &BuildingForm, id: Option<i64>) -> Result<Self, FormErrors> {
        form.from_form(id)
    }

    async fn relationship_options(
        api: &ApiClient,
        form: &BuildingForm,
        current: Option<&Self>,
    ) -> Vec<(&'static str, Vec<SelectOption>)> {
        // one address per building, so only unclaimed locations are offered
        let address = current
            .and_then(|b| b.address.clone())
            .or_else(|| forms::selected::<Location>(&form.address));
        let addresses = load_options(
            api,
            QueryOptions::unclaimed_by("building"),
            address,
            &form.address,
        )
        .await;
        vec![("addresses", addresses)]
    }
}
