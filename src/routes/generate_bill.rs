use async_trait::async_trait;

use crate::{
    forms::{self, FormErrors, GenerateBillForm, SelectOption},
    gateway::{ApiClient, QueryOptions},
    structs::{GenerateBill, Tenant},
};

use super::crud::{load_options, EditView};

#[async_trait(?Send)]
impl EditView for GenerateBill {
    type Form = GenerateBillForm;

    fn to_form(&self) -> GenerateBillForm {
        GenerateBillForm::to_form(self)
    }

    fn from_form(form: &GenerateBillForm, id: Option<i64>) -> Result<Self, FormErrors> {
        form.from_form(id)
    }

    async fn relationship_options(
        api: &ApiClient,
        form: &GenerateBillForm,
        current: Option<&Self>,
    ) -> Vec<(&'static str, Vec<SelectOption>)> {
        let tenant = current
            .and_then(|b| b.tenant.clone())
            .or_else(|| forms::selected::<Tenant>(&form.tenant));
        let tenants = load_options(api, QueryOptions::default(), tenant, &form.tenant).await;
        vec![("tenants", tenants)]
    }
}
