use async_trait::async_trait;

use crate::{
    forms::{self, FormErrors, RoomForm, SelectOption},
    gateway::{ApiClient, QueryOptions},
    structs::{Building, Room, Tenant},
};

use super::crud::{load_options, EditView};

#[async_trait(?Send)]
impl EditView for Room {
    type Form = RoomForm;

    fn to_form(&self) -> RoomForm {
        RoomForm::to_form(self)
    }

    fn from_form(form: &RoomForm, id: Option<i64>) -> Result<Self, FormErrors> {
        form.from_form(id)
    }

    async fn relationship_options(
        api: &ApiClient,
        form: &RoomForm,
        current: Option<&Self>,
    ) -> Vec<(&'static str, Vec<SelectOption>)> {
        let building = current
            .and_then(|r| r.building.clone())
            .or_else(|| forms::selected::<Building>(&form.building));
        let tenant = current
            .and_then(|r| r.tenant.clone())
            .or_else(|| forms::selected::<Tenant>(&form.tenant));

        let (buildings, tenants) = tokio::join!(
            load_options(api, QueryOptions::default(), building, &form.building),
            load_options(api, QueryOptions::default(), tenant, &form.tenant),
        );
        vec![("buildings", buildings), ("tenants", tenants)]
    }
}
