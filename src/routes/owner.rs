use async_trait::async_trait;

use crate::{
    forms::{FormErrors, OwnerForm},
    structs::Owner,
};

use super::crud::EditView;

#[async_trait(?Send)]
impl EditView for Owner {
    type Form = OwnerForm;

    fn to_form(&self) -> OwnerForm {
        OwnerForm::to_form(self)
    }

    fn from_form(form: &OwnerForm, id: Option<i64>) -> Result<Self, FormErrors> {
        form.from_form(id)
    }
}
