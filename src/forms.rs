//! Typed edit forms, one per entity, with the `to_form`/`from_form` mapping
//! between an entity and what the HTML form posts.
//!
//! Every field arrives as a string (`application/x-www-form-urlencoded`), so
//! the form structs keep strings and parsing happens in `from_form`, where
//! each failure is recorded against its field.

use std::collections::BTreeMap;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::dates;
use crate::entity::Entity;
use crate::structs::{Building, Country, GenerateBill, Location, Owner, Room, Tenant};

pub const DETAILS_MAX_LEN: usize = 500;
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Validation messages keyed by field name.
#[derive(Debug, Default, Clone, Serialize, PartialEq)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<&'static str, String>);

impl FormErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    fn finish<T>(self, value: T) -> Result<T, FormErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

/// One `<option>` of a relationship select.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// Options for a select bound to `selected` (the raw form value). Entities
/// without identifier can't be selected and are left out.
pub fn select_options<E: Entity>(entities: &[E], selected: &str) -> Vec<SelectOption> {
    entities
        .iter()
        .filter_map(|e| e.id().map(|id| (id, e)))
        .map(|(id, e)| {
            let value = id.to_string();
            SelectOption {
                selected: value == selected,
                label: e.label(),
                value,
            }
        })
        .collect()
}

pub fn country_options(selected: &str) -> Vec<SelectOption> {
    Country::ALL
        .iter()
        .map(|c| SelectOption {
            value: c.code().to_owned(),
            label: c.code().replace('_', " "),
            selected: c.code() == selected,
        })
        .collect()
}

fn text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

fn required(errors: &mut FormErrors, field: &'static str, raw: &str) -> Option<String> {
    let value = text(raw);
    if value.is_none() {
        errors.add(field, "This field is required.");
    }
    value
}

fn number<T: FromStr>(errors: &mut FormErrors, field: &'static str, raw: &str) -> Option<T> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            errors.add(field, "This field should be a number.");
            None
        }
    }
}

fn required_number<T: FromStr>(
    errors: &mut FormErrors,
    field: &'static str,
    raw: &str,
) -> Option<T> {
    if raw.trim().is_empty() {
        errors.add(field, "This field is required.");
        return None;
    }
    number(errors, field, raw)
}

fn checked(raw: &str) -> bool {
    matches!(raw, "true" | "on" | "1")
}

/// Maps a select value back to the entity shape the API embeds. Only the
/// identifier is needed by the backend.
fn reference<E: Entity>(errors: &mut FormErrors, field: &'static str, raw: &str) -> Option<E> {
    number::<i64>(errors, field, raw).map(E::reference)
}

/// The entity a select currently points at, if its value is an identifier.
pub fn selected<E: Entity>(raw: &str) -> Option<E> {
    raw.trim().parse::<i64>().ok().map(E::reference)
}

fn id_string(id: Option<i64>) -> String {
    id.map(|i| i.to_string()).unwrap_or_default()
}

fn num_string<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn bool_string(value: Option<bool>) -> String {
    if value.unwrap_or(false) {
        "true".to_owned()
    } else {
        String::new()
    }
}

#[derive(Debug, Default, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LocationForm {
    pub street_address: String,
    pub postal_code: String,
    pub city: String,
    pub state_province: String,
    pub country: String,
}

impl LocationForm {
    pub fn to_form(location: &Location) -> Self {
        LocationForm {
            street_address: location.street_address.clone().unwrap_or_default(),
            postal_code: location.postal_code.clone().unwrap_or_default(),
            city: location.city.clone().unwrap_or_default(),
            state_province: location.state_province.clone().unwrap_or_default(),
            country: location
                .country
                .map(|c| c.code().to_owned())
                .unwrap_or_default(),
        }
    }

    pub fn from_form(&self, id: Option<i64>) -> Result<Location, FormErrors> {
        let mut errors = FormErrors::default();
        let country = match text(&self.country) {
            Some(code) => {
                let parsed = Country::from_code(&code);
                if parsed.is_none() {
                    errors.add("country", "Unknown country.");
                }
                parsed
            }
            None => None,
        };
        errors.finish(Location {
            id,
            street_address: text(&self.street_address),
            postal_code: text(&self.postal_code),
            city: text(&self.city),
            state_province: text(&self.state_province),
            country,
        })
    }
}

#[derive(Debug, Default, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct BuildingForm {
    pub building_name: String,
    pub address: String,
}

impl BuildingForm {
    pub fn to_form(building: &Building) -> Self {
        BuildingForm {
            building_name: building.building_name.clone().unwrap_or_default(),
            address: id_string(building.address.as_ref().and_then(|a| a.id)),
        }
    }

    pub fn from_form(&self, id: Option<i64>) -> Result<Building, FormErrors> {
        let mut errors = FormErrors::default();
        let building_name = required(&mut errors, "building_name", &self.building_name);
        if text(&self.address).is_none() {
            errors.add("address", "This field is required.");
        }
        let address = reference::<Location>(&mut errors, "address", &self.address);
        errors.finish(Building {
            id,
            building_name,
            address,
            rooms: Vec::new(),
        })
    }
}

#[derive(Debug, Default, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RoomForm {
    pub room_name: String,
    pub floor: String,
    pub building: String,
    pub tenant: String,
}

impl RoomForm {
    pub fn to_form(room: &Room) -> Self {
        RoomForm {
            room_name: room.room_name.clone().unwrap_or_default(),
            floor: room.floor.clone().unwrap_or_default(),
            building: id_string(room.building.as_ref().and_then(|b| b.id)),
            tenant: id_string(room.tenant.as_ref().and_then(|t| t.id)),
        }
    }

    pub fn from_form(&self, id: Option<i64>) -> Result<Room, FormErrors> {
        let mut errors = FormErrors::default();
        let room_name = required(&mut errors, "room_name", &self.room_name);
        if text(&self.building).is_none() {
            errors.add("building", "This field is required.");
        }
        let building = reference::<Building>(&mut errors, "building", &self.building);
        let tenant = reference::<Tenant>(&mut errors, "tenant", &self.tenant);
        errors.finish(Room {
            id,
            room_name,
            floor: text(&self.floor),
            building,
            tenant,
        })
    }
}

#[derive(Debug, Default, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct OwnerForm {
    pub phone_number: String,
    pub email_address: String,
}

impl OwnerForm {
    pub fn to_form(owner: &Owner) -> Self {
        OwnerForm {
            phone_number: owner.phone_number.clone().unwrap_or_default(),
            email_address: owner.email_address.clone().unwrap_or_default(),
        }
    }

    pub fn from_form(&self, id: Option<i64>) -> Result<Owner, FormErrors> {
        let mut errors = FormErrors::default();
        let phone_number = required(&mut errors, "phone_number", &self.phone_number);
        errors.finish(Owner {
            id,
            phone_number,
            email_address: text(&self.email_address),
        })
    }
}

#[derive(Debug, Default, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TenantForm {
    pub tenant_name: String,
    pub address_proof: String,
    pub address_proof_content_type: String,
    pub family_members: String,
    pub phone_number: String,
    pub rent_start_date: String,
    pub rent_amount: String,
    pub electricity_unit_rate: String,
    pub starting_electricity_unit: String,
    pub any_other_details: String,
    pub send_notification: String,
    pub email_address: String,
    pub emergency_contact_number: String,
    pub outstanding_amount: String,
    pub month_end_calculation: String,
    pub calculate_on_date: String,
    pub location: String,
}

impl TenantForm {
    pub fn to_form(tenant: &Tenant) -> Self {
        TenantForm {
            tenant_name: tenant.tenant_name.clone().unwrap_or_default(),
            address_proof: tenant.address_proof.clone().unwrap_or_default(),
            address_proof_content_type: tenant
                .address_proof_content_type
                .clone()
                .unwrap_or_default(),
            family_members: num_string(tenant.family_members),
            phone_number: tenant.phone_number.clone().unwrap_or_default(),
            rent_start_date: dates::format_date(tenant.rent_start_date),
            rent_amount: num_string(tenant.rent_amount),
            electricity_unit_rate: num_string(tenant.electricity_unit_rate),
            starting_electricity_unit: num_string(tenant.starting_electricity_unit),
            any_other_details: tenant.any_other_details.clone().unwrap_or_default(),
            send_notification: bool_string(tenant.send_notification),
            email_address: tenant.email_address.clone().unwrap_or_default(),
            emergency_contact_number: tenant.emergency_contact_number.clone().unwrap_or_default(),
            outstanding_amount: num_string(tenant.outstanding_amount),
            month_end_calculation: bool_string(tenant.month_end_calculation),
            calculate_on_date: bool_string(tenant.calculate_on_date),
            location: id_string(tenant.location.as_ref().and_then(|l| l.id)),
        }
    }

    /// A malformed or empty rent start date is dropped, not reported.
    pub fn from_form(&self, id: Option<i64>) -> Result<Tenant, FormErrors> {
        let mut errors = FormErrors::default();
        let tenant_name = required(&mut errors, "tenant_name", &self.tenant_name);
        let address_proof = required(&mut errors, "address_proof", &self.address_proof);
        if let Some(data) = &address_proof {
            if STANDARD.decode(data).is_err() {
                errors.add("address_proof", "The document is not valid base64 data.");
            }
        }
        // browsers leave the type blank for files they don't recognise
        let address_proof_content_type = address_proof.as_ref().map(|_| {
            text(&self.address_proof_content_type)
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_owned())
        });
        let phone_number = required(&mut errors, "phone_number", &self.phone_number);
        let any_other_details = text(&self.any_other_details);
        if any_other_details
            .as_ref()
            .is_some_and(|d| d.chars().count() > DETAILS_MAX_LEN)
        {
            errors.add(
                "any_other_details",
                format!("This field cannot be longer than {DETAILS_MAX_LEN} characters."),
            );
        }

        let tenant = Tenant {
            id,
            tenant_name,
            address_proof,
            address_proof_content_type,
            family_members: number(&mut errors, "family_members", &self.family_members),
            phone_number,
            rent_start_date: dates::parse_date(&self.rent_start_date),
            rent_amount: required_number(&mut errors, "rent_amount", &self.rent_amount),
            electricity_unit_rate: required_number(
                &mut errors,
                "electricity_unit_rate",
                &self.electricity_unit_rate,
            ),
            starting_electricity_unit: required_number(
                &mut errors,
                "starting_electricity_unit",
                &self.starting_electricity_unit,
            ),
            any_other_details,
            send_notification: Some(checked(&self.send_notification)),
            email_address: text(&self.email_address),
            emergency_contact_number: text(&self.emergency_contact_number),
            outstanding_amount: number(&mut errors, "outstanding_amount", &self.outstanding_amount),
            month_end_calculation: Some(checked(&self.month_end_calculation)),
            calculate_on_date: Some(checked(&self.calculate_on_date)),
            calculated_for_current_month: None,
            location: reference::<Location>(&mut errors, "location", &self.location),
            rooms: Vec::new(),
            generate_bills: Vec::new(),
        };
        errors.finish(tenant)
    }
}

#[derive(Debug, Default, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct GenerateBillForm {
    pub amount_pending: String,
    pub send_notification: String,
    pub electricity_unit: String,
    pub tenant: String,
}

impl GenerateBillForm {
    pub fn to_form(bill: &GenerateBill) -> Self {
        GenerateBillForm {
            amount_pending: num_string(bill.amount_pending),
            send_notification: bool_string(bill.send_notification),
            electricity_unit: num_string(bill.electricity_unit),
            tenant: id_string(bill.tenant.as_ref().and_then(|t| t.id)),
        }
    }

    pub fn from_form(&self, id: Option<i64>) -> Result<GenerateBill, FormErrors> {
        let mut errors = FormErrors::default();
        let bill = GenerateBill {
            id,
            amount_pending: number(&mut errors, "amount_pending", &self.amount_pending),
            send_notification: Some(checked(&self.send_notification)),
            electricity_unit: number(&mut errors, "electricity_unit", &self.electricity_unit),
            tenant: reference::<Tenant>(&mut errors, "tenant", &self.tenant),
        };
        errors.finish(bill)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn building_requires_name_and_address() {
        let errors = BuildingForm::default().from_form(None).unwrap_err();
        assert!(errors.get("building_name").is_some());
        assert!(errors.get("address").is_some());
    }

    #[test]
    fn building_address_is_embedded_by_identifier() {
        let form = BuildingForm {
            building_name: " North Block ".into(),
            address: "4".into(),
        };
        let building = form.from_form(Some(2)).unwrap();
        assert_eq!(building.id, Some(2));
        assert_eq!(building.building_name.as_deref(), Some("North Block"));
        assert_eq!(building.address.and_then(|a| a.id), Some(4));
    }

    #[test]
    fn room_tenant_is_optional() {
        let form = RoomForm {
            room_name: "A1".into(),
            building: "3".into(),
            ..Default::default()
        };
        let room = form.from_form(None).unwrap();
        assert!(room.tenant.is_none());
        assert_eq!(room.building.and_then(|b| b.id), Some(3));
    }

    #[test]
    fn bad_select_value_is_reported() {
        let form = RoomForm {
            room_name: "A1".into(),
            building: "abc".into(),
            ..Default::default()
        };
        let errors = form.from_form(None).unwrap_err();
        assert!(errors.get("building").is_some());
    }

    fn valid_tenant_form() -> TenantForm {
        TenantForm {
            tenant_name: "Asha".into(),
            address_proof: STANDARD.encode(b"%PDF-1.4"),
            address_proof_content_type: "application/pdf".into(),
            phone_number: "9876543210".into(),
            rent_start_date: "2022-04-01".into(),
            rent_amount: "8500".into(),
            electricity_unit_rate: "8".into(),
            starting_electricity_unit: "1200.5".into(),
            send_notification: "true".into(),
            location: "6".into(),
            ..Default::default()
        }
    }

    #[test]
    fn tenant_form_maps_back_and_forth() {
        let tenant = valid_tenant_form().from_form(Some(1)).unwrap();
        assert_eq!(tenant.rent_start_date, NaiveDate::from_ymd_opt(2022, 4, 1));
        assert_eq!(tenant.rent_amount, Some(8500.0));
        assert_eq!(tenant.electricity_unit_rate, Some(8));
        assert_eq!(tenant.send_notification, Some(true));
        assert_eq!(tenant.month_end_calculation, Some(false));
        assert_eq!(tenant.location.as_ref().and_then(|l| l.id), Some(6));

        let again = TenantForm::to_form(&tenant);
        assert_eq!(again.rent_start_date, "2022-04-01");
        assert_eq!(again.rent_amount, "8500");
        assert_eq!(again.send_notification, "true");
        assert_eq!(again.month_end_calculation, "");
    }

    #[test]
    fn malformed_rent_date_is_dropped_silently() {
        let form = TenantForm {
            rent_start_date: "2022-02-30".into(),
            ..valid_tenant_form()
        };
        let tenant = form.from_form(None).unwrap();
        assert_eq!(tenant.rent_start_date, None);
        let wire = serde_json::to_value(&tenant).unwrap();
        assert!(wire.get("rentStartDate").is_none());
    }

    #[test]
    fn tenant_validation_failures() {
        let form = TenantForm {
            rent_amount: "lots".into(),
            any_other_details: "x".repeat(DETAILS_MAX_LEN + 1),
            address_proof: "***".into(),
            phone_number: String::new(),
            ..valid_tenant_form()
        };
        let errors = form.from_form(None).unwrap_err();
        assert!(errors.get("rent_amount").is_some());
        assert!(errors.get("any_other_details").is_some());
        assert!(errors.get("address_proof").is_some());
        assert!(errors.get("phone_number").is_some());
        assert!(errors.get("tenant_name").is_none());
    }

    #[test]
    fn blank_document_type_falls_back_to_octet_stream() {
        let form = TenantForm {
            address_proof: STANDARD.encode(b"scan"),
            address_proof_content_type: " ".into(),
            ..valid_tenant_form()
        };
        let tenant = form.from_form(None).unwrap();
        assert_eq!(
            tenant.address_proof_content_type.as_deref(),
            Some(DEFAULT_CONTENT_TYPE)
        );

        let form = TenantForm {
            address_proof: String::new(),
            address_proof_content_type: String::new(),
            ..valid_tenant_form()
        };
        let errors = form.from_form(None).unwrap_err();
        assert!(errors.get("address_proof").is_some());
        assert!(errors.get("address_proof_content_type").is_none());
    }

    #[test]
    fn location_country_must_be_known() {
        let form = LocationForm {
            country: "ATLANTIS".into(),
            ..Default::default()
        };
        assert!(form.from_form(None).unwrap_err().get("country").is_some());

        let form = LocationForm {
            city: "Pune".into(),
            country: "INDIA".into(),
            ..Default::default()
        };
        let location = form.from_form(None).unwrap();
        assert_eq!(location.country, Some(Country::India));
        assert_eq!(location.street_address, None);
    }

    #[test]
    fn bill_fields_are_optional() {
        let bill = GenerateBillForm::default().from_form(None).unwrap();
        assert_eq!(bill.send_notification, Some(false));
        assert!(bill.tenant.is_none());
        assert!(bill.amount_pending.is_none());
    }

    #[test]
    fn select_options_mark_the_selection() {
        let buildings = vec![
            Building {
                id: Some(1),
                building_name: Some("A".into()),
                ..Default::default()
            },
            Building::default(),
            Building {
                id: Some(2),
                ..Default::default()
            },
        ];
        let options = select_options(&buildings, "2");
        assert_eq!(options.len(), 2);
        assert!(!options[0].selected);
        assert!(options[1].selected);
        assert_eq!(options[0].label, "A (#1)");
    }
}
