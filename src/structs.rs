use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::dates;

/// Administrator account, stored locally in sqlite.
#[derive(Deserialize, Serialize, Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub created_at: String,
    pub updated_at: String,
    pub email: String,
    pub pwd_hash: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Country {
    India,
    Nepal,
    Bangladesh,
    SriLanka,
    UnitedStates,
    UnitedKingdom,
    Other,
}

impl Country {
    pub const ALL: [Country; 7] = [
        Country::India,
        Country::Nepal,
        Country::Bangladesh,
        Country::SriLanka,
        Country::UnitedStates,
        Country::UnitedKingdom,
        Country::Other,
    ];

    /// Wire name, also used as the form value.
    pub fn code(&self) -> &'static str {
        match self {
            Country::India => "INDIA",
            Country::Nepal => "NEPAL",
            Country::Bangladesh => "BANGLADESH",
            Country::SriLanka => "SRI_LANKA",
            Country::UnitedStates => "UNITED_STATES",
            Country::UnitedKingdom => "UNITED_KINGDOM",
            Country::Other => "OTHER",
        }
    }

    pub fn from_code(code: &str) -> Option<Country> {
        Country::ALL.into_iter().find(|c| c.code() == code)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_province: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<Country>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Building {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub building_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Location>,
    /// Rooms of the building. The API names this side of the relation
    /// `buildings`.
    #[serde(rename = "buildings", default, skip_serializing_if = "Vec::is_empty")]
    pub rooms: Vec<Room>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub building: Option<Building>,
    #[serde(rename = "tenants", skip_serializing_if = "Option::is_none")]
    pub tenant: Option<Tenant>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_name: Option<String>,
    /// Identity document, base64 encoded.
    #[serde(rename = "addressProff", skip_serializing_if = "Option::is_none")]
    pub address_proof: Option<String>,
    #[serde(
        rename = "addressProffContentType",
        skip_serializing_if = "Option::is_none"
    )]
    pub address_proof_content_type: Option<String>,
    #[serde(rename = "numberofFamilyMembers", skip_serializing_if = "Option::is_none")]
    pub family_members: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(
        default,
        with = "dates::optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub rent_start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rent_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub electricity_unit_rate: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starting_electricity_unit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub any_other_details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub send_notification: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact_number: Option<String>,
    #[serde(rename = "outStandingAmount", skip_serializing_if = "Option::is_none")]
    pub outstanding_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month_end_calculation: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calculate_on_date: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calculated_for_current_month: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rooms: Vec<Room>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generate_bills: Vec<GenerateBill>,
}

impl Default for Tenant {
    fn default() -> Self {
        Tenant {
            id: None,
            tenant_name: None,
            address_proof: None,
            address_proof_content_type: None,
            family_members: None,
            phone_number: None,
            rent_start_date: None,
            rent_amount: None,
            electricity_unit_rate: None,
            starting_electricity_unit: None,
            any_other_details: None,
            send_notification: Some(false),
            email_address: None,
            emergency_contact_number: None,
            outstanding_amount: None,
            month_end_calculation: Some(false),
            calculate_on_date: Some(false),
            calculated_for_current_month: None,
            location: None,
            rooms: Vec::new(),
            generate_bills: Vec::new(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateBill {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_pending: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub send_notification: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub electricity_unit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant: Option<Tenant>,
}

impl Default for GenerateBill {
    fn default() -> Self {
        GenerateBill {
            id: None,
            amount_pending: None,
            send_notification: Some(false),
            electricity_unit: None,
            tenant: None,
        }
    }
}
