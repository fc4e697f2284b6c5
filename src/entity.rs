use std::fmt::Debug;

use serde::{de::DeserializeOwned, Serialize};

use crate::structs::{Building, GenerateBill, Location, Owner, Room, Tenant};

/// A record of the rent-management API.
///
/// `Default` is the blank entity a create form starts from. The identifier is
/// assigned by the backend, so its absence means "not persisted yet".
pub trait Entity:
    Serialize + DeserializeOwned + Default + Clone + Debug + Send + Sync + 'static
{
    /// Collection name under `api/`, e.g. `generate-bills`.
    const RESOURCE: &'static str;
    /// Route segment of the admin views, e.g. `generate-bill`. Also the
    /// template directory.
    const ROUTE: &'static str;
    const TITLE: &'static str;

    fn id(&self) -> Option<i64>;

    /// The identifier-only shape used to embed a relationship.
    fn reference(id: i64) -> Self;

    /// Human readable label for select options.
    fn label(&self) -> String {
        match self.id() {
            Some(id) => format!("{} #{}", Self::TITLE, id),
            None => format!("New {}", Self::TITLE),
        }
    }
}

fn with_name(id: Option<i64>, name: Option<&str>, fallback: String) -> String {
    match (id, name) {
        (Some(id), Some(name)) if !name.is_empty() => format!("{name} (#{id})"),
        _ => fallback,
    }
}

impl Entity for Location {
    const RESOURCE: &'static str = "locations";
    const ROUTE: &'static str = "location";
    const TITLE: &'static str = "Location";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn reference(id: i64) -> Self {
        Self {
            id: Some(id),
            ..Default::default()
        }
    }

    fn label(&self) -> String {
        let parts: Vec<&str> = [&self.street_address, &self.city, &self.postal_code]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .filter(|p| !p.is_empty())
            .collect();
        match (self.id, parts.is_empty()) {
            (Some(id), false) => format!("{} (#{id})", parts.join(", ")),
            (Some(id), true) => format!("Location #{id}"),
            (None, _) => "New Location".to_owned(),
        }
    }
}

impl Entity for Building {
    const RESOURCE: &'static str = "buildings";
    const ROUTE: &'static str = "building";
    const TITLE: &'static str = "Building";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn reference(id: i64) -> Self {
        Self {
            id: Some(id),
            ..Default::default()
        }
    }

    fn label(&self) -> String {
        with_name(
            self.id,
            self.building_name.as_deref(),
            format!("Building #{}", self.id.unwrap_or_default()),
        )
    }
}

impl Entity for Room {
    const RESOURCE: &'static str = "rooms";
    const ROUTE: &'static str = "room";
    const TITLE: &'static str = "Room";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn reference(id: i64) -> Self {
        Self {
            id: Some(id),
            ..Default::default()
        }
    }

    fn label(&self) -> String {
        with_name(
            self.id,
            self.room_name.as_deref(),
            format!("Room #{}", self.id.unwrap_or_default()),
        )
    }
}

impl Entity for Owner {
    const RESOURCE: &'static str = "owners";
    const ROUTE: &'static str = "owner";
    const TITLE: &'static str = "Owner";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn reference(id: i64) -> Self {
        Self {
            id: Some(id),
            ..Default::default()
        }
    }
}

impl Entity for Tenant {
    const RESOURCE: &'static str = "tenants";
    const ROUTE: &'static str = "tenant";
    const TITLE: &'static str = "Tenant";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn reference(id: i64) -> Self {
        Self {
            id: Some(id),
            send_notification: None,
            month_end_calculation: None,
            calculate_on_date: None,
            ..Default::default()
        }
    }

    fn label(&self) -> String {
        with_name(
            self.id,
            self.tenant_name.as_deref(),
            format!("Tenant #{}", self.id.unwrap_or_default()),
        )
    }
}

impl Entity for GenerateBill {
    const RESOURCE: &'static str = "generate-bills";
    const ROUTE: &'static str = "generate-bill";
    const TITLE: &'static str = "Generate Bill";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn reference(id: i64) -> Self {
        Self {
            id: Some(id),
            send_notification: None,
            ..Default::default()
        }
    }
}
