use crate::entity::Entity;
use crate::gateway::{ApiError, Repository};

/// Outcome of resolving the entity a detail or form view works on.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved<E> {
    Found(E),
    /// The caller is expected to send the user to the not-found page.
    NotFound,
}

impl<E> Resolved<E> {
    pub fn found(self) -> Option<E> {
        match self {
            Resolved::Found(entity) => Some(entity),
            Resolved::NotFound => None,
        }
    }
}

/// Fetches the entity named by `id`, or hands out a blank one when there is
/// no identifier (create forms). Transport errors are returned untouched.
pub async fn resolve<E: Entity>(
    repository: &Repository<E>,
    id: Option<i64>,
) -> Result<Resolved<E>, ApiError> {
    let Some(id) = id else {
        return Ok(Resolved::Found(E::default()));
    };
    match repository.find(id).await? {
        Some(entity) => Ok(Resolved::Found(entity)),
        None => {
            log::warn!("{} with id {} not found", E::TITLE, id);
            Ok(Resolved::NotFound)
        }
    }
}
