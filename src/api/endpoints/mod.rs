pub mod admin;
pub mod appointments;
pub mod health;
pub mod notifications;
pub mod payments;
pub mod requests;

use serde::Deserialize;
use uuid::Uuid;

/// Owner scoping for list endpoints. Identity arrives from the external
/// auth collaborator as a plain user id.
#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: Uuid,
}
