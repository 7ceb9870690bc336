use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// A role row: `roles(id, name)` with a unique name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleRecord {
    pub id: RecordId,
    pub name: String,
}

/// A user row: `users(id, username, role_id)`.
///
/// `role_id` is a plain foreign-key value pointing at `roles`; there is no
/// back-reference from a role to its users, membership is queried by value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: RecordId,
    pub username: String,
    #[serde(default)]
    pub role_id: Option<RecordId>,
}

/// Insert payload for `roles`.
#[derive(Debug, Serialize)]
pub(crate) struct NewRole {
    pub name: String,
}

/// Insert payload for `users`.
#[derive(Debug, Serialize)]
pub(crate) struct NewUser {
    pub username: String,
    pub role_id: Option<RecordId>,
}
