use crate::auth::Role;

///
/// Identity of the logged-in user, as known to the embedding application.
/// The token is an opaque bearer credential, validated by the backend only.
///
#[derive(Clone, Debug)]
pub struct UserIdentity {
    pub user_id: String,
    pub role: Role,
    pub token: String,
}
