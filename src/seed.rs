//! Default accounts for a fresh installation.

use crate::domain::{RepositoryPtr, Role, User};
use crate::password::hash_password;
use anyhow::Result;

/// (username, full name, role) of every seeded account.
pub const DEFAULT_USERS: [(&str, &str, Role); 4] = [
    ("admin", "Administrator", Role::Admin),
    ("user1", "John Doe", Role::User),
    ("user2", "Jane Smith", Role::User),
    ("user3", "Bob Johnson", Role::User),
];

/// Creates the default accounts that do not exist yet.
///
/// Existing accounts are left untouched, so running the seed twice is harmless.
/// Returns the accounts as stored, whether newly created or pre-existing.
pub async fn seed_default_users(
    repository: &RepositoryPtr,
    admin_password: &str,
    user_password: &str,
) -> Result<Vec<User>> {
    // ---
    let admin_hash = hash_password(admin_password)?;
    let user_hash = hash_password(user_password)?;
    let mut seeded = Vec::with_capacity(DEFAULT_USERS.len());

    for (username, full_name, role) in DEFAULT_USERS {
        // ---
        if let Some(existing) = repository.get_user_by_username(username).await? {
            tracing::info!("User already present: {username}");
            seeded.push(existing);
            continue;
        }

        let hash = if role.is_admin() { &admin_hash } else { &user_hash };
        let user = repository
            .create_user(User::new(
                username.to_string(),
                full_name.to_string(),
                hash.clone(),
                role,
            ))
            .await?;

        tracing::info!("Created {role} user: {username}");
        seeded.push(user);
    }

    Ok(seeded)
}
