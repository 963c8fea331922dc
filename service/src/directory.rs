//! Resolution of role targets into recipient user ids.

use async_trait::async_trait;
use dashmap::DashMap;
use entity::Id;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, PartialEq, Eq)]
pub enum DirectoryError {
    UnknownRole(Id),
}

impl fmt::Display for DirectoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectoryError::UnknownRole(role_id) => write!(f, "unknown role {role_id}"),
        }
    }
}

impl std::error::Error for DirectoryError {}

/// Looks up which users belong to a role.
///
/// Implementations may be backed by a remote user service, hence async.
#[async_trait]
pub trait RecipientResolver: Send + Sync {
    async fn members_of_role(&self, role_id: Id) -> Result<Vec<Id>, DirectoryError>;
}

/// One role and its members, as given on the command line: `<role>=<user>,<user>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoleMembers {
    pub role_id: Id,
    pub user_ids: Vec<Id>,
}

impl FromStr for RoleMembers {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (role, users) = value
            .split_once('=')
            .ok_or_else(|| format!("expected <role>=<user>[,<user>...], got {value:?}"))?;

        let role_id = role
            .trim()
            .parse::<Id>()
            .map_err(|e| format!("invalid role id {role:?}: {e}"))?;

        let user_ids = users
            .split(',')
            .map(str::trim)
            .filter(|user| !user.is_empty())
            .map(|user| {
                user.parse::<Id>()
                    .map_err(|e| format!("invalid user id {user:?}: {e}"))
            })
            .collect::<Result<Vec<Id>, String>>()?;

        Ok(Self { role_id, user_ids })
    }
}

/// In-process role directory.
pub struct RoleDirectory {
    roles: DashMap<Id, Vec<Id>>,
}

impl RoleDirectory {
    pub fn new() -> Self {
        Self {
            roles: DashMap::new(),
        }
    }

    pub fn from_members(members: &[RoleMembers]) -> Self {
        let directory = Self::new();
        for role in members {
            for user_id in &role.user_ids {
                directory.assign(role.role_id, *user_id);
            }
            // Roles listed without members still exist
            directory.roles.entry(role.role_id).or_default();
        }
        directory
    }

    /// Adds a user to a role, creating the role if needed. Idempotent.
    pub fn assign(&self, role_id: Id, user_id: Id) {
        let mut members = self.roles.entry(role_id).or_default();
        if !members.contains(&user_id) {
            members.push(user_id);
        }
    }

    pub fn role_count(&self) -> usize {
        self.roles.len()
    }
}

impl Default for RoleDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecipientResolver for RoleDirectory {
    async fn members_of_role(&self, role_id: Id) -> Result<Vec<Id>, DirectoryError> {
        self.roles
            .get(&role_id)
            .map(|members| members.value().clone())
            .ok_or(DirectoryError::UnknownRole(role_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_role_members() {
        let role: RoleMembers = "7= 100, 101,".parse().unwrap();

        assert_eq!(role.role_id, 7);
        assert_eq!(role.user_ids, vec![100, 101]);
    }

    #[test]
    fn test_parse_role_members_rejects_bad_input() {
        assert!("7".parse::<RoleMembers>().is_err());
        assert!("admins=1".parse::<RoleMembers>().is_err());
        assert!("7=one".parse::<RoleMembers>().is_err());
    }

    #[tokio::test]
    async fn test_members_of_role() {
        let directory = RoleDirectory::from_members(&[
            RoleMembers {
                role_id: 1,
                user_ids: vec![100, 101, 100],
            },
            RoleMembers {
                role_id: 2,
                user_ids: vec![],
            },
        ]);
        directory.assign(2, 102);

        assert_eq!(directory.members_of_role(1).await.unwrap(), vec![100, 101]);
        assert_eq!(directory.members_of_role(2).await.unwrap(), vec![102]);
        assert_eq!(
            directory.members_of_role(3).await,
            Err(DirectoryError::UnknownRole(3))
        );
        assert_eq!(directory.role_count(), 2);
    }
}
