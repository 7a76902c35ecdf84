use axum::http::Method;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use super::AuthError;

/// Coarse permission class attached to every user.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Writer,
    Editor,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Writer => "writer",
            Role::Editor => "editor",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Role::User),
            "writer" => Ok(Role::Writer),
            "editor" => Ok(Role::Editor),
            "admin" => Ok(Role::Admin),
            other => Err(AuthError::InvalidRole(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Read,
    Create,
    Update,
    Delete,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Read => "read",
            Permission::Create => "create",
            Permission::Update => "update",
            Permission::Delete => "delete",
        }
    }

    /// Permission required to perform an HTTP verb against a collection.
    pub fn for_method(method: &Method) -> Option<Self> {
        match *method {
            Method::GET | Method::HEAD => Some(Permission::Read),
            Method::POST => Some(Permission::Create),
            Method::PUT => Some(Permission::Update),
            Method::DELETE => Some(Permission::Delete),
            _ => None,
        }
    }
}

impl FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "read" => Ok(Permission::Read),
            "create" => Ok(Permission::Create),
            "update" => Ok(Permission::Update),
            "delete" => Ok(Permission::Delete),
            other => Err(format!("unknown permission '{}'", other)),
        }
    }
}

/// Static role → permission table consulted by the v2 authorization check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControl {
    roles: BTreeMap<Role, BTreeSet<Permission>>,
}

impl AccessControl {
    pub fn new(roles: BTreeMap<Role, BTreeSet<Permission>>) -> Self {
        Self { roles }
    }

    pub fn allows(&self, role: Role, permission: Permission) -> bool {
        self.roles
            .get(&role)
            .is_some_and(|granted| granted.contains(&permission))
    }

    pub fn permissions(&self, role: Role) -> impl Iterator<Item = Permission> + '_ {
        self.roles.get(&role).into_iter().flatten().copied()
    }

    /// Parse `role=perm,perm;role=perm`. Roles left out are granted nothing.
    pub fn parse(table: &str) -> Result<Self, String> {
        let mut roles = BTreeMap::new();

        for entry in table.split(';').map(str::trim).filter(|e| !e.is_empty()) {
            let (role, perms) = entry
                .split_once('=')
                .ok_or_else(|| format!("expected role=permissions, got '{}'", entry))?;
            let role: Role = role.parse().map_err(|e: AuthError| e.to_string())?;
            let perms = perms
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(Permission::from_str)
                .collect::<Result<BTreeSet<_>, _>>()?;
            roles.insert(role, perms);
        }

        if roles.is_empty() {
            return Err("no roles defined".to_string());
        }
        Ok(Self::new(roles))
    }
}

impl Default for AccessControl {
    fn default() -> Self {
        use Permission::*;

        let roles = BTreeMap::from([
            (Role::User, BTreeSet::from([Read])),
            (Role::Writer, BTreeSet::from([Read, Create])),
            (Role::Editor, BTreeSet::from([Read, Create, Update])),
            (Role::Admin, BTreeSet::from([Read, Create, Update, Delete])),
        ]);
        Self::new(roles)
    }
}
