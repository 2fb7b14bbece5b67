use core::fmt;
use std::{collections::BTreeSet, fmt::Display};

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum PermissionLevel {
    Admin,
    Everyone,
}

impl Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PermissionLevel::Admin => "admin",
            PermissionLevel::Everyone => "everyone",
        };
        write!(f, "{}", s)
    }
}

/// Who is an admin, and which canonical commands only admins may run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrivilegeRegistry {
    admins: BTreeSet<String>,
    privileged: BTreeSet<String>,
}

impl PrivilegeRegistry {
    pub fn new<A, P>(admins: A, privileged: P) -> Self
    where
        A: IntoIterator<Item = String>,
        P: IntoIterator<Item = String>,
    {
        Self {
            admins: admins.into_iter().collect(),
            privileged: privileged.into_iter().collect(),
        }
    }

    /// Exact, case-sensitive match on the username.
    pub fn is_admin(&self, username: &str) -> bool {
        self.admins.contains(username)
    }

    pub fn is_privileged(&self, command: &str) -> bool {
        self.privileged.contains(command)
    }

    pub fn list_admins(&self) -> Vec<&str> {
        self.admins.iter().map(String::as_str).collect()
    }

    pub fn required_level(&self, command: &str) -> PermissionLevel {
        if self.is_privileged(command) {
            PermissionLevel::Admin
        } else {
            PermissionLevel::Everyone
        }
    }

    pub fn has_permission(&self, username: &str, required: PermissionLevel) -> bool {
        match required {
            PermissionLevel::Everyone => true,
            PermissionLevel::Admin => self.is_admin(username),
        }
    }
}
