//! Request-side types: the new-user record and the operation identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fields for creating a user.
///
/// Only `userid` is required. Empty scalar fields are left out of the
/// request; `groups` and `subadmin` become repeated `groups[]` /
/// `subadmin[]` form fields in the order given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewUser {
    pub userid: String,
    pub password: String,
    pub display_name: String,
    pub email: String,
    /// Quota string as the server understands it, e.g. `"5 GB"` or `"none"`.
    pub quota: String,
    pub language: String,
    pub groups: Vec<String>,
    /// Groups in which the new user is granted subadmin rights.
    pub subadmin: Vec<String>,
}

impl NewUser {
    pub fn new(userid: impl Into<String>) -> Self {
        Self {
            userid: userid.into(),
            ..Self::default()
        }
    }

    /// Form fields in wire order, empties omitted.
    pub(crate) fn form_fields(&self) -> Vec<(&'static str, &str)> {
        let mut fields = vec![("userid", self.userid.as_str())];
        let optional = [
            ("password", &self.password),
            ("displayName", &self.display_name),
            ("email", &self.email),
            ("quota", &self.quota),
            ("language", &self.language),
        ];
        fields.extend(
            optional
                .into_iter()
                .filter(|(_, value)| !value.is_empty())
                .map(|(name, value)| (name, value.as_str())),
        );
        fields.extend(self.groups.iter().map(|group| ("groups[]", group.as_str())));
        fields.extend(self.subadmin.iter().map(|group| ("subadmin[]", group.as_str())));
        fields
    }
}

/// Identifies which client operation issued a request. Carried by every
/// error and log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListUsers,
    GetUser,
    AddUser,
    AddUserSimple,
    DeleteUser,
    ListUserGroups,
    AddUserToGroup,
    RemoveUserFromGroup,
    ResendWelcomeEmail,
    DisableUser,
    EnableUser,
    ListGroups,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::ListUsers => "list_users",
            Operation::GetUser => "get_user",
            Operation::AddUser => "add_user",
            Operation::AddUserSimple => "add_user_simple",
            Operation::DeleteUser => "delete_user",
            Operation::ListUserGroups => "list_user_groups",
            Operation::AddUserToGroup => "add_user_to_group",
            Operation::RemoveUserFromGroup => "remove_user_from_group",
            Operation::ResendWelcomeEmail => "resend_welcome_email",
            Operation::DisableUser => "disable_user",
            Operation::EnableUser => "enable_user",
            Operation::ListGroups => "list_groups",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
