//! Contact directory model.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

/// How a single user can be reached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMethods {
    /// Email address, unvalidated.
    #[serde(
        default,
        deserialize_with = "scalar_as_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub email: Option<String>,
    /// Mobile number as written in the file; integers become their decimal
    /// string.
    #[serde(
        default,
        deserialize_with = "scalar_as_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub mobile: Option<String>,
}

/// Users and groups known to the notifier. Immutable once loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDirectory {
    /// User name to contact methods.
    #[serde(default)]
    pub users: BTreeMap<String, ContactMethods>,
    /// Group name to member user names.
    #[serde(default)]
    pub groups: BTreeMap<String, Vec<String>>,
}

impl ContactDirectory {
    /// Returns true if the directory has neither users nor groups.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.groups.is_empty()
    }

    /// Looks up a user.
    #[must_use]
    pub fn user(&self, name: &str) -> Option<&ContactMethods> {
        self.users.get(name)
    }

    /// Returns the contact methods of every known member of a group.
    ///
    /// Members that are not users are skipped. `None` if the group does not
    /// exist.
    #[must_use]
    pub fn group_members(&self, name: &str) -> Option<Vec<&ContactMethods>> {
        self.groups.get(name).map(|members| {
            members
                .iter()
                .filter_map(|member| self.users.get(member))
                .collect()
        })
    }
}

/// Reads any JSON value as its string form. Strings are taken verbatim;
/// anything else is kept as written and left for the sanitizers to reject,
/// so one odd entry never fails the whole directory.
fn scalar_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Number(n) if n.is_u64() || n.is_i64() => Some(n.to_string()),
        other => {
            warn!(value = %other, "unexpected contact value type, treating it as text");
            Some(other.to_string())
        }
    })
}
