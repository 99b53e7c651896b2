use std::fs;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::paths::Paths;
use crate::vdf::parse_text_vdf;

/// A locally logged-in Steam account from `loginusers.vdf`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalUser {
    pub account_name: String,
    pub id: String,
}

/// Returns the accounts that have logged into this Steam install.
///
/// Best-effort: a missing or unparseable `loginusers.vdf` yields an empty
/// list (the user can still enter an account manually), never an error.
pub fn local_users(paths: &Paths) -> Vec<LocalUser> {
    let path = paths.loginusers_path();
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not read login index");
            return Vec::new();
        }
    };

    let root = match parse_text_vdf(&content) {
        Ok(root) => root,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not parse login index");
            return Vec::new();
        }
    };

    let Some(users) = root.get("users") else {
        return Vec::new();
    };

    let mut out = Vec::new();
    for (id, data) in users.entries() {
        // Entries are keyed by 64-bit Steam id; anything else is noise.
        if id.parse::<u64>().is_err() {
            continue;
        }
        if let Some(name) = data.get("AccountName").and_then(|v| v.as_str())
            && !name.is_empty()
        {
            out.push(LocalUser {
                account_name: name.to_string(),
                id: id.clone(),
            });
        }
    }

    out
}
