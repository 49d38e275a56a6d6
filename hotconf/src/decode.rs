//! Decoding merged trees into typed targets.
//!
//! Decoding uses replace semantics: a complete new value is built from the
//! merged tree and only then assigned to the target. A field missing from the
//! tree therefore takes whatever default the target type's `Deserialize`
//! implementation gives it (e.g. `#[serde(default)]`), not its previous
//! value. Because the tree is always the full layered merge, deleting a key
//! from an overlay makes the field fall back to the base file's value on the
//! next reload.

use serde::de::DeserializeOwned;
use serde_yaml::Value;

use crate::error::{Error, Result};
use crate::name::ConfigName;

/// Builds a `T` from `tree`.
///
/// # Errors
///
/// Returns [`Error::Decode`] if the tree does not fit `T`.
pub fn decode<T: DeserializeOwned>(name: &ConfigName, tree: &Value) -> Result<T> {
    serde_yaml::from_value(tree.clone()).map_err(|e| Error::Decode {
        name: name.to_string(),
        source: e,
    })
}

/// Decodes `tree` into `target`, leaving `target` untouched on failure.
///
/// # Errors
///
/// Returns [`Error::Decode`] if the tree does not fit `T`.
///
/// # Examples
///
/// ```
/// use hotconf::{decode_into, ConfigName};
/// use serde::Deserialize;
///
/// #[derive(Debug, Default, Deserialize, PartialEq)]
/// #[serde(default)]
/// struct Events {
///     topic: String,
///     retries: u32,
/// }
///
/// let name = ConfigName::new("events").unwrap();
/// let mut target = Events { topic: "old".into(), retries: 9 };
///
/// let tree = serde_yaml::from_str("topic: orders").unwrap();
/// decode_into(&name, &tree, &mut target).unwrap();
///
/// // retries was absent from the tree, so it took its default
/// assert_eq!(target, Events { topic: "orders".into(), retries: 0 });
/// ```
pub fn decode_into<T: DeserializeOwned>(
    name: &ConfigName,
    tree: &Value,
    target: &mut T,
) -> Result<()> {
    *target = decode(name, tree)?;
    Ok(())
}
