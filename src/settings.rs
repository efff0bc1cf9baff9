//! Session settings: the API credential and the root label override.
//!
//! Held in memory for the session only, never written anywhere.

use crate::oracle::OracleConfig;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserSettings {
	pub api_key: String,
	pub root_label: Option<String>,
}

impl UserSettings {
	/// Builds settings from the raw form fields. Blank fields count as unset.
	pub fn from_form(api_key: &str, root_label: &str) -> Self {
		let root_label = root_label.trim();
		Self {
			api_key: api_key.trim().to_owned(),
			root_label: (!root_label.is_empty()).then(|| root_label.to_owned()),
		}
	}

	pub fn has_api_key(&self) -> bool {
		!self.api_key.is_empty()
	}

	pub fn root_label(&self) -> Option<&str> {
		self.root_label.as_deref()
	}
}

/// Everything an expansion needs from the session, cloned at activation time.
#[derive(Clone, Debug, Default)]
pub struct Session {
	pub user: UserSettings,
	pub oracle: OracleConfig,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn form_fields_are_trimmed() {
		let settings = UserSettings::from_form("  sk-abc \n", "  Chef ");
		assert_eq!(settings.api_key, "sk-abc");
		assert_eq!(settings.root_label(), Some("Chef"));
		assert!(settings.has_api_key());
	}

	#[test]
	fn blank_root_label_is_unset() {
		let settings = UserSettings::from_form("", "   ");
		assert_eq!(settings.root_label(), None);
		assert!(!settings.has_api_key());
	}
}
