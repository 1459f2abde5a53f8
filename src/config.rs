use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::*;

/// Where the widget finds its controls on the page.
///
/// Every field has a default matching the bird list page, so a partial TOML
/// document only needs to name what differs:
///
/// ```toml
/// list_id = "speciesList"
/// toggle_selector = "input[type=checkbox]"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// Id of the text input supplying the search term.
    pub input_id: String,
    /// Id of the list container whose rows are filtered.
    pub list_id: String,
    /// Class carried by every row inside the list container.
    pub row_class: String,
    /// Selector for the toggle control, evaluated inside each row.
    pub toggle_selector: String,
    pub select_all_id: String,
    pub deselect_all_id: String,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            input_id: "searchInput".into(),
            list_id: "birdList".into(),
            row_class: "list-group-item".into(),
            toggle_selector: "input".into(),
            select_all_id: "selectAllBirds".into(),
            deselect_all_id: "deselectAllBirds".into(),
        }
    }
}

impl WidgetConfig {
    pub fn from_toml_str(src: &str) -> Result<Self> {
        let config: Self = toml::from_str(src).map_err(|err| Error::Config {
            reason: err.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let src = fs::read_to_string(path).map_err(|err| Error::Config {
            reason: format!("failed to read {}: {err}", path.display()),
        })?;
        Self::from_toml_str(&src)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|err| Error::Config {
            reason: err.to_string(),
        })
    }

    /// Rejects blank ids, a blank row class, and a toggle selector the
    /// selector engine cannot evaluate.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("input_id", &self.input_id),
            ("list_id", &self.list_id),
            ("row_class", &self.row_class),
            ("select_all_id", &self.select_all_id),
            ("deselect_all_id", &self.deselect_all_id),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(Error::Config {
                    reason: format!("{field} must not be empty"),
                });
            }
            if value.chars().any(char::is_whitespace) {
                return Err(Error::Config {
                    reason: format!("{field} must not contain whitespace: {value:?}"),
                });
            }
        }

        validate_selector(&self.toggle_selector).map_err(|err| Error::Config {
            reason: format!("toggle_selector: {err}"),
        })
    }
}
