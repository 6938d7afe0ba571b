//! Hardware part candidates and the structured answer returned by the model.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::category::CategoryKey;
use crate::price::extract_price;

/// Reason a raw component entry was rejected during validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidComponent {
    /// The entry was not a JSON object.
    #[error("component entry is not an object")]
    NotAnObject,
    /// A required field was absent.
    #[error("component field `{field}` is missing")]
    MissingField {
        /// Name of the missing field.
        field: &'static str,
    },
    /// A field had the wrong JSON type.
    #[error("component field `{field}` has the wrong type")]
    WrongType {
        /// Name of the mistyped field.
        field: &'static str,
    },
    /// The product name was blank.
    #[error("component name is empty")]
    EmptyName,
}

/// A single hardware part, either a candidate or a selection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    category: String,
    name: String,
    price: String,
    features: Vec<String>,
}

impl Component {
    /// Creates a component from already-validated parts.
    #[must_use]
    pub fn new(
        category: impl Into<String>,
        name: impl Into<String>,
        price: impl Into<String>,
        features: Vec<String>,
    ) -> Self {
        Self {
            category: category.into(),
            name: name.into(),
            price: price.into(),
            features,
        }
    }

    /// Validates a raw JSON entry from the model.
    ///
    /// All four fields must be present and correctly typed. Nothing is defaulted.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidComponent`] describing the first field that failed.
    pub fn from_value(value: &Value) -> Result<Self, InvalidComponent> {
        let object = value.as_object().ok_or(InvalidComponent::NotAnObject)?;

        let string_field = |field: &'static str| -> Result<String, InvalidComponent> {
            match object.get(field) {
                None => Err(InvalidComponent::MissingField { field }),
                Some(Value::String(text)) => Ok(text.clone()),
                Some(_) => Err(InvalidComponent::WrongType { field }),
            }
        };

        let category = string_field("category")?;
        let name = string_field("name")?;
        let price = string_field("price")?;

        let features = match object.get("features") {
            None => return Err(InvalidComponent::MissingField { field: "features" }),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_owned)
                        .ok_or(InvalidComponent::WrongType { field: "features" })
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => return Err(InvalidComponent::WrongType { field: "features" }),
        };

        if name.trim().is_empty() {
            return Err(InvalidComponent::EmptyName);
        }

        Ok(Self {
            category,
            name,
            price,
            features,
        })
    }

    /// Returns the category label as given by the model.
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Returns the selection slot for this component.
    #[must_use]
    pub fn category_key(&self) -> CategoryKey {
        CategoryKey::from_label(&self.category)
    }

    /// Returns the product display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the display price string.
    #[must_use]
    pub fn price(&self) -> &str {
        &self.price
    }

    /// Returns the numeric price extracted from the display string.
    #[must_use]
    pub fn price_value(&self) -> u64 {
        extract_price(&self.price)
    }

    /// Returns the short feature keywords.
    #[must_use]
    pub fn features(&self) -> &[String] {
        &self.features
    }
}

/// Structured answer for one recommendation request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiResponse {
    /// Conversational analysis shown as the model's chat turn.
    pub analysis: String,
    /// Valid candidate components, in the order the model listed them.
    pub components: Vec<Component>,
}
