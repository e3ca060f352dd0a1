use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::DomainError;

/// Length of the hex rendering of a product identifier (12 bytes).
pub const PRODUCT_ID_LEN: usize = 24;

/// Store-generated product identifier: 4 bytes of big-endian Unix seconds
/// followed by 8 random bytes, rendered as lowercase hex.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String)]
pub struct ProductId(pub String);

impl ProductId {
    pub fn generate() -> Self {
        Self::generate_at(Utc::now())
    }

    pub fn generate_at(now: DateTime<Utc>) -> Self {
        let seconds = u32::try_from(now.timestamp()).unwrap_or(u32::MAX);
        let random = Uuid::new_v4();

        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..].copy_from_slice(&random.as_bytes()[8..]);

        Self(bytes.iter().map(|byte| format!("{byte:02x}")).collect())
    }

    /// Accepts exactly 24 hex characters in either case; anything else is not
    /// identifier-shaped.
    pub fn parse(raw: &str) -> Option<Self> {
        let identifier_shaped =
            raw.len() == PRODUCT_ID_LEN && raw.bytes().all(|byte| byte.is_ascii_hexdigit());
        identifier_shaped.then(|| Self(raw.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(as = Produto)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "cor")]
    pub color: String,
    /// Kilograms.
    #[serde(rename = "peso")]
    pub weight: f64,
    #[serde(rename = "tipo")]
    pub category: String,
    #[serde(rename = "preco")]
    pub price: f64,
    #[serde(rename = "dataCadastro")]
    pub registered_at: DateTime<Utc>,
}

impl Product {
    pub fn from_new(id: ProductId, fields: NewProduct, registered_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: fields.name,
            description: fields.description,
            color: fields.color,
            weight: fields.weight,
            category: fields.category,
            price: fields.price,
            registered_at,
        }
    }

    /// Overwrites every field present in `fields`; identifier and
    /// registration time never change.
    pub fn apply(&mut self, fields: &ProductFields) {
        if let Some(name) = &fields.name {
            self.name = name.clone();
        }
        if let Some(description) = &fields.description {
            self.description = description.clone();
        }
        if let Some(color) = &fields.color {
            self.color = color.clone();
        }
        if let Some(weight) = fields.weight {
            self.weight = weight;
        }
        if let Some(category) = &fields.category {
            self.category = category.clone();
        }
        if let Some(price) = fields.price {
            self.price = price;
        }
    }
}

/// The six client-settable fields, validated for creation.
#[derive(Clone, Debug, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub color: String,
    pub weight: f64,
    pub category: String,
    pub price: f64,
}

/// Request body for create and update. Every field is optional on the wire;
/// unknown keys such as `_id` or `dataCadastro` are ignored.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductFields {
    #[serde(rename = "nome", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "descricao", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "cor", default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(rename = "peso", default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(rename = "tipo", default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(rename = "preco", default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

impl ProductFields {
    /// Creation requires all six fields. Empty strings and a zero or
    /// non-finite weight or price count as missing.
    pub fn require_all(self) -> Result<NewProduct, DomainError> {
        let mut missing = Vec::new();

        let name = required_text(self.name, "nome", &mut missing);
        let description = required_text(self.description, "descricao", &mut missing);
        let color = required_text(self.color, "cor", &mut missing);
        let weight = required_number(self.weight, "peso", &mut missing);
        let category = required_text(self.category, "tipo", &mut missing);
        let price = required_number(self.price, "preco", &mut missing);

        match (name, description, color, weight, category, price) {
            (
                Some(name),
                Some(description),
                Some(color),
                Some(weight),
                Some(category),
                Some(price),
            ) if missing.is_empty() => {
                Ok(NewProduct { name, description, color, weight, category, price })
            }
            _ => Err(DomainError::MissingFields(missing)),
        }
    }

    /// Update does not require presence, but a provided text field must not
    /// be empty and a provided number must be finite.
    pub fn check_provided(&self) -> Result<(), DomainError> {
        let text_fields = [
            ("nome", &self.name),
            ("descricao", &self.description),
            ("cor", &self.color),
            ("tipo", &self.category),
        ];
        for (field, value) in text_fields {
            if value.as_deref().is_some_and(str::is_empty) {
                return Err(DomainError::EmptyField(field));
            }
        }
        for (field, value) in [("peso", self.weight), ("preco", self.price)] {
            if value.is_some_and(|number| !number.is_finite()) {
                return Err(DomainError::InvalidNumber(field));
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

impl From<NewProduct> for ProductFields {
    fn from(value: NewProduct) -> Self {
        Self {
            name: Some(value.name),
            description: Some(value.description),
            color: Some(value.color),
            weight: Some(value.weight),
            category: Some(value.category),
            price: Some(value.price),
        }
    }
}

fn required_text(
    value: Option<String>,
    field: &'static str,
    missing: &mut Vec<&'static str>,
) -> Option<String> {
    match value {
        Some(text) if !text.is_empty() => Some(text),
        _ => {
            missing.push(field);
            None
        }
    }
}

fn required_number(
    value: Option<f64>,
    field: &'static str,
    missing: &mut Vec<&'static str>,
) -> Option<f64> {
    match value {
        Some(number) if number.is_finite() && number != 0.0 => Some(number),
        _ => {
            missing.push(field);
            None
        }
    }
}
