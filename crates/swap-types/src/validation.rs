//! Schema validation for collaborator configuration tables.
//!
//! Each DEX, bridge and chain implementation receives a raw TOML table from
//! the configuration file. Implementations describe the fields they accept
//! with a [`Schema`] and expose it through [`ConfigSchema`] so that the
//! engine builder can reject a bad table before any factory runs.

use alloy_primitives::Address;
use async_trait::async_trait;
use thiserror::Error;

/// Errors raised while validating a configuration table.
#[derive(Debug, Error)]
pub enum ValidationError {
	#[error("Missing required field: {0}")]
	MissingField(String),
	#[error("Invalid value for field '{field}': {message}")]
	InvalidValue { field: String, message: String },
	#[error("Type mismatch for field '{field}': expected {expected}, got {actual}")]
	TypeMismatch {
		field: String,
		expected: String,
		actual: String,
	},
	#[error("Failed to deserialize config: {0}")]
	DeserializationError(String),
}

impl ValidationError {
	fn mismatch(field: &str, expected: &str, value: &toml::Value) -> Self {
		ValidationError::TypeMismatch {
			field: field.to_string(),
			expected: expected.to_string(),
			actual: value.type_str().to_string(),
		}
	}

	/// Prefixes the field path of this error with `parent`.
	fn nested_under(self, parent: &str) -> Self {
		match self {
			ValidationError::MissingField(f) => {
				ValidationError::MissingField(format!("{}.{}", parent, f))
			},
			ValidationError::InvalidValue { field, message } => ValidationError::InvalidValue {
				field: format!("{}.{}", parent, field),
				message,
			},
			ValidationError::TypeMismatch {
				field,
				expected,
				actual,
			} => ValidationError::TypeMismatch {
				field: format!("{}.{}", parent, field),
				expected,
				actual,
			},
			other => other,
		}
	}
}

/// Expected type of a configuration field.
#[derive(Debug)]
pub enum FieldType {
	String,
	Integer {
		min: Option<i64>,
		max: Option<i64>,
	},
	/// A float; integers are accepted too since TOML users often write `1` for `1.0`.
	Float {
		min: Option<f64>,
		max: Option<f64>,
	},
	Boolean,
	/// A `0x`-prefixed 20-byte hex address string.
	Address,
	Array(Box<FieldType>),
	Table(Schema),
}

/// Extra check run after the type check passed.
pub type FieldValidator = Box<dyn Fn(&toml::Value) -> Result<(), String> + Send + Sync>;

pub struct Field {
	pub name: String,
	pub field_type: FieldType,
	pub validator: Option<FieldValidator>,
}

impl std::fmt::Debug for Field {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Field")
			.field("name", &self.name)
			.field("field_type", &self.field_type)
			.field("validator", &self.validator.is_some())
			.finish()
	}
}

impl Field {
	pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
		Self {
			name: name.into(),
			field_type,
			validator: None,
		}
	}

	/// Attaches a custom validator to this field.
	pub fn with_validator<F>(mut self, validator: F) -> Self
	where
		F: Fn(&toml::Value) -> Result<(), String> + Send + Sync + 'static,
	{
		self.validator = Some(Box::new(validator));
		self
	}

	fn check(&self, value: &toml::Value) -> Result<(), ValidationError> {
		validate_field_type(&self.name, value, &self.field_type)?;
		if let Some(validator) = &self.validator {
			validator(value).map_err(|message| ValidationError::InvalidValue {
				field: self.name.clone(),
				message,
			})?;
		}
		Ok(())
	}
}

/// Required and optional fields of a TOML table.
#[derive(Debug)]
pub struct Schema {
	pub required: Vec<Field>,
	pub optional: Vec<Field>,
}

impl Schema {
	pub fn new(required: Vec<Field>, optional: Vec<Field>) -> Self {
		Self { required, optional }
	}

	/// Validates `config` against this schema.
	///
	/// Unknown keys are ignored. Nested tables are validated recursively and
	/// their errors carry the dotted path of the offending field.
	pub fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let table = config
			.as_table()
			.ok_or_else(|| ValidationError::mismatch("root", "table", config))?;

		for field in &self.required {
			let value = table
				.get(&field.name)
				.ok_or_else(|| ValidationError::MissingField(field.name.clone()))?;
			field.check(value)?;
		}

		for field in &self.optional {
			if let Some(value) = table.get(&field.name) {
				field.check(value)?;
			}
		}

		Ok(())
	}
}

fn validate_field_type(
	field_name: &str,
	value: &toml::Value,
	expected_type: &FieldType,
) -> Result<(), ValidationError> {
	let out_of_range = |message: String| ValidationError::InvalidValue {
		field: field_name.to_string(),
		message,
	};

	match expected_type {
		FieldType::String => {
			if !value.is_str() {
				return Err(ValidationError::mismatch(field_name, "string", value));
			}
		},
		FieldType::Integer { min, max } => {
			let int_val = value
				.as_integer()
				.ok_or_else(|| ValidationError::mismatch(field_name, "integer", value))?;
			if let Some(min_val) = min.filter(|m| int_val < *m) {
				return Err(out_of_range(format!(
					"Value {} is less than minimum {}",
					int_val, min_val
				)));
			}
			if let Some(max_val) = max.filter(|m| int_val > *m) {
				return Err(out_of_range(format!(
					"Value {} is greater than maximum {}",
					int_val, max_val
				)));
			}
		},
		FieldType::Float { min, max } => {
			let float_val = value
				.as_float()
				.or_else(|| value.as_integer().map(|i| i as f64))
				.ok_or_else(|| ValidationError::mismatch(field_name, "float", value))?;
			if let Some(min_val) = min.filter(|m| float_val < *m) {
				return Err(out_of_range(format!(
					"Value {} is less than minimum {}",
					float_val, min_val
				)));
			}
			if let Some(max_val) = max.filter(|m| float_val > *m) {
				return Err(out_of_range(format!(
					"Value {} is greater than maximum {}",
					float_val, max_val
				)));
			}
		},
		FieldType::Boolean => {
			if !value.is_bool() {
				return Err(ValidationError::mismatch(field_name, "boolean", value));
			}
		},
		FieldType::Address => {
			let raw = value
				.as_str()
				.ok_or_else(|| ValidationError::mismatch(field_name, "address", value))?;
			if !raw.starts_with("0x") || raw.parse::<Address>().is_err() {
				return Err(out_of_range(format!("'{}' is not a valid address", raw)));
			}
		},
		FieldType::Array(inner_type) => {
			let array = value
				.as_array()
				.ok_or_else(|| ValidationError::mismatch(field_name, "array", value))?;
			for (i, item) in array.iter().enumerate() {
				validate_field_type(&format!("{}[{}]", field_name, i), item, inner_type)?;
			}
		},
		FieldType::Table(schema) => {
			schema
				.validate(value)
				.map_err(|e| e.nested_under(field_name))?;
		},
	}

	Ok(())
}

/// Implemented by every collaborator to describe its configuration table.
#[async_trait]
pub trait ConfigSchema: Send + Sync {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError>;
}
