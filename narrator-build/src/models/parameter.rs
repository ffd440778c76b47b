//! Typed template parameter

use crate::error::ValidationError;
use crate::grammar::ParamKind;

/// A `{name:kind}` placeholder declared by a translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    /// Raw kind text as authored; checked against `ParamKind` on validation
    pub kind: String,
}

impl Parameter {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
        }
    }

    /// Parsed kind, if it belongs to the closed set
    pub fn param_kind(&self) -> Option<ParamKind> {
        self.kind.parse().ok()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::MissingField {
                entity: "parameter",
                field: "key",
            });
        }
        if self.kind.is_empty() {
            return Err(ValidationError::MissingField {
                entity: "parameter",
                field: "type",
            });
        }
        if self.param_kind().is_none() {
            return Err(ValidationError::InvalidParamKind {
                name: self.name.clone(),
                kind: self.kind.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_kinds_validate() {
        assert!(Parameter::new("n", "number").validate().is_ok());
        assert!(Parameter::new("d", "date(yearnum)").validate().is_ok());
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let err = Parameter::new("n", "float").validate().unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidParamKind {
                name: "n".to_string(),
                kind: "float".to_string()
            }
        );
    }
}
