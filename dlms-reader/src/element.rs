//! Read targets and the builder that accumulates them field by field

use crate::error::{ReaderError, ReaderResult};
use crate::validate;
use dlms_client::AttributeRequest;
use dlms_core::ObisCode;

/// Valid class ids
pub const CLASS_ID_RANGE: (i64, i64) = (1, 16383);

/// Valid attribute indices
pub const ATTRIBUTE_INDEX_RANGE: (i64, i64) = (1, 32);

/// One attribute to read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementSpec {
    pub class_id: u16,
    pub obis: ObisCode,
    pub attribute_index: u8,
    /// Encoded selective access descriptor; `None` reads the whole attribute
    pub selective_access: Option<Vec<u8>>,
}

impl From<&ElementSpec> for AttributeRequest {
    fn from(element: &ElementSpec) -> Self {
        let mut request =
            AttributeRequest::new(element.class_id, element.obis, element.attribute_index);
        request.selective_access = element.selective_access.clone();
        request
    }
}

/// Element fields that arrive one token at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementField {
    ClassId,
    Obis,
    AttributeIndex,
    Range,
}

/// Element under construction
#[derive(Debug, Default, Clone)]
pub struct ElementBuilder {
    class_id: Option<u16>,
    obis: Option<ObisCode>,
    attribute_index: Option<u8>,
    selective_access: Option<Vec<u8>>,
}

impl ElementBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `token` and store it; a later value replaces an earlier one
    pub fn set(&mut self, field: ElementField, token: &str) -> ReaderResult<()> {
        match field {
            ElementField::ClassId => {
                let (low, high) = CLASS_ID_RANGE;
                self.class_id = Some(validate::int_in_range(token, low, high)? as u16);
            }
            ElementField::Obis => self.obis = Some(validate::obis(token)?),
            ElementField::AttributeIndex => {
                let (low, high) = ATTRIBUTE_INDEX_RANGE;
                self.attribute_index = Some(validate::int_in_range(token, low, high)? as u8);
            }
            ElementField::Range => {
                self.selective_access = Some(validate::selective_access(token)?)
            }
        }
        Ok(())
    }

    /// True when no field has been set
    pub fn is_empty(&self) -> bool {
        self.class_id.is_none()
            && self.obis.is_none()
            && self.attribute_index.is_none()
            && self.selective_access.is_none()
    }

    /// Complete the element
    ///
    /// Returns `Ok(None)` when nothing was set, and an error when some but not
    /// all of class id, OBIS code and attribute index were given.
    pub fn finish(self) -> ReaderResult<Option<ElementSpec>> {
        if self.is_empty() {
            return Ok(None);
        }
        match (self.class_id, self.obis, self.attribute_index) {
            (Some(class_id), Some(obis), Some(attribute_index)) => Ok(Some(ElementSpec {
                class_id,
                obis,
                attribute_index,
                selective_access: self.selective_access,
            })),
            _ => {
                let mut missing = Vec::new();
                if self.class_id.is_none() {
                    missing.push("class id");
                }
                if self.obis.is_none() {
                    missing.push("OBIS code");
                }
                if self.attribute_index.is_none() {
                    missing.push("attribute index");
                }
                Err(ReaderError::Incomplete(format!(
                    "incomplete element: missing {}",
                    missing.join(", ")
                )))
            }
        }
    }

    /// Parse a config file element value: `classId obis attrIndex [from-to]`
    pub fn parse_line(value: &str) -> ReaderResult<ElementSpec> {
        let fields: Vec<&str> = value.split_whitespace().collect();
        if !(3..=4).contains(&fields.len()) {
            return Err(ReaderError::validation(
                value,
                format!("expected 'classId obis attrIndex [from-to]', got {} fields", fields.len()),
            ));
        }

        let mut builder = Self::new();
        builder.set(ElementField::ClassId, fields[0])?;
        builder.set(ElementField::Obis, fields[1])?;
        builder.set(ElementField::AttributeIndex, fields[2])?;
        if let Some(range) = fields.get(3) {
            builder.set(ElementField::Range, range)?;
        }
        builder
            .finish()?
            .ok_or_else(|| ReaderError::validation(value, "empty element"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_in_any_order() {
        let mut builder = ElementBuilder::new();
        builder.set(ElementField::AttributeIndex, "2").unwrap();
        builder.set(ElementField::Range, "0-10").unwrap();
        builder.set(ElementField::Obis, "1.0.99.1.0.255").unwrap();
        builder.set(ElementField::ClassId, "7").unwrap();

        let element = builder.finish().unwrap().unwrap();
        assert_eq!(element.class_id, 7);
        assert_eq!(element.obis, ObisCode::new(1, 0, 99, 1, 0, 255));
        assert_eq!(element.attribute_index, 2);
        assert_eq!(element.selective_access.as_ref().map(|d| d[0]), Some(0x02));
    }

    #[test]
    fn test_empty_builder_yields_nothing() {
        assert_eq!(ElementBuilder::new().finish().unwrap(), None);
    }

    #[test]
    fn test_partial_element_is_rejected() {
        let mut builder = ElementBuilder::new();
        builder.set(ElementField::ClassId, "3").unwrap();
        let err = builder.finish().unwrap_err();
        assert_eq!(err.to_string(), "incomplete element: missing OBIS code, attribute index");

        let mut range_only = ElementBuilder::new();
        range_only.set(ElementField::Range, "1-2").unwrap();
        assert!(range_only.finish().is_err());
    }

    #[test]
    fn test_field_bounds() {
        let mut builder = ElementBuilder::new();
        assert!(builder.set(ElementField::ClassId, "0").is_err());
        assert!(builder.set(ElementField::ClassId, "16384").is_err());
        assert!(builder.set(ElementField::AttributeIndex, "33").is_err());
        assert!(builder.set(ElementField::AttributeIndex, "0").is_err());
        assert!(builder.is_empty());
    }

    #[test]
    fn test_parse_line_field_counts() {
        assert!(ElementBuilder::parse_line("3 1.0.1.8.0.255").is_err());
        assert!(ElementBuilder::parse_line("3 1.0.1.8.0.255 2").is_ok());
        assert!(ElementBuilder::parse_line("7 1.0.99.1.0.255 2 0-5").is_ok());
        assert!(ElementBuilder::parse_line("7 1.0.99.1.0.255 2 0-5 extra").is_err());
    }

    #[test]
    fn test_parse_line_values() {
        let element = ElementBuilder::parse_line("7 1.0.99.1.0.255 2 946684800-946771200").unwrap();
        assert_eq!(element.class_id, 7);
        assert_eq!(element.selective_access.as_ref().map(|d| d[0]), Some(0x01));

        let request = AttributeRequest::from(&element);
        assert_eq!(request.logical_name, element.obis);
        assert_eq!(request.selective_access, element.selective_access);
    }
}
