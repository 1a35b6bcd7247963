//! # Record Shapes
//!
//! Compile-time description of a record: its fields in declaration order
//! and the external alias each one is reported under.
//!
//! Shapes are normally produced by `#[derive(Record)]` and live in a
//! `static`, so resolving a field name never needs runtime reflection.

/// One declared field of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldShape {
    ident: &'static str,
    alias: Option<&'static str>,
}

impl FieldShape {
    /// Field reported under its own identifier
    #[must_use]
    pub const fn new(ident: &'static str) -> Self {
        Self { ident, alias: None }
    }

    /// Field reported under an external alias (e.g. its serialized name)
    #[must_use]
    pub const fn aliased(ident: &'static str, alias: &'static str) -> Self {
        Self {
            ident,
            alias: Some(alias),
        }
    }

    /// Identifier as written in the struct
    #[must_use]
    pub const fn ident(&self) -> &'static str {
        self.ident
    }

    /// Declared alias, if any
    #[must_use]
    pub const fn alias(&self) -> Option<&'static str> {
        self.alias
    }

    /// Name this field is reported under: the alias if declared,
    /// otherwise the identifier
    #[must_use]
    pub const fn external_name(&self) -> &'static str {
        match self.alias {
            Some(alias) => alias,
            None => self.ident,
        }
    }
}

/// Ordered set of fields declared by one record type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordShape {
    name: &'static str,
    fields: &'static [FieldShape],
}

impl RecordShape {
    /// Create a shape from its type name and declared fields
    #[must_use]
    pub const fn new(name: &'static str, fields: &'static [FieldShape]) -> Self {
        Self { name, fields }
    }

    /// Record type name, used in diagnostics
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Declared fields in declaration order
    #[must_use]
    pub const fn fields(&self) -> &'static [FieldShape] {
        self.fields
    }

    /// Find a declared field by the name an engine reported it under
    ///
    /// Identifiers are matched first; an engine that already reports the
    /// alias is matched second.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&'static FieldShape> {
        self.fields
            .iter()
            .find(|field| field.ident == name)
            .or_else(|| self.fields.iter().find(|field| field.alias == Some(name)))
    }

    /// Declaration index of a field, used to order engine output
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.field(name)
            .and_then(|found| self.fields.iter().position(|field| field == found))
    }

    /// Resolve the external name for an engine-reported field
    ///
    /// Returns `None` when the shape does not declare the field.
    #[must_use]
    pub fn external_name(&self, name: &str) -> Option<&'static str> {
        self.field(name).map(FieldShape::external_name)
    }
}

/// A record type with a declared shape
///
/// Implement with `#[derive(Record)]`.
pub trait Record {
    /// The static shape of this record type
    fn shape() -> &'static RecordShape;
}
