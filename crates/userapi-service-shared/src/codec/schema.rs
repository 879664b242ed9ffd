//! Declarative description of the JSON shape a request body may take.

/// JSON type accepted for a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    String,
    /// A number with no fractional part that fits in `i64`.
    Integer,
    Number,
    Boolean,
    Object(Schema),
    /// Every element must have the given kind.
    Array(Box<FieldKind>),
    /// Any JSON value, unchecked.
    Any,
}

/// A named member of a JSON object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Whether an explicit `null` is accepted.
    pub nullable: bool,
}

impl Field {
    pub fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            nullable: false,
        }
    }

    pub fn string(name: &'static str) -> Self {
        Self::new(name, FieldKind::String)
    }

    pub fn integer(name: &'static str) -> Self {
        Self::new(name, FieldKind::Integer)
    }

    pub fn boolean(name: &'static str) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    pub fn object(name: &'static str, schema: Schema) -> Self {
        Self::new(name, FieldKind::Object(schema))
    }

    pub fn array(name: &'static str, element: FieldKind) -> Self {
        Self::new(name, FieldKind::Array(Box::new(element)))
    }

    /// Accept `null` for this field.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

/// The known members of a JSON object, in declaration order.
///
/// Fields not listed are rejected as unknown keys; listed fields are all
/// optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    pub fn new(fields: impl IntoIterator<Item = Field>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }
}

/// Types that can be decoded strictly from a JSON object body.
pub trait HasSchema {
    fn schema() -> Schema;
}
