use crate::ast::Type;
use crate::schema::ExtendedType;
use crate::Name;
use crate::Schema;
use std::fmt;

/// The type of a field or variable as seen by generated code.
///
/// Composite types are replaced by the model generated for the base field set
/// of the field, referenced by its path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "of")]
pub enum IrType {
    NonNull(Box<IrType>),
    List(Box<IrType>),
    Scalar(Name),
    Enum(Name),
    InputObject(Name),
    Model(String),
}

impl IrType {
    /// Wrap in `NonNull` unless already non-null
    pub fn non_null(self) -> Self {
        match self {
            Self::NonNull(_) => self,
            other => Self::NonNull(Box::new(other)),
        }
    }

    /// Remove the outer `NonNull`, if any
    pub fn nullable(self) -> Self {
        match self {
            Self::NonNull(inner) => *inner,
            other => other,
        }
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, Self::NonNull(_))
    }

    /// The innermost type, under lists and non-null markers
    pub fn leaf(&self) -> &Self {
        match self {
            Self::NonNull(inner) | Self::List(inner) => inner.leaf(),
            _ => self,
        }
    }

    /// Convert a schema type. The named type is replaced by `model` when given.
    pub(crate) fn from_type(schema: &Schema, ty: &Type, model: Option<&str>) -> Self {
        match ty {
            Type::Named(name) => Self::named(schema, name, model),
            Type::NonNullNamed(name) => Self::named(schema, name, model).non_null(),
            Type::List(item) => Self::List(Box::new(Self::from_type(schema, item, model))),
            Type::NonNullList(item) => {
                Self::List(Box::new(Self::from_type(schema, item, model))).non_null()
            }
        }
    }

    fn named(schema: &Schema, name: &Name, model: Option<&str>) -> Self {
        if let Some(model) = model {
            return Self::Model(model.to_owned());
        }
        match schema.types.get(name) {
            Some(ExtendedType::Enum(_)) => Self::Enum(name.clone()),
            Some(ExtendedType::InputObject(_)) => Self::InputObject(name.clone()),
            _ => Self::Scalar(name.clone()),
        }
    }
}

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonNull(inner) => write!(f, "{inner}!"),
            Self::List(inner) => write!(f, "[{inner}]"),
            Self::Scalar(name) | Self::Enum(name) | Self::InputObject(name) => f.write_str(name),
            Self::Model(path) => write!(f, "<{path}>"),
        }
    }
}
