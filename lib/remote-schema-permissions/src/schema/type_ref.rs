use std::fmt::{self, Display};

use graphql_parser::query::Text;
use graphql_parser::schema::Type;
use serde::{Deserialize, Serialize};

/// A (possibly wrapped) reference to a named type, e.g. `[String!]!`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeRef {
    Named(String),
    NonNull(Box<TypeRef>),
    List(Box<TypeRef>),
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    pub fn non_null(inner: TypeRef) -> Self {
        TypeRef::NonNull(Box::new(inner))
    }

    pub fn list(inner: TypeRef) -> Self {
        TypeRef::List(Box::new(inner))
    }

    /// [[String!]]! -> String
    pub fn named_type(&self) -> &str {
        match self {
            TypeRef::Named(name) => name,
            TypeRef::NonNull(inner) | TypeRef::List(inner) => inner.named_type(),
        }
    }

    /// Strips one level of non-null wrapping, if any.
    pub fn nullable(&self) -> &TypeRef {
        match self {
            TypeRef::NonNull(inner) => inner,
            other => other,
        }
    }

    /// `true` for `[T]` and `[T]!`.
    pub fn is_list(&self) -> bool {
        matches!(self.nullable(), TypeRef::List(_))
    }

    /// The element type of a list reference (`[T!]!` -> `T!`).
    pub fn list_item(&self) -> Option<&TypeRef> {
        match self.nullable() {
            TypeRef::List(inner) => Some(inner),
            _ => None,
        }
    }
}

impl Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(name) => write!(f, "{}", name),
            TypeRef::NonNull(inner) => write!(f, "{}!", inner),
            TypeRef::List(inner) => write!(f, "[{}]", inner),
        }
    }
}

impl<'a, T: Text<'a>> From<&Type<'a, T>> for TypeRef {
    fn from(value: &Type<'a, T>) -> Self {
        match value {
            Type::NamedType(name) => TypeRef::Named(name.as_ref().to_string()),
            Type::ListType(inner) => TypeRef::list((&**inner).into()),
            Type::NonNullType(inner) => TypeRef::non_null((&**inner).into()),
        }
    }
}
