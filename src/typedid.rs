use std::fmt::{self, Debug, Display, Formatter};
use std::marker::PhantomData;
use std::str::FromStr;

use mongodb::bson::Bson;
use serde::de::{self, Deserialize, Deserializer, Visitor};
use serde::{Serialize, Serializer};
use uuid::Uuid;

/// Associates a short, human-readable prefix with an entity so that its ids
/// can't be mistaken for another entity's ids, e.g. `CPN-…` vs `UPD-…`.
pub trait TypedIdMarker {
    fn tag() -> &'static str;
}

/// A v4 uuid rendered as `<TAG>-<UPPERCASE HYPHENATED UUID>`. It is stored
/// in that same textual form, so ids read the same in the database and on
/// the wire.
pub struct TypedId<T>(Uuid, PhantomData<fn() -> T>);

impl<T: TypedIdMarker> TypedId<T> {
    pub fn new() -> TypedId<T> {
        TypedId(Uuid::new_v4(), PhantomData)
    }
}

impl<T> Copy for TypedId<T> {}

impl<T> Clone for TypedId<T> {
    fn clone(&self) -> TypedId<T> {
        *self
    }
}

impl<T> PartialEq for TypedId<T> {
    fn eq(&self, other: &TypedId<T>) -> bool {
        self.0 == other.0
    }
}

impl<T> Eq for TypedId<T> {}

impl<T: TypedIdMarker> Display for TypedId<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut buffer = Uuid::encode_buffer();
        let uuid = self.0.as_hyphenated().encode_upper(&mut buffer);

        write!(f, "{}-{}", T::tag(), uuid)
    }
}

impl<T: TypedIdMarker> Debug for TypedId<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl<T: TypedIdMarker> FromStr for TypedId<T> {
    type Err = TypedIdParseError;

    fn from_str(s: &str) -> Result<TypedId<T>, TypedIdParseError> {
        let (tag, uuid) = s.split_once('-').ok_or(TypedIdParseError::InvalidFormat)?;
        if tag != T::tag() {
            return Err(TypedIdParseError::InvalidTag);
        }

        let uuid = Uuid::parse_str(uuid).map_err(|_| TypedIdParseError::InvalidUuid)?;

        Ok(TypedId(uuid, PhantomData))
    }
}

impl<T: TypedIdMarker> Serialize for TypedId<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de, T: TypedIdMarker> Deserialize<'de> for TypedId<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<TypedId<T>, D::Error> {
        struct TypedIdVisitor<T>(PhantomData<fn() -> T>);

        impl<'de, T: TypedIdMarker> Visitor<'de> for TypedIdVisitor<T> {
            type Value = TypedId<T>;

            fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
                write!(f, "an id of the form {}-<uuid>", T::tag())
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<TypedId<T>, E> {
                value.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(TypedIdVisitor(PhantomData))
    }
}

impl<T: TypedIdMarker> From<TypedId<T>> for Bson {
    fn from(id: TypedId<T>) -> Bson {
        Bson::String(id.to_string())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TypedIdParseError {
    InvalidFormat,
    InvalidTag,
    InvalidUuid,
}

impl Display for TypedIdParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TypedIdParseError::InvalidFormat => f.write_str("id is missing its tag"),
            TypedIdParseError::InvalidTag => f.write_str("id has the wrong tag"),
            TypedIdParseError::InvalidUuid => f.write_str("id does not end in a valid uuid"),
        }
    }
}

impl std::error::Error for TypedIdParseError {}
