//! Member kinds read from a record's `Deserialize` impl rather than from the
//! values it happens to hold.
//!
//! [`KindDeserializer`] answers every request with a placeholder and records
//! which request the member's type made: `deserialize_u16` means `Uint`,
//! `deserialize_option` is transparent, `deserialize_seq` is a list when its
//! element asks for a string. An empty `Vec<u32>` is therefore unsupported
//! and `Option<String>` is a string even when it is `None`.
//!
//! Types that insist on parsing the placeholder (an `IpAddr` rejects `""`)
//! make the whole pass fail; callers then keep the value-based kinds from
//! [`flatten`](crate::flatten).

use std::collections::HashMap;

use serde::de::value::StrDeserializer;
use serde::de::{self, DeserializeOwned, DeserializeSeed, Visitor};
use serde::forward_to_deserialize_any;

use crate::flatten::ShapeError;
use crate::types::Kind;

impl de::Error for ShapeError {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        ShapeError(msg.to_string())
    }
}

/// Kinds of the members `names` of `R`, keyed by serialized name.
///
/// Names that `R` does not deserialize map to [`Kind::Unsupported`].
pub fn member_kinds<R: DeserializeOwned>(
    names: &[String],
) -> Result<HashMap<String, Kind>, ShapeError> {
    let mut kinds = HashMap::with_capacity(names.len());
    R::deserialize(RecordDeserializer {
        names,
        kinds: &mut kinds,
    })?;
    Ok(kinds)
}

// --- Top level: a struct, fed one key per member ---

struct RecordDeserializer<'a> {
    names: &'a [String],
    kinds: &'a mut HashMap<String, Kind>,
}

impl<'de> de::Deserializer<'de> for RecordDeserializer<'_> {
    type Error = ShapeError;

    fn deserialize_any<V: Visitor<'de>>(self, _: V) -> Result<V::Value, ShapeError> {
        Err(ShapeError("does not deserialize as a struct".into()))
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _: &'static str,
        _: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, ShapeError> {
        visitor.visit_map(MemberAccess {
            names: self.names,
            next: 0,
            kinds: self.kinds,
        })
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _: &'static str,
        visitor: V,
    ) -> Result<V::Value, ShapeError> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, ShapeError> {
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _: &'static str,
        visitor: V,
    ) -> Result<V::Value, ShapeError> {
        visitor.visit_unit()
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option seq tuple tuple_struct map enum identifier ignored_any
    }
}

struct MemberAccess<'a> {
    names: &'a [String],
    next: usize,
    kinds: &'a mut HashMap<String, Kind>,
}

impl<'de> de::MapAccess<'de> for MemberAccess<'_> {
    type Error = ShapeError;

    fn next_key_seed<K: DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, ShapeError> {
        let names = self.names;
        match names.get(self.next) {
            Some(name) => seed.deserialize(StrDeserializer::<ShapeError>::new(name)).map(Some),
            None => Ok(None),
        }
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value, ShapeError> {
        let names = self.names;
        let name = names
            .get(self.next)
            .ok_or_else(|| ShapeError("value requested without a key".into()))?;
        self.next += 1;

        let mut kind = Kind::Unsupported;
        let value = seed.deserialize(KindDeserializer { kind: &mut kind })?;
        self.kinds.insert(name.clone(), kind);
        Ok(value)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.names.len() - self.next)
    }
}

// --- Member values: record the kind, hand back a placeholder ---

struct KindDeserializer<'a> {
    kind: &'a mut Kind,
}

macro_rules! leaf {
    ($($method:ident => $visit:ident($($value:expr)?) as $kind:expr;)*) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, ShapeError> {
                *self.kind = $kind;
                visitor.$visit($($value)?)
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for KindDeserializer<'_> {
    type Error = ShapeError;

    // Integer placeholders are 1 so non-zero types accept them.
    leaf! {
        deserialize_any => visit_unit() as Kind::Unsupported;
        deserialize_bool => visit_bool(false) as Kind::Bool;
        deserialize_i8 => visit_i8(1) as Kind::Int;
        deserialize_i16 => visit_i16(1) as Kind::Int;
        deserialize_i32 => visit_i32(1) as Kind::Int;
        deserialize_i64 => visit_i64(1) as Kind::Int;
        deserialize_i128 => visit_i128(1) as Kind::Unsupported;
        deserialize_u8 => visit_u8(1) as Kind::Uint;
        deserialize_u16 => visit_u16(1) as Kind::Uint;
        deserialize_u32 => visit_u32(1) as Kind::Uint;
        deserialize_u64 => visit_u64(1) as Kind::Uint;
        deserialize_u128 => visit_u128(1) as Kind::Unsupported;
        deserialize_f32 => visit_f32(1.0) as Kind::Unsupported;
        deserialize_f64 => visit_f64(1.0) as Kind::Unsupported;
        deserialize_char => visit_char('a') as Kind::Str;
        deserialize_str => visit_str("") as Kind::Str;
        deserialize_string => visit_string(String::new()) as Kind::Str;
        deserialize_bytes => visit_bytes(&[]) as Kind::Unsupported;
        deserialize_byte_buf => visit_byte_buf(Vec::new()) as Kind::Unsupported;
        deserialize_unit => visit_unit() as Kind::Unsupported;
        deserialize_identifier => visit_str("") as Kind::Unsupported;
        deserialize_ignored_any => visit_unit() as Kind::Unsupported;
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, ShapeError> {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _: &'static str,
        visitor: V,
    ) -> Result<V::Value, ShapeError> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _: &'static str,
        visitor: V,
    ) -> Result<V::Value, ShapeError> {
        *self.kind = Kind::Unsupported;
        visitor.visit_unit()
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, ShapeError> {
        let mut element = Kind::Unsupported;
        let value = visitor.visit_seq(Elements {
            remaining: 1,
            kind: Some(&mut element),
        })?;
        *self.kind = if element == Kind::Str {
            Kind::List
        } else {
            Kind::Unsupported
        };
        Ok(value)
    }

    fn deserialize_tuple<V: Visitor<'de>>(
        self,
        len: usize,
        visitor: V,
    ) -> Result<V::Value, ShapeError> {
        *self.kind = Kind::Unsupported;
        visitor.visit_seq(Elements::scratch(len))
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value, ShapeError> {
        *self.kind = Kind::Unsupported;
        visitor.visit_seq(Elements::scratch(len))
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, ShapeError> {
        *self.kind = Kind::Unsupported;
        visitor.visit_map(NoEntries)
    }

    // Nested structs are filled positionally; `fields` may list aliases, and
    // visitors stop reading once every member is set.
    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, ShapeError> {
        *self.kind = Kind::Unsupported;
        visitor.visit_seq(Elements::scratch(fields.len()))
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, ShapeError> {
        *self.kind = Kind::Unsupported;
        visitor.visit_enum(FirstVariant { variants })
    }
}

/// A sequence of `remaining` placeholders. The last element's kind lands in
/// `kind` when one is given.
struct Elements<'a> {
    remaining: usize,
    kind: Option<&'a mut Kind>,
}

impl Elements<'_> {
    fn scratch(remaining: usize) -> Self {
        Elements {
            remaining,
            kind: None,
        }
    }
}

impl<'de> de::SeqAccess<'de> for Elements<'_> {
    type Error = ShapeError;

    fn next_element_seed<T: DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>, ShapeError> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        let mut scratch = Kind::Unsupported;
        let kind = match &mut self.kind {
            Some(kind) => &mut **kind,
            None => &mut scratch,
        };
        seed.deserialize(KindDeserializer { kind }).map(Some)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.remaining)
    }
}

struct NoEntries;

impl<'de> de::MapAccess<'de> for NoEntries {
    type Error = ShapeError;

    fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, _: K) -> Result<Option<K::Value>, ShapeError> {
        Ok(None)
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, _: V) -> Result<V::Value, ShapeError> {
        Err(ShapeError("map has no entries".into()))
    }
}

/// Always picks the first declared variant.
struct FirstVariant {
    variants: &'static [&'static str],
}

impl<'de> de::EnumAccess<'de> for FirstVariant {
    type Error = ShapeError;
    type Variant = Self;

    fn variant_seed<S: DeserializeSeed<'de>>(self, seed: S) -> Result<(S::Value, Self), ShapeError> {
        let name = self
            .variants
            .first()
            .ok_or_else(|| ShapeError("enum has no variants".into()))?;
        let value = seed.deserialize(StrDeserializer::<ShapeError>::new(name))?;
        Ok((value, self))
    }
}

impl<'de> de::VariantAccess<'de> for FirstVariant {
    type Error = ShapeError;

    fn unit_variant(self) -> Result<(), ShapeError> {
        Ok(())
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value, ShapeError> {
        let mut kind = Kind::Unsupported;
        seed.deserialize(KindDeserializer { kind: &mut kind })
    }

    fn tuple_variant<V: Visitor<'de>>(self, len: usize, visitor: V) -> Result<V::Value, ShapeError> {
        visitor.visit_seq(Elements::scratch(len))
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, ShapeError> {
        visitor.visit_seq(Elements::scratch(fields.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::{BTreeMap, HashSet};
    use std::num::NonZeroU16;
    use std::path::PathBuf;

    fn kinds_of<R: DeserializeOwned>(names: &[&str]) -> HashMap<String, Kind> {
        let names: Vec<String> = names.iter().map(|n| n.to_string()).collect();
        member_kinds::<R>(&names).unwrap()
    }

    #[test]
    fn scalar_types() {
        #[derive(Deserialize)]
        #[allow(dead_code)]
        struct Opts {
            verbose: bool,
            name: String,
            offset: i32,
            port: u16,
            ratio: f64,
        }
        let kinds = kinds_of::<Opts>(&["verbose", "name", "offset", "port", "ratio"]);
        assert_eq!(kinds["verbose"], Kind::Bool);
        assert_eq!(kinds["name"], Kind::Str);
        assert_eq!(kinds["offset"], Kind::Int);
        assert_eq!(kinds["port"], Kind::Uint);
        assert_eq!(kinds["ratio"], Kind::Unsupported);
    }

    #[test]
    fn sequences_are_lists_only_of_strings() {
        #[derive(Deserialize)]
        #[allow(dead_code)]
        struct Opts {
            tags: Vec<String>,
            ids: Vec<u32>,
            labels: HashSet<String>,
            bytes: Vec<u8>,
        }
        let kinds = kinds_of::<Opts>(&["tags", "ids", "labels", "bytes"]);
        assert_eq!(kinds["tags"], Kind::List);
        assert_eq!(kinds["ids"], Kind::Unsupported);
        assert_eq!(kinds["labels"], Kind::List);
        assert_eq!(kinds["bytes"], Kind::Unsupported);
    }

    #[test]
    fn options_and_newtypes_are_transparent() {
        #[derive(Deserialize)]
        #[allow(dead_code)]
        struct Remote(String);
        #[derive(Deserialize)]
        #[allow(dead_code)]
        struct Opts {
            remote: Option<String>,
            depth: Option<u32>,
            alias: Remote,
            workers: NonZeroU16,
            root: PathBuf,
        }
        let kinds = kinds_of::<Opts>(&["remote", "depth", "alias", "workers", "root"]);
        assert_eq!(kinds["remote"], Kind::Str);
        assert_eq!(kinds["depth"], Kind::Uint);
        assert_eq!(kinds["alias"], Kind::Str);
        assert_eq!(kinds["workers"], Kind::Uint);
        assert_eq!(kinds["root"], Kind::Str);
    }

    #[test]
    fn compound_types_are_unsupported() {
        #[derive(Deserialize)]
        #[allow(dead_code)]
        enum Mode {
            Fast,
            Slow { delay: u32 },
        }
        #[derive(Deserialize)]
        #[allow(dead_code)]
        struct Inner {
            #[serde(alias = "h")]
            host: String,
            port: u16,
        }
        #[derive(Deserialize)]
        #[allow(dead_code)]
        struct Opts {
            mode: Mode,
            inner: Inner,
            extra: BTreeMap<String, String>,
            pair: (u8, String),
        }
        let kinds = kinds_of::<Opts>(&["mode", "inner", "extra", "pair"]);
        assert_eq!(kinds.len(), 4);
        assert!(kinds.values().all(|k| *k == Kind::Unsupported));
    }

    #[test]
    fn renamed_and_undeserialized_members() {
        #[derive(Deserialize)]
        #[allow(dead_code)]
        struct Opts {
            #[serde(rename = "DryRun")]
            dry_run: bool,
            #[serde(skip_deserializing)]
            cache: String,
        }
        let kinds = kinds_of::<Opts>(&["DryRun", "cache"]);
        assert_eq!(kinds["DryRun"], Kind::Bool);
        assert_eq!(kinds["cache"], Kind::Unsupported);
    }

    #[test]
    fn non_struct_is_rejected() {
        let names = vec!["a".to_string()];
        assert!(member_kinds::<Vec<String>>(&names).is_err());
    }
}
