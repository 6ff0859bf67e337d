//! Custom serde Serializer that walks the top-level members of a record and
//! reports each member's serialized name, in declaration order, with the
//! [`Kind`] its current value serializes as.
//!
//! The value-based kind is only a fallback: an empty `Vec<u32>` looks like a
//! list of strings here. [`schema`](crate::schema) refines it from the
//! member's type. The top level must be a struct (or unit, which has no
//! members); anything else is rejected with a [`ShapeError`].

use serde::ser::{self, Serialize};

use crate::types::Kind;

type Members = Vec<(String, Kind)>;

/// List the members of `source` with their kinds.
///
/// `struct Opts { verbose: bool, tags: Vec<String> }` →
/// `[("verbose", Bool), ("tags", List)]`
pub fn members<S: Serialize + ?Sized>(source: &S) -> Result<Members, ShapeError> {
    source.serialize(MemberSerializer)
}

#[derive(Debug)]
pub struct ShapeError(pub(crate) String);

impl std::fmt::Display for ShapeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ShapeError {}

impl ser::Error for ShapeError {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        ShapeError(msg.to_string())
    }
}

fn not_a_record(what: &str) -> ShapeError {
    ShapeError(format!("serializes as {what}"))
}

// --- Top level: accepts a struct and nothing else ---

struct MemberSerializer;

impl ser::Serializer for MemberSerializer {
    type Ok = Members;
    type Error = ShapeError;
    type SerializeSeq = ser::Impossible<Members, ShapeError>;
    type SerializeTuple = ser::Impossible<Members, ShapeError>;
    type SerializeTupleStruct = ser::Impossible<Members, ShapeError>;
    type SerializeTupleVariant = ser::Impossible<Members, ShapeError>;
    type SerializeMap = ser::Impossible<Members, ShapeError>;
    type SerializeStruct = MemberCollector;
    type SerializeStructVariant = ser::Impossible<Members, ShapeError>;

    fn serialize_bool(self, _: bool) -> Result<Members, Self::Error> {
        Err(not_a_record("a boolean"))
    }
    fn serialize_i8(self, _: i8) -> Result<Members, Self::Error> {
        Err(not_a_record("an integer"))
    }
    fn serialize_i16(self, _: i16) -> Result<Members, Self::Error> {
        Err(not_a_record("an integer"))
    }
    fn serialize_i32(self, _: i32) -> Result<Members, Self::Error> {
        Err(not_a_record("an integer"))
    }
    fn serialize_i64(self, _: i64) -> Result<Members, Self::Error> {
        Err(not_a_record("an integer"))
    }
    fn serialize_u8(self, _: u8) -> Result<Members, Self::Error> {
        Err(not_a_record("an integer"))
    }
    fn serialize_u16(self, _: u16) -> Result<Members, Self::Error> {
        Err(not_a_record("an integer"))
    }
    fn serialize_u32(self, _: u32) -> Result<Members, Self::Error> {
        Err(not_a_record("an integer"))
    }
    fn serialize_u64(self, _: u64) -> Result<Members, Self::Error> {
        Err(not_a_record("an integer"))
    }
    fn serialize_f32(self, _: f32) -> Result<Members, Self::Error> {
        Err(not_a_record("a float"))
    }
    fn serialize_f64(self, _: f64) -> Result<Members, Self::Error> {
        Err(not_a_record("a float"))
    }
    fn serialize_char(self, _: char) -> Result<Members, Self::Error> {
        Err(not_a_record("a string"))
    }
    fn serialize_str(self, _: &str) -> Result<Members, Self::Error> {
        Err(not_a_record("a string"))
    }
    fn serialize_bytes(self, _: &[u8]) -> Result<Members, Self::Error> {
        Err(not_a_record("bytes"))
    }
    fn serialize_none(self) -> Result<Members, Self::Error> {
        Err(not_a_record("an empty option"))
    }
    fn serialize_some<T: Serialize + ?Sized>(self, _: &T) -> Result<Members, Self::Error> {
        Err(not_a_record("an option"))
    }
    fn serialize_unit(self) -> Result<Members, Self::Error> {
        Ok(Vec::new())
    }
    fn serialize_unit_struct(self, _: &'static str) -> Result<Members, Self::Error> {
        Ok(Vec::new())
    }
    fn serialize_unit_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
    ) -> Result<Members, Self::Error> {
        Err(not_a_record("an enum"))
    }
    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _: &'static str,
        value: &T,
    ) -> Result<Members, Self::Error> {
        value.serialize(self)
    }
    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: &T,
    ) -> Result<Members, Self::Error> {
        Err(not_a_record("an enum"))
    }
    fn serialize_seq(self, _: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
        Err(not_a_record("a sequence"))
    }
    fn serialize_tuple(self, _: usize) -> Result<Self::SerializeTuple, Self::Error> {
        Err(not_a_record("a tuple"))
    }
    fn serialize_tuple_struct(
        self,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeTupleStruct, Self::Error> {
        Err(not_a_record("a tuple struct"))
    }
    fn serialize_tuple_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeTupleVariant, Self::Error> {
        Err(not_a_record("an enum"))
    }
    fn serialize_map(self, _: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
        Err(not_a_record("a map"))
    }
    fn serialize_struct(
        self,
        _: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStruct, Self::Error> {
        Ok(MemberCollector {
            members: Vec::with_capacity(len),
        })
    }
    fn serialize_struct_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeStructVariant, Self::Error> {
        Err(not_a_record("an enum"))
    }
}

struct MemberCollector {
    members: Members,
}

impl ser::SerializeStruct for MemberCollector {
    type Ok = Members;
    type Error = ShapeError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        let kind = value.serialize(KindSerializer)?;
        self.members.push((key.to_string(), kind));
        Ok(())
    }

    // `skip_serializing_if` members still exist; their kind comes from the type.
    fn skip_field(&mut self, key: &'static str) -> Result<(), Self::Error> {
        self.members.push((key.to_string(), Kind::Unsupported));
        Ok(())
    }

    fn end(self) -> Result<Members, Self::Error> {
        Ok(self.members)
    }
}

// --- Member values: classify, never fail on unknown shapes ---

struct KindSerializer;

impl ser::Serializer for KindSerializer {
    type Ok = Kind;
    type Error = ShapeError;
    type SerializeSeq = SeqKind;
    type SerializeTuple = Skip;
    type SerializeTupleStruct = Skip;
    type SerializeTupleVariant = Skip;
    type SerializeMap = Skip;
    type SerializeStruct = Skip;
    type SerializeStructVariant = Skip;

    fn serialize_bool(self, _: bool) -> Result<Kind, Self::Error> {
        Ok(Kind::Bool)
    }
    fn serialize_i8(self, _: i8) -> Result<Kind, Self::Error> {
        Ok(Kind::Int)
    }
    fn serialize_i16(self, _: i16) -> Result<Kind, Self::Error> {
        Ok(Kind::Int)
    }
    fn serialize_i32(self, _: i32) -> Result<Kind, Self::Error> {
        Ok(Kind::Int)
    }
    fn serialize_i64(self, _: i64) -> Result<Kind, Self::Error> {
        Ok(Kind::Int)
    }
    fn serialize_i128(self, _: i128) -> Result<Kind, Self::Error> {
        Ok(Kind::Unsupported)
    }
    fn serialize_u8(self, _: u8) -> Result<Kind, Self::Error> {
        Ok(Kind::Uint)
    }
    fn serialize_u16(self, _: u16) -> Result<Kind, Self::Error> {
        Ok(Kind::Uint)
    }
    fn serialize_u32(self, _: u32) -> Result<Kind, Self::Error> {
        Ok(Kind::Uint)
    }
    fn serialize_u64(self, _: u64) -> Result<Kind, Self::Error> {
        Ok(Kind::Uint)
    }
    fn serialize_u128(self, _: u128) -> Result<Kind, Self::Error> {
        Ok(Kind::Unsupported)
    }
    fn serialize_f32(self, _: f32) -> Result<Kind, Self::Error> {
        Ok(Kind::Unsupported)
    }
    fn serialize_f64(self, _: f64) -> Result<Kind, Self::Error> {
        Ok(Kind::Unsupported)
    }
    fn serialize_char(self, _: char) -> Result<Kind, Self::Error> {
        Ok(Kind::Str)
    }
    fn serialize_str(self, _: &str) -> Result<Kind, Self::Error> {
        Ok(Kind::Str)
    }
    fn serialize_bytes(self, _: &[u8]) -> Result<Kind, Self::Error> {
        Ok(Kind::Unsupported)
    }
    fn serialize_none(self) -> Result<Kind, Self::Error> {
        Ok(Kind::Unsupported)
    }
    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Kind, Self::Error> {
        value.serialize(self)
    }
    fn serialize_unit(self) -> Result<Kind, Self::Error> {
        Ok(Kind::Unsupported)
    }
    fn serialize_unit_struct(self, _: &'static str) -> Result<Kind, Self::Error> {
        Ok(Kind::Unsupported)
    }
    fn serialize_unit_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
    ) -> Result<Kind, Self::Error> {
        Ok(Kind::Unsupported)
    }
    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _: &'static str,
        value: &T,
    ) -> Result<Kind, Self::Error> {
        value.serialize(self)
    }
    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: &T,
    ) -> Result<Kind, Self::Error> {
        Ok(Kind::Unsupported)
    }
    fn serialize_seq(self, _: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
        Ok(SeqKind { all_strings: true })
    }
    fn serialize_tuple(self, _: usize) -> Result<Self::SerializeTuple, Self::Error> {
        Ok(Skip)
    }
    fn serialize_tuple_struct(
        self,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeTupleStruct, Self::Error> {
        Ok(Skip)
    }
    fn serialize_tuple_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeTupleVariant, Self::Error> {
        Ok(Skip)
    }
    fn serialize_map(self, _: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
        Ok(Skip)
    }
    fn serialize_struct(
        self,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeStruct, Self::Error> {
        Ok(Skip)
    }
    fn serialize_struct_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeStructVariant, Self::Error> {
        Ok(Skip)
    }
}

// --- SerializeSeq: a list only when every element is a string ---

struct SeqKind {
    all_strings: bool,
}

impl ser::SerializeSeq for SeqKind {
    type Ok = Kind;
    type Error = ShapeError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Self::Error> {
        if value.serialize(KindSerializer)? != Kind::Str {
            self.all_strings = false;
        }
        Ok(())
    }

    fn end(self) -> Result<Kind, Self::Error> {
        Ok(if self.all_strings {
            Kind::List
        } else {
            Kind::Unsupported
        })
    }
}

// --- Everything else compound is unsupported; contents are ignored ---

struct Skip;

impl ser::SerializeTuple for Skip {
    type Ok = Kind;
    type Error = ShapeError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, _: &T) -> Result<(), Self::Error> {
        Ok(())
    }

    fn end(self) -> Result<Kind, Self::Error> {
        Ok(Kind::Unsupported)
    }
}

impl ser::SerializeTupleStruct for Skip {
    type Ok = Kind;
    type Error = ShapeError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, _: &T) -> Result<(), Self::Error> {
        Ok(())
    }

    fn end(self) -> Result<Kind, Self::Error> {
        Ok(Kind::Unsupported)
    }
}

impl ser::SerializeTupleVariant for Skip {
    type Ok = Kind;
    type Error = ShapeError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, _: &T) -> Result<(), Self::Error> {
        Ok(())
    }

    fn end(self) -> Result<Kind, Self::Error> {
        Ok(Kind::Unsupported)
    }
}

impl ser::SerializeMap for Skip {
    type Ok = Kind;
    type Error = ShapeError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, _: &T) -> Result<(), Self::Error> {
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, _: &T) -> Result<(), Self::Error> {
        Ok(())
    }

    fn end(self) -> Result<Kind, Self::Error> {
        Ok(Kind::Unsupported)
    }
}

impl ser::SerializeStruct for Skip {
    type Ok = Kind;
    type Error = ShapeError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        _: &'static str,
        _: &T,
    ) -> Result<(), Self::Error> {
        Ok(())
    }

    fn end(self) -> Result<Kind, Self::Error> {
        Ok(Kind::Unsupported)
    }
}

impl ser::SerializeStructVariant for Skip {
    type Ok = Kind;
    type Error = ShapeError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        _: &'static str,
        _: &T,
    ) -> Result<(), Self::Error> {
        Ok(())
    }

    fn end(self) -> Result<Kind, Self::Error> {
        Ok(Kind::Unsupported)
    }
}
