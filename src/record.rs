//! Configuration records and the per-member metadata attached to them.
//!
//! A record is a plain serde struct. Its members become flags, keys in the
//! config file, and prompts. Metadata that serde has no place for (short
//! flags, help text, prompt eligibility) is attached through [`Record::tags`]:
//!
//! ```ignore
//! #[derive(Serialize, Deserialize, Clone, Default)]
//! struct Opts {
//!     verbose: bool,
//!     name: String,
//! }
//!
//! impl Record for Opts {
//!     fn tags() -> Tags {
//!         Tags::new()
//!             .field("verbose", FieldTags::new().short('v'))
//!             .field("name", FieldTags::new().usage("Your name").prompt("yes"))
//!     }
//! }
//! ```

use serde::Serialize;
use serde::de::DeserializeOwned;

/// A configuration record that can be bound to flags, config entries and
/// prompts.
///
/// The unit type `()` is the record with no members.
pub trait Record: Serialize + DeserializeOwned + Clone + 'static {
    /// Metadata for the record's members, keyed by serialized member name.
    fn tags() -> Tags {
        Tags::new()
    }
}

impl Record for () {}

/// False for the unit record, which is never offered to actions.
pub(crate) fn is_present<R: Record>() -> bool {
    std::any::TypeId::of::<R>() != std::any::TypeId::of::<()>()
}

/// Metadata for one member. Every tag is optional; absent tags fall back to
/// defaults derived from the member name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldTags {
    pub(crate) long: Option<String>,
    pub(crate) short: Option<char>,
    pub(crate) usage: Option<String>,
    pub(crate) prompt: Option<String>,
}

impl FieldTags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the long flag name (default: lower-cased member name).
    pub fn long(mut self, long: &str) -> Self {
        self.long = Some(long.to_string());
        self
    }

    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    /// Help text (default: the member name).
    pub fn usage(mut self, usage: &str) -> Self {
        self.usage = Some(usage.to_string());
        self
    }

    /// Prompt eligibility. Only the token `yes` (any case) enables prompting.
    pub fn prompt(mut self, token: &str) -> Self {
        self.prompt = Some(token.to_string());
        self
    }
}

/// Member metadata for a whole record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tags {
    fields: Vec<(String, FieldTags)>,
}

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach tags to `member`. A later call for the same member replaces the
    /// earlier one.
    pub fn field(mut self, member: &str, tags: FieldTags) -> Self {
        self.fields.retain(|(name, _)| name != member);
        self.fields.push((member.to_string(), tags));
        self
    }

    pub(crate) fn get(&self, member: &str) -> Option<&FieldTags> {
        self.fields
            .iter()
            .find(|(name, _)| name == member)
            .map(|(_, tags)| tags)
    }
}
