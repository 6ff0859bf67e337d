//! Records for the clapbind demo application.
//!
//! [`DemoConfig`] is the root record: its fields are global flags, top-level
//! keys in `~/.config/clapbind-demo/config.yml`, and (for `name`) a prompt.
//! [`GreetConfig`] belongs to the `greet` command and is read from the
//! `greet:` section of the same file.
//!
//! ```yaml
//! name: Ada
//! verbose: true
//! greet:
//!   times: 3
//!   punctuation: "!"
//! ```

use clapbind::{FieldTags, Record, Tags};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct DemoConfig {
    pub name: String,
    pub verbose: bool,
    pub tags: Vec<String>,
}

impl Record for DemoConfig {
    fn tags() -> Tags {
        Tags::new()
            .field("name", FieldTags::new().short('n').usage("Who to greet").prompt("yes"))
            .field("verbose", FieldTags::new().short('V').usage("Verbose output"))
            .field("tags", FieldTags::new().usage("Labels to print"))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GreetConfig {
    pub times: u32,
    pub punctuation: String,
    pub shout: bool,
}

impl Default for GreetConfig {
    fn default() -> Self {
        Self {
            times: 1,
            punctuation: ".".to_string(),
            shout: false,
        }
    }
}

impl Record for GreetConfig {
    fn tags() -> Tags {
        Tags::new()
            .field("times", FieldTags::new().short('t').usage("How many greetings"))
            .field("punctuation", FieldTags::new().usage("Closing punctuation"))
            .field("shout", FieldTags::new().usage("Upper-case the greeting"))
    }
}
