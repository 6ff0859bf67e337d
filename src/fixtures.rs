#[cfg(test)]
pub mod test {
    use serde::{Deserialize, Serialize};

    use crate::record::{FieldTags, Record, Tags};

    /// Root record covering every bindable kind.
    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
    pub struct ServeOpts {
        pub verbose: bool,
        pub name: String,
        pub port: u16,
        pub offset: i32,
        pub tags: Vec<String>,
    }

    impl Default for ServeOpts {
        fn default() -> Self {
            Self {
                verbose: false,
                name: String::new(),
                port: 8080,
                offset: 0,
                tags: Vec::new(),
            }
        }
    }

    impl Record for ServeOpts {
        fn tags() -> Tags {
            Tags::new()
                .field("verbose", FieldTags::new().short('v').usage("Verbose output"))
                .field("name", FieldTags::new().usage("Your name").prompt("yes"))
                .field("port", FieldTags::new().short('p').usage("Port"))
                .field("tags", FieldTags::new().usage("Tags"))
        }
    }

    /// Command record with untagged defaults and promptable fields.
    #[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
    pub struct SyncOpts {
        #[serde(rename = "DryRun")]
        pub dry_run: bool,
        pub remote: String,
        pub depth: u32,
        pub branches: Vec<String>,
    }

    impl Record for SyncOpts {
        fn tags() -> Tags {
            Tags::new()
                .field("remote", FieldTags::new().usage("Remote").prompt("yes"))
                .field("depth", FieldTags::new().short('d').usage("Depth").prompt("yes"))
                .field("branches", FieldTags::new().usage("Branches").prompt("yes"))
        }
    }

    #[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
    pub struct VerboseOpts {
        #[serde(rename = "Verbose")]
        pub verbose: bool,
    }

    impl Record for VerboseOpts {
        fn tags() -> Tags {
            Tags::new().field("Verbose", FieldTags::new().short('v'))
        }
    }

    /// Root record with a single promptable string.
    #[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
    pub struct NameOpts {
        pub name: String,
    }

    impl Record for NameOpts {
        fn tags() -> Tags {
            Tags::new().field("name", FieldTags::new().usage("Name").prompt("yes"))
        }
    }

    #[test]
    fn serve_defaults() {
        let opts = ServeOpts::default();
        assert_eq!(opts.port, 8080);
        assert!(opts.tags.is_empty());
    }
}
