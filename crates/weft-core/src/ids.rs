//! Identity types for scripts, languages and embedded codes

use std::fmt;
use std::sync::Arc;

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(Arc<str>);

        impl $name {
            pub fn new(value: impl AsRef<str>) -> Self {
                $name(Arc::from(value.as_ref()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                $name::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                $name(Arc::from(value))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_type! {
    /// Opaque identity of one authored source document.
    ///
    /// Equality of this value defines the registry key (typically a URI or
    /// path, but the registry does not interpret it). Cheap to clone; ids
    /// are held in the registry's dependency sets.
    ScriptId
}

id_type! {
    /// Language tag resolved by the generator contract (e.g. `"component"`,
    /// `"html"`, `"javascript"`).
    LanguageId
}

id_type! {
    /// Identity of one virtual code within its tree, unique per tree.
    CodeId
}
