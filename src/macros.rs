//! Macros for typed state names.

use thiserror::Error;

/// A string that names none of an enum's states.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown state \"{name}\"")]
pub struct ParseStateError {
    pub name: String,
}

/// Generate an enum whose variants are state names.
///
/// The enum converts to the state name (`name()`, `AsRef<str>`, `Display`)
/// and parses back from it (`FromStr`), so it can be passed anywhere a state
/// name is accepted. Variants map to their identifier unless renamed with
/// `= "name"`.
///
/// # Example
///
/// ```
/// use hashstate::state_enum;
///
/// state_enum! {
///     pub enum Wizard {
///         Step1 = "step1",
///         Step2 = "step2",
///         Done,
///     }
/// }
///
/// assert_eq!(Wizard::Step1.name(), "step1");
/// assert_eq!("Done".parse::<Wizard>(), Ok(Wizard::Done));
/// assert_eq!(Wizard::ALL.len(), 3);
/// ```
#[macro_export]
macro_rules! state_enum {
    (@name $variant:ident) => {
        stringify!($variant)
    };
    (@name $variant:ident $rename:literal) => {
        $rename
    };
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $(= $rename:literal)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $name {
            /// Every state, in declaration order.
            pub const ALL: &'static [$name] = &[$(Self::$variant),*];

            /// The state name as stored in the fragment.
            pub fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $crate::state_enum!(@name $variant $($rename)?)),*
                }
            }
        }

        impl ::std::convert::AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.name()
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.name())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::ParseStateError;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|state| state.name() == s)
                    .ok_or_else(|| $crate::ParseStateError { name: s.to_string() })
            }
        }
    };
}
