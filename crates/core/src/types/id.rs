//! Newtype IDs for platform records.
//!
//! Course, callback and internship-form ids all arrive as integers; wrapping
//! them keeps a callback id from being sent where a course id is expected.

/// Macro to define a type-safe ID wrapper around `i64`.
///
/// ```rust
/// # use skillcoders_core::define_id;
/// define_id!(LessonId);
///
/// let id = LessonId::new(7);
/// assert_eq!(id.as_i64(), 7);
/// assert_eq!(id.to_string(), "7");
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            #[must_use]
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::core::num::ParseIntError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                s.trim().parse::<i64>().map(Self)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(CourseId);
define_id!(CallbackId);
define_id!(InternshipFormId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_trims() {
        assert_eq!(" 42 ".parse::<CourseId>().unwrap(), CourseId::new(42));
        assert!("abc".parse::<CourseId>().is_err());
    }

    #[test]
    fn test_serde_transparent() {
        let id: CallbackId = serde_json::from_str("17").unwrap();
        assert_eq!(id, CallbackId::new(17));
        assert_eq!(serde_json::to_string(&id).unwrap(), "17");
    }
}
