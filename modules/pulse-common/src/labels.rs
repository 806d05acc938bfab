/// Case- and separator-insensitive form of an enum label, so "Partially
/// Verified", "partially_verified" and "PartiallyVerified" compare equal.
pub(crate) fn normalize(label: &str) -> String {
    label
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Label table for a fieldless enum: `ALL`, `label()`, `Display`, a lenient
/// `FromStr`, and a `Deserialize` that goes through `FromStr`.
///
/// `Serialize` and `JsonSchema` stay derived; their `#[serde(rename)]`s must
/// agree with the labels given here.
macro_rules! labelled_enum {
    ($name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.pad(self.label())
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::error::PulseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = crate::labels::normalize(s);
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| crate::labels::normalize(v.label()) == wanted)
                    .ok_or_else(|| {
                        crate::error::PulseError::Validation(format!(
                            "unknown {} '{}'",
                            stringify!($name),
                            s.trim()
                        ))
                    })
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = <String as serde::Deserialize>::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}
