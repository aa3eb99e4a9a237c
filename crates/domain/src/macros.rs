//! Macro for implementing Display and FromStr for wire-name enums
//!
//! Status and format enums travel over JSON and query strings as lowercase
//! names. This macro keeps the Display/FromStr pair in one place so the two
//! directions can never drift apart.
//!
//! # Example
//!
//! ```rust
//! use metricdeck_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Freshness {
//!     Live,
//!     Stale,
//! }
//!
//! impl_domain_status_conversions!(Freshness {
//!     Live => "live",
//!     Stale => "stale",
//! });
//!
//! assert_eq!(Freshness::Live.to_string(), "live");
//! assert_eq!("STALE".parse::<Freshness>(), Ok(Freshness::Stale));
//! ```

/// Implements Display and FromStr traits for wire-name enums
///
/// This macro generates:
/// - Display trait: converts enum variants to their lowercase names
/// - FromStr trait: parses case-insensitive strings to enum variants
///
/// # Arguments
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of enum variants to their string
///   representations (must be lowercase)
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Wire name of this variant.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Band {
        Low,
        Healthy,
        High,
    }

    impl_domain_status_conversions!(Band {
        Low => "low",
        Healthy => "healthy",
        High => "high",
    });

    #[test]
    fn test_display_conversion() {
        assert_eq!(Band::Low.to_string(), "low");
        assert_eq!(Band::Healthy.to_string(), "healthy");
        assert_eq!(Band::High.as_str(), "high");
    }

    #[test]
    fn test_fromstr_mixed_case_and_whitespace() {
        assert_eq!(Band::from_str("LOW").unwrap(), Band::Low);
        assert_eq!(Band::from_str("Healthy").unwrap(), Band::Healthy);
        assert_eq!(Band::from_str(" high ").unwrap(), Band::High);
    }

    #[test]
    fn test_fromstr_invalid() {
        let result = Band::from_str("medium");
        assert!(result.unwrap_err().contains("Invalid Band: medium"));
        assert!(Band::from_str("").is_err());
    }
}
