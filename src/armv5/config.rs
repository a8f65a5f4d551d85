use alloc::borrow::Cow;
use alloc::string::String;

use crate::armv5::Reg;

/// configured register names are stored but not consulted: listings always use the fixed
/// default names below.
const USE_CONFIGURED_NAMES: bool = false;

const DEFAULT_HEX_PREFIX: &str = "0x";

static DEFAULT_REGISTER_NAMES: [&str; 16] = [
    "r0", "r1", "r2", "r3",
    "r4", "r5", "r6", "r7",
    "r8", "r9", "r10", "r11",
    "r12", "sp", "lr", "pc",
];

static DEFAULT_FLOAT_REGISTER_NAMES: [&str; 8] = [
    "f0", "f1", "f2", "f3",
    "f4", "f5", "f6", "f7",
];

/// how operands are spelled. set up once and then shared, read-only, by every decode.
#[derive(Clone, Debug)]
#[cfg_attr(feature="use-serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature="use-serde", serde(default))]
pub struct DisplayConfig {
    hex_prefix: Cow<'static, str>,
    register_names: Option<[String; 16]>,
    float_register_names: Option<[String; 8]>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            hex_prefix: Cow::Borrowed(DEFAULT_HEX_PREFIX),
            register_names: None,
            float_register_names: None,
        }
    }
}

// an empty prefix renders as the default, so it compares equal to it.
impl PartialEq for DisplayConfig {
    fn eq(&self, other: &Self) -> bool {
        self.hex_prefix() == other.hex_prefix() &&
            self.register_names == other.register_names &&
            self.float_register_names == other.float_register_names
    }
}

impl Eq for DisplayConfig {}

impl DisplayConfig {
    /// an empty prefix puts back the default `0x`.
    pub fn set_hex_prefix(&mut self, prefix: &str) {
        self.hex_prefix = if prefix.is_empty() {
            Cow::Borrowed(DEFAULT_HEX_PREFIX)
        } else {
            Cow::Owned(String::from(prefix))
        };
    }

    pub fn hex_prefix(&self) -> &str {
        // a deserialized config may carry an empty prefix.
        if self.hex_prefix.is_empty() {
            DEFAULT_HEX_PREFIX
        } else {
            &self.hex_prefix
        }
    }

    /// `None` for either table leaves that table as it was.
    pub fn set_register_names(&mut self, names: Option<&[&str; 16]>, float_names: Option<&[&str; 8]>) {
        if let Some(names) = names {
            self.register_names = Some((*names).map(String::from));
        }
        if let Some(float_names) = float_names {
            self.float_register_names = Some((*float_names).map(String::from));
        }
    }

    pub fn register_names(&self) -> Option<&[String; 16]> {
        self.register_names.as_ref()
    }

    pub fn float_register_names(&self) -> Option<&[String; 8]> {
        self.float_register_names.as_ref()
    }

    pub fn register_name(&self, reg: Reg) -> &str {
        let idx = reg.number() as usize;
        if USE_CONFIGURED_NAMES {
            if let Some(name) = self.register_names.as_ref().and_then(|names| names.get(idx)) {
                return name;
            }
        }
        DEFAULT_REGISTER_NAMES.get(idx).copied().unwrap_or("r?")
    }

    /// for extension decoders that name floating point registers.
    pub fn float_register_name(&self, num: u8) -> &str {
        let idx = num as usize;
        if USE_CONFIGURED_NAMES {
            if let Some(name) = self.float_register_names.as_ref().and_then(|names| names.get(idx)) {
                return name;
            }
        }
        DEFAULT_FLOAT_REGISTER_NAMES.get(idx).copied().unwrap_or("f?")
    }
}

#[cfg(test)]
mod test {
    use super::DisplayConfig;
    use crate::armv5::Reg;

    #[test]
    fn test_hex_prefix_reverts_when_empty() {
        let mut config = DisplayConfig::default();
        assert_eq!(config.hex_prefix(), "0x");
        config.set_hex_prefix("&");
        assert_eq!(config.hex_prefix(), "&");
        config.set_hex_prefix("");
        assert_eq!(config.hex_prefix(), "0x");
        assert_eq!(config, DisplayConfig::default());
    }

    #[test]
    fn test_empty_prefix_compares_as_default() {
        let config = DisplayConfig {
            hex_prefix: "".into(),
            ..DisplayConfig::default()
        };
        assert_eq!(config, DisplayConfig::default());

        let mut other = DisplayConfig::default();
        other.set_hex_prefix("&");
        assert_ne!(config, other);
    }

    #[test]
    fn test_register_names_are_stored_not_used() {
        let mut config = DisplayConfig::default();
        let apcs = [
            "a1", "a2", "a3", "a4", "v1", "v2", "v3", "v4",
            "v5", "v6", "sl", "fp", "ip", "sp", "lr", "pc",
        ];
        config.set_register_names(Some(&apcs), None);
        assert_eq!(config.register_names().map(|names| names[0].as_str()), Some("a1"));
        assert!(config.float_register_names().is_none());
        assert_eq!(config.register_name(Reg::from_u8(0)), "r0");
        assert_eq!(config.register_name(Reg::from_u8(10)), "r10");
        assert_eq!(config.register_name(Reg::SP), "sp");
        assert_eq!(config.register_name(Reg::from_u8(16)), "r?");

        // a missing table leaves the previous one alone.
        config.set_register_names(None, Some(&["g0", "g1", "g2", "g3", "g4", "g5", "g6", "g7"]));
        assert_eq!(config.register_names().map(|names| names[10].as_str()), Some("sl"));
        assert_eq!(config.float_register_name(3), "f3");
        assert_eq!(config.float_register_name(8), "f?");
    }
}
