//! Cvar value type and policy flags

use bitflags::bitflags;

bitflags! {
    /// Flags that control cvar persistence, exposure and write policy
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CvarFlags: u32 {
        /// Saved to the configuration file on shutdown
        const ARCHIVE = 0x01;
        /// Added to the userinfo string sent to the server
        const USERINFO = 0x02;
        /// Added to the serverinfo string sent to clients
        const SERVERINFO = 0x04;
        /// Can only be changed from the command line, never at runtime
        const NOSET = 0x08;
        /// Changes are staged and applied at the next session boundary
        const LATCH = 0x10;
    }
}

impl CvarFlags {
    /// Flags whose names and values end up in an info string
    pub fn is_info(self) -> bool {
        self.intersects(CvarFlags::USERINFO | CvarFlags::SERVERINFO)
    }
}

/// A named, string-valued runtime setting.
///
/// The string is the value of record; the numeric value is a cache
/// recomputed from the string on every committed write, so
/// `value() == parse(string())` always holds.
pub struct Cvar {
    name: String,
    string: String,
    latched: Option<String>,
    flags: CvarFlags,
    modified: bool,
    value: f32,
}

impl Cvar {
    pub(crate) fn new(name: &str, value: &str, flags: CvarFlags) -> Self {
        Self {
            name: name.to_string(),
            string: value.to_string(),
            latched: None,
            flags,
            modified: true,
            value: parse_value(value),
        }
    }

    /// The cvar name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The committed string value
    pub fn string(&self) -> &str {
        &self.string
    }

    /// The cached numeric value (0.0 for non-numeric strings)
    pub fn value(&self) -> f32 {
        self.value
    }

    /// The pending latched value, if one is staged
    pub fn latched(&self) -> Option<&str> {
        self.latched.as_deref()
    }

    /// The current flag set
    pub fn flags(&self) -> CvarFlags {
        self.flags
    }

    /// True whenever the committed value has changed since the flag was
    /// last cleared
    pub fn modified(&self) -> bool {
        self.modified
    }

    /// True if the numeric value is nonzero (console convention for
    /// boolean cvars)
    pub fn is_set(&self) -> bool {
        self.value != 0.0
    }

    pub(crate) fn or_flags(&mut self, flags: CvarFlags) {
        self.flags |= flags;
    }

    pub(crate) fn replace_flags(&mut self, flags: CvarFlags) {
        self.flags = flags;
    }

    pub(crate) fn stage(&mut self, value: &str) {
        self.latched = Some(value.to_string());
    }

    pub(crate) fn discard_latched(&mut self) -> bool {
        self.latched.take().is_some()
    }

    /// Commit a new string value and recompute the numeric cache.
    pub(crate) fn commit(&mut self, value: &str) {
        self.string.clear();
        self.string.push_str(value);
        self.value = parse_value(value);
        self.modified = true;
    }

    /// Commit the staged value, if any. Returns true if one was applied.
    pub(crate) fn commit_latched(&mut self) -> bool {
        match self.latched.take() {
            Some(staged) => {
                self.string = staged;
                self.value = parse_value(&self.string);
                self.modified = true;
                true
            }
            None => false,
        }
    }

    pub(crate) fn clear_modified(&mut self) {
        self.modified = false;
    }
}

impl std::fmt::Debug for Cvar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cvar")
            .field("name", &self.name)
            .field("string", &self.string)
            .field("latched", &self.latched)
            .field("flags", &self.flags)
            .field("modified", &self.modified)
            .finish()
    }
}

impl std::fmt::Display for Cvar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = \"{}\"", self.name, self.string)
    }
}

/// Locale-independent strtod-style parse: the longest numeric prefix,
/// 0.0 if there is none.
pub(crate) fn parse_value(s: &str) -> f32 {
    let s = s.trim_start();
    for end in (1..=s.len()).rev() {
        if !s.is_char_boundary(end) {
            continue;
        }
        if let Ok(v) = s[..end].parse::<f32>() {
            return v;
        }
    }
    0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("8000"), 8000.0);
        assert_eq!(parse_value("0.022"), 0.022);
        assert_eq!(parse_value("-2.5"), -2.5);
        assert_eq!(parse_value("  1.5"), 1.5);
        assert_eq!(parse_value(""), 0.0);
        assert_eq!(parse_value("male/grunt"), 0.0);
        // strtod semantics: trailing garbage is ignored
        assert_eq!(parse_value("640x480"), 640.0);
    }

    #[test]
    fn test_commit_recomputes_value() {
        let mut var = Cvar::new("rate", "8000", CvarFlags::empty());
        assert_eq!(var.value(), 8000.0);
        var.commit("25000");
        assert_eq!(var.string(), "25000");
        assert_eq!(var.value(), 25000.0);
        assert!(var.modified());
    }

    #[test]
    fn test_latch_commit() {
        let mut var = Cvar::new("game", "xatrix", CvarFlags::LATCH);
        var.stage("rogue");
        assert_eq!(var.string(), "xatrix");
        assert_eq!(var.latched(), Some("rogue"));

        assert!(var.commit_latched());
        assert_eq!(var.string(), "rogue");
        assert_eq!(var.latched(), None);
        assert!(!var.commit_latched());
    }

    #[test]
    fn test_info_flags() {
        assert!(CvarFlags::USERINFO.is_info());
        assert!(CvarFlags::SERVERINFO.is_info());
        assert!(!(CvarFlags::ARCHIVE | CvarFlags::LATCH).is_info());
    }
}
