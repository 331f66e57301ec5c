//! Info string handling
//!
//! An info string is a bounded `\key\value\key\value` blob exchanged with
//! the remote peer (userinfo going up, serverinfo coming down). Keys and
//! values are restricted to a safe character set because the blob is
//! embedded in the quoted command stream.

/// Maximum length of an info string, including all keys and values.
pub const MAX_INFO_STRING: usize = 512;

/// Maximum length of a single key or value.
pub const MAX_INFO_KEY: usize = 64;

/// True if the string is safe to embed in an info string.
pub fn is_valid_info(s: &str) -> bool {
    !s.contains('\\') && !s.contains('"') && !s.contains(';')
}

/// Look up a key's value in an info string.
pub fn value_for_key<'a>(info: &'a str, key: &str) -> Option<&'a str> {
    let mut parts = info.split('\\');
    // leading backslash produces an empty first element
    if info.starts_with('\\') {
        parts.next();
    }
    while let Some(k) = parts.next() {
        let v = parts.next()?;
        if k == key {
            return Some(v);
        }
    }
    None
}

/// Remove a key (and its value) from an info string.
pub fn remove_key(info: &mut String, key: &str) {
    if key.contains('\\') {
        tracing::warn!("can't use a key with a \\");
        return;
    }

    let mut rebuilt = String::with_capacity(info.len());
    let mut parts = info.split('\\');
    if info.starts_with('\\') {
        parts.next();
    }
    while let Some(k) = parts.next() {
        let Some(v) = parts.next() else { break };
        if k != key {
            rebuilt.push('\\');
            rebuilt.push_str(k);
            rebuilt.push('\\');
            rebuilt.push_str(v);
        }
    }
    *info = rebuilt;
}

/// Set a key/value pair in an info string, replacing any existing pair
/// with the same key.
///
/// Pairs with invalid characters or that would push the string past
/// [`MAX_INFO_STRING`] are refused with a warning; the rest of the info
/// string is left intact.
pub fn set_value_for_key(info: &mut String, key: &str, value: &str) {
    if !is_valid_info(key) || !is_valid_info(value) {
        tracing::warn!("invalid info key or value: {}={}", key, value);
        return;
    }

    if key.len() >= MAX_INFO_KEY || value.len() >= MAX_INFO_KEY {
        tracing::warn!("info key or value too long: {}={}", key, value);
        return;
    }

    remove_key(info, key);

    if value.is_empty() {
        return;
    }

    // +2 for the two backslashes
    if info.len() + key.len() + value.len() + 2 > MAX_INFO_STRING {
        tracing::warn!("info string length exceeded, dropping {}", key);
        return;
    }

    info.push('\\');
    info.push_str(key);
    info.push('\\');
    info.push_str(value);
}

/// Log an info string one key/value pair per line.
pub fn print(info: &str) {
    let mut parts = info.split('\\');
    if info.starts_with('\\') {
        parts.next();
    }
    while let Some(k) = parts.next() {
        match parts.next() {
            Some(v) => tracing::info!("{:<20} {}", k, v),
            None => tracing::info!("{:<20} MISSING VALUE", k),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let mut info = String::new();
        set_value_for_key(&mut info, "name", "unnamed");
        set_value_for_key(&mut info, "rate", "8000");
        assert_eq!(info, "\\name\\unnamed\\rate\\8000");
        assert_eq!(value_for_key(&info, "name"), Some("unnamed"));
        assert_eq!(value_for_key(&info, "rate"), Some("8000"));
        assert_eq!(value_for_key(&info, "skin"), None);
    }

    #[test]
    fn test_replace_existing_key() {
        let mut info = String::new();
        set_value_for_key(&mut info, "name", "unnamed");
        set_value_for_key(&mut info, "rate", "8000");
        set_value_for_key(&mut info, "name", "player");
        assert_eq!(value_for_key(&info, "name"), Some("player"));
        // exactly one pair per key
        assert_eq!(info.matches("name").count(), 1);
    }

    #[test]
    fn test_remove_key() {
        let mut info = String::from("\\name\\unnamed\\rate\\8000");
        remove_key(&mut info, "name");
        assert_eq!(info, "\\rate\\8000");
    }

    #[test]
    fn test_invalid_chars_refused() {
        let mut info = String::from("\\name\\unnamed");
        set_value_for_key(&mut info, "name", "a\"b");
        assert_eq!(info, "\\name\\unnamed");
        set_value_for_key(&mut info, "na;me", "x");
        assert_eq!(info, "\\name\\unnamed");
    }

    #[test]
    fn test_empty_value_removes_pair() {
        let mut info = String::from("\\spectator\\0");
        set_value_for_key(&mut info, "spectator", "");
        assert_eq!(info, "");
    }

    #[test]
    fn test_length_bound() {
        let mut info = String::new();
        let big = "x".repeat(MAX_INFO_KEY - 1);
        let mut keys = 0;
        for i in 0..20 {
            let key = format!("key{}", i);
            set_value_for_key(&mut info, &key, &big);
            if value_for_key(&info, &key).is_some() {
                keys += 1;
            }
        }
        assert!(info.len() <= MAX_INFO_STRING);
        assert!(keys < 20, "bound never kicked in");
    }
}
