//! The cvar store
//!
//! One explicitly-constructed store owns every [`Cvar`]; callers look
//! variables up by name and never hold owning handles. All mutation goes
//! through the policy checks in [`CvarStore::set2`], so flag handling
//! (write protection, latching, info validation) lives in one place.

use std::collections::BTreeMap;
use std::io::Write;

use super::cvar::{Cvar, CvarFlags};
use super::info;
use super::rename;

/// The reserved variable naming the active content set (mod directory).
pub const CONTENT_VAR: &str = "game";

/// The default content set. Stored as "" so path-building code can treat
/// "no mod" and "default mod" identically.
pub const BASE_CONTENT: &str = "baseq2";

/// Callback fired when the content-set variable commits, so the
/// filesystem can rebuild its search path.
pub type ContentHook = Box<dyn FnMut(&str) + Send>;

/// Owns all cvars and enforces their write policy.
///
/// Iteration order is lexicographic by name; listing and serialization
/// rely on it.
pub struct CvarStore {
    vars: BTreeMap<String, Cvar>,
    /// While a session is active, LATCH cvars stage instead of committing.
    session_active: bool,
    /// Raised by any committed USERINFO write; the frame driver consumes
    /// it to retransmit userinfo.
    userinfo_modified: bool,
    content_hook: Option<ContentHook>,
}

impl Default for CvarStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CvarStore {
    pub fn new() -> Self {
        Self {
            vars: BTreeMap::new(),
            session_active: false,
            userinfo_modified: false,
            content_hook: None,
        }
    }

    /// Install the search-path rebuild hook for the content-set variable.
    pub fn set_content_hook<F>(&mut self, hook: F)
    where
        F: FnMut(&str) + Send + 'static,
    {
        self.content_hook = Some(Box::new(hook));
    }

    /// Look up a cvar by (possibly deprecated) name.
    pub fn find(&self, name: &str) -> Option<&Cvar> {
        self.vars.get(rename::resolve(name))
    }

    /// Numeric value of a cvar, 0.0 if it does not exist.
    pub fn value(&self, name: &str) -> f32 {
        self.find(name).map_or(0.0, Cvar::value)
    }

    /// String value of a cvar, "" if it does not exist.
    pub fn string(&self, name: &str) -> &str {
        self.find(name).map_or("", Cvar::string)
    }

    /// Get a cvar, creating it with `default` if it does not exist.
    ///
    /// An existing cvar keeps its value; `flags` are OR'ed into its flag
    /// set. Creation fails (None) when the name or default value is
    /// invalid for an info cvar.
    pub fn get(&mut self, name: &str, default: &str, flags: CvarFlags) -> Option<&Cvar> {
        let name = rename::resolve(name);

        if flags.is_info() && !info::is_valid_info(name) {
            tracing::warn!("invalid info cvar name: {}", name);
            return None;
        }

        if self.vars.contains_key(name) {
            let var = self.vars.get_mut(name).unwrap();
            var.or_flags(flags);
            return Some(&*var);
        }

        if flags.is_info() && !info::is_valid_info(default) {
            tracing::warn!("invalid info cvar value: {}", default);
            return None;
        }

        let default = normalize_content(name, default);
        let var = Cvar::new(name, default, flags);
        Some(self.vars.entry(name.to_string()).or_insert(var))
    }

    /// Set a cvar's value, honoring write protection and latching.
    /// Creates the cvar (no flags) if it does not exist.
    pub fn set(&mut self, name: &str, value: &str) -> Option<&Cvar> {
        self.set2(name, value, false)
    }

    /// Set a cvar's value, bypassing write protection and discarding any
    /// pending latched value.
    pub fn force_set(&mut self, name: &str, value: &str) -> Option<&Cvar> {
        self.set2(name, value, true)
    }

    /// Set a numeric value, formatted without a decimal point when whole.
    pub fn set_value(&mut self, name: &str, value: f32) {
        let text = if value == value.trunc() {
            format!("{}", value as i64)
        } else {
            format!("{}", value)
        };
        self.set(name, &text);
    }

    fn set2(&mut self, name: &str, value: &str, force: bool) -> Option<&Cvar> {
        let name = rename::resolve(name).to_string();

        if !self.vars.contains_key(&name) {
            return self.get(&name, value, CvarFlags::empty());
        }

        let value = normalize_content(&name, value);
        // deferred past the &mut borrow on the entry
        let mut fire_content = false;

        {
            let var = self.vars.get_mut(&name).unwrap();

            if var.flags().is_info() && !info::is_valid_info(value) {
                tracing::warn!("invalid info cvar value: {}", value);
                return self.vars.get(&name);
            }

            if !force {
                if var.flags().contains(CvarFlags::NOSET) {
                    tracing::info!("{} is write protected.", name);
                    return self.vars.get(&name);
                }

                if var.flags().contains(CvarFlags::LATCH) {
                    match var.latched() {
                        Some(latched) => {
                            if value == latched {
                                return self.vars.get(&name);
                            }
                            var.discard_latched();
                        }
                        None => {
                            if value == var.string() {
                                return self.vars.get(&name);
                            }
                        }
                    }

                    if self.session_active {
                        tracing::info!("{} will be changed for next game.", name);
                        var.stage(value);
                    } else {
                        var.commit(value);
                        if name == CONTENT_VAR {
                            fire_content = true;
                        }
                    }

                    if fire_content {
                        self.rebuild_content_path(&name);
                    }
                    return self.vars.get(&name);
                }
            } else {
                var.discard_latched();
            }

            if value == var.string() {
                return self.vars.get(&name);
            }

            if var.flags().contains(CvarFlags::USERINFO) {
                self.userinfo_modified = true;
            }

            var.commit(value);
        }

        self.vars.get(&name)
    }

    /// Unconditionally overwrite a cvar's value and replace its entire
    /// flag set. Used by the console to re-type a variable (e.g. promote
    /// it to archived or userinfo).
    pub fn full_set(&mut self, name: &str, value: &str, flags: CvarFlags) -> Option<&Cvar> {
        let name = rename::resolve(name).to_string();

        if !self.vars.contains_key(&name) {
            return self.get(&name, value, flags);
        }

        if flags.is_info() && !info::is_valid_info(value) {
            tracing::warn!("invalid info cvar value: {}", value);
            return self.vars.get(&name);
        }

        let value = normalize_content(&name, value);
        let var = self.vars.get_mut(&name).unwrap();

        if var.flags().contains(CvarFlags::USERINFO) || flags.contains(CvarFlags::USERINFO) {
            self.userinfo_modified = true;
        }

        var.commit(value);
        var.replace_flags(flags);
        self.vars.get(&name)
    }

    /// Commit every pending latched value. Called at session transition
    /// points (leaving the previous game, entering a new one).
    pub fn commit_latched(&mut self) {
        let mut content_value = None;
        for (name, var) in self.vars.iter_mut() {
            if var.commit_latched() && name == CONTENT_VAR {
                content_value = Some(var.string().to_string());
            }
        }
        if content_value.is_some() {
            self.rebuild_content_path(CONTENT_VAR);
        }
    }

    fn rebuild_content_path(&mut self, name: &str) {
        let value = self
            .vars
            .get(name)
            .map(|v| v.string().to_string())
            .unwrap_or_default();
        if let Some(hook) = self.content_hook.as_mut() {
            hook(&value);
        }
    }

    /// Whether a game session is currently active. Governs latching.
    pub fn session_active(&self) -> bool {
        self.session_active
    }

    pub fn set_session_active(&mut self, active: bool) {
        self.session_active = active;
    }

    /// True if a USERINFO cvar committed since the flag was last taken.
    pub fn userinfo_modified(&self) -> bool {
        self.userinfo_modified
    }

    /// Read and clear the userinfo-changed signal.
    pub fn take_userinfo_modified(&mut self) -> bool {
        std::mem::take(&mut self.userinfo_modified)
    }

    /// Clear a cvar's modified flag. Used by callers that track whether
    /// the user touched a setting directly.
    pub fn clear_modified(&mut self, name: &str) {
        let name = rename::resolve(name);
        if let Some(var) = self.vars.get_mut(name) {
            var.clear_modified();
        }
    }

    /// Build a bounded info string from all cvars carrying any bit in
    /// `mask`, in store order.
    pub fn bit_info(&self, mask: CvarFlags) -> String {
        let mut info = String::new();
        for var in self.vars.values() {
            if var.flags().intersects(mask) {
                info::set_value_for_key(&mut info, var.name(), var.string());
            }
        }
        info
    }

    /// The userinfo string sent to the server.
    pub fn userinfo(&self) -> String {
        self.bit_info(CvarFlags::USERINFO)
    }

    /// The serverinfo string sent to clients.
    pub fn serverinfo(&self) -> String {
        self.bit_info(CvarFlags::SERVERINFO)
    }

    /// Emit one `set name "value"` line per ARCHIVE cvar, in store order.
    pub fn write_archived(&self, sink: &mut dyn Write) -> std::io::Result<()> {
        for var in self.vars.values() {
            if var.flags().contains(CvarFlags::ARCHIVE) {
                writeln!(sink, "set {} \"{}\"", var.name(), var.string())?;
            }
        }
        Ok(())
    }

    /// Iterate all cvars in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Cvar> {
        self.vars.values()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Release all variable storage. The store is empty afterwards.
    pub fn clear(&mut self) {
        self.vars.clear();
        self.userinfo_modified = false;
        self.session_active = false;
    }
}

/// The default content set is stored as the empty string.
fn normalize_content<'a>(name: &str, value: &'a str) -> &'a str {
    if name == CONTENT_VAR && value == BASE_CONTENT {
        ""
    } else {
        value
    }
}

impl std::fmt::Debug for CvarStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CvarStore")
            .field("vars", &self.vars.len())
            .field("session_active", &self.session_active)
            .field("userinfo_modified", &self.userinfo_modified)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_creates_with_default() {
        let mut store = CvarStore::new();
        let var = store.get("rate", "8000", CvarFlags::ARCHIVE).unwrap();
        assert_eq!(var.string(), "8000");
        assert_eq!(var.value(), 8000.0);
        assert!(var.modified());
        assert_eq!(var.flags(), CvarFlags::ARCHIVE);
    }

    #[test]
    fn test_get_existing_keeps_value_unions_flags() {
        let mut store = CvarStore::new();
        store.get("rate", "8000", CvarFlags::empty()).unwrap();
        let var = store.get("rate", "25000", CvarFlags::USERINFO).unwrap();
        assert_eq!(var.string(), "8000");
        assert_eq!(var.flags(), CvarFlags::USERINFO);

        let var = store.get("rate", "1", CvarFlags::ARCHIVE).unwrap();
        assert_eq!(var.flags(), CvarFlags::USERINFO | CvarFlags::ARCHIVE);
    }

    #[test]
    fn test_set_equal_value_is_noop() {
        let mut store = CvarStore::new();
        store.get("rate", "8000", CvarFlags::USERINFO).unwrap();
        store.take_userinfo_modified();
        store.clear_modified("rate");

        store.set("rate", "8000");
        assert!(!store.find("rate").unwrap().modified());
        assert!(!store.userinfo_modified());
    }

    #[test]
    fn test_set_userinfo_raises_signal() {
        let mut store = CvarStore::new();
        store.get("name", "unnamed", CvarFlags::USERINFO).unwrap();
        store.take_userinfo_modified();

        store.set("name", "player");
        assert!(store.userinfo_modified());
        assert_eq!(store.string("name"), "player");
        // signal is consumed exactly once
        assert!(store.take_userinfo_modified());
        assert!(!store.userinfo_modified());
    }

    #[test]
    fn test_invalid_info_value_rejected() {
        let mut store = CvarStore::new();
        store.get("name", "unnamed", CvarFlags::USERINFO).unwrap();
        let var = store.set("name", "bad\"quote").unwrap();
        assert_eq!(var.string(), "unnamed");

        assert!(store.get("bad\\name", "1", CvarFlags::USERINFO).is_none());
        assert!(store.get("skin", "a;b", CvarFlags::USERINFO).is_none());
        assert!(store.find("skin").is_none());
    }

    #[test]
    fn test_noset_refuses_without_force() {
        let mut store = CvarStore::new();
        store.get("dedicated", "0", CvarFlags::NOSET).unwrap();

        let var = store.set("dedicated", "1").unwrap();
        assert_eq!(var.string(), "0");

        let var = store.force_set("dedicated", "1").unwrap();
        assert_eq!(var.string(), "1");
    }

    #[test]
    fn test_latch_defers_while_session_active() {
        let mut store = CvarStore::new();
        store.get("game", "xatrix", CvarFlags::LATCH).unwrap();
        store.set_session_active(true);

        let var = store.set("game", "rogue").unwrap();
        assert_eq!(var.string(), "xatrix");
        assert_eq!(var.latched(), Some("rogue"));

        store.commit_latched();
        let var = store.find("game").unwrap();
        assert_eq!(var.string(), "rogue");
        assert_eq!(var.latched(), None);
    }

    #[test]
    fn test_latch_commits_immediately_without_session() {
        let mut store = CvarStore::new();
        store.get("game", "xatrix", CvarFlags::LATCH).unwrap();

        let var = store.set("game", "rogue").unwrap();
        assert_eq!(var.string(), "rogue");
        assert_eq!(var.latched(), None);
    }

    #[test]
    fn test_force_discards_pending_latch() {
        let mut store = CvarStore::new();
        store.get("game", "xatrix", CvarFlags::LATCH).unwrap();
        store.set_session_active(true);
        store.set("game", "rogue");

        store.force_set("game", "zaero");
        let var = store.find("game").unwrap();
        assert_eq!(var.string(), "zaero");
        assert_eq!(var.latched(), None);
    }

    #[test]
    fn test_content_default_normalized() {
        let mut store = CvarStore::new();
        let var = store.get("game", BASE_CONTENT, CvarFlags::LATCH).unwrap();
        assert_eq!(var.string(), "");

        store.set("game", "rogue");
        let var = store.set("game", BASE_CONTENT).unwrap();
        assert_eq!(var.string(), "");
    }

    #[test]
    fn test_content_hook_fires_on_commit() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let fired = Arc::new(AtomicUsize::new(0));
        let count = fired.clone();

        let mut store = CvarStore::new();
        store.set_content_hook(move |_| {
            count.fetch_add(1, Ordering::SeqCst);
        });
        store.get("game", "", CvarFlags::LATCH).unwrap();

        // no session: immediate commit fires the hook
        store.set("game", "rogue");
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        // session active: nothing until the latch commits
        store.set_session_active(true);
        store.set("game", "xatrix");
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        store.commit_latched();
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_rename_resolved_before_creation() {
        let mut store = CvarStore::new();
        store.get("gl_picmip", "0", CvarFlags::empty()).unwrap();
        assert!(store.find("gl1_picmip").is_some());
        assert_eq!(store.iter().filter(|v| v.name() == "gl_picmip").count(), 0);

        // set through the old name hits the same variable
        store.set("gl_picmip", "2");
        assert_eq!(store.value("gl1_picmip"), 2.0);
    }

    #[test]
    fn test_full_set_replaces_flags() {
        let mut store = CvarStore::new();
        store
            .get("fov", "90", CvarFlags::USERINFO | CvarFlags::ARCHIVE)
            .unwrap();

        let var = store.full_set("fov", "110", CvarFlags::ARCHIVE).unwrap();
        assert_eq!(var.string(), "110");
        assert_eq!(var.flags(), CvarFlags::ARCHIVE);
        // was userinfo before the overwrite, so the signal still fires
        assert!(store.userinfo_modified());
    }

    #[test]
    fn test_set_value_formats_integers_plainly() {
        let mut store = CvarStore::new();
        store.get("paused", "0", CvarFlags::empty()).unwrap();
        store.set_value("paused", 1.0);
        assert_eq!(store.string("paused"), "1");
        store.set_value("paused", 0.5);
        assert_eq!(store.string("paused"), "0.5");
    }

    #[test]
    fn test_bit_info_filters_by_mask() {
        let mut store = CvarStore::new();
        store.get("name", "unnamed", CvarFlags::USERINFO).unwrap();
        store.get("rate", "8000", CvarFlags::USERINFO).unwrap();
        store.get("hostname", "q2", CvarFlags::SERVERINFO).unwrap();
        store.get("cl_gun", "1", CvarFlags::ARCHIVE).unwrap();

        let userinfo = store.userinfo();
        assert_eq!(userinfo, "\\name\\unnamed\\rate\\8000");
        assert_eq!(store.serverinfo(), "\\hostname\\q2");
    }

    #[test]
    fn test_write_archived() {
        let mut store = CvarStore::new();
        store.get("rate", "8000", CvarFlags::ARCHIVE).unwrap();
        store.get("cl_showfps", "0", CvarFlags::ARCHIVE).unwrap();
        store.get("cl_shownet", "0", CvarFlags::empty()).unwrap();

        let mut out = Vec::new();
        store.write_archived(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "set cl_showfps \"0\"\nset rate \"8000\"\n");
    }

    #[test]
    fn test_clear_releases_everything() {
        let mut store = CvarStore::new();
        store.get("rate", "8000", CvarFlags::ARCHIVE).unwrap();
        store.clear();
        assert!(store.is_empty());
        assert!(store.find("rate").is_none());
    }
}
