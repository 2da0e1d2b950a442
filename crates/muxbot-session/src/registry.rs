//! Channel ↔ session registry.
//!
//! A strict 1:1 map kept in both directions. Linking either side replaces
//! whatever that side was linked to before, so neither map ever holds a
//! stale reverse entry. Whether the session still exists is not checked here.

use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct ChannelRegistry {
    session_by_channel: HashMap<String, String>,
    channel_by_session: HashMap<String, String>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Link `session_id` and `channel_id`, dropping any prior link of either.
    pub fn link(&mut self, session_id: &str, channel_id: &str) {
        if let Some(old_channel) = self.channel_by_session.remove(session_id) {
            self.session_by_channel.remove(&old_channel);
        }
        if let Some(old_session) = self.session_by_channel.remove(channel_id) {
            self.channel_by_session.remove(&old_session);
        }
        self.session_by_channel
            .insert(channel_id.to_string(), session_id.to_string());
        self.channel_by_session
            .insert(session_id.to_string(), channel_id.to_string());
    }

    pub fn session_for(&self, channel_id: &str) -> Option<&str> {
        self.session_by_channel.get(channel_id).map(String::as_str)
    }

    pub fn channel_for(&self, session_id: &str) -> Option<&str> {
        self.channel_by_session.get(session_id).map(String::as_str)
    }

    /// Remove the link held by `channel_id`. Returns the session it pointed to.
    pub fn unlink(&mut self, channel_id: &str) -> Option<String> {
        let session_id = self.session_by_channel.remove(channel_id)?;
        self.channel_by_session.remove(&session_id);
        Some(session_id)
    }

    /// Remove the link held by `session_id`. Returns the channel it pointed to.
    pub fn unlink_session(&mut self, session_id: &str) -> Option<String> {
        let channel_id = self.channel_by_session.remove(session_id)?;
        self.session_by_channel.remove(&channel_id);
        Some(channel_id)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.session_by_channel.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.session_by_channel.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_consistent(reg: &ChannelRegistry) {
        assert_eq!(reg.session_by_channel.len(), reg.channel_by_session.len());
        for (channel, session) in &reg.session_by_channel {
            assert_eq!(reg.channel_for(session), Some(channel.as_str()));
        }
    }

    #[test]
    fn test_link_both_directions() {
        let mut reg = ChannelRegistry::new();
        reg.link("s1", "c1");
        assert_eq!(reg.session_for("c1"), Some("s1"));
        assert_eq!(reg.channel_for("s1"), Some("c1"));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_relink_session_to_new_channel() {
        let mut reg = ChannelRegistry::new();
        reg.link("s1", "c1");
        reg.link("s1", "c2");
        assert_eq!(reg.session_for("c1"), None);
        assert_eq!(reg.session_for("c2"), Some("s1"));
        assert_consistent(&reg);
    }

    #[test]
    fn test_relink_channel_to_new_session() {
        let mut reg = ChannelRegistry::new();
        reg.link("s1", "c1");
        reg.link("s2", "c1");
        assert_eq!(reg.channel_for("s1"), None);
        assert_eq!(reg.channel_for("s2"), Some("c1"));
        assert_consistent(&reg);
    }

    #[test]
    fn test_cross_relink_keeps_one_to_one() {
        let mut reg = ChannelRegistry::new();
        reg.link("s1", "c1");
        reg.link("s2", "c2");
        reg.link("s1", "c2");
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.session_for("c2"), Some("s1"));
        assert_eq!(reg.channel_for("s2"), None);
        assert_eq!(reg.session_for("c1"), None);
        assert_consistent(&reg);
    }

    #[test]
    fn test_unlink_removes_both() {
        let mut reg = ChannelRegistry::new();
        reg.link("s1", "c1");
        assert_eq!(reg.unlink("c1").as_deref(), Some("s1"));
        assert_eq!(reg.channel_for("s1"), None);
        assert!(reg.is_empty());
        assert_eq!(reg.unlink("c1"), None);
    }

    #[test]
    fn test_unlink_session() {
        let mut reg = ChannelRegistry::new();
        reg.link("s1", "c1");
        assert_eq!(reg.unlink_session("s1").as_deref(), Some("c1"));
        assert_eq!(reg.session_for("c1"), None);
        assert_eq!(reg.unlink_session("s1"), None);
    }
}
