//! In-memory host: a directory of recipients that records every primitive
//! it receives.
//!
//! Membership, permissions and scopes can be changed at any time from any
//! thread, which is what a live server does to the dispatch engine.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use uuid::Uuid;

use super::{Host, Primitive, Recipient, RecipientId, RecipientKind, ScopeId};
use crate::errors::HostError;

// ---------------------------------------------------------------------------
// MemoryRecipient
// ---------------------------------------------------------------------------

/// A recipient whose deliveries are kept in memory.
#[derive(Debug)]
pub struct MemoryRecipient {
    id: RecipientId,
    name: String,
    kind: RecipientKind,
    permissions: RwLock<HashSet<String>>,
    scope: RwLock<Option<ScopeId>>,
    rejected: RwLock<HashSet<&'static str>>,
    lookups_failing: AtomicBool,
    disconnected: AtomicBool,
    received: Mutex<Vec<Primitive>>,
}

impl MemoryRecipient {
    fn new(name: impl Into<String>, kind: RecipientKind, scope: Option<ScopeId>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            permissions: RwLock::new(HashSet::new()),
            scope: RwLock::new(scope),
            rejected: RwLock::new(HashSet::new()),
            lookups_failing: AtomicBool::new(false),
            disconnected: AtomicBool::new(false),
            received: Mutex::new(Vec::new()),
        }
    }

    /// A player standing in `scope`.
    pub fn player(name: impl Into<String>, scope: impl Into<ScopeId>) -> Self {
        Self::new(name, RecipientKind::Player, Some(scope.into()))
    }

    pub fn console() -> Self {
        let mut console = Self::new("CONSOLE", RecipientKind::Console, None);
        console.id = Uuid::nil();
        console
    }

    pub fn remote_console(name: impl Into<String>) -> Self {
        Self::new(name, RecipientKind::RemoteConsole, None)
    }

    pub fn with_permission(self, permission: &str) -> Self {
        self.grant(permission);
        self
    }

    pub fn grant(&self, permission: &str) {
        self.permissions.write().insert(permission.to_string());
    }

    pub fn revoke(&self, permission: &str) -> bool {
        self.permissions.write().remove(permission)
    }

    /// Move the recipient to another scope.
    pub fn move_to(&self, scope: impl Into<ScopeId>) {
        *self.scope.write() = Some(scope.into());
    }

    /// Make the host refuse a primitive (by [`Primitive::name`]) for this recipient.
    pub fn reject(&self, primitive: &'static str) {
        self.rejected.write().insert(primitive);
    }

    /// Make permission and scope lookups fail.
    pub fn set_lookups_failing(&self, failing: bool) {
        self.lookups_failing.store(failing, Ordering::SeqCst);
    }

    /// Everything delivered so far, in order.
    pub fn received(&self) -> Vec<Primitive> {
        self.received.lock().clone()
    }

    pub fn received_count(&self) -> usize {
        self.received.lock().len()
    }

    /// Whether the host has dropped this recipient.
    pub fn is_disconnected(&self) -> bool {
        self.disconnected.load(Ordering::SeqCst)
    }

    fn check_lookup(&self) -> Result<(), HostError> {
        if self.lookups_failing.load(Ordering::SeqCst) {
            Err(HostError::Unavailable(format!(
                "lookup for {} failed",
                self.name
            )))
        } else {
            Ok(())
        }
    }
}

impl Recipient for MemoryRecipient {
    fn id(&self) -> RecipientId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> RecipientKind {
        self.kind
    }

    fn has_permission(&self, permission: &str) -> Result<bool, HostError> {
        self.check_lookup()?;
        Ok(self.permissions.read().contains(permission))
    }

    fn scope(&self) -> Result<Option<ScopeId>, HostError> {
        self.check_lookup()?;
        Ok(self.scope.read().clone())
    }

    fn invoke(&self, primitive: Primitive) -> Result<(), HostError> {
        if self.is_disconnected() {
            return Err(HostError::Disconnected(self.id));
        }
        let name = primitive.name();
        if self.rejected.read().contains(name) {
            return Err(HostError::Rejected { primitive: name });
        }
        self.received.lock().push(primitive);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemoryHost
// ---------------------------------------------------------------------------

/// A host whose directory and feature set live in memory.
#[derive(Debug)]
pub struct MemoryHost {
    version: String,
    features: RwLock<HashSet<String>>,
    console: Arc<MemoryRecipient>,
    recipients: RwLock<Vec<Arc<MemoryRecipient>>>,
    probe_failing: AtomicBool,
    directory_failing: AtomicBool,
    probes: AtomicUsize,
}

impl MemoryHost {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            features: RwLock::new(HashSet::new()),
            console: Arc::new(MemoryRecipient::console()),
            recipients: RwLock::new(Vec::new()),
            probe_failing: AtomicBool::new(false),
            directory_failing: AtomicBool::new(false),
            probes: AtomicUsize::new(0),
        }
    }

    pub fn with_feature(self, marker: &str) -> Self {
        self.features.write().insert(marker.to_string());
        self
    }

    /// Connect a recipient. Returns the shared handle kept by the directory.
    pub fn connect(&self, recipient: MemoryRecipient) -> Arc<MemoryRecipient> {
        let recipient = Arc::new(recipient);
        self.recipients.write().push(recipient.clone());
        recipient
    }

    /// Drop a recipient. Handles still held elsewhere refuse further output.
    pub fn disconnect(&self, id: RecipientId) -> Option<Arc<MemoryRecipient>> {
        let mut recipients = self.recipients.write();
        let index = recipients.iter().position(|r| r.id == id)?;
        let recipient = recipients.remove(index);
        recipient.disconnected.store(true, Ordering::SeqCst);
        Some(recipient)
    }

    pub fn console_recipient(&self) -> &Arc<MemoryRecipient> {
        &self.console
    }

    pub fn set_probe_failing(&self, failing: bool) {
        self.probe_failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_directory_failing(&self, failing: bool) {
        self.directory_failing.store(failing, Ordering::SeqCst);
    }

    /// How many times the marker feature was queried.
    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    fn check_directory(&self) -> Result<(), HostError> {
        if self.directory_failing.load(Ordering::SeqCst) {
            Err(HostError::Unavailable("recipient directory offline".to_string()))
        } else {
            Ok(())
        }
    }
}

impl Host for MemoryHost {
    fn version(&self) -> String {
        self.version.clone()
    }

    fn has_feature(&self, marker: &str) -> Result<bool, HostError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        if self.probe_failing.load(Ordering::SeqCst) {
            return Err(HostError::Unavailable(format!("cannot resolve `{marker}`")));
        }
        Ok(self.features.read().contains(marker))
    }

    fn console(&self) -> Arc<dyn Recipient> {
        self.console.clone()
    }

    fn online(&self) -> Result<Vec<Arc<dyn Recipient>>, HostError> {
        self.check_directory()?;
        Ok(self
            .recipients
            .read()
            .iter()
            .map(|r| r.clone() as Arc<dyn Recipient>)
            .collect())
    }

    fn find(&self, id: RecipientId) -> Result<Option<Arc<dyn Recipient>>, HostError> {
        self.check_directory()?;
        Ok(self
            .recipients
            .read()
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.clone() as Arc<dyn Recipient>))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_find_disconnect() {
        let host = MemoryHost::new("test");
        let alice = host.connect(MemoryRecipient::player("alice", "world"));

        let found = host.find(alice.id()).unwrap().expect("alice is online");
        assert_eq!(found.name(), "alice");
        assert_eq!(host.online().unwrap().len(), 1);

        assert!(host.disconnect(alice.id()).is_some());
        assert!(host.find(alice.id()).unwrap().is_none());
        assert!(host.disconnect(alice.id()).is_none());
    }

    #[test]
    fn test_disconnected_handle_refuses_output() {
        let host = MemoryHost::new("test");
        let alice = host.connect(MemoryRecipient::player("alice", "world"));
        assert!(alice.invoke(Primitive::TextMessage("before".into())).is_ok());

        host.disconnect(alice.id());

        assert!(alice.is_disconnected());
        assert_eq!(
            alice.invoke(Primitive::TextMessage("after".into())),
            Err(HostError::Disconnected(alice.id()))
        );
        assert_eq!(alice.received_count(), 1);
    }

    #[test]
    fn test_console_is_not_online() {
        let host = MemoryHost::new("test");
        host.connect(MemoryRecipient::player("alice", "world"));
        assert!(host
            .online()
            .unwrap()
            .iter()
            .all(|r| r.kind() == RecipientKind::Player));
        assert_eq!(host.console().kind(), RecipientKind::Console);
        assert!(host.console().id().is_nil());
    }

    #[test]
    fn test_rejected_primitives() {
        let bob = MemoryRecipient::player("bob", "world");
        bob.reject("action_bar");

        let err = bob.invoke(Primitive::ActionBar(serde_json::json!("hi")));
        assert_eq!(err, Err(HostError::Rejected { primitive: "action_bar" }));
        assert!(bob.invoke(Primitive::TextMessage("hi".into())).is_ok());
        assert_eq!(bob.received_count(), 1);
    }

    #[test]
    fn test_failing_lookups() {
        let host = MemoryHost::new("test");
        let carol = host.connect(MemoryRecipient::player("carol", "nether").with_permission("vip"));
        assert_eq!(carol.has_permission("vip"), Ok(true));

        carol.set_lookups_failing(true);
        assert!(carol.has_permission("vip").is_err());
        assert!(carol.scope().is_err());

        host.set_directory_failing(true);
        assert!(host.online().is_err());
        assert!(host.find(carol.id()).is_err());
    }
}
