//! Group audiences whose membership is recomputed on every dispatch.

use std::fmt;
use std::sync::Arc;

use super::{guarded, Audience, AudienceFactory, Operation};
use crate::errors::AudienceError;
use crate::host::{Host, Recipient, RecipientKind, ScopeId};

/// Which connected players belong to a [`CompositeAudience`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberFilter {
    Everyone,
    Permission(String),
    Scope(ScopeId),
}

impl MemberFilter {
    /// Reject a permission or scope filter with a blank name.
    pub fn validate(&self) -> Result<(), AudienceError> {
        let (what, name) = match self {
            MemberFilter::Everyone => return Ok(()),
            MemberFilter::Permission(permission) => ("permission", permission.as_str()),
            MemberFilter::Scope(scope) => ("scope", scope.as_str()),
        };
        if name.trim().is_empty() {
            return Err(AudienceError::InvalidArgument(format!(
                "{what} name must not be empty"
            )));
        }
        Ok(())
    }

    /// Whether `recipient` currently passes the filter.
    ///
    /// A failed permission or scope lookup counts as "not a member".
    pub fn admits(&self, recipient: &dyn Recipient) -> bool {
        let result = match self {
            MemberFilter::Everyone => Ok(true),
            MemberFilter::Permission(permission) => recipient.has_permission(permission),
            MemberFilter::Scope(scope) => recipient
                .scope()
                .map(|current| current.as_ref() == Some(scope)),
        };
        result.unwrap_or_else(|e| {
            log::debug!(
                "Skipping {} ({}) for {}: {}",
                recipient.name(),
                recipient.id(),
                self,
                e
            );
            false
        })
    }
}

impl fmt::Display for MemberFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberFilter::Everyone => f.write_str("everyone"),
            MemberFilter::Permission(permission) => write!(f, "permission:{permission}"),
            MemberFilter::Scope(scope) => write!(f, "scope:{scope}"),
        }
    }
}

/// Outcome of one fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Members the operation reached (including no-op bindings).
    pub delivered: usize,
    /// Members whose handler returned an error.
    pub failed: usize,
    /// Members whose delivery panicked.
    pub panicked: usize,
}

impl DeliveryReport {
    pub fn members(&self) -> usize {
        self.delivered + self.failed + self.panicked
    }
}

/// A dynamic group of players.
///
/// Holds only the host and a filter. Every dispatch enumerates the players
/// connected at that moment, so joins, quits, permission changes and scope
/// moves between two calls are always observed. The console is never a
/// member.
#[derive(Clone)]
pub struct CompositeAudience {
    host: Arc<dyn Host>,
    factory: AudienceFactory,
    filter: MemberFilter,
}

impl CompositeAudience {
    /// A group selected by `filter`. Permission and scope names must not be
    /// blank.
    pub fn new(
        host: Arc<dyn Host>,
        factory: AudienceFactory,
        filter: MemberFilter,
    ) -> Result<Self, AudienceError> {
        filter.validate()?;
        Ok(Self {
            host,
            factory,
            filter,
        })
    }

    pub fn everyone(host: Arc<dyn Host>, factory: AudienceFactory) -> Self {
        Self {
            host,
            factory,
            filter: MemberFilter::Everyone,
        }
    }

    /// Players holding `permission`.
    pub fn permission(
        host: Arc<dyn Host>,
        factory: AudienceFactory,
        permission: impl Into<String>,
    ) -> Result<Self, AudienceError> {
        Self::new(host, factory, MemberFilter::Permission(permission.into()))
    }

    /// Players currently in `scope`.
    pub fn scope(
        host: Arc<dyn Host>,
        factory: AudienceFactory,
        scope: impl Into<ScopeId>,
    ) -> Result<Self, AudienceError> {
        Self::new(host, factory, MemberFilter::Scope(scope.into()))
    }

    pub fn filter(&self) -> &MemberFilter {
        &self.filter
    }

    /// The players that belong to the group right now.
    pub fn members(&self) -> Vec<Arc<dyn Recipient>> {
        let online = match self.host.online() {
            Ok(online) => online,
            Err(e) => {
                log::warn!("Cannot enumerate recipients for {}: {}", self.filter, e);
                return Vec::new();
            }
        };
        online
            .into_iter()
            .filter(|r| r.kind() == RecipientKind::Player)
            .filter(|r| self.filter.admits(r.as_ref()))
            .collect()
    }

    /// Deliver `operation` to every current member, isolating each one.
    pub fn deliver(&self, operation: Operation<'_>) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        for member in self.members() {
            let label = || format!("{} ({})", member.name(), member.id());
            let result = guarded(operation, label, || {
                self.factory.audience(member.clone()).try_dispatch(operation)
            });
            match result {
                Some(Ok(())) => report.delivered += 1,
                Some(Err(e)) => {
                    log::debug!(
                        "Dropped {} for {} ({}): {}",
                        operation.category(),
                        member.name(),
                        member.id(),
                        e
                    );
                    report.failed += 1;
                }
                None => report.panicked += 1,
            }
        }
        report
    }
}

impl Audience for CompositeAudience {
    fn dispatch(&self, operation: Operation<'_>) {
        self.deliver(operation);
    }
}

impl fmt::Debug for CompositeAudience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeAudience")
            .field("filter", &self.filter)
            .field("tier", &self.factory.tier())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::Tier;
    use crate::errors::HostError;
    use crate::handlers::Handlers;
    use crate::host::memory::{MemoryHost, MemoryRecipient};
    use crate::host::{Primitive, RecipientId};
    use crate::payload::Message;
    use parking_lot::Mutex;
    use uuid::Uuid;

    fn factory() -> AudienceFactory {
        AudienceFactory::new(Tier::Modern, Arc::new(Handlers::standard()))
    }

    #[test]
    fn test_permission_membership_is_live() {
        let host = Arc::new(MemoryHost::new("test"));
        let alice = host.connect(MemoryRecipient::player("alice", "world").with_permission("vip"));
        let bob = host.connect(MemoryRecipient::player("bob", "world"));
        let vip = CompositeAudience::permission(host.clone(), factory(), "vip").unwrap();

        vip.send_message(&Message::text("first"));
        assert_eq!(alice.received_count(), 1);
        assert_eq!(bob.received_count(), 0);

        alice.revoke("vip");
        bob.grant("vip");
        vip.send_message(&Message::text("second"));
        assert_eq!(alice.received_count(), 1);
        assert_eq!(bob.received_count(), 1);

        let carol = host.connect(MemoryRecipient::player("carol", "world").with_permission("vip"));
        host.disconnect(bob.id());
        vip.send_message(&Message::text("third"));
        assert_eq!(bob.received_count(), 1);
        assert_eq!(carol.received_count(), 1);
    }

    #[test]
    fn test_empty_permission_rejected() {
        let host = Arc::new(MemoryHost::new("test"));
        let err = CompositeAudience::permission(host, factory(), " ").unwrap_err();
        assert!(matches!(err, AudienceError::InvalidArgument(_)));
    }

    #[test]
    fn test_blank_filter_names_rejected_by_every_constructor() {
        let host: Arc<dyn Host> = Arc::new(MemoryHost::new("test"));
        for filter in [
            MemberFilter::Permission(String::new()),
            MemberFilter::Scope(ScopeId::new("")),
            MemberFilter::Scope(ScopeId::new("  ")),
        ] {
            let err = CompositeAudience::new(host.clone(), factory(), filter.clone()).unwrap_err();
            assert!(matches!(err, AudienceError::InvalidArgument(_)), "{filter:?}");
        }
        assert!(matches!(
            CompositeAudience::scope(host.clone(), factory(), ""),
            Err(AudienceError::InvalidArgument(_))
        ));
        assert!(CompositeAudience::new(host, factory(), MemberFilter::Everyone).is_ok());
    }

    #[test]
    fn test_scope_filter_follows_moves() {
        let host = Arc::new(MemoryHost::new("test"));
        let alice = host.connect(MemoryRecipient::player("alice", "world"));
        let bob = host.connect(MemoryRecipient::player("bob", "nether"));
        let nether = CompositeAudience::scope(host.clone(), factory(), "nether").unwrap();

        assert_eq!(nether.deliver(Operation::Message(&Message::text("a"))).delivered, 1);
        alice.move_to("nether");
        assert_eq!(nether.deliver(Operation::Message(&Message::text("b"))).delivered, 2);
        assert_eq!(alice.received_count(), 1);
        assert_eq!(bob.received_count(), 2);
    }

    #[test]
    fn test_console_is_never_a_member() {
        let host = Arc::new(MemoryHost::new("test"));
        host.connect(MemoryRecipient::player("alice", "world"));
        let everyone = CompositeAudience::everyone(host.clone(), factory());

        everyone.send_message(&Message::text("hi"));
        assert_eq!(everyone.members().len(), 1);
        assert_eq!(host.console_recipient().received_count(), 0);
    }

    #[test]
    fn test_rejecting_member_does_not_block_others() {
        let host = Arc::new(MemoryHost::new("test"));
        let recipients: Vec<_> = (0..4)
            .map(|i| host.connect(MemoryRecipient::player(format!("p{i}"), "world")))
            .collect();
        recipients[1].reject("component_message");

        let report = CompositeAudience::everyone(host.clone(), factory())
            .deliver(Operation::Message(&Message::text("hi")));

        assert_eq!(report, DeliveryReport { delivered: 3, failed: 1, panicked: 0 });
        for (i, r) in recipients.iter().enumerate() {
            assert_eq!(r.received_count(), usize::from(i != 1));
        }
    }

    #[test]
    fn test_failed_lookup_skips_member() {
        let host = Arc::new(MemoryHost::new("test"));
        let alice = host.connect(MemoryRecipient::player("alice", "world").with_permission("vip"));
        let bob = host.connect(MemoryRecipient::player("bob", "world").with_permission("vip"));
        alice.set_lookups_failing(true);

        let vip = CompositeAudience::permission(host.clone(), factory(), "vip").unwrap();
        vip.send_message(&Message::text("hi"));
        assert_eq!(alice.received_count(), 0);
        assert_eq!(bob.received_count(), 1);
    }

    #[test]
    fn test_failing_directory_delivers_nothing() {
        let host = Arc::new(MemoryHost::new("test"));
        let alice = host.connect(MemoryRecipient::player("alice", "world"));
        host.set_directory_failing(true);

        let report = CompositeAudience::everyone(host.clone(), factory())
            .deliver(Operation::Message(&Message::text("hi")));
        assert_eq!(report.members(), 0);
        assert_eq!(alice.received_count(), 0);
    }

    /// A player whose host side panics on every primitive.
    struct Exploding(RecipientId);

    impl Recipient for Exploding {
        fn id(&self) -> RecipientId {
            self.0
        }
        fn name(&self) -> &str {
            "exploding"
        }
        fn kind(&self) -> RecipientKind {
            RecipientKind::Player
        }
        fn has_permission(&self, _permission: &str) -> Result<bool, HostError> {
            Ok(true)
        }
        fn scope(&self) -> Result<Option<ScopeId>, HostError> {
            Ok(None)
        }
        fn invoke(&self, _primitive: Primitive) -> Result<(), HostError> {
            panic!("host callback blew up");
        }
    }

    struct FixedHost(Vec<Arc<dyn Recipient>>);

    impl Host for FixedHost {
        fn version(&self) -> String {
            "fixed".to_string()
        }
        fn has_feature(&self, _marker: &str) -> Result<bool, HostError> {
            Ok(true)
        }
        fn console(&self) -> Arc<dyn Recipient> {
            Arc::new(MemoryRecipient::console())
        }
        fn online(&self) -> Result<Vec<Arc<dyn Recipient>>, HostError> {
            Ok(self.0.clone())
        }
        fn find(&self, id: RecipientId) -> Result<Option<Arc<dyn Recipient>>, HostError> {
            Ok(self.0.iter().find(|r| r.id() == id).cloned())
        }
    }

    #[test]
    fn test_panicking_member_is_isolated() {
        let before = Arc::new(MemoryRecipient::player("before", "world"));
        let after = Arc::new(MemoryRecipient::player("after", "world"));
        let members: Vec<Arc<dyn Recipient>> = vec![
            before.clone(),
            Arc::new(Exploding(Uuid::new_v4())),
            after.clone(),
        ];
        let host = Arc::new(FixedHost(members));

        let report = CompositeAudience::everyone(host, factory())
            .deliver(Operation::Message(&Message::text("hi")));

        assert_eq!(report, DeliveryReport { delivered: 2, failed: 0, panicked: 1 });
        assert_eq!(before.received_count(), 1);
        assert_eq!(after.received_count(), 1);
    }

    /// Drops one recipient between enumerating the directory and delivering.
    struct ChurningHost {
        inner: MemoryHost,
        leaving: Mutex<Option<RecipientId>>,
    }

    impl Host for ChurningHost {
        fn version(&self) -> String {
            self.inner.version()
        }
        fn has_feature(&self, marker: &str) -> Result<bool, HostError> {
            self.inner.has_feature(marker)
        }
        fn console(&self) -> Arc<dyn Recipient> {
            self.inner.console()
        }
        fn online(&self) -> Result<Vec<Arc<dyn Recipient>>, HostError> {
            let online = self.inner.online()?;
            if let Some(id) = self.leaving.lock().take() {
                self.inner.disconnect(id);
            }
            Ok(online)
        }
        fn find(&self, id: RecipientId) -> Result<Option<Arc<dyn Recipient>>, HostError> {
            self.inner.find(id)
        }
    }

    #[test]
    fn test_member_disconnecting_mid_delivery_does_not_block_others() {
        let inner = MemoryHost::new("test");
        let recipients: Vec<_> = ["alice", "bob", "carol"]
            .iter()
            .map(|name| inner.connect(MemoryRecipient::player(*name, "world")))
            .collect();
        let host = Arc::new(ChurningHost {
            inner,
            leaving: Mutex::new(Some(recipients[1].id())),
        });

        let report = CompositeAudience::everyone(host.clone(), factory())
            .deliver(Operation::Message(&Message::text("hi")));

        assert_eq!(report, DeliveryReport { delivered: 2, failed: 1, panicked: 0 });
        assert!(recipients[1].is_disconnected());
        assert_eq!(recipients[0].received_count(), 1);
        assert_eq!(recipients[1].received_count(), 0);
        assert_eq!(recipients[2].received_count(), 1);
    }

    #[test]
    fn test_filter_display() {
        assert_eq!(MemberFilter::Everyone.to_string(), "everyone");
        assert_eq!(MemberFilter::Permission("vip".into()).to_string(), "permission:vip");
        assert_eq!(MemberFilter::Scope(ScopeId::new("nether")).to_string(), "scope:nether");
    }
}
