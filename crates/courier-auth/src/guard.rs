//! Access-control predicates applied by handlers before touching a resource.
//! "Must be authenticated" is enforced upstream by the bearer middleware;
//! these gates decide ownership for an already-authenticated principal.

use courier_types::error::{Error, Result};
use courier_types::models::Principal;

/// The principal must be the sole owner of the resource (e.g. a user record).
pub fn require_owner(principal: &Principal, owner: &str) -> Result<()> {
    if principal.username == owner {
        Ok(())
    } else {
        Err(Error::Forbidden)
    }
}

/// The principal must be a participant of the message: sender OR recipient.
pub fn require_participant(principal: &Principal, from: &str, to: &str) -> Result<()> {
    if principal.username == from || principal.username == to {
        Ok(())
    } else {
        Err(Error::Forbidden)
    }
}

/// Only the recipient may acknowledge receipt of a message.
pub fn require_recipient(principal: &Principal, to: &str) -> Result<()> {
    if principal.username == to {
        Ok(())
    } else {
        Err(Error::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(name: &str) -> Principal {
        Principal {
            username: name.to_string(),
        }
    }

    #[test]
    fn owner_gate() {
        assert!(require_owner(&principal("alice"), "alice").is_ok());
        assert!(matches!(
            require_owner(&principal("alice"), "bob"),
            Err(Error::Forbidden)
        ));
    }

    #[test]
    fn either_participant_may_read() {
        // Sender and recipient both pass; anyone else is rejected.
        assert!(require_participant(&principal("alice"), "alice", "bob").is_ok());
        assert!(require_participant(&principal("bob"), "alice", "bob").is_ok());
        assert!(matches!(
            require_participant(&principal("carol"), "alice", "bob"),
            Err(Error::Forbidden)
        ));
    }

    #[test]
    fn only_recipient_may_mark_read() {
        assert!(require_recipient(&principal("bob"), "bob").is_ok());
        assert!(matches!(
            require_recipient(&principal("alice"), "bob"),
            Err(Error::Forbidden)
        ));
    }
}
