//! Owner-only access to tasks.
//!
//! A request moves through `Unauthenticated -> IdentityExtracted -> OwnershipChecked ->
//! Authorized`. The types carry that progression: a raw header becomes a
//! [`SubjectIdentity`] only through the identity extractor, and a loaded resource becomes an
//! [`Authorized`] value only through [`OwnershipGuard::authorize_resource`]. Code that
//! mutates or returns a single task takes an `Authorized` value, so it cannot skip a step.

use std::ops::Deref;

use thiserror::Error;

use crate::auth::identity::SubjectIdentity;
use crate::models::{Task, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OwnershipError {
    #[error("resource belongs to another user")]
    NotOwner,
}

/// Anything with a single owning user.
pub trait Owned {
    fn owner_id(&self) -> UserId;
}

impl Owned for Task {
    fn owner_id(&self) -> UserId {
        self.user_id
    }
}

/// A resource the current subject has been checked to own.
#[derive(Debug)]
pub struct Authorized<T>(T);

impl<T> Authorized<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Authorized<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

pub struct OwnershipGuard;

impl OwnershipGuard {
    /// Exact identity match. There is no hierarchy and no shared access.
    pub fn authorize(subject_id: UserId, owner_id: UserId) -> Result<(), OwnershipError> {
        if subject_id == owner_id {
            Ok(())
        } else {
            Err(OwnershipError::NotOwner)
        }
    }

    pub fn authorize_resource<T: Owned>(
        subject: &SubjectIdentity,
        resource: T,
    ) -> Result<Authorized<T>, OwnershipError> {
        Self::authorize(subject.user_id, resource.owner_id())?;
        Ok(Authorized(resource))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Note {
        owner: UserId,
        body: &'static str,
    }

    impl Owned for Note {
        fn owner_id(&self) -> UserId {
            self.owner
        }
    }

    fn subject(user_id: UserId) -> SubjectIdentity {
        SubjectIdentity {
            user_id,
            email: format!("{}@example.com", user_id),
        }
    }

    #[test]
    fn test_authorize_exact_match() {
        assert_eq!(OwnershipGuard::authorize(1, 1), Ok(()));
        assert_eq!(
            OwnershipGuard::authorize(1, 2),
            Err(OwnershipError::NotOwner)
        );
        assert_eq!(
            OwnershipGuard::authorize(2, 1),
            Err(OwnershipError::NotOwner)
        );
    }

    #[test]
    fn test_authorize_resource() {
        let note = Note {
            owner: 4,
            body: "mine",
        };
        let authorized = OwnershipGuard::authorize_resource(&subject(4), note).unwrap();
        assert_eq!(authorized.body, "mine");

        let other = Note {
            owner: 4,
            body: "not yours",
        };
        assert!(matches!(
            OwnershipGuard::authorize_resource(&subject(5), other),
            Err(OwnershipError::NotOwner)
        ));
    }
}
