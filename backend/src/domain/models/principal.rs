//! The user on whose behalf a service call is made.
//!
//! Every service operation takes the principal explicitly; nothing reads it
//! from ambient request state.

use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    pub is_staff: bool,
}

impl Principal {
    pub fn guardian(user_id: Uuid) -> Self {
        Self {
            user_id,
            is_staff: false,
        }
    }

    pub fn staff(user_id: Uuid) -> Self {
        Self {
            user_id,
            is_staff: true,
        }
    }

    pub fn require_staff(&self) -> DomainResult<()> {
        if self.is_staff {
            Ok(())
        } else {
            Err(DomainError::PermissionDenied(
                "You do not have permission to perform this action".to_string(),
            ))
        }
    }
}
