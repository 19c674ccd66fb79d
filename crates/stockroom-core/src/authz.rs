//! # Authorization Gate
//!
//! Role-based permission checks, evaluated before any validation or I/O.
//!
//! ## Permission Matrix
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 │  SALE  │ PURCHASE │ ADJUST STOCK │ MANAGE CATALOG    │
//! │  ───────────────┼────────┼──────────┼──────────────┼─────────────────  │
//! │  ADMIN          │   ✓    │    ✓     │      ✓       │       ✓           │
//! │  MANAGER        │   ✓    │    ✓     │      ✓       │       ✓           │
//! │  CLERK          │   ✓    │    ✗     │      ✗       │       ✗           │
//! │  (no identity)  │   ✗    │    ✗     │      ✗       │       ✗           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Roles are read-only input here. Nothing in this module mutates them or
//! consults storage.

use crate::error::{Operation, PostingError};
use crate::types::{Actor, Role, TransactionKind};

/// Returns whether `role` may post a transaction of `kind`.
///
/// ## Example
/// ```rust
/// use stockroom_core::authz::can_post;
/// use stockroom_core::types::{Role, TransactionKind};
///
/// assert!(can_post(Some(Role::Clerk), TransactionKind::Sale));
/// assert!(!can_post(Some(Role::Clerk), TransactionKind::Purchase));
/// assert!(!can_post(None, TransactionKind::Sale));
/// ```
pub fn can_post(role: Option<Role>, kind: TransactionKind) -> bool {
    match (role, kind) {
        (None, _) => false,
        (Some(Role::Clerk), TransactionKind::Purchase) => false,
        (Some(_), _) => true,
    }
}

/// Returns whether `role` may archive, unarchive or delete catalog entries.
pub fn can_manage_catalog(role: Option<Role>) -> bool {
    matches!(role, Some(Role::Admin) | Some(Role::Manager))
}

/// Returns whether `role` may perform `operation`.
pub fn permits(role: Option<Role>, operation: Operation) -> bool {
    match operation {
        Operation::Record(kind) => can_post(role, kind),
        Operation::AdjustStock | Operation::ManageCatalog => can_manage_catalog(role),
    }
}

/// Gates `operation` for `actor`, handing back the actor on success.
///
/// ## Errors
/// - [`PostingError::Unauthenticated`] when there is no actor
/// - [`PostingError::Forbidden`] when the role is not permitted
pub fn authorize(actor: Option<&Actor>, operation: Operation) -> Result<&Actor, PostingError> {
    let actor = actor.ok_or(PostingError::Unauthenticated)?;
    if permits(Some(actor.role), operation) {
        Ok(actor)
    } else {
        Err(PostingError::Forbidden {
            role: actor.role,
            operation,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
