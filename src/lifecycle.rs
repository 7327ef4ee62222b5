//! Lifecycle state machine
//!
//! `registered → validated → proven`. `integrated` is an attribute set
//! together with `proven`, not a state of its own. There is no way back.

use chrono::{DateTime, Utc};

use crate::component::{ComponentRecord, ComponentStatus};
use crate::error::{RegistryError, Result};

/// Apply a successful integration validation.
///
/// Idempotent: re-validating keeps the status (a proven record stays proven)
/// and re-stamps `validated_at`.
pub fn mark_validated(record: &mut ComponentRecord, now: DateTime<Utc>) {
    record.validated = true;
    record.validated_at = Some(now);
    advance(record, ComponentStatus::Validated);
}

/// Move a validated record to `proven` and flag it integrated.
pub fn mark_proven(record: &mut ComponentRecord, now: DateTime<Utc>) -> Result<()> {
    ensure_provable(record)?;

    record.integrated = true;
    if record.integrated_at.is_none() {
        record.integrated_at = Some(now);
    }
    advance(record, ComponentStatus::Proven);
    Ok(())
}

/// Fails with `NotValidated` unless the record passed validation.
pub fn ensure_provable(record: &ComponentRecord) -> Result<()> {
    if record.validated {
        Ok(())
    } else {
        Err(RegistryError::NotValidated(record.name.clone()))
    }
}

fn advance(record: &mut ComponentRecord, to: ComponentStatus) {
    if to > record.status {
        record.status = to;
    }
}
