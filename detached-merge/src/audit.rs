//! Created/modified stamping.
//!
//! Types opt in by declaring audit properties in their descriptor. The
//! merger stamps them from the configured [`SessionInfoProvider`]: created
//! columns when an instance is added, modified columns when a merge changed
//! it. Stamped columns are never copied from a submitted graph.

use chrono::{DateTime, Utc};
use detached_model::{Entity, EntityType};
use detached_staging::StagingSink;
use detached_types::Value;

/// Supplies the acting user and the current time.
pub trait SessionInfoProvider: Send + Sync {
    fn current_user(&self) -> String;

    fn current_time(&self) -> DateTime<Utc>;
}

/// Fixed user and time. Suited to batch jobs and tests.
#[derive(Debug, Clone)]
pub struct StaticSessionInfo {
    user: String,
    time: DateTime<Utc>,
}

impl StaticSessionInfo {
    pub fn new(user: impl Into<String>, time: DateTime<Utc>) -> Self {
        Self {
            user: user.into(),
            time,
        }
    }
}

impl SessionInfoProvider for StaticSessionInfo {
    fn current_user(&self) -> String {
        self.user.clone()
    }

    fn current_time(&self) -> DateTime<Utc> {
        self.time
    }
}

/// Fixed user, wall-clock time.
#[derive(Debug, Clone)]
pub struct SystemSessionInfo {
    user: String,
}

impl SystemSessionInfo {
    pub fn new(user: impl Into<String>) -> Self {
        Self { user: user.into() }
    }
}

impl SessionInfoProvider for SystemSessionInfo {
    fn current_user(&self) -> String {
        self.user.clone()
    }

    fn current_time(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stamp {
    Created,
    Modified,
}

pub(crate) fn stamp<S: StagingSink + ?Sized>(
    session: &dyn SessionInfoProvider,
    ty: &EntityType,
    entity: &mut Entity,
    sink: &mut S,
    stamp: Stamp,
) {
    let (by, at) = match stamp {
        Stamp::Created => (&ty.audit.created_by, &ty.audit.created_at),
        Stamp::Modified => (&ty.audit.modified_by, &ty.audit.modified_at),
    };
    if let Some(property) = by {
        write(entity, sink, property, Value::Text(session.current_user()));
    }
    if let Some(property) = at {
        write(entity, sink, property, Value::Timestamp(session.current_time()));
    }
}

fn write<S: StagingSink + ?Sized>(entity: &mut Entity, sink: &mut S, property: &str, value: Value) {
    entity.set(property, value.clone());
    sink.set_property(entity, property, &value);
}
