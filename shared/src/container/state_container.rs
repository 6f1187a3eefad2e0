use std::sync::Arc;

use log::{debug, info, warn};

use crate::{
    codec::Codec,
    config::SyncConfig,
    dirty::{dirty_flags::DirtyFlags, DirtyCollection},
    mutation::PathMutator,
    schema::{
        registry::SchemaRegistry,
        type_schema::TypeSchema,
        value::{StructValue, Value},
    },
    types::{ContainerId, HostType},
};

use super::{change_record::ChangeRecord, error::StateError};

pub type ChangeObserver = Box<dyn FnMut(&[ChangeRecord]) + Send>;
pub type DestroyObserver = Box<dyn FnOnce(ContainerId) + Send>;

/// One replicated value on one host.
///
/// A container keeps two copies of its value. The *working* copy is the one
/// this host writes to and encodes from: the authoritative copy on a server,
/// the mirrored copy on a client. The other copy is the *baseline*, the value
/// as of the last flush, which `reject_changes` restores from.
pub struct StateContainer {
    id: ContainerId,
    host: HostType,
    registry: Arc<SchemaRegistry>,
    config: SyncConfig,
    schema: Arc<TypeSchema>,
    authoritative: StructValue,
    mirrored: StructValue,
    dirty: DirtyFlags,
    change_observers: Vec<ChangeObserver>,
    destroy_observers: Vec<DestroyObserver>,
}

impl StateContainer {
    pub fn new(
        id: ContainerId,
        host: HostType,
        registry: Arc<SchemaRegistry>,
        config: SyncConfig,
        value: StructValue,
    ) -> Result<Self, StateError> {
        let schema = registry.schema_for(value.type_name())?;
        let dirty = DirtyFlags::new(&schema, &value);
        Ok(Self {
            id,
            host,
            registry,
            config,
            schema,
            authoritative: value.clone(),
            mirrored: value,
            dirty,
            change_observers: Vec::new(),
            destroy_observers: Vec::new(),
        })
    }

    /// Replaces both copies with `value` and starts tracking from scratch.
    /// The type may differ from the previous one.
    pub fn setup(&mut self, value: StructValue) -> Result<(), StateError> {
        self.schema = self.registry.schema_for(value.type_name())?;
        self.dirty = DirtyFlags::new(&self.schema, &value);
        self.authoritative = value.clone();
        self.mirrored = value;
        Ok(())
    }

    pub fn id(&self) -> ContainerId {
        self.id
    }

    pub fn host(&self) -> HostType {
        self.host
    }

    pub fn type_name(&self) -> &'static str {
        self.schema.type_name()
    }

    pub fn schema(&self) -> &TypeSchema {
        &self.schema
    }

    pub fn authoritative(&self) -> &StructValue {
        &self.authoritative
    }

    pub fn mirrored(&self) -> &StructValue {
        &self.mirrored
    }

    /// The copy this host reads and writes
    pub fn current(&self) -> &StructValue {
        match self.host {
            HostType::Server => &self.authoritative,
            HostType::Client => &self.mirrored,
        }
    }

    /// The copy as of the last flush
    pub fn baseline(&self) -> &StructValue {
        match self.host {
            HostType::Server => &self.mirrored,
            HostType::Client => &self.authoritative,
        }
    }

    pub fn dirty_flags(&self) -> &DirtyFlags {
        &self.dirty
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.is_dirty()
    }

    /// Writes `value` at `path` in the working copy.
    /// Returns `false` if the value was already there.
    pub fn apply_path(&mut self, path: &str, value: impl Into<Value>) -> Result<bool, StateError> {
        let registry = self.registry.clone();
        let mutator = PathMutator::new(&registry);
        let (working, dirty) = self.working_and_dirty();
        Ok(mutator.apply_path(working, dirty, path, value.into())?)
    }

    /// Replaces the working copy wholesale, as a fresh baseline. Nothing is
    /// marked dirty: the new value is not sent anywhere.
    pub fn replace_current(&mut self, value: StructValue) -> Result<(), StateError> {
        if value.type_name() != self.schema.type_name() {
            return Err(StateError::WrongType {
                expected: self.schema.type_name(),
                found: value.type_name(),
            });
        }
        PathMutator::new(&self.registry).validate(&value)?;
        let (working, _) = self.working_and_dirty();
        *working = value;
        self.flush();
        Ok(())
    }

    pub fn write_full_frame(&self) -> Result<Vec<u8>, StateError> {
        Ok(self.codec().to_full_frame(self.current())?)
    }

    /// Encodes the working copy as a partial frame against the last flush
    pub fn write_partial_frame(&self) -> Result<Vec<u8>, StateError> {
        if !self.dirty.is_dirty() {
            return Err(StateError::NothingToSync { id: self.id });
        }
        Ok(self.codec().to_partial_frame(self.current(), &self.dirty)?)
    }

    /// Applies an inbound partial frame to the working copy. Afterwards the
    /// dirty tree holds what the frame carried plus any local changes that
    /// were not sent yet, so the next outbound frame still carries them.
    /// A frame that fails to decode changes nothing.
    pub fn accept_partial_frame(&mut self, bytes: &[u8]) -> Result<(), StateError> {
        let registry = self.registry.clone();
        let codec = Codec::with_config(&registry, self.config);
        let schema = self.schema.clone();
        let id = self.id;

        let (working, dirty) = self.working_and_dirty();
        let mut inbound = dirty.clone();
        inbound.reinit(&schema, working);
        codec.apply_partial_frame(working, &mut inbound, bytes)?;

        if dirty.is_dirty() {
            debug!(
                "StateContainer {}: keeping unsent local changes under inbound frame",
                id
            );
            inbound.merge(dirty);
        }
        *dirty = inbound;
        Ok(())
    }

    /// Flattens the dirty tree into one record per dirty scalar field or
    /// element, read from the working copy. Collections that were replaced
    /// whole produce a single record.
    pub fn compute_outbound_changes(&self) -> Result<Vec<ChangeRecord>, StateError> {
        if !self.dirty.is_dirty() {
            return Err(StateError::NothingToSync { id: self.id });
        }

        let value = self.current();
        let root = self.dirty.root();
        let mut changes = Vec::new();

        for field in self.schema.fields() {
            if !root.is_field_dirty(field.index) {
                continue;
            }
            let Some(field_value) = value.field(field.slot) else {
                return Err(StateError::StaleChange {
                    path: field.name.to_string(),
                });
            };

            match root.partial(field) {
                Some(tracker) if !tracker.is_fully_replaced() => {
                    for index in tracker.elements().ones() {
                        let path = format!("{}/{}", field.name, index);
                        let element = field_value
                            .elements()
                            .and_then(|items| items.get(index))
                            .ok_or_else(|| StateError::StaleChange { path: path.clone() })?;
                        changes.push(ChangeRecord::new(path, element.clone()));
                    }
                }
                _ => changes.push(ChangeRecord::new(field.name, field_value.clone())),
            }
        }
        Ok(changes)
    }

    /// Hands the current change set to every change observer without
    /// flushing, and returns it
    pub fn notify_changes(&mut self) -> Result<Vec<ChangeRecord>, StateError> {
        let changes = self.compute_outbound_changes()?;
        for observer in &mut self.change_observers {
            observer(&changes);
        }
        Ok(changes)
    }

    /// Notifies observers, then flushes
    pub fn sync_changes(&mut self) -> Result<Vec<ChangeRecord>, StateError> {
        let changes = self.notify_changes()?;
        self.flush();
        Ok(changes)
    }

    /// Makes the working copy the new baseline and clears every dirty bit.
    /// Call once the outbound frame for this tick has been produced.
    pub fn flush(&mut self) {
        match self.host {
            HostType::Server => self.mirrored = self.authoritative.clone(),
            HostType::Client => self.authoritative = self.mirrored.clone(),
        }
        self.reinit_dirty();
    }

    /// Discards unsent changes: the working copy goes back to the baseline
    pub fn reject_changes(&mut self) {
        if self.dirty.is_dirty() {
            warn!("StateContainer {}: rejecting unsent changes", self.id);
        }
        match self.host {
            HostType::Server => self.authoritative = self.mirrored.clone(),
            HostType::Client => self.mirrored = self.authoritative.clone(),
        }
        self.dirty.reject_changes();
        self.reinit_dirty();
    }

    pub fn on_change(&mut self, observer: impl FnMut(&[ChangeRecord]) + Send + 'static) {
        self.change_observers.push(Box::new(observer));
    }

    pub fn on_destroy(&mut self, observer: impl FnOnce(ContainerId) + Send + 'static) {
        self.destroy_observers.push(Box::new(observer));
    }

    /// Drops both copies and tells every destroy observer
    pub fn destroy(self) {
        info!("StateContainer {}: destroyed", self.id);
        let id = self.id;
        for observer in self.destroy_observers {
            observer(id);
        }
    }

    fn codec(&self) -> Codec<'_> {
        Codec::with_config(&self.registry, self.config)
    }

    fn reinit_dirty(&mut self) {
        let working = match self.host {
            HostType::Server => &self.authoritative,
            HostType::Client => &self.mirrored,
        };
        self.dirty.reinit(&self.schema, working);
    }

    fn working_and_dirty(&mut self) -> (&mut StructValue, &mut DirtyFlags) {
        let working = match self.host {
            HostType::Server => &mut self.authoritative,
            HostType::Client => &mut self.mirrored,
        };
        (working, &mut self.dirty)
    }
}
