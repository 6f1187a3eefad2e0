use std::{
    collections::{HashMap, HashSet},
    mem,
    sync::Arc,
};

use log::{info, warn};

use crate::{
    codec::Codec,
    config::SyncConfig,
    schema::{
        registry::SchemaRegistry,
        value::{StructValue, Value},
    },
    types::{ContainerId, HostType},
};

use super::{
    change_record::ChangeRecord, error::ManagerError, state_container::StateContainer,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameKind {
    /// Announces a container, or replaces it whole
    Full,
    /// Changes since the previous frame for the same container
    Partial,
}

/// A frame ready for the transport, addressed to one container
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundFrame {
    pub container_id: ContainerId,
    pub kind: FrameKind,
    pub bytes: Vec<u8>,
}

/// What one send tick produced
#[derive(Debug, Default, PartialEq)]
pub struct TickOutput {
    pub frames: Vec<OutboundFrame>,
    /// Containers whose frame could not be written. They stay queued with
    /// their dirty bits intact and are retried on the next tick.
    pub failures: Vec<(ContainerId, ManagerError)>,
}

/// Every container of one host, plus the queues that decide what the next
/// send tick emits
pub struct ContainerManager {
    host: HostType,
    registry: Arc<SchemaRegistry>,
    config: SyncConfig,
    next_id: ContainerId,
    containers: HashMap<ContainerId, StateContainer>,
    new_containers: Vec<ContainerId>,
    changed: Vec<ContainerId>,
    changed_set: HashSet<ContainerId>,
}

impl ContainerManager {
    pub fn new(host: HostType, registry: Arc<SchemaRegistry>) -> Self {
        Self::with_config(host, registry, SyncConfig::default())
    }

    pub fn with_config(host: HostType, registry: Arc<SchemaRegistry>, config: SyncConfig) -> Self {
        Self {
            host,
            registry,
            config,
            next_id: 0,
            containers: HashMap::new(),
            new_containers: Vec::new(),
            changed: Vec::new(),
            changed_set: HashSet::new(),
        }
    }

    pub fn host(&self) -> HostType {
        self.host
    }

    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    // Server

    /// Registers a new container and queues its full frame for the next tick
    pub fn create(&mut self, value: StructValue) -> Result<ContainerId, ManagerError> {
        self.check_host(HostType::Server, "create")?;

        let id = self.allocate_id()?;
        let container = StateContainer::new(
            id,
            self.host,
            self.registry.clone(),
            self.config,
            value,
        )?;
        info!(
            "ContainerManager: created container {} of type {}",
            id,
            container.type_name()
        );
        self.containers.insert(id, container);
        self.new_containers.push(id);
        Ok(id)
    }

    // Client

    /// Registers a container announced by the server
    pub fn create_remote(
        &mut self,
        id: ContainerId,
        value: StructValue,
    ) -> Result<(), ManagerError> {
        self.check_host(HostType::Client, "create_remote")?;
        if self.containers.contains_key(&id) {
            return Err(ManagerError::ContainerAlreadyExists { id });
        }

        let container = StateContainer::new(
            id,
            self.host,
            self.registry.clone(),
            self.config,
            value,
        )?;
        info!(
            "ContainerManager: registered remote container {} of type {}",
            id,
            container.type_name()
        );
        self.containers.insert(id, container);
        Ok(())
    }

    /// Decodes a full frame, registering the container or replacing its state
    pub fn receive_full(&mut self, id: ContainerId, bytes: &[u8]) -> Result<(), ManagerError> {
        self.check_host(HostType::Client, "receive_full")?;

        let value = Codec::with_config(&self.registry, self.config).from_full_frame(bytes)?;
        if let Some(container) = self.containers.get_mut(&id) {
            container.setup(value)?;
            return Ok(());
        }
        self.create_remote(id, value)
    }

    // Both

    /// Writes `value` at `path` in a container, queuing it for the next tick
    /// if anything changed
    pub fn apply_path(
        &mut self,
        id: ContainerId,
        path: &str,
        value: impl Into<Value>,
    ) -> Result<bool, ManagerError> {
        let changed = self.container_mut(id)?.apply_path(path, value)?;
        if changed {
            self.mark_changed(id);
        }
        Ok(changed)
    }

    /// Applies an inbound partial frame and returns the changes it carried,
    /// along with any local changes still waiting to be sent.
    ///
    /// A server keeps the dirty bits so the next tick rebroadcasts the
    /// accepted changes to every other client. A client flushes right away
    /// unless it has unsent edits of its own, which stay queued.
    pub fn receive_partial(
        &mut self,
        id: ContainerId,
        bytes: &[u8],
    ) -> Result<Vec<ChangeRecord>, ManagerError> {
        let host = self.host;
        let container = self.container_mut(id)?;
        let had_local_changes = container.is_dirty();

        if let Err(error) = container.accept_partial_frame(bytes) {
            warn!(
                "ContainerManager: discarded partial frame for container {}: {}",
                id, error
            );
            return Err(error.into());
        }

        let keep_queued = host == HostType::Server || had_local_changes;
        let changes = if keep_queued {
            container.notify_changes()?
        } else {
            container.sync_changes()?
        };
        if keep_queued {
            self.mark_changed(id);
        }
        Ok(changes)
    }

    /// Emits full frames for new containers, then partial frames for dirty
    /// ones, flushing each container after its frame is written.
    ///
    /// A container whose frame fails to encode is reported in
    /// `TickOutput::failures` and left queued; the others still go out.
    pub fn send_tick(&mut self) -> TickOutput {
        let mut output = TickOutput::default();

        let mut unannounced = Vec::new();
        for id in mem::take(&mut self.new_containers) {
            let Some(container) = self.containers.get_mut(&id) else {
                continue;
            };
            match container.write_full_frame() {
                Ok(bytes) => {
                    output.frames.push(OutboundFrame {
                        container_id: id,
                        kind: FrameKind::Full,
                        bytes,
                    });
                    container.flush();
                }
                Err(error) => {
                    warn!(
                        "ContainerManager: could not write full frame for container {}: {}",
                        id, error
                    );
                    unannounced.push(id);
                    output.failures.push((id, error.into()));
                }
            }
        }
        self.new_containers = unannounced;

        let mut retry = Vec::new();
        self.changed_set.clear();
        for id in mem::take(&mut self.changed) {
            // its full frame carries every change once it goes out
            if self.new_containers.contains(&id) {
                continue;
            }
            let Some(container) = self.containers.get_mut(&id) else {
                continue;
            };
            if !container.is_dirty() {
                continue;
            }
            match container.write_partial_frame() {
                Ok(bytes) => {
                    output.frames.push(OutboundFrame {
                        container_id: id,
                        kind: FrameKind::Partial,
                        bytes,
                    });
                    container.flush();
                }
                Err(error) => {
                    warn!(
                        "ContainerManager: could not write partial frame for container {}: {}",
                        id, error
                    );
                    retry.push(id);
                    output.failures.push((id, error.into()));
                }
            }
        }
        for id in retry {
            self.mark_changed(id);
        }

        output
    }

    /// # Panics
    ///
    /// Panics if no container has this id. Use `try_container` to get an error instead.
    pub fn container(&self, id: ContainerId) -> &StateContainer {
        match self.try_container(id) {
            Ok(container) => container,
            Err(error) => panic!("{}", error),
        }
    }

    pub fn try_container(&self, id: ContainerId) -> Result<&StateContainer, ManagerError> {
        self.containers
            .get(&id)
            .ok_or(ManagerError::ContainerNotFound { id })
    }

    pub fn container_mut(&mut self, id: ContainerId) -> Result<&mut StateContainer, ManagerError> {
        self.containers
            .get_mut(&id)
            .ok_or(ManagerError::ContainerNotFound { id })
    }

    pub fn contains(&self, id: ContainerId) -> bool {
        self.containers.contains_key(&id)
    }

    pub fn containers(&self) -> impl Iterator<Item = &StateContainer> {
        self.containers.values()
    }

    pub fn destroy(&mut self, id: ContainerId) -> Result<(), ManagerError> {
        let container = self
            .containers
            .remove(&id)
            .ok_or(ManagerError::ContainerNotFound { id })?;
        self.new_containers.retain(|queued| *queued != id);
        self.changed.retain(|queued| *queued != id);
        self.changed_set.remove(&id);
        container.destroy();
        Ok(())
    }

    /// Next free id, skipping ids still in use after the counter wraps
    fn allocate_id(&mut self) -> Result<ContainerId, ManagerError> {
        let start = self.next_id;
        let mut id = start;
        while self.containers.contains_key(&id) {
            id = id.wrapping_add(1);
            if id == start {
                return Err(ManagerError::ContainerAlreadyExists { id });
            }
        }
        self.next_id = id.wrapping_add(1);
        Ok(id)
    }

    fn mark_changed(&mut self, id: ContainerId) {
        if self.changed_set.insert(id) {
            self.changed.push(id);
        }
    }

    fn check_host(&self, expected: HostType, operation: &'static str) -> Result<(), ManagerError> {
        if self.host != expected {
            return Err(ManagerError::WrongHost {
                operation,
                host: self.host.name(),
            });
        }
        Ok(())
    }
}
