pub type ContainerId = u32;
pub type SyncTypeId = u8;

/// Which side of the replication link this process plays
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HostType {
    /// Holds the writer-of-record copy and broadcasts it
    Server,
    /// Holds a mirror and sends local edits upstream
    Client,
}

impl HostType {
    pub fn name(self) -> &'static str {
        match self {
            HostType::Server => "Server",
            HostType::Client => "Client",
        }
    }
}
