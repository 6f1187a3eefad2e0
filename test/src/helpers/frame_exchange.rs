use deltasync_shared::{
    ChangeRecord, ContainerManager, FrameKind, ManagerError, OutboundFrame, TickOutput,
};

/// Feeds server frames to a client in order, returning the changes the
/// client's observers saw
pub fn deliver_to_client(
    frames: &[OutboundFrame],
    client: &mut ContainerManager,
) -> Result<Vec<ChangeRecord>, ManagerError> {
    let mut changes = Vec::new();
    for frame in frames {
        match frame.kind {
            FrameKind::Full => client.receive_full(frame.container_id, &frame.bytes)?,
            FrameKind::Partial => {
                changes.extend(client.receive_partial(frame.container_id, &frame.bytes)?)
            }
        }
    }
    Ok(changes)
}

/// Feeds client frames to the server in order. Clients only ever send
/// partial frames.
pub fn deliver_to_server(
    frames: &[OutboundFrame],
    server: &mut ContainerManager,
) -> Result<Vec<ChangeRecord>, ManagerError> {
    let mut changes = Vec::new();
    for frame in frames {
        changes.extend(server.receive_partial(frame.container_id, &frame.bytes)?);
    }
    Ok(changes)
}

/// Runs one server send tick and delivers its frames to every client.
/// Returns how many frames were sent, or the first container that failed
/// to encode once the frames that did encode have been delivered.
pub fn tick_server(
    server: &mut ContainerManager,
    clients: &mut [&mut ContainerManager],
) -> Result<usize, ManagerError> {
    let output = server.send_tick();
    for client in clients.iter_mut() {
        deliver_to_client(&output.frames, client)?;
    }
    sent_or_first_failure(output)
}

/// Runs one client send tick and delivers its frames to the server
pub fn tick_client(
    client: &mut ContainerManager,
    server: &mut ContainerManager,
) -> Result<usize, ManagerError> {
    let output = client.send_tick();
    deliver_to_server(&output.frames, server)?;
    sent_or_first_failure(output)
}

fn sent_or_first_failure(output: TickOutput) -> Result<usize, ManagerError> {
    match output.failures.into_iter().next() {
        Some((_, error)) => Err(error),
        None => Ok(output.frames.len()),
    }
}
