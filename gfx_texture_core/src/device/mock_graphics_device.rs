/// Mock graphics device for tests (no GPU required)
///
/// Records every device call into a shared `MockDeviceState` that tests can
/// inspect after handing the device to a `Renderer`. Destroyed native handles
/// are recycled (LIFO, like a real driver reusing addresses), so a resource
/// freed too early shows up as two logical resources sharing one handle.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use rustc_hash::FxHashMap;
use crate::error::{Error, Result};
use crate::utils::SlotAllocator;
use super::graphics_device::{
    CommandList, CpuDescriptorHandle, DescriptorHeapKind, DeviceLimits, GraphicsDevice,
    HeapType, ResourceDesc, ResourceHandle, ResourceStates, SubresourceFootprint,
};

// ============================================================================
// Recorded state
// ============================================================================

/// A live mock resource
#[derive(Debug, Clone)]
pub struct MockResource {
    pub desc: ResourceDesc,
    /// Mapped contents (upload buffers only)
    pub contents: Vec<u8>,
}

/// A view written into a descriptor slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockView {
    RenderTarget { resource: ResourceHandle, dest: CpuDescriptorHandle },
    DepthStencil { resource: ResourceHandle, dest: CpuDescriptorHandle },
}

/// A command recorded into a mock command list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockCommand {
    Barrier {
        resource: ResourceHandle,
        before: ResourceStates,
        after: ResourceStates,
    },
    CopyBufferToTexture {
        dst: ResourceHandle,
        dst_subresource: u32,
        src: ResourceHandle,
        src_offset: u64,
    },
}

/// Everything the mock device has observed
#[derive(Debug)]
pub struct MockDeviceState {
    handle_ids: SlotAllocator,
    /// Resources currently alive on the "GPU"
    pub live_resources: FxHashMap<ResourceHandle, MockResource>,
    /// Every successful creation, in order
    pub created: Vec<ResourceHandle>,
    /// Every destruction, in order
    pub destroyed: Vec<ResourceHandle>,
    /// Destructions of handles that were not alive
    pub invalid_destroys: usize,
    pub views: Vec<MockView>,
    pub commands: Vec<MockCommand>,
    pub heaps: Vec<(DescriptorHeapKind, u32)>,
    pub signaled_frame_index: u64,
    pub completed_frame_index: u64,
    /// When set, `signal_frame` retires frames automatically this many frames late
    pub frame_latency: Option<u64>,
    /// When set, every resource creation fails with `OutOfMemory`
    pub fail_allocations: bool,
    next_heap_base: usize,
}

impl MockDeviceState {
    fn new(resource_limit: Option<u32>) -> Self {
        Self {
            handle_ids: match resource_limit {
                Some(limit) => SlotAllocator::with_capacity(limit),
                None => SlotAllocator::new(),
            },
            live_resources: FxHashMap::default(),
            created: Vec::new(),
            destroyed: Vec::new(),
            invalid_destroys: 0,
            views: Vec::new(),
            commands: Vec::new(),
            heaps: Vec::new(),
            signaled_frame_index: 0,
            completed_frame_index: 0,
            frame_latency: None,
            fail_allocations: false,
            next_heap_base: 0x1000,
        }
    }

    pub fn live_count(&self) -> usize {
        self.live_resources.len()
    }

    pub fn is_live(&self, resource: ResourceHandle) -> bool {
        self.live_resources.contains_key(&resource)
    }

    pub fn resource(&self, resource: ResourceHandle) -> Option<&MockResource> {
        self.live_resources.get(&resource)
    }

    /// Pretend the GPU has finished every frame up to `frame_index`
    pub fn complete_frames_up_to(&mut self, frame_index: u64) {
        self.completed_frame_index = self.completed_frame_index.max(frame_index);
    }

    /// Copy commands recorded against `dst`
    pub fn copies_into(&self, dst: ResourceHandle) -> usize {
        self.commands
            .iter()
            .filter(|cmd| matches!(cmd, MockCommand::CopyBufferToTexture { dst: d, .. } if *d == dst))
            .count()
    }
}

fn lock(state: &Mutex<MockDeviceState>) -> MutexGuard<'_, MockDeviceState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Mock device
// ============================================================================

/// Mock graphics device
pub struct MockGraphicsDevice {
    state: Arc<Mutex<MockDeviceState>>,
    limits: DeviceLimits,
}

impl MockGraphicsDevice {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockDeviceState::new(None))),
            limits: DeviceLimits::default(),
        }
    }

    /// Device that runs out of memory once `max_live` resources are alive
    pub fn with_resource_limit(max_live: u32) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockDeviceState::new(Some(max_live)))),
            limits: DeviceLimits::default(),
        }
    }

    /// Device whose GPU retires each frame `latency` frames after it is signaled
    pub fn with_frame_latency(latency: u64) -> Self {
        let device = Self::new();
        lock(&device.state).frame_latency = Some(latency);
        device
    }

    /// Shared recorded state (keep a clone before boxing the device)
    pub fn state(&self) -> Arc<Mutex<MockDeviceState>> {
        Arc::clone(&self.state)
    }

    /// Command list recording into this device's state
    pub fn command_list(&self) -> MockCommandList {
        MockCommandList {
            state: Arc::clone(&self.state),
        }
    }
}

impl Default for MockGraphicsDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn limits(&self) -> DeviceLimits {
        self.limits
    }

    fn create_committed_resource(&mut self, desc: &ResourceDesc) -> Result<ResourceHandle> {
        let mut state = lock(&self.state);
        if state.fail_allocations {
            return Err(Error::OutOfMemory);
        }
        let id = state.handle_ids.alloc().ok_or(Error::OutOfMemory)?;
        let handle = ResourceHandle::from_raw(id as u64 + 1);
        let contents = match desc.heap_type {
            HeapType::Upload => vec![0; desc.width as usize],
            HeapType::Default => Vec::new(),
        };
        state.live_resources.insert(handle, MockResource { desc: desc.clone(), contents });
        state.created.push(handle);
        Ok(handle)
    }

    fn destroy_resource(&mut self, resource: ResourceHandle) {
        let mut state = lock(&self.state);
        if state.live_resources.remove(&resource).is_none() {
            state.invalid_destroys += 1;
            return;
        }
        state.handle_ids.free((resource.raw() - 1) as u32);
        state.destroyed.push(resource);
    }

    fn create_descriptor_heap(&mut self, kind: DescriptorHeapKind, capacity: u32) -> Result<CpuDescriptorHandle> {
        let increment = self.descriptor_handle_increment_size(kind);
        let mut state = lock(&self.state);
        let base = CpuDescriptorHandle { ptr: state.next_heap_base };
        state.next_heap_base += capacity as usize * increment as usize + 0x1000;
        state.heaps.push((kind, capacity));
        Ok(base)
    }

    fn descriptor_handle_increment_size(&self, kind: DescriptorHeapKind) -> u32 {
        match kind {
            DescriptorHeapKind::RenderTargetView => 32,
            DescriptorHeapKind::DepthStencilView => 8,
        }
    }

    fn create_render_target_view(&mut self, resource: ResourceHandle, dest: CpuDescriptorHandle) {
        lock(&self.state).views.push(MockView::RenderTarget { resource, dest });
    }

    fn create_depth_stencil_view(&mut self, resource: ResourceHandle, dest: CpuDescriptorHandle) {
        lock(&self.state).views.push(MockView::DepthStencil { resource, dest });
    }

    fn write_buffer(&mut self, buffer: ResourceHandle, offset: u64, data: &[u8]) -> Result<()> {
        let mut state = lock(&self.state);
        let resource = state.live_resources.get_mut(&buffer).ok_or_else(|| {
            Error::BackendError(format!("write to unknown buffer {:?}", buffer))
        })?;
        if resource.desc.heap_type != HeapType::Upload {
            return Err(Error::BackendError(format!("buffer {:?} is not CPU-writable", buffer)));
        }
        let start = offset as usize;
        let end = start + data.len();
        if end > resource.contents.len() {
            return Err(Error::BackendError(format!(
                "write of {} bytes at {} overflows buffer of {} bytes",
                data.len(),
                offset,
                resource.contents.len()
            )));
        }
        resource.contents[start..end].copy_from_slice(data);
        Ok(())
    }

    fn signal_frame(&mut self, frame_index: u64) {
        let mut state = lock(&self.state);
        state.signaled_frame_index = frame_index;
        if let Some(latency) = state.frame_latency {
            let retired = frame_index.saturating_sub(latency);
            state.complete_frames_up_to(retired);
        }
    }

    fn completed_frame_index(&self) -> u64 {
        lock(&self.state).completed_frame_index
    }
}

// ============================================================================
// Mock command list
// ============================================================================

/// Mock command list (records into the owning device's state)
pub struct MockCommandList {
    state: Arc<Mutex<MockDeviceState>>,
}

impl CommandList for MockCommandList {
    fn resource_barrier(&mut self, resource: ResourceHandle, before: ResourceStates, after: ResourceStates) {
        lock(&self.state).commands.push(MockCommand::Barrier { resource, before, after });
    }

    fn copy_buffer_to_texture(
        &mut self,
        dst: ResourceHandle,
        dst_subresource: u32,
        src: ResourceHandle,
        footprint: &SubresourceFootprint,
    ) {
        lock(&self.state).commands.push(MockCommand::CopyBufferToTexture {
            dst,
            dst_subresource,
            src,
            src_offset: footprint.offset,
        });
    }
}

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;
