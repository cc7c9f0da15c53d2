//! Process-scoped handle registry and provider-factory slot
//!
//! The registry is the only shared mutable state in the bridge. It maps
//! tokens to nodes of the provider object graph; hardware and sensor nodes
//! are held behind `Arc`, so freeing one handle never invalidates another
//! handle to an overlapping node - each handle keeps its node alive on its
//! own. The mutex is defense-in-depth: the caller contract is still one
//! call in flight per handle.

use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use hwmon_core::{
    ComputerOptions, HardwareNode, Provider, ProviderError, ProviderFactory, SensorNode,
};

use crate::handle::{Arena, RawToken};

/// Token resolution failure. Always degrades at the ABI, never propagates.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// Stale, foreign, never-issued, or wrongly-typed token
    #[error("invalid handle {0:#x}")]
    InvalidHandle(RawToken),
}

/// An open computer: the provider instance plus its current options
pub(crate) struct ComputerState {
    pub provider: Box<dyn Provider>,
    pub options: ComputerOptions,
}

pub(crate) enum Node {
    Computer(ComputerState),
    Hardware(Arc<dyn HardwareNode>),
    Sensor(Arc<dyn SensorNode>),
}

static REGISTRY: Mutex<Arena<Node>> = Mutex::new(Arena::new());
static FACTORY: Mutex<Option<Box<dyn ProviderFactory>>> = Mutex::new(None);

/// Install the backend used by `hwmon_computer_open`.
///
/// Hosts call this once, before exercising the C surface. Reinstalling
/// replaces the previous factory; computers already open keep their
/// provider.
pub fn install_provider_factory<F>(factory: F)
where
    F: ProviderFactory + 'static,
{
    *FACTORY.lock() = Some(Box::new(factory));
}

/// Remove the installed factory; subsequent opens fail with a diagnostic.
pub fn clear_provider_factory() {
    *FACTORY.lock() = None;
}

/// Open a provider through the installed factory and register the computer.
pub(crate) fn open_computer(options: ComputerOptions) -> Result<RawToken, ProviderError> {
    let factory = FACTORY.lock();
    let factory = factory
        .as_ref()
        .ok_or_else(|| ProviderError::unavailable("no provider factory installed"))?;
    let provider = factory.open(&options)?;
    let token = REGISTRY
        .lock()
        .insert(Node::Computer(ComputerState { provider, options }));
    debug!("opened computer {token:#x}");
    Ok(token)
}

/// Close the provider and retire the computer token.
///
/// Separately issued hardware/sensor handles stay valid; their nodes are
/// independently owned.
pub(crate) fn close_computer(token: RawToken) -> Result<(), RegistryError> {
    let mut registry = REGISTRY.lock();
    match registry.get(token) {
        Some(Node::Computer(_)) => {}
        _ => return Err(RegistryError::InvalidHandle(token)),
    }
    if let Some(Node::Computer(mut state)) = registry.remove(token) {
        // Close outside the registry's own bookkeeping but under the lock;
        // the single-call contract means no one else is waiting on it.
        state.provider.close();
        debug!("closed computer {token:#x}");
    }
    Ok(())
}

/// Run `f` against the computer state behind `token`.
pub(crate) fn with_computer<R>(
    token: RawToken,
    f: impl FnOnce(&mut ComputerState) -> R,
) -> Result<R, RegistryError> {
    let mut registry = REGISTRY.lock();
    match registry.get_mut(token) {
        Some(Node::Computer(state)) => Ok(f(state)),
        _ => Err(RegistryError::InvalidHandle(token)),
    }
}

/// Clone out the hardware node behind `token`.
pub(crate) fn hardware_node(token: RawToken) -> Result<Arc<dyn HardwareNode>, RegistryError> {
    match REGISTRY.lock().get(token) {
        Some(Node::Hardware(node)) => Ok(Arc::clone(node)),
        _ => Err(RegistryError::InvalidHandle(token)),
    }
}

/// Clone out the sensor node behind `token`.
pub(crate) fn sensor_node(token: RawToken) -> Result<Arc<dyn SensorNode>, RegistryError> {
    match REGISTRY.lock().get(token) {
        Some(Node::Sensor(node)) => Ok(Arc::clone(node)),
        _ => Err(RegistryError::InvalidHandle(token)),
    }
}

/// Issue a fresh token for a hardware node. Every accessor call issues new
/// tokens; there is no identity caching.
pub(crate) fn insert_hardware(node: Arc<dyn HardwareNode>) -> RawToken {
    REGISTRY.lock().insert(Node::Hardware(node))
}

pub(crate) fn insert_sensor(node: Arc<dyn SensorNode>) -> RawToken {
    REGISTRY.lock().insert(Node::Sensor(node))
}

/// Retire a hardware token. The token block only; the node survives while
/// other handles or its provider reference it.
pub(crate) fn free_hardware(token: RawToken) -> Result<(), RegistryError> {
    let mut registry = REGISTRY.lock();
    match registry.get(token) {
        Some(Node::Hardware(_)) => {
            registry.remove(token);
            Ok(())
        }
        _ => Err(RegistryError::InvalidHandle(token)),
    }
}

pub(crate) fn free_sensor(token: RawToken) -> Result<(), RegistryError> {
    let mut registry = REGISTRY.lock();
    match registry.get(token) {
        Some(Node::Sensor(_)) => {
            registry.remove(token);
            Ok(())
        }
        _ => Err(RegistryError::InvalidHandle(token)),
    }
}
