//! Provider seam for monitoring backends
//!
//! The bridge never enumerates hardware itself; a backend implements
//! [`Provider`] and the host installs a [`ProviderFactory`] so the boundary
//! layer can open computers on demand. Backends are consumed as black
//! boxes: whatever does the real SMBus/driver work lives behind these two
//! traits.

use std::sync::Arc;

use crate::error::ProviderError;
use crate::node::HardwareNode;
use crate::options::ComputerOptions;

/// An open monitoring backend for one computer
pub trait Provider: Send {
    /// Top-level hardware nodes currently enumerated
    fn hardware(&self) -> Vec<Arc<dyn HardwareNode>>;

    /// Re-apply enumeration options to the live backend without reopening
    fn apply_options(&mut self, options: &ComputerOptions);

    /// Release backend resources. Called exactly once, before drop.
    fn close(&mut self);
}

/// Opens [`Provider`] instances for the bridge
pub trait ProviderFactory: Send {
    fn open(&self, options: &ComputerOptions) -> Result<Box<dyn Provider>, ProviderError>;
}
