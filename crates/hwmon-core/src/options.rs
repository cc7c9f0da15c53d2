//! Computer enumeration options

use serde::{Deserialize, Serialize};

use crate::HardwareKind;

/// Which hardware subsystems a provider enumerates.
///
/// Nine independent toggles. The default is all-false: a freshly opened
/// computer enumerates nothing until the host asks for something, which
/// keeps accidental privilege-heavy probing (SMBus, ring-0 drivers on some
/// backends) opt-in. Options may be re-applied to a live provider via
/// [`crate::Provider::apply_options`] without reopening.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputerOptions {
    pub battery: bool,
    pub controller: bool,
    pub cpu: bool,
    pub gpu: bool,
    pub memory: bool,
    pub motherboard: bool,
    pub network: bool,
    pub psu: bool,
    pub storage: bool,
}

impl ComputerOptions {
    /// Every subsystem enabled
    pub fn all() -> Self {
        Self {
            battery: true,
            controller: true,
            cpu: true,
            gpu: true,
            memory: true,
            motherboard: true,
            network: true,
            psu: true,
            storage: true,
        }
    }

    /// True if no subsystem is enabled
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Whether hardware of the given kind is enabled by these options.
    ///
    /// GPU vendors share one toggle; SuperIO and cooler hardware surface
    /// under the motherboard and controller toggles respectively, matching
    /// how monitoring backends group them.
    pub fn enables(&self, kind: HardwareKind) -> bool {
        use HardwareKind::*;
        match kind {
            Motherboard | SuperIo => self.motherboard,
            Cpu => self.cpu,
            Memory => self.memory,
            GpuNvidia | GpuAmd | GpuIntel => self.gpu,
            Storage => self.storage,
            Network => self.network,
            Cooler | EmbeddedController => self.controller,
            Psu => self.psu,
            Battery => self.battery,
        }
    }
}
