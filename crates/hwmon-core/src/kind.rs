//! Hardware and sensor kind enumerations
//!
//! Variant order is the wire order: `code()` returns the discriminant
//! carried across the C ABI, and `from_code` is its partial inverse.
//! Reordering variants is a breaking ABI change.

use serde::{Deserialize, Serialize};

/// Kind of a hardware node
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum HardwareKind {
    Motherboard,
    SuperIo,
    Cpu,
    Memory,
    GpuNvidia,
    GpuAmd,
    GpuIntel,
    Storage,
    Network,
    Cooler,
    EmbeddedController,
    Psu,
    Battery,
}

impl HardwareKind {
    /// Integer code carried across the ABI
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i32) -> Option<Self> {
        use HardwareKind::*;
        Some(match code {
            0 => Motherboard,
            1 => SuperIo,
            2 => Cpu,
            3 => Memory,
            4 => GpuNvidia,
            5 => GpuAmd,
            6 => GpuIntel,
            7 => Storage,
            8 => Network,
            9 => Cooler,
            10 => EmbeddedController,
            11 => Psu,
            12 => Battery,
            _ => return None,
        })
    }
}

/// Kind of a sensor reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum SensorKind {
    Voltage,
    Current,
    Power,
    Clock,
    Temperature,
    Load,
    Frequency,
    Fan,
    Flow,
    Control,
    Level,
    Factor,
    Data,
    SmallData,
    Throughput,
    TimeSpan,
    Energy,
    Noise,
    Conductivity,
    Humidity,
}

impl SensorKind {
    /// Integer code carried across the ABI
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i32) -> Option<Self> {
        use SensorKind::*;
        Some(match code {
            0 => Voltage,
            1 => Current,
            2 => Power,
            3 => Clock,
            4 => Temperature,
            5 => Load,
            6 => Frequency,
            7 => Fan,
            8 => Flow,
            9 => Control,
            10 => Level,
            11 => Factor,
            12 => Data,
            13 => SmallData,
            14 => Throughput,
            15 => TimeSpan,
            16 => Energy,
            17 => Noise,
            18 => Conductivity,
            19 => Humidity,
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn hardware_kind_codes_round_trip() {
        for code in 0..13 {
            let kind = HardwareKind::from_code(code).expect("valid code");
            assert_eq!(kind.code(), code);
        }
        assert_eq!(HardwareKind::from_code(13), None);
        assert_eq!(HardwareKind::from_code(-1), None);
    }

    #[test]
    fn sensor_kind_codes_round_trip() {
        for code in 0..20 {
            let kind = SensorKind::from_code(code).expect("valid code");
            assert_eq!(kind.code(), code);
        }
        assert_eq!(SensorKind::from_code(20), None);
        assert_eq!(SensorKind::from_code(-1), None);
    }

    #[test]
    fn wire_order_is_stable() {
        assert_eq!(HardwareKind::Cpu.code(), 2);
        assert_eq!(HardwareKind::Battery.code(), 12);
        assert_eq!(SensorKind::Temperature.code(), 4);
        assert_eq!(SensorKind::Humidity.code(), 19);
    }
}
