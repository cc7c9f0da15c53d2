//! Deterministic in-memory provider
//!
//! Stands in for a real monitoring backend in tests and host integration
//! testing. One hardware node per enabled subsystem, a SuperIO sub-node
//! under the motherboard, and sensors whose readings are absent until the
//! first update and then advance deterministically with a shared tick
//! counter, so freshness ordering is observable.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::error::ProviderError;
use crate::kind::{HardwareKind, SensorKind};
use crate::node::{HardwareNode, SensorNode};
use crate::options::ComputerOptions;
use crate::provider::{Provider, ProviderFactory};

/// Opens [`MockProvider`] instances; optionally fails to open.
#[derive(Default)]
pub struct MockFactory {
    fail_with: Option<String>,
}

impl MockFactory {
    /// A factory whose `open` always fails with the given diagnostic
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            fail_with: Some(message.into()),
        }
    }
}

impl ProviderFactory for MockFactory {
    fn open(&self, options: &ComputerOptions) -> Result<Box<dyn Provider>, ProviderError> {
        if let Some(message) = &self.fail_with {
            return Err(ProviderError::init(message.clone()));
        }
        Ok(Box::new(MockProvider::new(options)))
    }
}

/// Tick counter shared by every node of one provider instance
struct TickClock {
    tick: AtomicU64,
}

pub struct MockProvider {
    roots: Vec<Arc<MockHardware>>,
    clock: Arc<TickClock>,
    closed: bool,
}

impl MockProvider {
    fn new(options: &ComputerOptions) -> Self {
        let clock = Arc::new(TickClock {
            tick: AtomicU64::new(0),
        });
        Self {
            roots: build_tree(options, &clock),
            clock,
            closed: false,
        }
    }

    /// Current tick; advances by one on every hardware update
    pub fn tick(&self) -> u64 {
        self.clock.tick.load(Ordering::SeqCst)
    }
}

impl Provider for MockProvider {
    fn hardware(&self) -> Vec<Arc<dyn HardwareNode>> {
        self.roots
            .iter()
            .map(|hw| Arc::clone(hw) as Arc<dyn HardwareNode>)
            .collect()
    }

    fn apply_options(&mut self, options: &ComputerOptions) {
        if self.closed {
            log::warn!("apply_options on closed mock provider");
            return;
        }
        // Previously handed-out nodes stay alive through their own Arcs;
        // the provider just stops enumerating them.
        self.roots = build_tree(options, &self.clock);
    }

    fn close(&mut self) {
        self.closed = true;
        self.roots.clear();
    }
}

struct SensorSpec {
    name: &'static str,
    kind: SensorKind,
    base: f32,
}

fn spec(name: &'static str, kind: SensorKind, base: f32) -> SensorSpec {
    SensorSpec { name, kind, base }
}

fn build_tree(options: &ComputerOptions, clock: &Arc<TickClock>) -> Vec<Arc<MockHardware>> {
    use HardwareKind::*;
    use SensorKind::*;

    let mut roots = Vec::new();

    if options.battery {
        roots.push(MockHardware::new(
            "Mock Battery",
            "/battery/0",
            Battery,
            vec![],
            vec![spec("Charge Level", Level, 72.0), spec("Voltage", Voltage, 11.4)],
            clock,
        ));
    }
    if options.controller {
        roots.push(MockHardware::new(
            "Mock Embedded Controller",
            "/lpc/ec/0",
            EmbeddedController,
            vec![],
            vec![spec("Fan #1", Fan, 900.0), spec("Chipset", Temperature, 41.0)],
            clock,
        ));
    }
    if options.cpu {
        roots.push(MockHardware::new(
            "Mock CPU",
            "/cpu/0",
            Cpu,
            vec![],
            vec![
                spec("Core (Tctl)", Temperature, 48.0),
                spec("CPU Total", Load, 12.0),
                spec("Core #1", SensorKind::Clock, 3600.0),
                spec("Package", Power, 34.0),
            ],
            clock,
        ));
    }
    if options.gpu {
        roots.push(MockHardware::new(
            "Mock GPU",
            "/gpu-nvidia/0",
            GpuNvidia,
            vec![],
            vec![
                spec("GPU Core", Temperature, 52.0),
                spec("GPU Core", Load, 7.0),
                spec("GPU Fan", Fan, 1200.0),
            ],
            clock,
        ));
    }
    if options.memory {
        roots.push(MockHardware::new(
            "Mock Memory",
            "/ram",
            Memory,
            vec![],
            vec![spec("Memory", Load, 38.0), spec("Memory Used", Data, 12.3)],
            clock,
        ));
    }
    if options.motherboard {
        let super_io = MockHardware::new(
            "Mock SuperIO",
            "/motherboard/superio/0",
            SuperIo,
            vec![],
            vec![
                spec("CPU Fan", Fan, 750.0),
                spec("+12V", Voltage, 12.05),
                spec("System", Temperature, 33.0),
            ],
            clock,
        );
        roots.push(MockHardware::new(
            "Mock Motherboard",
            "/motherboard",
            Motherboard,
            vec![super_io],
            vec![],
            clock,
        ));
    }
    if options.network {
        roots.push(MockHardware::new(
            "Mock NIC",
            "/nic/0",
            Network,
            vec![],
            vec![
                spec("Upload Speed", Throughput, 0.2),
                spec("Download Speed", Throughput, 1.6),
                spec("Network Utilization", Load, 3.0),
            ],
            clock,
        ));
    }
    if options.psu {
        roots.push(MockHardware::new(
            "Mock PSU",
            "/psu/0",
            Psu,
            vec![],
            vec![spec("Power Out", Power, 180.0), spec("+12V Rail", Voltage, 12.1)],
            clock,
        ));
    }
    if options.storage {
        roots.push(MockHardware::new(
            "Mock NVMe",
            "/nvme/0",
            Storage,
            vec![],
            vec![spec("Temperature", Temperature, 39.0), spec("Used Space", Level, 61.0)],
            clock,
        ));
    }

    roots
}

pub struct MockHardware {
    name: String,
    identifier: String,
    kind: HardwareKind,
    children: Vec<Arc<MockHardware>>,
    sensors: Vec<Arc<MockSensor>>,
    clock: Arc<TickClock>,
}

impl MockHardware {
    fn new(
        name: &str,
        identifier: &str,
        kind: HardwareKind,
        children: Vec<Arc<MockHardware>>,
        sensor_specs: Vec<SensorSpec>,
        clock: &Arc<TickClock>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<MockHardware>| {
            let sensors = sensor_specs
                .into_iter()
                .enumerate()
                .map(|(index, spec)| {
                    Arc::new(MockSensor {
                        name: spec.name.to_string(),
                        identifier: format!("{}/{}/{}", identifier, slug(spec.kind), index),
                        kind: spec.kind,
                        base: spec.base,
                        owner: weak.clone(),
                        reading: Mutex::new(Reading::default()),
                    })
                })
                .collect();
            MockHardware {
                name: name.to_string(),
                identifier: identifier.to_string(),
                kind,
                children,
                sensors,
                clock: Arc::clone(clock),
            }
        })
    }
}

impl HardwareNode for MockHardware {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn identifier(&self) -> String {
        self.identifier.clone()
    }

    fn kind(&self) -> HardwareKind {
        self.kind
    }

    fn sub_hardware(&self) -> Vec<Arc<dyn HardwareNode>> {
        self.children
            .iter()
            .map(|c| Arc::clone(c) as Arc<dyn HardwareNode>)
            .collect()
    }

    fn sensors(&self) -> Vec<Arc<dyn SensorNode>> {
        self.sensors
            .iter()
            .map(|s| Arc::clone(s) as Arc<dyn SensorNode>)
            .collect()
    }

    fn update(&self) {
        let tick = self.clock.tick.fetch_add(1, Ordering::SeqCst) + 1;
        for sensor in &self.sensors {
            sensor.poll(tick);
        }
    }
}

#[derive(Default, Clone, Copy)]
struct Reading {
    value: Option<f32>,
    min: Option<f32>,
    max: Option<f32>,
}

pub struct MockSensor {
    name: String,
    identifier: String,
    kind: SensorKind,
    base: f32,
    owner: Weak<MockHardware>,
    reading: Mutex<Reading>,
}

impl MockSensor {
    /// Deterministic reading for a given tick: wobbles around the base.
    fn sample(&self, tick: u64) -> f32 {
        self.base + (tick % 5) as f32 * 0.5
    }

    fn poll(&self, tick: u64) {
        let value = self.sample(tick);
        let mut reading = self.reading.lock();
        reading.value = Some(value);
        reading.min = Some(reading.min.map_or(value, |m| m.min(value)));
        reading.max = Some(reading.max.map_or(value, |m| m.max(value)));
    }
}

impl SensorNode for MockSensor {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn identifier(&self) -> String {
        self.identifier.clone()
    }

    fn kind(&self) -> SensorKind {
        self.kind
    }

    fn value(&self) -> Option<f32> {
        self.reading.lock().value
    }

    fn min(&self) -> Option<f32> {
        self.reading.lock().min
    }

    fn max(&self) -> Option<f32> {
        self.reading.lock().max
    }

    fn owner(&self) -> Option<Arc<dyn HardwareNode>> {
        self.owner.upgrade().map(|hw| hw as Arc<dyn HardwareNode>)
    }
}

fn slug(kind: SensorKind) -> &'static str {
    use SensorKind::*;
    match kind {
        Voltage => "voltage",
        Current => "current",
        Power => "power",
        Clock => "clock",
        Temperature => "temperature",
        Load => "load",
        Frequency => "frequency",
        Fan => "fan",
        Flow => "flow",
        Control => "control",
        Level => "level",
        Factor => "factor",
        Data => "data",
        SmallData => "smalldata",
        Throughput => "throughput",
        TimeSpan => "timespan",
        Energy => "energy",
        Noise => "noise",
        Conductivity => "conductivity",
        Humidity => "humidity",
    }
}
