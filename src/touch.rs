//! Touch sensor model.
//!
//! The robot reports touch as a full snapshot: every sensor with its
//! current active flag, not a diff.  On the wire that is a list of
//! `[name, active]` pairs:
//!
//! ```text
//! [["Head", true], ["LArm", false], ["RFoot/Bumper/Right", false], ...]
//! ```
//!
//! Names outside the known set (e.g. hand or head sub-zones on some body
//! versions) are skipped during parsing.  A payload whose *shape* is wrong
//! is a [`MalformedEvent`].

use core::fmt;

use log::debug;
use serde_json::Value;

use crate::error::MalformedEvent;

/// Readings kept per snapshot: one per known sensor.
pub const MAX_READINGS: usize = TouchSensor::COUNT;

// ---------------------------------------------------------------------------
// Sensor identity
// ---------------------------------------------------------------------------

/// Physical touch sensors the dispatcher understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TouchSensor {
    Head = 0,
    LeftArm = 1,
    RightArm = 2,
    LeftFootBumperLeft = 3,
    LeftFootBumperRight = 4,
    RightFootBumperLeft = 5,
    RightFootBumperRight = 6,
}

impl TouchSensor {
    pub const COUNT: usize = 7;

    pub const ALL: [Self; Self::COUNT] = [
        Self::Head,
        Self::LeftArm,
        Self::RightArm,
        Self::LeftFootBumperLeft,
        Self::LeftFootBumperRight,
        Self::RightFootBumperLeft,
        Self::RightFootBumperRight,
    ];

    /// Name the robot uses for this sensor in `TouchChanged` payloads.
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Head => "Head",
            Self::LeftArm => "LArm",
            Self::RightArm => "RArm",
            Self::LeftFootBumperLeft => "LFoot/Bumper/Left",
            Self::LeftFootBumperRight => "LFoot/Bumper/Right",
            Self::RightFootBumperLeft => "RFoot/Bumper/Left",
            Self::RightFootBumperRight => "RFoot/Bumper/Right",
        }
    }

    pub fn from_wire_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.wire_name() == name)
    }

    const fn mask(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for TouchSensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

// ---------------------------------------------------------------------------
// TouchedSet
// ---------------------------------------------------------------------------

/// The subset of sensors reported active in one snapshot.
///
/// Stored as a bitmask, one bit per [`TouchSensor`] discriminant.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct TouchedSet(u8);

impl TouchedSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, sensor: TouchSensor) {
        self.0 |= sensor.mask();
    }

    pub const fn contains(&self, sensor: TouchSensor) -> bool {
        self.0 & sensor.mask() != 0
    }

    /// `true` if at least one of `sensors` is in the set.
    pub fn contains_any(&self, sensors: &[TouchSensor]) -> bool {
        sensors.iter().any(|s| self.contains(*s))
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub const fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = TouchSensor> + '_ {
        TouchSensor::ALL.into_iter().filter(|s| self.contains(*s))
    }

    pub const fn bits(&self) -> u8 {
        self.0
    }
}

impl FromIterator<TouchSensor> for TouchedSet {
    fn from_iter<I: IntoIterator<Item = TouchSensor>>(iter: I) -> Self {
        let mut set = Self::empty();
        for s in iter {
            set.insert(s);
        }
        set
    }
}

impl fmt::Debug for TouchedSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

// ---------------------------------------------------------------------------
// TouchEvent
// ---------------------------------------------------------------------------

/// One `(sensor, active)` pair from a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchReading {
    pub sensor: TouchSensor,
    pub active: bool,
}

/// Full snapshot of the known touch sensors at the moment the event fired.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TouchEvent {
    readings: heapless::Vec<TouchReading, MAX_READINGS>,
}

impl TouchEvent {
    /// A snapshot with no readings (every sensor inactive).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from `(sensor, active)` pairs.  A sensor listed twice is
    /// active if any of its entries is.
    pub fn from_pairs(pairs: &[(TouchSensor, bool)]) -> Self {
        let mut ev = Self::empty();
        for &(sensor, active) in pairs {
            ev.record(sensor, active);
        }
        ev
    }

    /// Parse a `TouchChanged` payload.
    ///
    /// Active flags follow the robot's truthiness: `true`/`false`, or a
    /// number where non-zero means active.
    pub fn from_payload(value: &Value) -> Result<Self, MalformedEvent> {
        let entries = value.as_array().ok_or(MalformedEvent::NotAList)?;
        let mut ev = Self::empty();

        for (i, entry) in entries.iter().enumerate() {
            let pair = match entry.as_array() {
                Some(p) if p.len() == 2 => p,
                _ => return Err(MalformedEvent::BadEntry(i)),
            };
            let name = pair[0].as_str().ok_or(MalformedEvent::BadName(i))?;
            let active = match &pair[1] {
                Value::Bool(b) => *b,
                Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
                _ => return Err(MalformedEvent::BadFlag(i)),
            };

            let Some(sensor) = TouchSensor::from_wire_name(name) else {
                debug!("Skipping unknown touch sensor '{}'", name);
                continue;
            };
            ev.record(sensor, active);
        }

        Ok(ev)
    }

    /// Render back to the wire shape.
    pub fn to_payload(&self) -> Value {
        Value::Array(
            self.readings
                .iter()
                .map(|r| Value::Array(vec![Value::from(r.sensor.wire_name()), Value::from(r.active)]))
                .collect(),
        )
    }

    pub fn readings(&self) -> &[TouchReading] {
        &self.readings
    }

    /// Sensors whose flag is active.
    pub fn touched(&self) -> TouchedSet {
        self.readings
            .iter()
            .filter(|r| r.active)
            .map(|r| r.sensor)
            .collect()
    }

    /// Merge one reading, keeping a single slot per sensor.
    fn record(&mut self, sensor: TouchSensor, active: bool) {
        if let Some(r) = self.readings.iter_mut().find(|r| r.sensor == sensor) {
            r.active |= active;
            return;
        }
        // At most COUNT distinct sensors, so the push always fits.
        let _ = self.readings.push(TouchReading { sensor, active });
    }
}
