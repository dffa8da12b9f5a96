//! Delays, clock constraints and timing classification.

use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// Delay in architecture units (picoseconds for every supported family).
pub type Delay = i32;

/// A min/max delay range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DelayPair {
    /// Fastest delay.
    pub min_delay: Delay,
    /// Slowest delay.
    pub max_delay: Delay,
}

impl DelayPair {
    /// Pair with explicit bounds.
    #[must_use]
    pub const fn new(min_delay: Delay, max_delay: Delay) -> Self {
        Self {
            min_delay,
            max_delay,
        }
    }

    /// Degenerate range with `min == max == delay`.
    #[must_use]
    pub const fn fixed(delay: Delay) -> Self {
        Self::new(delay, delay)
    }

    /// Bound-wise sum, `None` on overflow.
    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        Some(Self::new(
            self.min_delay.checked_add(rhs.min_delay)?,
            self.max_delay.checked_add(rhs.max_delay)?,
        ))
    }

    /// Bound-wise difference, `None` on overflow.
    #[must_use]
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        Some(Self::new(
            self.min_delay.checked_sub(rhs.min_delay)?,
            self.max_delay.checked_sub(rhs.max_delay)?,
        ))
    }
}

/// # Panics
///
/// When a delay overflows, in every build profile. Use
/// [`DelayPair::checked_add`] for untrusted input.
#[allow(clippy::panic)]
impl Add for DelayPair {
    type Output = DelayPair;

    fn add(self, rhs: Self) -> Self::Output {
        self.checked_add(rhs)
            .unwrap_or_else(|| panic!("delay overflow: {self} + {rhs}"))
    }
}

/// # Panics
///
/// When a delay overflows, in every build profile. Use
/// [`DelayPair::checked_sub`] for untrusted input.
#[allow(clippy::panic)]
impl Sub for DelayPair {
    type Output = DelayPair;

    fn sub(self, rhs: Self) -> Self::Output {
        self.checked_sub(rhs)
            .unwrap_or_else(|| panic!("delay overflow: {self} - {rhs}"))
    }
}

impl AddAssign for DelayPair {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for DelayPair {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl fmt::Display for DelayPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DelayPair(min={}, max={})", self.min_delay, self.max_delay)
    }
}

/// Separate delay ranges for rising and falling transitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DelayQuad {
    /// Rising edge delays.
    pub rise: DelayPair,
    /// Falling edge delays.
    pub fall: DelayPair,
}

impl DelayQuad {
    /// Quad with every bound given.
    #[must_use]
    pub const fn new(min_rise: Delay, max_rise: Delay, min_fall: Delay, max_fall: Delay) -> Self {
        Self {
            rise: DelayPair::new(min_rise, max_rise),
            fall: DelayPair::new(min_fall, max_fall),
        }
    }

    /// Quad with every bound equal to `delay`.
    #[must_use]
    pub const fn fixed(delay: Delay) -> Self {
        Self::from_pairs(DelayPair::fixed(delay), DelayPair::fixed(delay))
    }

    /// Same range for both edges.
    #[must_use]
    pub const fn from_range(min_delay: Delay, max_delay: Delay) -> Self {
        let pair = DelayPair::new(min_delay, max_delay);
        Self::from_pairs(pair, pair)
    }

    /// Quad from rise and fall pairs.
    #[must_use]
    pub const fn from_pairs(rise: DelayPair, fall: DelayPair) -> Self {
        Self { rise, fall }
    }

    /// Fastest rising delay.
    #[must_use]
    pub const fn min_rise_delay(&self) -> Delay {
        self.rise.min_delay
    }

    /// Slowest rising delay.
    #[must_use]
    pub const fn max_rise_delay(&self) -> Delay {
        self.rise.max_delay
    }

    /// Fastest falling delay.
    #[must_use]
    pub const fn min_fall_delay(&self) -> Delay {
        self.fall.min_delay
    }

    /// Slowest falling delay.
    #[must_use]
    pub const fn max_fall_delay(&self) -> Delay {
        self.fall.max_delay
    }

    /// Fastest delay of either edge.
    #[must_use]
    pub fn min_delay(&self) -> Delay {
        self.rise.min_delay.min(self.fall.min_delay)
    }

    /// Slowest delay of either edge.
    #[must_use]
    pub fn max_delay(&self) -> Delay {
        self.rise.max_delay.max(self.fall.max_delay)
    }

    /// Collapse both edges into one range.
    #[must_use]
    pub fn delay_pair(&self) -> DelayPair {
        DelayPair::new(self.min_delay(), self.max_delay())
    }

    /// Edge-wise sum, `None` on overflow.
    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        Some(Self::from_pairs(
            self.rise.checked_add(rhs.rise)?,
            self.fall.checked_add(rhs.fall)?,
        ))
    }

    /// Edge-wise difference, `None` on overflow.
    #[must_use]
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        Some(Self::from_pairs(
            self.rise.checked_sub(rhs.rise)?,
            self.fall.checked_sub(rhs.fall)?,
        ))
    }
}

/// # Panics
///
/// When a delay overflows, in every build profile. Use
/// [`DelayQuad::checked_add`] for untrusted input.
#[allow(clippy::panic)]
impl Add for DelayQuad {
    type Output = DelayQuad;

    fn add(self, rhs: Self) -> Self::Output {
        self.checked_add(rhs)
            .unwrap_or_else(|| panic!("delay overflow: {self} + {rhs}"))
    }
}

/// # Panics
///
/// When a delay overflows, in every build profile. Use
/// [`DelayQuad::checked_sub`] for untrusted input.
#[allow(clippy::panic)]
impl Sub for DelayQuad {
    type Output = DelayQuad;

    fn sub(self, rhs: Self) -> Self::Output {
        self.checked_sub(rhs)
            .unwrap_or_else(|| panic!("delay overflow: {self} - {rhs}"))
    }
}

impl AddAssign for DelayQuad {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for DelayQuad {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl fmt::Display for DelayQuad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DelayQuad(rise={}, fall={})", self.rise, self.fall)
    }
}

/// Clock waveform constraint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClockConstraint {
    /// High pulse width.
    pub high: DelayPair,
    /// Low pulse width.
    pub low: DelayPair,
    /// Clock period.
    pub period: DelayPair,
}

impl fmt::Display for ClockConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ClockConstraint(high={}, low={}, period={})",
            self.high, self.low, self.period
        )
    }
}

/// Achieved versus requested clock frequency, in MHz.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClockFmax {
    /// Achieved frequency in MHz.
    pub achieved: f32,
    /// Constrained frequency in MHz.
    pub constraint: f32,
}

impl ClockFmax {
    /// Timing closure was met.
    #[must_use]
    pub fn is_met(&self) -> bool {
        self.achieved >= self.constraint
    }
}

impl fmt::Display for ClockFmax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ClockFmax(achieved={:.6}, constraint={:.6})",
            self.achieved, self.constraint
        )
    }
}

/// Direction of a cell port.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum PortType {
    /// Input port.
    #[default]
    In = 0,
    /// Output port.
    Out,
    /// Bidirectional port.
    Inout,
}

impl PortType {
    /// Every value in declaration order.
    pub const ALL: [PortType; 3] = [PortType::In, PortType::Out, PortType::Inout];

    /// Script-facing name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            PortType::In => "IN",
            PortType::Out => "OUT",
            PortType::Inout => "INOUT",
        }
    }
}

/// Role of a port in timing analysis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum TimingPortClass {
    /// Clock input of a sequential cell.
    ClockInput = 0,
    /// Generated clock output.
    GenClock,
    /// Data input of a register.
    RegisterInput,
    /// Data output of a register.
    RegisterOutput,
    /// Input of combinational logic.
    CombInput,
    /// Output of combinational logic.
    CombOutput,
    /// Unclocked path start.
    Startpoint,
    /// Unclocked path end.
    Endpoint,
    /// Not timed.
    #[default]
    Ignore,
}

impl TimingPortClass {
    /// Every value in declaration order.
    pub const ALL: [TimingPortClass; 9] = [
        TimingPortClass::ClockInput,
        TimingPortClass::GenClock,
        TimingPortClass::RegisterInput,
        TimingPortClass::RegisterOutput,
        TimingPortClass::CombInput,
        TimingPortClass::CombOutput,
        TimingPortClass::Startpoint,
        TimingPortClass::Endpoint,
        TimingPortClass::Ignore,
    ];

    /// Script-facing name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            TimingPortClass::ClockInput => "CLOCK_INPUT",
            TimingPortClass::GenClock => "GEN_CLOCK",
            TimingPortClass::RegisterInput => "REGISTER_INPUT",
            TimingPortClass::RegisterOutput => "REGISTER_OUTPUT",
            TimingPortClass::CombInput => "COMB_INPUT",
            TimingPortClass::CombOutput => "COMB_OUTPUT",
            TimingPortClass::Startpoint => "STARTPOINT",
            TimingPortClass::Endpoint => "ENDPOINT",
            TimingPortClass::Ignore => "IGNORE",
        }
    }
}

/// Active clock edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum ClockEdge {
    /// Rising edge.
    #[default]
    Rising = 0,
    /// Falling edge.
    Falling,
}

impl ClockEdge {
    /// Every value in declaration order.
    pub const ALL: [ClockEdge; 2] = [ClockEdge::Rising, ClockEdge::Falling];

    /// Script-facing name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            ClockEdge::Rising => "RISING",
            ClockEdge::Falling => "FALLING",
        }
    }

    /// The other edge.
    #[must_use]
    pub const fn inverted(self) -> Self {
        match self {
            ClockEdge::Rising => ClockEdge::Falling,
            ClockEdge::Falling => ClockEdge::Rising,
        }
    }
}

macro_rules! display_by_name {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.name())
                }
            }
        )*
    };
}

display_by_name!(PortType, TimingPortClass, ClockEdge);
