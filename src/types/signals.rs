use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a trend call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Get display label for this direction.
    pub fn label(&self) -> &'static str {
        match self {
            Direction::Up => "UP",
            Direction::Down => "DOWN",
        }
    }

    /// Trade side implied by this direction.
    pub fn side(&self) -> &'static str {
        match self {
            Direction::Up => "LONG",
            Direction::Down => "SHORT",
        }
    }

    /// +1.0 for Up, -1.0 for Down.
    pub fn sign(&self) -> f64 {
        match self {
            Direction::Up => 1.0,
            Direction::Down => -1.0,
        }
    }

    /// Direction of `a` relative to `b`: Up iff a > b.
    pub fn of_cross(a: f64, b: f64) -> Self {
        if a > b {
            Direction::Up
        } else {
            Direction::Down
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Directional bias that may also be neutral (structure, daily coarse direction).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrendBias {
    Up,
    Down,
    #[default]
    Neutral,
}

impl TrendBias {
    /// The non-neutral direction, if any.
    pub fn direction(&self) -> Option<Direction> {
        match self {
            TrendBias::Up => Some(Direction::Up),
            TrendBias::Down => Some(Direction::Down),
            TrendBias::Neutral => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TrendBias::Up => "UP",
            TrendBias::Down => "DOWN",
            TrendBias::Neutral => "NEUTRAL",
        }
    }
}

impl From<Direction> for TrendBias {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Up => TrendBias::Up,
            Direction::Down => TrendBias::Down,
        }
    }
}

impl fmt::Display for TrendBias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Comparison of the two most recent swing highs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HighType {
    /// Higher high.
    HH,
    /// Lower (or equal) high.
    LH,
}

/// Comparison of the two most recent swing lows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LowType {
    /// Higher low.
    HL,
    /// Lower (or equal) low.
    LL,
}

impl HighType {
    pub fn label(&self) -> &'static str {
        match self {
            HighType::HH => "HH",
            HighType::LH => "LH",
        }
    }
}

impl LowType {
    pub fn label(&self) -> &'static str {
        match self {
            LowType::HL => "HL",
            LowType::LL => "LL",
        }
    }
}

/// Market structure at a bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Structure {
    pub high_type: Option<HighType>,
    pub low_type: Option<LowType>,
    /// Direction implied by the high/low labels.
    pub bias: TrendBias,
    /// Index of the latest swing high at or before the bar.
    pub last_swing_high: Option<usize>,
    /// Index of the latest swing low at or before the bar.
    pub last_swing_low: Option<usize>,
}

impl Structure {
    /// "HH / HL" style label, with "-" for a missing side.
    pub fn labels(&self) -> String {
        format!(
            "{} / {}",
            self.high_type.map(|h| h.label()).unwrap_or("-"),
            self.low_type.map(|l| l.label()).unwrap_or("-"),
        )
    }
}

/// Trend confirmation state of a single bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Confirmation {
    /// EMA fast vs slow direction at the bar.
    pub raw_direction: Direction,
    /// Confirmed direction; never contradicts structure or EMA.
    pub confirmed_direction: Option<Direction>,
    pub structure: Structure,
    /// Vote count (0 when structure and EMA disagree or structure is neutral).
    pub votes: u8,
}

/// Advisory strength of a confirmed call against the daily bias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrengthLabel {
    Strong,
    WeakCounterTrend,
    Neutral,
}

impl StrengthLabel {
    pub fn label(&self) -> &'static str {
        match self {
            StrengthLabel::Strong => "Strong",
            StrengthLabel::WeakCounterTrend => "Weak (counter-trend)",
            StrengthLabel::Neutral => "Neutral",
        }
    }
}

/// Taker side of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    /// Parse from an exchange side string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "buy" | "b" => Some(TradeSide::Buy),
            "sell" | "s" => Some(TradeSide::Sell),
            _ => None,
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            TradeSide::Buy => Direction::Up,
            TradeSide::Sell => Direction::Down,
        }
    }
}

/// A single trade from the recent tape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub price: f64,
    pub size: f64,
    pub side: TradeSide,
}

impl Trade {
    pub fn notional(&self) -> f64 {
        self.price * self.size
    }
}

/// Size bucket of the largest trade in the tape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum FlowCategory {
    #[default]
    #[serde(rename = "-")]
    None,
    M,
    L,
    XL,
    XXL,
}

impl FlowCategory {
    pub fn label(&self) -> &'static str {
        match self {
            FlowCategory::None => "-",
            FlowCategory::M => "M",
            FlowCategory::L => "L",
            FlowCategory::XL => "XL",
            FlowCategory::XXL => "XXL",
        }
    }
}

/// Summary of recent large-trade flow for an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FlowSummary {
    /// Buy notional minus sell notional.
    pub net: f64,
    pub category: FlowCategory,
    /// Notional of the single largest trade.
    pub largest_notional: f64,
    /// Side of the single largest trade.
    pub dominant_direction: Option<Direction>,
}
