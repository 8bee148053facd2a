use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Packing configuration.
/// Key notes:
///   - `method` selects the packing strategy; `Auto` runs the whole portfolio and keeps the
///     placement with the best occupancy
///   - `sizing` selects how the canvas is chosen (`Automatic` grows up to `max_*`, `MinMax`
///     stays within `[min_*, max_*]`, `Manual` packs into exactly `max_width x max_height`)
///   - `parallel` fans portfolio trials out over rayon when the `parallel` feature is enabled
///
/// Packing methods.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PackerMethod {
    /// Free-rectangle list (highest quality; several heuristics).
    MaxRects,
    /// Guillotine cuts (fast, flexible choice/split rules).
    Guillotine,
    /// Next-fit shelves in input order.
    Shelf,
    /// First-fit decreasing height shelves.
    #[serde(rename = "shelf_ffdh")]
    ShelfFfdh,
    /// Piecewise height profile (bottom-left or min-waste).
    Skyline,
    /// Left-to-right rows in input order; baseline.
    #[serde(rename = "simple_row")]
    SimpleRow,
    /// Try every method and keep the densest placement.
    Auto,
}

impl FromStr for PackerMethod {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "maxrects" => Ok(Self::MaxRects),
            "guillotine" => Ok(Self::Guillotine),
            "shelf" => Ok(Self::Shelf),
            "shelf_ffdh" | "ffdh" => Ok(Self::ShelfFfdh),
            "skyline" => Ok(Self::Skyline),
            "simple_row" | "row" => Ok(Self::SimpleRow),
            "auto" => Ok(Self::Auto),
            _ => Err(()),
        }
    }
}

/// MaxRects placement heuristics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MaxRectsHeuristic {
    BestShortSideFit,
    BestLongSideFit,
    BestAreaFit,
    BottomLeft,
    ContactPoint,
    /// Run every heuristic above and keep the best result.
    Auto,
}

impl MaxRectsHeuristic {
    /// Concrete heuristics in the order `Auto` tries them.
    pub const ALL: [MaxRectsHeuristic; 5] = [
        MaxRectsHeuristic::BestShortSideFit,
        MaxRectsHeuristic::BestLongSideFit,
        MaxRectsHeuristic::BestAreaFit,
        MaxRectsHeuristic::BottomLeft,
        MaxRectsHeuristic::ContactPoint,
    ];
}

impl FromStr for MaxRectsHeuristic {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bssf" | "bestshortsidefit" => Ok(Self::BestShortSideFit),
            "blsf" | "bestlongsidefit" => Ok(Self::BestLongSideFit),
            "baf" | "bestareafit" => Ok(Self::BestAreaFit),
            "bl" | "bottomleft" => Ok(Self::BottomLeft),
            "cp" | "contactpoint" => Ok(Self::ContactPoint),
            "auto" => Ok(Self::Auto),
            _ => Err(()),
        }
    }
}

/// Skyline placement heuristics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SkylineHeuristic {
    BottomLeft,
    MinWaste,
}

impl FromStr for SkylineHeuristic {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bl" | "bottomleft" => Ok(Self::BottomLeft),
            "minwaste" | "mw" => Ok(Self::MinWaste),
            _ => Err(()),
        }
    }
}

/// Guillotine free-rect choice heuristics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum GuillotineChoice {
    BestAreaFit,
    BestShortSideFit,
    BestLongSideFit,
    WorstAreaFit,
    WorstShortSideFit,
    WorstLongSideFit,
}

impl FromStr for GuillotineChoice {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "baf" | "bestareafit" => Ok(Self::BestAreaFit),
            "bssf" | "bestshortsidefit" => Ok(Self::BestShortSideFit),
            "blsf" | "bestlongsidefit" => Ok(Self::BestLongSideFit),
            "waf" | "worstareafit" => Ok(Self::WorstAreaFit),
            "wssf" | "worstshortsidefit" => Ok(Self::WorstShortSideFit),
            "wlsf" | "worstlongsidefit" => Ok(Self::WorstLongSideFit),
            _ => Err(()),
        }
    }
}

/// Guillotine split axis heuristics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum GuillotineSplit {
    SplitShorterLeftoverAxis,
    SplitLongerLeftoverAxis,
    SplitMinimizeArea,
    SplitMaximizeArea,
    SplitShorterAxis,
    SplitLongerAxis,
}

impl FromStr for GuillotineSplit {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "slas" | "splitshorterleftoveraxis" => Ok(Self::SplitShorterLeftoverAxis),
            "llas" | "splitlongerleftoveraxis" => Ok(Self::SplitLongerLeftoverAxis),
            "minas" | "splitminimizearea" => Ok(Self::SplitMinimizeArea),
            "maxas" | "splitmaximizearea" => Ok(Self::SplitMaximizeArea),
            "sas" | "splitshorteraxis" => Ok(Self::SplitShorterAxis),
            "las" | "splitlongeraxis" => Ok(Self::SplitLongerAxis),
            _ => Err(()),
        }
    }
}

/// How the canvas size is chosen.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SizingMode {
    /// Smallest feasible canvas, growing up to `max_width x max_height`.
    Automatic,
    /// Like `Automatic`, but never below `min_*` nor above `max_*`.
    MinMax,
    /// Exactly `max_width x max_height`; never grows.
    Manual,
}

impl FromStr for SizingMode {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "automatic" | "auto" => Ok(Self::Automatic),
            "minmax" | "min_max" => Ok(Self::MinMax),
            "manual" | "fixed" => Ok(Self::Manual),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackerConfig {
    // algorithm selection
    #[serde(default = "default_method")]
    pub method: PackerMethod,
    #[serde(default = "default_mr_heuristic")]
    pub mr_heuristic: MaxRectsHeuristic,
    #[serde(default = "default_skyline_heuristic")]
    pub skyline_heuristic: SkylineHeuristic,
    #[serde(default = "default_g_choice")]
    pub g_choice: GuillotineChoice,
    #[serde(default = "default_g_split")]
    pub g_split: GuillotineSplit,

    // canvas sizing
    #[serde(default = "default_sizing")]
    pub sizing: SizingMode,
    /// Maximum canvas width; the exact width in `Manual` mode.
    pub max_width: u32,
    /// Maximum canvas height; the exact height in `Manual` mode.
    pub max_height: u32,
    /// Minimum canvas width (`MinMax` only).
    #[serde(default)]
    pub min_width: u32,
    /// Minimum canvas height (`MinMax` only).
    #[serde(default)]
    pub min_height: u32,
    /// Round canvas dimensions up to powers of two.
    pub power_of_two: bool,
    /// Force a square canvas.
    #[serde(default)]
    pub square: bool,

    /// Pixels between sprites.
    pub padding: u32,
    /// Pixels around the whole canvas.
    #[serde(default)]
    pub border_padding: u32,
    /// Repeat edge pixels of each sprite outward (for sampling safety).
    #[serde(default)]
    pub extrude: u32,

    /// Allow 90° rotations where the packer finds them beneficial.
    pub allow_rotation: bool,
    /// Detect horizontally/vertically mirrored duplicates and store them once.
    pub allow_flip: bool,
    /// Store bit-identical sprites once.
    #[serde(default = "default_dedupe")]
    pub dedupe: bool,
    /// Trim transparent borders.
    pub trim: bool,
    /// Pixels with alpha at or below this percentage of 255 count as transparent (0..=100).
    pub alpha_threshold: u8,

    /// Draw red outlines around sprites (debug).
    #[serde(default)]
    pub outlines: bool,
    /// Canvas fill for unoccupied pixels; transparent when `None`.
    #[serde(default)]
    pub background_color: Option<[u8; 4]>,
    /// Evaluate portfolio trials in parallel when feature "parallel" is on.
    #[serde(default)]
    pub parallel: bool,
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            method: default_method(),
            mr_heuristic: default_mr_heuristic(),
            skyline_heuristic: default_skyline_heuristic(),
            g_choice: default_g_choice(),
            g_split: default_g_split(),
            sizing: default_sizing(),
            max_width: 2048,
            max_height: 2048,
            min_width: 0,
            min_height: 0,
            power_of_two: false,
            square: false,
            padding: 2,
            border_padding: 0,
            extrude: 0,
            allow_rotation: true,
            allow_flip: false,
            dedupe: default_dedupe(),
            trim: true,
            alpha_threshold: 0,
            outlines: false,
            background_color: None,
            parallel: false,
        }
    }
}

impl PackerConfig {
    /// Validates the configuration parameters.
    ///
    /// Returns an error if:
    /// - Maximum dimensions are zero, or a minimum exceeds its maximum
    /// - Border padding leaves no usable space
    /// - `alpha_threshold` is above 100
    /// - Power-of-two sizing cannot be satisfied within the configured bounds
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::SheetPackerError;

        if self.max_width == 0 || self.max_height == 0 {
            return Err(SheetPackerError::InvalidDimension {
                key: "max size".into(),
                width: self.max_width,
                height: self.max_height,
            });
        }

        if self.min_width > self.max_width || self.min_height > self.max_height {
            return Err(SheetPackerError::InvalidConfig(format!(
                "min size {}x{} exceeds max size {}x{}",
                self.min_width, self.min_height, self.max_width, self.max_height
            )));
        }

        let total_border = self.border_padding.saturating_mul(2);
        if total_border >= self.max_width || total_border >= self.max_height {
            return Err(SheetPackerError::InvalidConfig(format!(
                "border_padding ({}) * 2 exceeds atlas dimensions ({}x{})",
                self.border_padding, self.max_width, self.max_height
            )));
        }

        if self.alpha_threshold > 100 {
            return Err(SheetPackerError::InvalidConfig(format!(
                "alpha_threshold must be within 0..=100, got {}",
                self.alpha_threshold
            )));
        }

        if self.square && self.sizing == SizingMode::Manual && self.max_width != self.max_height {
            return Err(SheetPackerError::InvalidConfig(format!(
                "manual size {}x{} is not square",
                self.max_width, self.max_height
            )));
        }

        if self.power_of_two {
            if self.sizing == SizingMode::Manual
                && !(self.max_width.is_power_of_two() && self.max_height.is_power_of_two())
            {
                return Err(SheetPackerError::InvalidConfig(format!(
                    "manual size {}x{} is not a power of two",
                    self.max_width, self.max_height
                )));
            }
            let w = crate::geometry::round_down_to_power_of_two(self.max_width);
            let h = crate::geometry::round_down_to_power_of_two(self.max_height);
            if w < self.min_width || h < self.min_height {
                return Err(SheetPackerError::InvalidConfig(format!(
                    "no power-of-two size between {}x{} and {}x{}",
                    self.min_width, self.min_height, self.max_width, self.max_height
                )));
            }
        }

        Ok(())
    }

    /// Alpha cutoff in `0..=255` derived from the percentage threshold.
    pub fn alpha_cutoff(&self) -> u8 {
        alpha_cutoff(self.alpha_threshold)
    }
}

/// Converts a `0..=100` percentage into an alpha cutoff; larger inputs saturate at 255.
pub fn alpha_cutoff(percent: u8) -> u8 {
    ((percent.min(100) as u32 * 255 + 50) / 100) as u8
}

fn default_method() -> PackerMethod {
    PackerMethod::MaxRects
}
fn default_mr_heuristic() -> MaxRectsHeuristic {
    MaxRectsHeuristic::BestShortSideFit
}
fn default_skyline_heuristic() -> SkylineHeuristic {
    SkylineHeuristic::BottomLeft
}
fn default_g_choice() -> GuillotineChoice {
    GuillotineChoice::BestAreaFit
}
fn default_g_split() -> GuillotineSplit {
    GuillotineSplit::SplitShorterLeftoverAxis
}
fn default_sizing() -> SizingMode {
    SizingMode::Automatic
}
fn default_dedupe() -> bool {
    true
}

/// Builder for `PackerConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct PackerConfigBuilder {
    cfg: PackerConfig,
}

impl PackerConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: PackerConfig::default(),
        }
    }
    pub fn method(mut self, v: PackerMethod) -> Self {
        self.cfg.method = v;
        self
    }
    pub fn mr_heuristic(mut self, v: MaxRectsHeuristic) -> Self {
        self.cfg.mr_heuristic = v;
        self
    }
    pub fn skyline_heuristic(mut self, v: SkylineHeuristic) -> Self {
        self.cfg.skyline_heuristic = v;
        self
    }
    pub fn g_choice(mut self, v: GuillotineChoice) -> Self {
        self.cfg.g_choice = v;
        self
    }
    pub fn g_split(mut self, v: GuillotineSplit) -> Self {
        self.cfg.g_split = v;
        self
    }
    pub fn sizing(mut self, v: SizingMode) -> Self {
        self.cfg.sizing = v;
        self
    }
    pub fn with_max_dimensions(mut self, w: u32, h: u32) -> Self {
        self.cfg.max_width = w;
        self.cfg.max_height = h;
        self
    }
    pub fn with_min_dimensions(mut self, w: u32, h: u32) -> Self {
        self.cfg.min_width = w;
        self.cfg.min_height = h;
        self
    }
    /// Manual sizing with an exact canvas.
    pub fn manual_size(mut self, w: u32, h: u32) -> Self {
        self.cfg.sizing = SizingMode::Manual;
        self.cfg.max_width = w;
        self.cfg.max_height = h;
        self
    }
    pub fn pow2(mut self, v: bool) -> Self {
        self.cfg.power_of_two = v;
        self
    }
    pub fn square(mut self, v: bool) -> Self {
        self.cfg.square = v;
        self
    }
    pub fn padding(mut self, v: u32) -> Self {
        self.cfg.padding = v;
        self
    }
    pub fn border_padding(mut self, v: u32) -> Self {
        self.cfg.border_padding = v;
        self
    }
    pub fn extrude(mut self, v: u32) -> Self {
        self.cfg.extrude = v;
        self
    }
    pub fn allow_rotation(mut self, v: bool) -> Self {
        self.cfg.allow_rotation = v;
        self
    }
    pub fn allow_flip(mut self, v: bool) -> Self {
        self.cfg.allow_flip = v;
        self
    }
    pub fn dedupe(mut self, v: bool) -> Self {
        self.cfg.dedupe = v;
        self
    }
    pub fn trim(mut self, v: bool) -> Self {
        self.cfg.trim = v;
        self
    }
    pub fn alpha_threshold(mut self, v: u8) -> Self {
        self.cfg.alpha_threshold = v;
        self
    }
    pub fn outlines(mut self, v: bool) -> Self {
        self.cfg.outlines = v;
        self
    }
    pub fn background_color(mut self, v: Option<[u8; 4]>) -> Self {
        self.cfg.background_color = v;
        self
    }
    pub fn parallel(mut self, v: bool) -> Self {
        self.cfg.parallel = v;
        self
    }
    pub fn build(self) -> PackerConfig {
        self.cfg
    }
}

impl PackerConfig {
    /// Create a fluent builder for `PackerConfig`.
    pub fn builder() -> PackerConfigBuilder {
        PackerConfigBuilder::new()
    }
}
