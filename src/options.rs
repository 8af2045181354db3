//! Generation options (§6).

/// Thresholds controlling §4.5 Pass B clash detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrectionThresholds {
    /// Two channels within this of each other are considered "in agreement".
    pub agreement: f64,
    /// A third channel beyond this far from the agreeing pair's average is
    /// an outlier (gap-artefact pattern).
    pub outlier: f64,
    /// Channels within this of the 127 inside/outside threshold are
    /// considered "near the boundary" for the threshold-disagreement rule.
    pub near_threshold: f64,
}

impl Default for CorrectionThresholds {
    fn default() -> Self {
        CorrectionThresholds { agreement: 50.0, outlier: 40.0, near_threshold: 20.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Options {
    /// Output edge length in pixels (square bitmap).
    pub size: u32,
    /// Pixel border kept between glyph bounds and bitmap edge.
    pub padding: f64,
    /// Distance range in pixels that maps to one output byte's full span.
    pub range: f64,
    /// If true, frame the glyph with the msdfgen-compatible autoframe
    /// formula (§6); if false, use a conservative formula keeping the glyph
    /// strictly inside the bitmap.
    pub msdfgen_autoframe: bool,
    /// Radians; corners are edges whose turn exceeds this.
    pub angle_threshold: f64,
    /// Enables §4.5 error correction.
    pub error_correction: bool,
    pub correction_thresholds: CorrectionThresholds,
    /// Radius (in pixels) of the square box protected around each
    /// colour-boundary corner in §4.5 Pass A. Default is 3 (a 7x7 box).
    pub corner_protection_radius: i64,
    /// Number of curved edges within one smooth spline after which the
    /// colouring cycle is forced to advance again, so that opposing sides of
    /// a thin curved limb don't share a colour (§4.3's channel-diversity
    /// fallback).
    pub channel_diversity_stride: u32,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            size: 32,
            padding: 2.0,
            range: 4.0,
            msdfgen_autoframe: true,
            angle_threshold: 3f64.to_radians(),
            error_correction: true,
            correction_thresholds: CorrectionThresholds::default(),
            corner_protection_radius: 3,
            channel_diversity_stride: 3,
        }
    }
}
