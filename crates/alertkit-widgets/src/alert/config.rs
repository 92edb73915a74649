#![forbid(unsafe_code)]

//! Overlay configuration and animation styles.

use std::fmt;
use std::time::Duration;

use alertkit_core::{Rgba, Shadow, Size, non_negative};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Entrance animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PresentationStyle {
    /// Slide up from below the container's bottom edge.
    #[default]
    Bottom,
    /// Slide down from above the container's top edge.
    Top,
    /// Grow from the center.
    Zoom,
    /// Grow from the center while fading in.
    ZoomFade,
    /// Appear in place without animation.
    None,
}

impl PresentationStyle {
    /// Whether the style runs through the animation runtime at all.
    #[inline]
    pub const fn is_animated(self) -> bool {
        !matches!(self, Self::None)
    }

    #[inline]
    pub const fn fades(self) -> bool {
        matches!(self, Self::ZoomFade)
    }
}

/// Exit animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DismissalStyle {
    /// Slide down past the container's bottom edge.
    #[default]
    Bottom,
    /// Slide up past the container's top edge.
    Top,
    /// Shrink into the center.
    Zoom,
    /// Shrink into the center while fading out.
    ZoomFade,
    /// Disappear in place without animation.
    None,
}

impl DismissalStyle {
    #[inline]
    pub const fn is_animated(self) -> bool {
        !matches!(self, Self::None)
    }

    #[inline]
    pub const fn fades(self) -> bool {
        matches!(self, Self::ZoomFade)
    }
}

/// Drop shadow drawn by the wrapper around the overlay content.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ShadowConfig {
    pub opacity: f64,
    pub radius: f64,
    pub offset: Size,
    pub color: Rgba,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            opacity: 0.44,
            radius: 13.0,
            offset: Size::new(0.0, -6.0),
            color: Rgba::BLACK,
        }
    }
}

impl ShadowConfig {
    /// Layer shadow with opacity and radius clamped to `>= 0`.
    #[must_use]
    pub fn to_shadow(&self) -> Shadow {
        Shadow {
            opacity: non_negative(self.opacity),
            radius: non_negative(self.radius),
            offset: self.offset,
            color: self.color,
        }
    }
}

/// Overlay configuration.
///
/// Values are stored as given; consumers clamp numeric fields to `>= 0` at
/// the point of use, so negative input degrades to zero size or zero
/// duration instead of failing. [`OverlayConfig::sanitized`] returns an
/// explicitly clamped copy.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OverlayConfig {
    pub presentation_style: PresentationStyle,
    pub dismissal_style: DismissalStyle,
    /// Horizontal gap between the overlay and each display edge.
    pub margin: f64,
    pub height: f64,
    pub dimming_alpha: f64,
    /// Backdrop color. Use [`Rgba::CLEAR`] for an invisible, tappable backdrop.
    pub dimming_color: Rgba,
    pub dimming_dismisses_on_tap: bool,
    /// Transition duration in seconds.
    pub duration: f64,
    pub corner_radius: f64,
    pub clips_content: bool,
    pub has_shadow: bool,
    pub shadow: ShadowConfig,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            presentation_style: PresentationStyle::Bottom,
            dismissal_style: DismissalStyle::Bottom,
            margin: 40.0,
            height: 240.0,
            dimming_alpha: 0.5,
            dimming_color: Rgba::BLACK,
            dimming_dismisses_on_tap: true,
            duration: 0.3,
            corner_radius: 8.0,
            clips_content: true,
            has_shadow: false,
            shadow: ShadowConfig::default(),
        }
    }
}

impl OverlayConfig {
    pub fn presentation_style(mut self, style: PresentationStyle) -> Self {
        self.presentation_style = style;
        self
    }

    pub fn dismissal_style(mut self, style: DismissalStyle) -> Self {
        self.dismissal_style = style;
        self
    }

    pub fn margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    pub fn height(mut self, height: f64) -> Self {
        self.height = height;
        self
    }

    pub fn dimming_alpha(mut self, alpha: f64) -> Self {
        self.dimming_alpha = alpha;
        self
    }

    pub fn dimming_color(mut self, color: Rgba) -> Self {
        self.dimming_color = color;
        self
    }

    pub fn dimming_dismisses_on_tap(mut self, dismisses: bool) -> Self {
        self.dimming_dismisses_on_tap = dismisses;
        self
    }

    pub fn duration(mut self, seconds: f64) -> Self {
        self.duration = seconds;
        self
    }

    pub fn corner_radius(mut self, radius: f64) -> Self {
        self.corner_radius = radius;
        self
    }

    pub fn clips_content(mut self, clips: bool) -> Self {
        self.clips_content = clips;
        self
    }

    pub fn has_shadow(mut self, has_shadow: bool) -> Self {
        self.has_shadow = has_shadow;
        self
    }

    pub fn shadow(mut self, shadow: ShadowConfig) -> Self {
        self.shadow = shadow;
        self
    }

    /// Overlay size for a display of `display_width`:
    /// `(display_width - 2 * margin, height)`, floored at zero.
    #[must_use]
    pub fn content_size(&self, display_width: f64) -> Size {
        super::frames::content_size(display_width, self.margin, self.height)
    }

    /// Configured duration. Negative and NaN become zero; values too large
    /// for [`Duration`] saturate to [`Duration::MAX`].
    #[must_use]
    pub fn transition_duration(&self) -> Duration {
        Duration::try_from_secs_f64(non_negative(self.duration)).unwrap_or(Duration::MAX)
    }

    /// Backdrop opacity once presented.
    #[must_use]
    pub fn resolved_dimming_alpha(&self) -> f64 {
        non_negative(self.dimming_alpha)
    }

    /// Layer shadow if enabled.
    #[must_use]
    pub fn resolved_shadow(&self) -> Option<Shadow> {
        self.has_shadow.then(|| self.shadow.to_shadow())
    }

    /// Copy with every non-negative field clamped (NaN becomes 0).
    #[must_use]
    pub fn sanitized(&self) -> Self {
        Self {
            margin: non_negative(self.margin),
            height: non_negative(self.height),
            dimming_alpha: non_negative(self.dimming_alpha),
            duration: non_negative(self.duration),
            corner_radius: non_negative(self.corner_radius),
            shadow: ShadowConfig {
                opacity: non_negative(self.shadow.opacity),
                radius: non_negative(self.shadow.radius),
                ..self.shadow
            },
            ..self.clone()
        }
    }

    /// Parse a TOML preset. Missing keys keep their defaults.
    ///
    /// ```toml
    /// presentation_style = "zoom_fade"
    /// margin = 24.0
    /// has_shadow = true
    ///
    /// [shadow]
    /// radius = 20.0
    /// ```
    #[cfg(feature = "config-toml")]
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Ok(config.sanitized())
    }
}

/// Errors from loading overlay configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The document could not be parsed.
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "invalid overlay config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}
