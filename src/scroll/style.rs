use crate::animation::Lerp;
use serde::Deserialize;

/// The visual state of an animation player's element.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PlayerStyle {
    /// Opacity. At zero the element is also hidden from hit-testing.
    pub alpha: f32,
    pub scale: f32,
    /// Horizontal translation, in percent of the element's width.
    pub x_percent: f32,
    /// Vertical translation, in percent of the element's height.
    pub y_percent: f32,
    /// Blur radius, in pixels.
    pub blur: f32,
}

impl Default for PlayerStyle {
    fn default() -> Self {
        PlayerStyle {
            alpha: 1.0,
            scale: 1.0,
            x_percent: 0.0,
            y_percent: 0.0,
            blur: 0.0,
        }
    }
}

impl PlayerStyle {
    /// Fully transparent, otherwise untransformed.
    pub fn hidden() -> Self {
        PlayerStyle {
            alpha: 0.0,
            ..Default::default()
        }
    }

    /// The CSS `transform` value.
    pub fn css_transform(&self) -> String {
        format!(
            "translate({}%, {}%) scale({})",
            self.x_percent, self.y_percent, self.scale
        )
    }

    /// The CSS `filter` value.
    pub fn css_filter(&self) -> String {
        format!("blur({}px)", self.blur)
    }
}

impl Lerp for PlayerStyle {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        PlayerStyle {
            alpha: Lerp::lerp(&self.alpha, &other.alpha, t),
            scale: Lerp::lerp(&self.scale, &other.scale, t),
            x_percent: Lerp::lerp(&self.x_percent, &other.x_percent, t),
            y_percent: Lerp::lerp(&self.y_percent, &other.y_percent, t),
            blur: Lerp::lerp(&self.blur, &other.blur, t),
        }
    }
}

/// A partial style, as authored in `data-in`/`data-out` keyframes.
///
/// Property names follow the animation markup: `autoAlpha` (or `opacity`), `scale`,
/// `xPercent`, `yPercent`. Any other key (durations, eases) is ignored.
#[derive(Copy, Clone, Debug, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleVars {
    #[serde(alias = "opacity")]
    pub auto_alpha: Option<f32>,
    pub scale: Option<f32>,
    pub x_percent: Option<f32>,
    pub y_percent: Option<f32>,
    pub blur: Option<f32>,
}

impl StyleVars {
    /// `base` with the properties set in `self` overridden.
    pub fn apply(&self, base: &PlayerStyle) -> PlayerStyle {
        PlayerStyle {
            alpha: self.auto_alpha.unwrap_or(base.alpha),
            scale: self.scale.unwrap_or(base.scale),
            x_percent: self.x_percent.unwrap_or(base.x_percent),
            y_percent: self.y_percent.unwrap_or(base.y_percent),
            blur: self.blur.unwrap_or(base.blur),
        }
    }
}

/// The named enter/leave transitions of scroll sections.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Transition {
    ScaleMax,
    ScaleMin,
    ScaleNormal,
    AlphaNormal,
    AlphaMin,
    ScaleLeft,
    #[default]
    Default,
}

impl Transition {
    /// Duration of enter and leave animations, in seconds.
    pub const DURATION: f32 = 0.7;
    /// Blur applied while leaving, in pixels.
    pub const LEAVE_BLUR: f32 = 100.0;

    /// Parses a transition name. Unknown or absent names give [`Transition::Default`].
    pub fn from_name(name: Option<&str>) -> Self {
        match name.map(str::trim) {
            Some("scale-max") => Transition::ScaleMax,
            Some("scale-min") => Transition::ScaleMin,
            Some("scale-normal") => Transition::ScaleNormal,
            Some("alpha-normal") => Transition::AlphaNormal,
            Some("alpha-min") => Transition::AlphaMin,
            Some("scale-left") => Transition::ScaleLeft,
            _ => Transition::Default,
        }
    }

    /// The style reached at the end of an enter animation.
    pub fn enter_style(self) -> PlayerStyle {
        let (scale, alpha, x_percent) = match self {
            Transition::ScaleMax => (1.3, 1.0, 0.0),
            Transition::ScaleMin => (0.0, 1.0, 0.0),
            Transition::AlphaMin => (1.0, 0.0, 0.0),
            Transition::ScaleLeft => (1.0, 1.0, -25.0),
            Transition::ScaleNormal | Transition::AlphaNormal | Transition::Default => {
                (1.0, 1.0, 0.0)
            }
        };

        PlayerStyle {
            alpha,
            scale,
            x_percent,
            y_percent: 0.0,
            blur: 0.0,
        }
    }

    /// The style reached at the end of a leave animation started from `current`.
    pub fn leave_style(self, current: &PlayerStyle) -> PlayerStyle {
        let scale = match self {
            Transition::ScaleMax => 1.3,
            Transition::ScaleMin => 0.0,
            _ => 1.0,
        };

        PlayerStyle {
            alpha: 0.0,
            scale,
            blur: Self::LEAVE_BLUR,
            ..*current
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_transitions_fall_back_to_default() {
        assert_eq!(Transition::from_name(Some("spin")), Transition::Default);
        assert_eq!(Transition::from_name(None), Transition::Default);
        assert_eq!(Transition::from_name(Some("spin")).enter_style(), PlayerStyle::default());
        assert_eq!(Transition::from_name(Some("scale-max")), Transition::ScaleMax);
    }

    #[test]
    fn enter_and_leave_targets() {
        let enter = Transition::ScaleMax.enter_style();
        assert_eq!((enter.scale, enter.alpha, enter.blur), (1.3, 1.0, 0.0));
        assert_eq!(Transition::AlphaMin.enter_style().alpha, 0.0);
        assert_eq!(Transition::ScaleLeft.enter_style().x_percent, -25.0);

        let leave = Transition::ScaleMin.leave_style(&Transition::ScaleLeft.enter_style());
        assert_eq!((leave.scale, leave.alpha, leave.blur), (0.0, 0.0, 100.0));
        assert_eq!(leave.x_percent, -25.0);
        assert_eq!(Transition::AlphaMin.leave_style(&enter).scale, 1.0);
    }

    #[test]
    fn keyframe_vars() {
        let vars: StyleVars =
            serde_json::from_str(r#"{ "autoAlpha": 0, "xPercent": -50, "duration": 2 }"#).unwrap();
        let style = vars.apply(&PlayerStyle::default());
        assert_eq!(style.alpha, 0.0);
        assert_eq!(style.x_percent, -50.0);
        assert_eq!(style.scale, 1.0);

        let vars: StyleVars = serde_json::from_str(r#"{ "opacity": 0.5 }"#).unwrap();
        assert_eq!(vars.auto_alpha, Some(0.5));
    }

    #[test]
    fn css_values() {
        let style = Transition::ScaleLeft.enter_style();
        assert_eq!(style.css_transform(), "translate(-25%, 0%) scale(1)");
        assert_eq!(PlayerStyle::hidden().css_filter(), "blur(0px)");
    }
}
