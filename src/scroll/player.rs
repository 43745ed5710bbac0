use crate::dom::ElementRef;
use crate::scroll::PlayerStyle;

/// An embedded animation player, seen from the scroll animators.
///
/// Animators only drive the player's presentation (opacity, transform, blur). Playback of
/// the player's own content is left to the player.
pub trait AnimationPlayer {
    fn set_style(&mut self, style: &PlayerStyle);
    fn style(&self) -> PlayerStyle;
}

/// A player whose presentation is the inline style of a page element.
#[derive(Debug)]
pub struct ElementPlayer {
    element: ElementRef,
    style: PlayerStyle,
}

impl ElementPlayer {
    pub fn new(element: ElementRef) -> Self {
        ElementPlayer {
            element,
            style: PlayerStyle::default(),
        }
    }

    pub fn element(&self) -> &ElementRef {
        &self.element
    }
}

impl AnimationPlayer for ElementPlayer {
    fn set_style(&mut self, style: &PlayerStyle) {
        self.style = *style;
        self.element.set_style("opacity", &style.alpha.to_string());
        self.element.set_style(
            "visibility",
            if style.alpha <= 0.0 { "hidden" } else { "inherit" },
        );
        self.element.set_style("transform", &style.css_transform());
        self.element.set_style("filter", &style.css_filter());
    }

    fn style(&self) -> PlayerStyle {
        self.style
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Element, MemoryElement};

    #[test]
    fn style_is_written_inline() {
        let canvas = MemoryElement::new("canvas");
        let mut player = ElementPlayer::new(canvas.clone());

        player.set_style(&PlayerStyle::hidden());
        assert_eq!(canvas.style("opacity").as_deref(), Some("0"));
        assert_eq!(canvas.style("visibility").as_deref(), Some("hidden"));

        player.set_style(&PlayerStyle::default());
        assert_eq!(canvas.style("visibility").as_deref(), Some("inherit"));
        assert_eq!(player.style(), PlayerStyle::default());
    }
}
