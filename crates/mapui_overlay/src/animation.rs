//! Show/hide animation plans
//!
//! Overlays animate by switching styles between a start state and an end
//! state and letting the platform transition between them. The plan says
//! which properties take part and carries the transition description.

use crate::config::OverlayConfig;

/// Animation kinds an overlay can use
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnimationKind {
    /// Opacity 0 ↔ 1
    Fade,
    /// Scale 0 ↔ 1
    Scale,
}

impl AnimationKind {
    /// Parse one token of the `animation` option
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim() {
            "fade" => Some(Self::Fade),
            "scale" => Some(Self::Scale),
            _ => None,
        }
    }
}

/// Resolved animation plan for an overlay
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnimationPlan {
    /// Animate opacity
    pub fade: bool,
    /// Animate the scale term of the transform
    pub scale: bool,
    /// Transition description, e.g. `"opacity 500ms,transform 500ms"`
    pub transition: Option<String>,
    /// Duration shared by every animated property
    pub duration_ms: u32,
}

impl AnimationPlan {
    /// Derive the plan from an overlay's options
    ///
    /// Unknown tokens in the `animation` list are ignored.
    pub fn resolve(config: &OverlayConfig) -> Self {
        let mut plan = AnimationPlan {
            duration_ms: config.animation_duration,
            ..Default::default()
        };

        for kind in config
            .animation
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .filter_map(AnimationKind::parse)
        {
            match kind {
                AnimationKind::Fade => plan.fade = true,
                AnimationKind::Scale => plan.scale = true,
            }
        }

        let duration = config.animation_duration;
        let mut parts: Vec<String> = Vec::with_capacity(2);
        if plan.fade {
            parts.push(format!("opacity {duration}ms"));
        }
        if plan.scale {
            parts.push(format!("transform {duration}ms"));
        }
        if !parts.is_empty() {
            plan.transition = Some(parts.join(","));
        }

        plan
    }

    /// True when any property animates
    ///
    /// When false, callers skip all animated styling and apply end states
    /// immediately.
    pub fn is_applicable(&self) -> bool {
        self.fade || self.scale
    }

    /// Plan with every animation switched off
    pub fn disabled(&self) -> Self {
        AnimationPlan {
            duration_ms: self.duration_ms,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(animation: Option<&str>, duration: u32) -> AnimationPlan {
        AnimationPlan::resolve(
            &OverlayConfig::default()
                .with_animation(animation)
                .with_animation_duration(duration),
        )
    }

    #[test]
    fn test_fade_and_scale() {
        let plan = resolve(Some("fade,scale"), 500);
        assert!(plan.fade);
        assert!(plan.scale);
        assert!(plan.is_applicable());
        assert_eq!(
            plan.transition.as_deref(),
            Some("opacity 500ms,transform 500ms")
        );
    }

    #[test]
    fn test_default_is_scale_only() {
        let plan = AnimationPlan::resolve(&OverlayConfig::default());
        assert!(!plan.fade);
        assert!(plan.scale);
        assert_eq!(plan.transition.as_deref(), Some("transform 500ms"));
    }

    #[test]
    fn test_tokens_are_trimmed_and_unknown_ignored() {
        let plan = resolve(Some(" fade , bounce "), 120);
        assert!(plan.fade);
        assert!(!plan.scale);
        assert_eq!(plan.transition.as_deref(), Some("opacity 120ms"));
    }

    #[test]
    fn test_not_applicable() {
        for animation in [None, Some(""), Some("spin")] {
            let plan = resolve(animation, 500);
            assert!(!plan.is_applicable());
            assert!(plan.transition.is_none());
        }
        assert!(!resolve(Some("fade"), 500).disabled().is_applicable());
    }
}
