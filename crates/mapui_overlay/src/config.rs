//! Overlay configuration
//!
//! [`OverlayConfig`] is the per-instance option set. It deserializes from
//! option documents using camelCase keys, so JSON like
//! `{"autoPan": true, "animation": "fade,scale"}` maps directly onto it.
//! Missing keys take the defaults below; unknown keys are ignored.
//!
//! | option | default |
//! |---|---|
//! | `eventsPropagation` | `false` |
//! | `eventsToStop` | none |
//! | `dx`, `dy` | `0`, `0` |
//! | `autoPan` | `false` |
//! | `autoPanDuration` | `600` ms |
//! | `autoPanMargin` | `50` px |
//! | `single` | `true` |
//! | `animation` | `"scale"` |
//! | `animationDuration` | `500` ms |
//! | `animationOnHide` | `false` |
//! | `pitchWithMap`, `rotateWithMap` | `false` |
//! | `visible` | `true` |
//! | `roundPoint` | `false` |
//! | `collision` | `false` |
//! | `collisionBufferSize` | `2` |
//! | `collisionWeight` | `0` |
//! | `collisionFadeIn` | `false` |
//! | `zIndex` | none |
//! | `minZoom`, `maxZoom` | none |
//! | `container` | `"ui"` |

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ConfigError;

/// Default name of the map panel hosting overlay elements
pub const DEFAULT_CONTAINER: &str = "ui";

/// Option set for one overlay instance
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OverlayConfig {
    /// Stop the `eventsToStop` events at the overlay element
    pub events_propagation: bool,
    /// DOM event names stopped when `eventsPropagation` is set
    #[serde(deserialize_with = "deserialize_event_list")]
    pub events_to_stop: Option<Vec<String>>,
    /// Horizontal pixel offset applied after projection
    pub dx: f64,
    /// Vertical pixel offset applied after projection
    pub dy: f64,
    /// Pan the map on show so the overlay is fully visible
    pub auto_pan: bool,
    /// Duration of the auto-pan animation in milliseconds
    pub auto_pan_duration: u32,
    /// Inner margin kept between the overlay and the container edge
    pub auto_pan_margin: f64,
    /// At most one live element per overlay class per map
    pub single: bool,
    /// Comma separated animation kinds (`fade`, `scale`)
    pub animation: Option<String>,
    /// Animation duration in milliseconds
    pub animation_duration: u32,
    /// Animate hide as well as show
    pub animation_on_hide: bool,
    /// Tilt the overlay with the map pitch
    pub pitch_with_map: bool,
    /// Rotate the overlay with the map bearing
    pub rotate_with_map: bool,
    /// Initial logical visibility flag
    pub visible: bool,
    /// Round computed positions to whole pixels
    pub round_point: bool,
    /// Take part in the map-wide collision pass
    pub collision: bool,
    /// Spacing added around the overlay box during collision
    pub collision_buffer_size: f64,
    /// Collision priority, higher wins
    pub collision_weight: f64,
    /// Add the fade-in class when the collision pass reveals the overlay
    pub collision_fade_in: bool,
    /// Stacking order applied to the element on show
    pub z_index: Option<i32>,
    /// Hide below this zoom (zoom-filter capable components only)
    pub min_zoom: Option<f64>,
    /// Hide above this zoom (zoom-filter capable components only)
    pub max_zoom: Option<f64>,
    /// Name of the map panel hosting the element
    pub container: String,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            events_propagation: false,
            events_to_stop: None,
            dx: 0.0,
            dy: 0.0,
            auto_pan: false,
            auto_pan_duration: 600,
            auto_pan_margin: 50.0,
            single: true,
            animation: Some("scale".to_string()),
            animation_duration: 500,
            animation_on_hide: false,
            pitch_with_map: false,
            rotate_with_map: false,
            visible: true,
            round_point: false,
            collision: false,
            collision_buffer_size: 2.0,
            collision_weight: 0.0,
            collision_fade_in: false,
            z_index: None,
            min_zoom: None,
            max_zoom: None,
            container: DEFAULT_CONTAINER.to_string(),
        }
    }
}

impl OverlayConfig {
    /// Load options from a JSON document
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load options from a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Set the pixel offset
    pub fn with_offset(mut self, dx: f64, dy: f64) -> Self {
        self.dx = dx;
        self.dy = dy;
        self
    }

    /// Set the animation kinds, `None` disables animation
    pub fn with_animation(mut self, animation: Option<&str>) -> Self {
        self.animation = animation.map(str::to_string);
        self
    }

    pub fn with_animation_duration(mut self, duration_ms: u32) -> Self {
        self.animation_duration = duration_ms;
        self
    }

    pub fn with_animation_on_hide(mut self, enabled: bool) -> Self {
        self.animation_on_hide = enabled;
        self
    }

    pub fn with_single(mut self, single: bool) -> Self {
        self.single = single;
        self
    }

    pub fn with_auto_pan(mut self, enabled: bool) -> Self {
        self.auto_pan = enabled;
        self
    }

    pub fn with_round_point(mut self, enabled: bool) -> Self {
        self.round_point = enabled;
        self
    }

    pub fn with_collision(mut self, enabled: bool) -> Self {
        self.collision = enabled;
        self
    }

    pub fn with_collision_weight(mut self, weight: f64) -> Self {
        self.collision_weight = weight;
        self
    }

    pub fn with_events_to_stop<I, S>(mut self, events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.events_to_stop = Some(events.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_zoom_range(mut self, min_zoom: Option<f64>, max_zoom: Option<f64>) -> Self {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self
    }

    /// Check `zoom` against the configured zoom range
    pub fn zoom_in_range(&self, zoom: f64) -> bool {
        self.min_zoom.map_or(true, |min| zoom >= min) && self.max_zoom.map_or(true, |max| zoom <= max)
    }
}

/// Accepts either `"click dblclick"` or `["click", "dblclick"]`
fn deserialize_event_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum EventList {
        Joined(String),
        Listed(Vec<String>),
    }

    let events = match Option::<EventList>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(EventList::Joined(joined)) => joined
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect::<Vec<_>>(),
        Some(EventList::Listed(listed)) => listed,
    };

    Ok(if events.is_empty() { None } else { Some(events) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OverlayConfig::default();
        assert!(!config.events_propagation);
        assert!(config.events_to_stop.is_none());
        assert_eq!((config.dx, config.dy), (0.0, 0.0));
        assert!(!config.auto_pan);
        assert_eq!(config.auto_pan_duration, 600);
        assert!(config.single);
        assert_eq!(config.animation.as_deref(), Some("scale"));
        assert_eq!(config.animation_duration, 500);
        assert!(!config.animation_on_hide);
        assert!(config.visible);
        assert!(!config.round_point);
        assert!(!config.collision);
        assert_eq!(config.collision_buffer_size, 2.0);
        assert_eq!(config.collision_weight, 0.0);
        assert_eq!(config.container, "ui");
    }

    #[test]
    fn test_json_camel_case_and_defaults() {
        let config = OverlayConfig::from_json_str(
            r#"{
                "dx": 5, "dy": -3,
                "autoPan": true,
                "animation": "fade,scale",
                "eventsToStop": "click dblclick",
                "pitchWithMap": true,
                "somethingElse": 1
            }"#,
        )
        .unwrap();

        assert_eq!((config.dx, config.dy), (5.0, -3.0));
        assert!(config.auto_pan);
        assert!(config.pitch_with_map);
        assert_eq!(config.animation.as_deref(), Some("fade,scale"));
        assert_eq!(
            config.events_to_stop,
            Some(vec!["click".to_string(), "dblclick".to_string()])
        );
        // Untouched keys keep their defaults
        assert_eq!(config.animation_duration, 500);
        assert!(config.single);
    }

    #[test]
    fn test_json_null_animation() {
        let config = OverlayConfig::from_json_str(r#"{"animation": null}"#).unwrap();
        assert!(config.animation.is_none());
    }

    #[test]
    fn test_toml_options() {
        let config = OverlayConfig::from_toml_str(
            r#"
            single = false
            animationDuration = 250
            eventsToStop = ["mousedown", "touchstart"]
            collision = true
            collisionWeight = 3.5
            "#,
        )
        .unwrap();

        assert!(!config.single);
        assert_eq!(config.animation_duration, 250);
        assert_eq!(
            config.events_to_stop,
            Some(vec!["mousedown".to_string(), "touchstart".to_string()])
        );
        assert!(config.collision);
        assert_eq!(config.collision_weight, 3.5);
    }

    #[test]
    fn test_malformed_document() {
        assert!(matches!(
            OverlayConfig::from_json_str("{ not json"),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            OverlayConfig::from_toml_str("single = = true"),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_zoom_range() {
        let config = OverlayConfig::default().with_zoom_range(Some(5.0), Some(10.0));
        assert!(!config.zoom_in_range(4.0));
        assert!(config.zoom_in_range(5.0));
        assert!(config.zoom_in_range(10.0));
        assert!(!config.zoom_in_range(10.5));
        assert!(OverlayConfig::default().zoom_in_range(22.0));
    }
}
