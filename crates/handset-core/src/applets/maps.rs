//! Map viewport state. The map widget itself is external.

use crate::applets::{Applet, AppletContext, arg, rest, unknown_command};
use crate::error::{HandsetError, Result};
use crate::registry::AppId;

pub const MIN_ZOOM: u8 = 1;
pub const MAX_ZOOM: u8 = 20;

const DEFAULT_CENTER: (f64, f64) = (40.7128, -74.0060);
const DEFAULT_ZOOM: u8 = 12;

pub struct MapsApplet {
    lat: f64,
    lon: f64,
    zoom: u8,
    query: Option<String>,
}

impl MapsApplet {
    pub fn new() -> Self {
        Self {
            lat: DEFAULT_CENTER.0,
            lon: DEFAULT_CENTER.1,
            zoom: DEFAULT_ZOOM,
            query: None,
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.lat, self.lon)
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn set_zoom(&mut self, zoom: i32) {
        self.zoom = zoom.clamp(i32::from(MIN_ZOOM), i32::from(MAX_ZOOM)) as u8;
    }

    /// Move the centre by a fraction of the visible span. Latitude is
    /// clamped to the poles, longitude wraps.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        let span = 360.0 / f64::from(1u32 << self.zoom);
        self.lat = (self.lat + dy * span).clamp(-90.0, 90.0);
        self.lon = (self.lon + dx * span + 180.0).rem_euclid(360.0) - 180.0;
    }

    pub fn set_center(&mut self, lat: f64, lon: f64) -> Result<()> {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(HandsetError::Validation(format!(
                "{lat}, {lon} is not a coordinate"
            )));
        }
        self.lat = lat;
        self.lon = lon;
        Ok(())
    }

    pub fn search(&mut self, query: &str) -> Result<()> {
        let query = query.trim();
        if query.is_empty() {
            return Err(HandsetError::Validation("enter a place to search".into()));
        }
        log::debug!("Map search {query:?}");
        self.query = Some(query.to_string());
        Ok(())
    }
}

impl Default for MapsApplet {
    fn default() -> Self {
        Self::new()
    }
}

impl Applet for MapsApplet {
    fn id(&self) -> AppId {
        AppId::Maps
    }

    fn handle(&mut self, command: &str, args: &[&str], _cx: &mut AppletContext<'_>) -> Result<()> {
        match command {
            "zoom" => self.set_zoom(arg(args, 0, "zoom level")?),
            "in" => self.set_zoom(i32::from(self.zoom) + 1),
            "out" => self.set_zoom(i32::from(self.zoom) - 1),
            "north" => self.pan(0.0, 0.25),
            "south" => self.pan(0.0, -0.25),
            "east" => self.pan(0.25, 0.0),
            "west" => self.pan(-0.25, 0.0),
            "center" => self.set_center(arg(args, 0, "latitude")?, arg(args, 1, "longitude")?)?,
            "search" => self.search(&rest(args))?,
            other => return Err(unknown_command(self.id(), other)),
        }
        Ok(())
    }

    fn view(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "{:.4}, {:.4}  zoom {}",
            self.lat, self.lon, self.zoom
        )];
        if let Some(q) = &self.query {
            lines.push(format!("Results for {q:?}"));
        }
        lines.push("[ map ]   + / -".into());
        lines
    }
}
