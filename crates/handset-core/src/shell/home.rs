//! Home grid: icon order, edit mode, and pointer geometry.

use crate::config::GridConfig;
use crate::registry::AppId;
use crate::settings::SettingsStore;

/// Preference key holding the icon order as a JSON array of labels.
pub const LAYOUT_KEY: &str = "handset.layout";

/// Move the element at `from` to `to`, shifting everything between.
///
/// `to` past the end clamps to the last position. `from == to` or `from`
/// out of range leaves `seq` untouched.
pub fn move_index<T>(seq: &mut Vec<T>, from: usize, to: usize) {
    if from >= seq.len() || from == to {
        return;
    }
    let item = seq.remove(from);
    let to = to.min(seq.len());
    seq.insert(to, item);
}

/// Turn any list of ids into a permutation of [`AppId::ALL`]: duplicates
/// are dropped, missing ids are appended in default order.
pub fn repair_order(ids: impl IntoIterator<Item = AppId>) -> Vec<AppId> {
    let mut order: Vec<AppId> = Vec::with_capacity(AppId::ALL.len());
    for id in ids {
        if !order.contains(&id) {
            order.push(id);
        }
    }
    for id in AppId::ALL {
        if !order.contains(&id) {
            order.push(id);
        }
    }
    order
}

/// Grid origin and cell size in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridGeometry {
    pub cols: u32,
    pub grid_x: i32,
    pub grid_y: i32,
    pub cell_w: u32,
    pub cell_h: u32,
}

impl GridGeometry {
    /// Slot under `(x, y)` for a grid of `count` icons.
    ///
    /// `None` outside the grid. A point in the last row past the final
    /// icon maps to the final slot.
    pub fn slot_at(&self, x: i32, y: i32, count: usize) -> Option<usize> {
        if count == 0 || self.cols == 0 || self.cell_w == 0 || self.cell_h == 0 {
            return None;
        }
        if x < self.grid_x || y < self.grid_y {
            return None;
        }
        let col = ((x - self.grid_x) as u32 / self.cell_w) as usize;
        let row = ((y - self.grid_y) as u32 / self.cell_h) as usize;
        let cols = self.cols as usize;
        if col >= cols || row >= count.div_ceil(cols) {
            return None;
        }
        Some((row * cols + col).min(count - 1))
    }

    /// Top-left corner of `slot`.
    pub fn cell_origin(&self, slot: usize) -> (i32, i32) {
        let cols = self.cols.max(1) as usize;
        let col = i32::try_from(slot % cols).unwrap_or(i32::MAX);
        let row = i32::try_from(slot / cols).unwrap_or(i32::MAX);
        let cell_w = i32::try_from(self.cell_w).unwrap_or(i32::MAX);
        let cell_h = i32::try_from(self.cell_h).unwrap_or(i32::MAX);
        (
            self.grid_x.saturating_add(col.saturating_mul(cell_w)),
            self.grid_y.saturating_add(row.saturating_mul(cell_h)),
        )
    }
}

impl From<GridConfig> for GridGeometry {
    fn from(c: GridConfig) -> Self {
        Self {
            cols: c.cols,
            grid_x: c.x,
            grid_y: c.y,
            cell_w: c.cell_w,
            cell_h: c.cell_h,
        }
    }
}

impl Default for GridGeometry {
    fn default() -> Self {
        GridConfig::default().into()
    }
}

/// Owner of `app_order` and `is_editing_layout`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeGrid {
    order: Vec<AppId>,
    editing: bool,
}

impl HomeGrid {
    pub fn new() -> Self {
        Self {
            order: AppId::ALL.to_vec(),
            editing: false,
        }
    }

    /// Grid with the order saved under [`LAYOUT_KEY`], repaired. Missing or
    /// unreadable layouts give the default order.
    pub fn restore(settings: &SettingsStore) -> Self {
        let Some(text) = settings.read_key(LAYOUT_KEY) else {
            return Self::new();
        };
        let labels: Vec<String> = match serde_json::from_str(&text) {
            Ok(labels) => labels,
            Err(e) => {
                log::warn!("Ignoring unreadable home layout: {e}");
                return Self::new();
            },
        };
        let ids = labels.iter().filter_map(|label| match label.parse::<AppId>() {
            Ok(id) => Some(id),
            Err(e) => {
                log::warn!("Dropping {e} from home layout");
                None
            },
        });
        Self {
            order: repair_order(ids),
            editing: false,
        }
    }

    pub fn persist(&self, settings: &mut SettingsStore) {
        let labels: Vec<&str> = self.order.iter().map(|id| id.label()).collect();
        match serde_json::to_string(&labels) {
            Ok(text) => settings.write_key(LAYOUT_KEY, &text),
            Err(e) => log::warn!("Could not encode home layout: {e}"),
        }
    }

    pub fn order(&self) -> &[AppId] {
        &self.order
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn toggle_edit_mode(&mut self) {
        self.set_editing(!self.editing);
    }

    /// Leaving edit mode keeps the current order.
    pub fn set_editing(&mut self, editing: bool) {
        if self.editing != editing {
            log::debug!("Home grid editing: {editing}");
        }
        self.editing = editing;
    }

    /// The applet to open for a tap on `index`. Taps only navigate while
    /// viewing.
    pub fn tap(&self, index: usize) -> Option<AppId> {
        if self.editing {
            return None;
        }
        self.order.get(index).copied()
    }

    /// Apply one move. Returns whether the order changed.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        let before = self.order.clone();
        move_index(&mut self.order, from, to);
        let changed = self.order != before;
        if changed {
            log::debug!("Moved icon {from} -> {to}");
        }
        changed
    }

    pub fn position(&self, app: AppId) -> Option<usize> {
        self.order.iter().position(|&id| id == app)
    }

    /// Per-icon wobble offset `(dx, dy)` in pixels, `elapsed` seconds into
    /// edit mode. Zero while viewing.
    pub fn jiggle_offset(&self, index: usize, elapsed: f64) -> (f64, f64) {
        if !self.editing {
            return (0.0, 0.0);
        }
        let phase = index as f64 * 0.5;
        let dx = (elapsed * 8.0 + phase).sin() * 0.5;
        let dy = ((elapsed * 10.0 + phase).cos() * 2.0).abs();
        (dx, dy)
    }
}

impl Default for HomeGrid {
    fn default() -> Self {
        Self::new()
    }
}
