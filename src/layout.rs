//! Most-recently-used overview layout.
//!
//! Every preview is scaled to the same height (half the monitor, capped by
//! [`OverviewConfig::max_preview_scale`]) and windows are laid out in MRU
//! order, left to right and top to bottom, so the window the user last
//! touched is always first.  Rows are filled greedily; the last row takes
//! whatever is left.  Rows are never re-sorted afterwards.

use serde::{Deserialize, Serialize};

/// Overview layout settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverviewConfig {
    /// Upper bound for a preview's scale factor.  Default: `0.7`.
    pub max_preview_scale: f64,
}

impl Default for OverviewConfig {
    fn default() -> Self {
        Self {
            max_preview_scale: 0.7,
        }
    }
}

/// A window to place, with its size and last-use timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowGeometry<T> {
    pub id: T,
    pub width: f64,
    pub height: f64,
    /// Host user-time of the last interaction; larger is more recent.
    pub user_time: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutRow<T> {
    pub windows: Vec<T>,
    /// Sum of scaled widths.
    pub full_width: f64,
    /// Tallest scaled height.
    pub full_height: f64,
}

impl<T> LayoutRow<T> {
    fn new() -> Self {
        Self {
            windows: Vec::new(),
            full_width: 0.0,
            full_height: 0.0,
        }
    }

    /// Whether adding `width` keeps this row at or below `ideal`, or at
    /// least brings it closer to `ideal`.
    fn keeps(&self, width: f64, ideal: f64) -> bool {
        let new_width = self.full_width + width;
        if new_width <= ideal {
            return true;
        }
        let old_ratio = self.full_width / ideal;
        let new_ratio = new_width / ideal;
        (1.0 - new_ratio).abs() < (1.0 - old_ratio).abs()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverviewLayout<T> {
    pub rows: Vec<LayoutRow<T>>,
    /// Window count of the widest row.
    pub max_columns: usize,
    /// Width of the widest row.
    pub grid_width: f64,
    /// Sum of row heights.
    pub grid_height: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("layout needs at least one row")]
    NoRows,
    #[error("invalid monitor height {0}")]
    MonitorHeight(f64),
}

/// Scale that makes a window of `height` half as tall as the monitor.
pub fn preview_scale(height: f64, monitor_height: f64, max_scale: f64) -> f64 {
    if height <= 0.0 {
        return max_scale;
    }
    (monitor_height / height / 2.0).min(max_scale)
}

/// Lay `windows` out in `num_rows` rows.
pub fn compute_layout<T: Clone>(
    windows: &[WindowGeometry<T>],
    monitor_height: f64,
    num_rows: usize,
    config: &OverviewConfig,
) -> Result<OverviewLayout<T>, LayoutError> {
    if num_rows == 0 {
        return Err(LayoutError::NoRows);
    }
    if monitor_height.is_nan() || monitor_height <= 0.0 {
        return Err(LayoutError::MonitorHeight(monitor_height));
    }

    let mut sorted: Vec<&WindowGeometry<T>> = windows.iter().collect();
    sorted.sort_by(|a, b| b.user_time.cmp(&a.user_time));

    let scaled = |w: &WindowGeometry<T>| {
        let s = preview_scale(w.height, monitor_height, config.max_preview_scale);
        (w.width * s, w.height * s)
    };
    let total_width: f64 = sorted.iter().map(|&w| scaled(w).0).sum();
    let ideal_row_width = total_width / num_rows as f64;

    let mut rows = Vec::with_capacity(num_rows);
    let mut remaining = sorted.into_iter().peekable();
    for i in 0..num_rows {
        let last_row = i == num_rows - 1;
        let mut row = LayoutRow::new();
        while let Some(&window) = remaining.peek() {
            let (width, height) = scaled(window);
            if !last_row && !row.keeps(width, ideal_row_width) {
                break;
            }
            row.windows.push(window.id.clone());
            row.full_width += width;
            row.full_height = row.full_height.max(height);
            remaining.next();
        }
        rows.push(row);
    }

    let mut widest = 0;
    for (i, row) in rows.iter().enumerate() {
        if row.full_width > rows[widest].full_width {
            widest = i;
        }
    }
    let grid_height = rows.iter().map(|r| r.full_height).sum();

    Ok(OverviewLayout {
        max_columns: rows[widest].windows.len(),
        grid_width: rows[widest].full_width,
        grid_height,
        rows,
    })
}
