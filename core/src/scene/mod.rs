//! Scene painters
//!
//! A scene decides how a module's state becomes pixels on the surface:
//!
//! - `framebuffer`: the module renders into its own linear memory and the
//!   host blits the buffer through a [`FrameBufferView`]
//! - `cell_grid`: the host queries one value per grid cell (`get_pos(x, y)`
//!   or `get_char(i)`) and fills a rectangle per cell
//! - `pixel_query`: the host queries a gray level per surface pixel
//!   (`get_pixel_color(i, j)`)

mod color;


use serde::{Deserialize, Serialize};

use crate::framebuffer::{FrameBufferView, FrameError, FrameExports, ReacquirePolicy};
use crate::surface::{ImageRef, Surface, SurfaceError};
use crate::wasm::{CallError, ComputationHandle};

pub use color::Color;

/// Whether a scene is painted every frame or only once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Repaint {
    #[default]
    Continuous,
    /// Paint once, then let the loop converge
    Once,
}

/// How cells are addressed by the query export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Addressing {
    /// `query(x, y)`
    #[default]
    Xy,
    /// `query(y * columns + x)`
    Index,
}

/// How a queried cell value becomes a color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Coloring {
    /// Look the value up in the palette
    #[default]
    Palette,
    /// Ask the module for each channel: `red(v)`, `green(v)`, `blue(v)`
    Channels,
    /// Character cells: NUL and space are background, anything else is ink
    Glyph,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteEntry {
    pub value: u32,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelExports {
    #[serde(default = "default_red_export")]
    pub red: String,
    #[serde(default = "default_green_export")]
    pub green: String,
    #[serde(default = "default_blue_export")]
    pub blue: String,
}

fn default_red_export() -> String {
    "red".to_string()
}
fn default_green_export() -> String {
    "green".to_string()
}
fn default_blue_export() -> String {
    "blue".to_string()
}

impl Default for ChannelExports {
    fn default() -> Self {
        Self {
            red: default_red_export(),
            green: default_green_export(),
            blue: default_blue_export(),
        }
    }
}

/// Cell grid scene settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellGridConfig {
    #[serde(default = "default_grid_extent")]
    pub columns: u32,
    #[serde(default = "default_grid_extent")]
    pub rows: u32,
    #[serde(default = "default_cell_export")]
    pub query_export: String,
    #[serde(default)]
    pub addressing: Addressing,
    #[serde(default)]
    pub coloring: Coloring,
    #[serde(default = "default_palette")]
    pub palette: Vec<PaletteEntry>,
    #[serde(default = "default_background")]
    pub background: Color,
    #[serde(default = "default_ink")]
    pub ink: Color,
    #[serde(default)]
    pub channels: ChannelExports,
    /// Export polled after painting; a nonzero value (e.g. `is_won`) is
    /// marked with a band across the top of the surface
    #[serde(default)]
    pub status_export: Option<String>,
}

fn default_grid_extent() -> u32 {
    10
}
fn default_cell_export() -> String {
    "get_pos".to_string()
}
fn default_palette() -> Vec<PaletteEntry> {
    vec![
        PaletteEntry {
            value: 1,
            color: Color::rgb(255, 0, 0),
        },
        PaletteEntry {
            value: 2,
            color: Color::rgb(128, 128, 128),
        },
    ]
}
fn default_background() -> Color {
    Color::WHITE
}
fn default_ink() -> Color {
    Color::BLACK
}

impl Default for CellGridConfig {
    fn default() -> Self {
        Self {
            columns: default_grid_extent(),
            rows: default_grid_extent(),
            query_export: default_cell_export(),
            addressing: Addressing::default(),
            coloring: Coloring::default(),
            palette: default_palette(),
            background: default_background(),
            ink: default_ink(),
            channels: ChannelExports::default(),
            status_export: None,
        }
    }
}

fn default_pixel_export() -> String {
    "get_pixel_color".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SceneKind {
    Framebuffer {
        #[serde(default)]
        policy: ReacquirePolicy,
        #[serde(default)]
        exports: FrameExports,
    },
    CellGrid(CellGridConfig),
    PixelQuery {
        #[serde(default = "default_pixel_export")]
        query_export: String,
    },
}

impl Default for SceneKind {
    fn default() -> Self {
        Self::Framebuffer {
            policy: ReacquirePolicy::default(),
            exports: FrameExports::default(),
        }
    }
}

/// `[scene]` section of a toy manifest
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SceneConfig {
    #[serde(flatten)]
    pub kind: SceneKind,
    #[serde(default)]
    pub repaint: Repaint,
}

#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error(transparent)]
    Call(#[from] CallError),
    #[error(transparent)]
    Surface(#[from] SurfaceError),
    #[error("query export '{0}' returned no value")]
    MissingValue(String),
}

/// Paints one scene kind onto a surface
#[derive(Debug)]
pub struct ScenePainter {
    config: SceneConfig,
    view: Option<FrameBufferView>,
    status: Option<u32>,
}

impl ScenePainter {
    pub fn new(config: SceneConfig) -> Self {
        Self {
            config,
            view: None,
            status: None,
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn repaint(&self) -> Repaint {
        self.config.repaint
    }

    /// Acquire whatever the scene reads from, right after init
    pub fn prepare(&mut self, handle: &mut ComputationHandle) -> Result<(), SceneError> {
        if let SceneKind::Framebuffer { exports, .. } = &self.config.kind {
            let view = FrameBufferView::acquire(handle, exports)?;
            tracing::debug!(layout = ?view.layout(), "Acquired frame buffer view");
            self.view = Some(view);
        }
        Ok(())
    }

    /// Force the frame buffer view to be re-acquired before the next paint
    pub fn invalidate(&mut self) {
        if let Some(view) = &mut self.view {
            view.invalidate();
        }
    }

    pub fn view(&self) -> Option<&FrameBufferView> {
        self.view.as_ref()
    }

    /// Last value reported by the status export, if one is configured
    pub fn status(&self) -> Option<u32> {
        self.status
    }

    /// Paint the module's current state
    pub fn paint<S: Surface + ?Sized>(
        &mut self,
        handle: &mut ComputationHandle,
        surface: &mut S,
    ) -> Result<(), SceneError> {
        match &self.config.kind {
            SceneKind::Framebuffer { policy, exports } => {
                let view = match self.view.take() {
                    Some(mut view) => {
                        if policy.needs_reacquire(&view, handle) {
                            view.reacquire(handle)?;
                        }
                        view
                    }
                    None => FrameBufferView::acquire(handle, exports)?,
                };
                let image = self.view.insert(view).image(handle)?;
                surface.put_image(&image, 0, 0)?;
            }
            SceneKind::CellGrid(grid) => {
                let status = paint_cells(grid, handle, surface)?;
                if status != self.status {
                    if let Some(value) = status.filter(|value| *value != 0) {
                        tracing::info!("Module status changed to {}", value);
                    }
                    self.status = status;
                }
            }
            SceneKind::PixelQuery { query_export } => paint_pixels(query_export, handle, surface)?,
        }
        Ok(())
    }
}

fn query(handle: &mut ComputationHandle, export: &str, args: &[u32]) -> Result<u32, SceneError> {
    handle
        .call(export, args)?
        .ok_or_else(|| SceneError::MissingValue(export.to_string()))
}

fn cell_color(
    grid: &CellGridConfig,
    handle: &mut ComputationHandle,
    value: u32,
) -> Result<Color, SceneError> {
    Ok(match grid.coloring {
        Coloring::Palette => grid
            .palette
            .iter()
            .find(|entry| entry.value == value)
            .map(|entry| entry.color)
            .unwrap_or(grid.background),
        Coloring::Channels => {
            let channels = &grid.channels;
            Color::rgb(
                query(handle, &channels.red, &[value])?.min(255) as u8,
                query(handle, &channels.green, &[value])?.min(255) as u8,
                query(handle, &channels.blue, &[value])?.min(255) as u8,
            )
        }
        Coloring::Glyph => match value {
            0 | 32 => grid.background,
            _ => grid.ink,
        },
    })
}

/// Paint every cell; returns the status export's value if configured
fn paint_cells<S: Surface + ?Sized>(
    grid: &CellGridConfig,
    handle: &mut ComputationHandle,
    surface: &mut S,
) -> Result<Option<u32>, SceneError> {
    surface.clear(grid.background.0);
    let cell_w = surface.width() / grid.columns.max(1);
    let cell_h = surface.height() / grid.rows.max(1);

    for y in 0..grid.rows {
        for x in 0..grid.columns {
            let value = match grid.addressing {
                Addressing::Xy => query(handle, &grid.query_export, &[x, y])?,
                Addressing::Index => query(handle, &grid.query_export, &[y * grid.columns + x])?,
            };
            let color = cell_color(grid, handle, value)?;
            surface.fill_rect((x * cell_w) as i32, (y * cell_h) as i32, cell_w, cell_h, color.0);
        }
    }

    let Some(export) = &grid.status_export else {
        return Ok(None);
    };
    let status = query(handle, export, &[])?;
    if status != 0 {
        surface.fill_rect(0, 0, surface.width(), cell_h / 4 + 1, grid.ink.0);
    }
    Ok(Some(status))
}

/// Query a gray level for every surface pixel and blit the result
fn paint_pixels<S: Surface + ?Sized>(
    export: &str,
    handle: &mut ComputationHandle,
    surface: &mut S,
) -> Result<(), SceneError> {
    let (width, height) = (surface.width(), surface.height());
    let mut data = Vec::with_capacity(width as usize * height as usize * 4);
    for j in 0..height {
        for i in 0..width {
            data.extend_from_slice(&Color::gray(query(handle, export, &[i, j])?).0);
        }
    }
    surface.put_image(
        &ImageRef {
            width,
            height,
            data: &data,
        },
        0,
        0,
    )?;
    Ok(())
}
