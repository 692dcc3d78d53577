//! Toy manifests (`<toy>.toml`)
//!
//! A manifest names the module to load and describes how the host drives
//! it: init arguments, the step function, how to paint, which exports take
//! input, and what a reset does. Every section except `[canvas]` is
//! optional.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::app::ResetAction;
use crate::input::InputConfig;
use crate::loader::{InitConfig, ModuleSource, is_url};
use crate::runtime::{RuntimeConfig, StepConfig};
use crate::scene::{SceneConfig, SceneKind};
use crate::surface::SurfaceRect;
use crate::wasm::{DEFAULT_RAM_LIMIT, HostImports, HostMemory, ImportName};

#[cfg(test)]
mod tests;

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("failed to read manifest {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse manifest: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid manifest: {0}")]
    Invalid(String),
}

/// Drawing surface size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    /// Displayed size when the surface is scaled by layout
    #[serde(default)]
    pub display_width: Option<f64>,
    #[serde(default)]
    pub display_height: Option<f64>,
}

/// Offline asset cache (`[cache]`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    pub name: String,
    /// Request paths stored on install
    #[serde(default)]
    pub assets: Vec<String>,
    /// Request path of the module binary (defaults to the `module` entry)
    #[serde(default)]
    pub module_path: Option<String>,
    /// Origin the asset paths are fetched from
    #[serde(default)]
    pub base_url: Option<String>,
}

/// A toy manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToyManifest {
    pub name: String,
    /// Path relative to the manifest, or an http(s) URL
    pub module: String,
    #[serde(default = "default_ram_limit")]
    pub ram_limit: usize,
    pub canvas: CanvasConfig,
    #[serde(default)]
    pub init: Option<InitConfig>,
    #[serde(default)]
    pub step: Option<StepConfig>,
    #[serde(default)]
    pub scene: SceneConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub reset: ResetAction,
    #[serde(default)]
    pub runtime: RuntimeConfig,
    /// Where the print sink is imported from
    #[serde(default = "default_print_import")]
    pub print: ImportName,
    #[serde(default)]
    pub host_memory: Option<HostMemory>,
    #[serde(default)]
    pub cache: Option<CacheConfig>,
    /// Directory relative module paths are resolved against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

fn default_ram_limit() -> usize {
    DEFAULT_RAM_LIMIT
}

fn default_print_import() -> ImportName {
    ImportName::new("env", "print")
}

impl ToyManifest {
    /// Read and validate a manifest file
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut manifest = Self::from_toml_str(&content)?;
        manifest.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        tracing::debug!("Loaded manifest '{}' from {}", manifest.name, path.display());
        Ok(manifest)
    }

    /// Parse and validate manifest text; relative paths resolve against the
    /// current directory
    pub fn from_toml_str(content: &str) -> Result<Self, ManifestError> {
        let manifest: Self = toml::from_str(content)?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn validate(&self) -> Result<(), ManifestError> {
        let invalid = |message: String| Err(ManifestError::Invalid(message));

        if self.name.trim().is_empty() {
            return invalid("name must not be empty".to_string());
        }
        if self.module.trim().is_empty() {
            return invalid("module must not be empty".to_string());
        }
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return invalid(format!(
                "canvas must have a nonzero size, got {}x{}",
                self.canvas.width, self.canvas.height
            ));
        }
        for extent in [self.canvas.display_width, self.canvas.display_height]
            .into_iter()
            .flatten()
        {
            if !(extent > 0.0) {
                return invalid(format!("display size must be positive, got {}", extent));
            }
        }
        if self.input.logical_width == Some(0) || self.input.logical_height == Some(0) {
            return invalid("logical input size must be nonzero".to_string());
        }
        if let SceneKind::CellGrid(grid) = &self.scene.kind
            && (grid.columns == 0 || grid.rows == 0)
        {
            return invalid(format!(
                "cell grid must have at least one cell, got {}x{}",
                grid.columns, grid.rows
            ));
        }
        if let Some(memory) = &self.host_memory
            && memory.maximum.is_some_and(|maximum| maximum < memory.initial)
        {
            return invalid(format!(
                "host memory maximum is below its initial size of {} pages",
                memory.initial
            ));
        }
        if self.runtime.frame_rate == 0 {
            return invalid("frame rate must be nonzero".to_string());
        }
        if let Some(cache) = &self.cache
            && cache.name.trim().is_empty()
        {
            return invalid("cache name must not be empty".to_string());
        }
        Ok(())
    }

    pub fn module_source(&self) -> ModuleSource {
        ModuleSource::resolve(&self.module, &self.base_dir)
    }

    pub fn is_remote(&self) -> bool {
        is_url(&self.module)
    }

    /// Import object for instantiating this toy's module
    pub fn host_imports(&self) -> HostImports {
        HostImports {
            print: Some(self.print.clone()),
            memory: self.host_memory.clone(),
            ram_limit: self.ram_limit,
        }
    }

    /// On-screen rectangle of the surface at `scale` times its display size
    pub fn display_rect(&self, scale: f64) -> SurfaceRect {
        let width = self.canvas.display_width.unwrap_or(self.canvas.width as f64);
        let height = self.canvas.display_height.unwrap_or(self.canvas.height as f64);
        SurfaceRect::sized(width * scale, height * scale)
    }

    /// Cache request path of the module binary
    pub fn cached_module_path(&self) -> Option<&str> {
        let cache = self.cache.as_ref()?;
        Some(cache.module_path.as_deref().unwrap_or(&self.module))
    }
}

/// Returns the platform-specific data directory.
///
/// On Linux: `~/.local/share/toyhost`
///
/// Returns `None` if the home directory cannot be determined.
pub fn data_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io.toyhost", "", "toyhost")
        .map(|dirs| dirs.data_dir().to_path_buf())
}
