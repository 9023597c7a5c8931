//! Plot composition and still-image export.
//!
//! [`PlotScene`] is computed from a [`Series`](temhumi_core::Series) without
//! touching any drawing backend. The live window shows it as an
//! image through [`RgbaFrame`]; [`PngExporter`] writes it to disk. Both go
//! through the same `plotters` painter.

pub mod export;
pub mod scene;

pub use export::{paint, PngExporter, RgbaFrame};
pub use scene::{day_ticks, hour_ticks, Label, LabelRole, Panel, PlotScene, Tick};

use temhumi_core::Result;

/// Anything a finished scene can be drawn to.
pub trait RenderSink {
    fn draw(&mut self, scene: &PlotScene) -> Result<()>;
}
