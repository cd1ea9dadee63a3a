//! Map overlays and their legend.

use geo::{
    LatLonBounds, Result, RgbaBuffer,
    overlay::{render_classes, render_continuous},
};
use inf::{ClassificationScheme, ColorMapPreset, LegendEntry, ProcessedColorMap, legend::format_range};

use crate::{RenderConfig, layers::ContinuousLayer, layers::MapLayers};

const LEGEND_GRADIENT_STEPS: usize = 5;

/// The layers of the map, in drawing order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LayerKind {
    Vegetation,
    Elevation,
    Slope,
    Wind,
    Hazard,
}

impl LayerKind {
    pub fn title(&self) -> &'static str {
        match self {
            LayerKind::Vegetation => "Vegetacion NDVI",
            LayerKind::Elevation => "Elevacion",
            LayerKind::Slope => "Pendiente",
            LayerKind::Wind => "Viento (magnitud)",
            LayerKind::Hazard => "Riesgo incendios (CONAF)",
        }
    }

    pub fn color_map(&self) -> Option<ColorMapPreset> {
        match self {
            LayerKind::Vegetation => Some(ColorMapPreset::RdYlGn),
            LayerKind::Elevation => Some(ColorMapPreset::Terrain),
            LayerKind::Slope => Some(ColorMapPreset::Magma),
            LayerKind::Wind => Some(ColorMapPreset::Viridis),
            LayerKind::Hazard => None,
        }
    }

    /// Hazard classes are drawn on top of the continuous layers
    pub fn z_index(&self) -> u32 {
        match self {
            LayerKind::Hazard => 6,
            _ => 3,
        }
    }
}

/// A rendered layer anchored on its geographic bounds
#[derive(Debug, Clone)]
pub struct Overlay {
    pub kind: LayerKind,
    pub name: String,
    pub image: RgbaBuffer,
    pub bounds: LatLonBounds,
}

impl MapLayers {
    fn continuous_layers(&self) -> [(LayerKind, Option<&ContinuousLayer>); 4] {
        [
            (LayerKind::Vegetation, self.vegetation.as_ref()),
            (LayerKind::Elevation, self.elevation.as_ref()),
            (LayerKind::Slope, self.slope.as_ref()),
            (LayerKind::Wind, self.wind.as_ref()),
        ]
    }

    /// Renders every available layer, the continuous layers without a value range are skipped.
    /// All overlays are masked with the boundary mask.
    pub fn render_overlays(&self, config: &RenderConfig) -> Result<Vec<Overlay>> {
        let mut overlays = Vec::new();

        for (kind, layer) in self.continuous_layers() {
            let (Some(layer), Some(preset)) = (layer, kind.color_map()) else {
                continue;
            };

            let image = render_continuous(
                layer.raster.band(),
                layer.vmin,
                layer.vmax,
                preset,
                config.continuous_opacity,
                Some(&self.boundary_mask),
            )?;

            match image {
                Some(image) => overlays.push(Overlay {
                    kind,
                    name: kind.title().to_string(),
                    image,
                    bounds: self.bounds,
                }),
                None => log::warn!("No value range for layer '{}', the overlay is omitted", kind.title()),
            }
        }

        let classes = &config.hazard_classes;
        overlays.push(Overlay {
            kind: LayerKind::Hazard,
            name: format!("Riesgo [{}-{}]", classes.start(), classes.end()),
            image: render_classes(
                self.hazard.band(),
                &ClassificationScheme::hazard_classes(),
                classes.clone(),
                config.class_opacity,
                Some(&self.boundary_mask),
            )?,
            bounds: self.bounds,
        });

        Ok(overlays)
    }

    /// Legend entries: the hazard classes first, followed by the available continuous layers
    pub fn legend(&self) -> Vec<LegendEntry> {
        let mut legend = vec![LegendEntry::categories(
            LayerKind::Hazard.title(),
            ClassificationScheme::hazard_classes()
                .categories()
                .map(|(code, cat)| (code, cat.clone()))
                .collect(),
        )];

        for (kind, layer) in self.continuous_layers() {
            if let (Some(layer), Some(preset)) = (layer, kind.color_map()) {
                legend.push(LegendEntry::gradient(
                    kind.title(),
                    ProcessedColorMap::create(preset).gradient(LEGEND_GRADIENT_STEPS),
                    format_range(layer.vmin, layer.vmax),
                ));
            }
        }

        legend
    }
}
