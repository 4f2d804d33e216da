//! Configuración de secciones del venue.
//!
//! El mapa conserva el orden de inserción: el payload y el fingerprint deben
//! ser estables para la misma configuración.
use indexmap::IndexMap;
use log::warn;
use serde::{Deserialize, Serialize};

pub type SectionMap = IndexMap<String, SectionConfig>;

/// Geometría de una sección (anillo de filas).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionConfig {
    pub tier: String,
    pub angle: f64,
    pub inner_radius: f64,
    pub rows: u32,
    pub row_depth: f64,
    pub row_rise: f64,
    pub base_height: f64,
}

impl Default for SectionConfig {
    fn default() -> Self {
        Self {
            tier: "lower".to_string(),
            angle: 0.0,
            inner_radius: 18.0,
            rows: 21,
            row_depth: 0.8,
            row_rise: 0.3,
            base_height: 2.0,
        }
    }
}

/// Subconjunto seleccionado, en el orden del mapa original. Selección vacía
/// significa todas las secciones; ids desconocidos se ignoran con warn.
pub fn select_sections(sections: &SectionMap, selected: &[String]) -> SectionMap {
    if selected.is_empty() {
        return sections.clone();
    }
    for id in selected.iter().filter(|id| !sections.contains_key(id.as_str())) {
        warn!("sections:select unknown section_id={id} (ignored)");
    }
    sections
        .iter()
        .filter(|(id, _)| selected.iter().any(|s| s == *id))
        .map(|(id, cfg)| (id.clone(), cfg.clone()))
        .collect()
}
