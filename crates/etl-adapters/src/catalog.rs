//! Catálogo de stages del pipeline de precios.
//!
//! Las aristas de gating son datos: el catálogo por defecto puede
//! sobreescribirse stage por stage (ver `Catalog::with_overrides`).

use std::collections::HashMap;

use etl_core::StageSpec;
use log::info;

pub const EXTRACT: &str = "extract";
pub const TRANSFORM: &str = "transform";
pub const LOAD: &str = "load";
pub const CHECK: &str = "check";
pub const DW_LOAD_DIM_BRAND: &str = "dw_load_dim_brand";
pub const DW_LOAD_DIM_PRODUCT: &str = "dw_load_dim_product";
pub const DW_LOAD_FACT_PRODUCT_PRICE: &str = "dw_load_fact_product_price";

pub const RAW_DATA: &str = "raw_data.csv";
pub const CLEAN_DATA: &str = "clean_data.csv";
pub const STAGED_DATA: &str = "staged_data.csv";
pub const QUALITY_REPORT: &str = "data_quality_report.csv";
pub const DIM_BRAND: &str = "dim_brand.csv";
pub const DIM_PRODUCT: &str = "dim_product.csv";
pub const FACT_PRODUCT_PRICE: &str = "fact_product_price.csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    specs: Vec<StageSpec>,
}

impl Default for Catalog {
    fn default() -> Self {
        let specs = vec![StageSpec::new(EXTRACT, RAW_DATA),
                         StageSpec::new(TRANSFORM, CLEAN_DATA).after(RAW_DATA),
                         StageSpec::new(LOAD, STAGED_DATA).after(CLEAN_DATA),
                         StageSpec::new(CHECK, QUALITY_REPORT).after(STAGED_DATA),
                         StageSpec::new(DW_LOAD_DIM_BRAND, DIM_BRAND).after(CLEAN_DATA),
                         StageSpec::new(DW_LOAD_DIM_PRODUCT, DIM_PRODUCT).after(CLEAN_DATA),
                         StageSpec::new(DW_LOAD_FACT_PRODUCT_PRICE, FACT_PRODUCT_PRICE).after(CLEAN_DATA)
                                                                                       .after(DIM_PRODUCT)];
        Self { specs }
    }
}

impl Catalog {
    pub fn new(specs: Vec<StageSpec>) -> Self {
        Self { specs }
    }

    /// Reemplaza las aristas de los stages indicados (clave = nombre del
    /// stage, sin distinguir mayúsculas). Claves desconocidas se ignoran.
    pub fn with_overrides(mut self, overrides: &HashMap<String, Vec<String>>) -> Self {
        for spec in &mut self.specs {
            if let Some(edges) = overrides.get(&spec.name.to_ascii_lowercase()) {
                info!("catalog: stage={} upstream overridden to {:?}", spec.name, edges);
                spec.upstream = edges.clone();
            }
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&StageSpec> {
        self.specs.iter().find(|s| s.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.specs.iter().map(|s| s.name.as_str())
    }

    /// Stages en orden de declaración (que es un orden topológico válido
    /// para el catálogo por defecto).
    pub fn iter(&self) -> impl Iterator<Item = &StageSpec> {
        self.specs.iter()
    }
}
