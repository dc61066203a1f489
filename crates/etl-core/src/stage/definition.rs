use serde::{Deserialize, Serialize};

/// Declaración de un stage.
///
/// `upstream` son los artifacts que deben estar en `P3` antes de empezar.
/// Qué artifact habilita a qué stage es configuración: el runner no conoce
/// nombres concretos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSpec {
    pub name: String,
    pub artifact_id: String,
    pub upstream: Vec<String>,
}

impl StageSpec {
    pub fn new(name: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Self { name: name.into(),
               artifact_id: artifact_id.into(),
               upstream: Vec::new() }
    }

    /// Agrega una arista de dependencia.
    pub fn after(mut self, upstream: impl Into<String>) -> Self {
        self.upstream.push(upstream.into());
        self
    }

    /// Reemplaza todas las aristas de dependencia.
    pub fn with_upstream<I, S>(mut self, upstream: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        self.upstream = upstream.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_root(&self) -> bool {
        self.upstream.is_empty()
    }
}
