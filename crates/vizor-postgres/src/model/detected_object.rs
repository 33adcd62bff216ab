//! Detected object model for PostgreSQL database operations.

use diesel::prelude::*;
use uuid::Uuid;

use super::{AnalysisRequest, ObjectMaterial};
use crate::schema::detected_objects;

/// An object confirmed by the caller and classified during material detection.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = detected_objects)]
#[diesel(belongs_to(AnalysisRequest, foreign_key = request_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DetectedObject {
    /// Serial object identifier.
    pub id: i32,
    /// Reference to the owning analysis request.
    pub request_id: Uuid,
    /// Object name as returned by the model.
    pub name: String,
}

/// Data for creating a new detected object.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = detected_objects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewDetectedObject {
    /// Request ID.
    pub request_id: Uuid,
    /// Object name.
    pub name: String,
}

/// An object name and its materials, ready to be stored under a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewObjectWithMaterials {
    /// Object name.
    pub name: String,
    /// Material names, in the order they should be stored.
    pub materials: Vec<String>,
}

impl NewObjectWithMaterials {
    pub fn new(name: impl Into<String>, materials: impl IntoIterator<Item = String>) -> Self {
        Self {
            name: name.into(),
            materials: materials.into_iter().collect(),
        }
    }
}

/// A detected object together with all of its materials.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedObjectWithMaterials {
    /// The detected object row.
    pub object: DetectedObject,
    /// Material rows belonging to the object, in insertion order.
    pub materials: Vec<ObjectMaterial>,
}

impl DetectedObjectWithMaterials {
    /// Returns the material names in insertion order.
    pub fn material_names(&self) -> Vec<String> {
        self.materials
            .iter()
            .map(|material| material.material_name.clone())
            .collect()
    }
}
