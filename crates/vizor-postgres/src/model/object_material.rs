//! Object material model for PostgreSQL database operations.

use diesel::prelude::*;

use super::DetectedObject;
use crate::schema::object_materials;

/// A single material name attached to a detected object.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = object_materials)]
#[diesel(belongs_to(DetectedObject, foreign_key = detected_object_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ObjectMaterial {
    /// Serial material identifier.
    pub id: i32,
    /// Reference to the owning detected object.
    pub detected_object_id: i32,
    /// Material name, e.g. `"металл"`.
    pub material_name: String,
}

/// Data for creating a new object material.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = object_materials)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewObjectMaterial {
    /// Detected object ID.
    pub detected_object_id: i32,
    /// Material name.
    pub material_name: String,
}
