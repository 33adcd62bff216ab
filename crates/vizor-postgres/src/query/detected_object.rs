//! Detected object repository.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt;
use uuid::Uuid;

use crate::model::{
    DetectedObject, DetectedObjectWithMaterials, NewDetectedObject, NewObjectMaterial,
    NewObjectWithMaterials, ObjectMaterial,
};
use crate::{PgClient, PgError, PgResult, TRACING_TARGET_QUERY, schema};

/// Repository for the objects and materials attached to an analysis request.
pub trait DetectedObjectRepository {
    /// Replaces every object (and its materials) stored under `request_id`.
    ///
    /// The delete and the inserts run in one transaction, so readers observe
    /// either the previous set or the new one. Returned rows keep input order.
    fn replace_detected_objects(
        &self,
        request_id: Uuid,
        objects: Vec<NewObjectWithMaterials>,
    ) -> impl Future<Output = PgResult<Vec<DetectedObjectWithMaterials>>> + Send;

    /// Lists the objects stored under `request_id` with their materials, in insertion order.
    fn list_detected_objects(
        &self,
        request_id: Uuid,
    ) -> impl Future<Output = PgResult<Vec<DetectedObjectWithMaterials>>> + Send;
}

impl DetectedObjectRepository for PgClient {
    async fn replace_detected_objects(
        &self,
        request_id: Uuid,
        objects: Vec<NewObjectWithMaterials>,
    ) -> PgResult<Vec<DetectedObjectWithMaterials>> {
        let mut conn = self.get_connection().await?;

        let stored = conn
            .transaction::<_, PgError, _>(|conn| {
                async move {
                    use schema::detected_objects::{self, dsl};
                    use schema::object_materials;

                    let removed = diesel::delete(
                        detected_objects::table.filter(dsl::request_id.eq(request_id)),
                    )
                    .execute(conn)
                    .await?;

                    let mut stored = Vec::with_capacity(objects.len());
                    for object in objects {
                        let row = diesel::insert_into(detected_objects::table)
                            .values(NewDetectedObject {
                                request_id,
                                name: object.name,
                            })
                            .returning(DetectedObject::as_returning())
                            .get_result(conn)
                            .await?;

                        let new_materials: Vec<NewObjectMaterial> = object
                            .materials
                            .into_iter()
                            .map(|material_name| NewObjectMaterial {
                                detected_object_id: row.id,
                                material_name,
                            })
                            .collect();

                        let materials = if new_materials.is_empty() {
                            Vec::new()
                        } else {
                            diesel::insert_into(object_materials::table)
                                .values(&new_materials)
                                .returning(ObjectMaterial::as_returning())
                                .get_results(conn)
                                .await?
                        };

                        stored.push(DetectedObjectWithMaterials {
                            object: row,
                            materials,
                        });
                    }

                    tracing::debug!(
                        target: TRACING_TARGET_QUERY,
                        %request_id,
                        removed,
                        inserted = stored.len(),
                        "Detected objects replaced"
                    );

                    Ok(stored)
                }
                .scope_boxed()
            })
            .await?;

        Ok(stored)
    }

    async fn list_detected_objects(
        &self,
        request_id: Uuid,
    ) -> PgResult<Vec<DetectedObjectWithMaterials>> {
        let mut conn = self.get_connection().await?;

        use schema::detected_objects::{self, dsl};
        use schema::object_materials;

        let objects: Vec<DetectedObject> = detected_objects::table
            .filter(dsl::request_id.eq(request_id))
            .order(dsl::id.asc())
            .select(DetectedObject::as_select())
            .load(&mut conn)
            .await
            .map_err(PgError::from)?;

        let materials: Vec<ObjectMaterial> = ObjectMaterial::belonging_to(&objects)
            .order(object_materials::id.asc())
            .select(ObjectMaterial::as_select())
            .load(&mut conn)
            .await
            .map_err(PgError::from)?;

        let grouped = materials
            .grouped_by(&objects)
            .into_iter()
            .zip(objects)
            .map(|(materials, object)| DetectedObjectWithMaterials { object, materials })
            .collect();

        Ok(grouped)
    }
}
