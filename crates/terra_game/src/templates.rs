//! Shared projectile templates
//!
//! The model and light hung under every projectile are built once per
//! process and shared by reference from then on. Whoever gets there first
//! decides the settings; later callers get the same nodes back.

use once_cell::sync::OnceCell;
use std::sync::Arc;
use terra_core::glam::Vec3;
use terra_core::scene::{NodeKind, SceneNode, Transform};
use terra_services::SpawnerSettings;

static BULLET_TEMPLATE: OnceCell<BulletTemplate> = OnceCell::new();

#[derive(Debug, Clone)]
pub struct BulletTemplate {
    pub model: Arc<SceneNode>,
    pub light: Arc<SceneNode>,
}

impl BulletTemplate {
    pub fn build(settings: &SpawnerSettings) -> Self {
        let model = SceneNode::new(NodeKind::Model {
            source: settings.model_source.clone(),
        })
        .with_transform(Transform {
            scale: Vec3::splat(settings.model_scale),
            ..Transform::IDENTITY
        });
        let light = SceneNode::new(NodeKind::PointLight {
            radius: settings.light_radius,
            intensity: settings.light_intensity,
        });

        Self {
            model: Arc::new(model),
            light: Arc::new(light),
        }
    }

    /// The process-wide template, built from `settings` on first use.
    pub fn shared(settings: &SpawnerSettings) -> &'static BulletTemplate {
        BULLET_TEMPLATE.get_or_init(|| {
            tracing::debug!(model = %settings.model_source, "building projectile template");
            Self::build(settings)
        })
    }
}
