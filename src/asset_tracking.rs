//! Loads collections of asset handles as resources.
//!
//! A resource registered with [`LoadResource::load_resource`] is only inserted
//! into the world once every asset it depends on has finished loading, so
//! systems can rely on `Res<GameAssets>` meaning "everything is ready".

use std::collections::VecDeque;

use bevy::prelude::*;

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<ResourceHandles>();
    app.add_systems(PreUpdate, load_resource_assets);
}

pub trait LoadResource {
    /// Load the [`Resource`] as an [`Asset`] and insert it as a resource once
    /// all of its asset dependencies are loaded.
    fn load_resource<T: Resource + Asset + Clone + FromWorld>(&mut self) -> &mut Self;
}

impl LoadResource for App {
    fn load_resource<T: Resource + Asset + Clone + FromWorld>(&mut self) -> &mut Self {
        self.init_asset::<T>();
        let world = self.world_mut();
        let value = T::from_world(world);
        let assets = world.resource::<AssetServer>();
        let handle = assets.add(value);
        let mut handles = world.resource_mut::<ResourceHandles>();
        handles
            .waiting
            .push_back((handle.untyped(), |world, handle| {
                let assets = world.resource::<Assets<T>>();
                if let Some(value) = assets.get(handle.id().typed::<T>()) {
                    world.insert_resource(value.clone());
                }
            }));
        self
    }
}

/// Inserts a loaded resource into the world.
type InsertLoadedResource = fn(&mut World, &UntypedHandle);

#[derive(Resource, Default)]
pub struct ResourceHandles {
    waiting: VecDeque<(UntypedHandle, InsertLoadedResource)>,
}

impl ResourceHandles {
    /// Returns true once every requested resource has been inserted.
    pub fn is_all_done(&self) -> bool {
        self.waiting.is_empty()
    }
}

fn load_resource_assets(world: &mut World) {
    world.resource_scope(|world, mut resource_handles: Mut<ResourceHandles>| {
        world.resource_scope(|world, assets: Mut<AssetServer>| {
            for _ in 0..resource_handles.waiting.len() {
                let Some((handle, insert_fn)) = resource_handles.waiting.pop_front() else {
                    break;
                };
                if assets.is_loaded_with_dependencies(&handle) {
                    insert_fn(world, &handle);
                } else {
                    resource_handles.waiting.push_back((handle, insert_fn));
                }
            }
        });
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nothing_requested_is_done() {
        assert!(ResourceHandles::default().is_all_done());
    }
}
