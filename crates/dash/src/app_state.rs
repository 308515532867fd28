use bevy::asset::{LoadState, UntypedHandle};
use bevy::prelude::*;

use crate::config::DashConfig;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum AppState {
    #[default]
    Loading,
    Ready,
}

/// Asset handles that must settle (load or fail) before the dash config can be finalized.
#[derive(Resource, Default)]
pub struct TrackedAssets(Vec<UntypedHandle>);

impl TrackedAssets {
    pub fn add(&mut self, handle: impl Into<UntypedHandle>) {
        self.0.push(handle.into());
    }

    pub fn all_settled(&self, asset_server: &AssetServer) -> bool {
        self.0.iter().all(|handle| {
            asset_server.is_loaded_with_dependencies(handle)
                || matches!(asset_server.load_state(handle), LoadState::Failed(_))
        })
    }
}

pub struct AppStatePlugin;

impl Plugin for AppStatePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<AppState>();
        app.init_resource::<TrackedAssets>();
        app.add_systems(
            Update,
            enter_ready_state.run_if(in_state(AppState::Loading)),
        );
    }
}

/// Leaves `Loading` once the tracked assets have settled and a config is in place.
fn enter_ready_state(
    asset_server: Res<AssetServer>,
    tracked: Res<TrackedAssets>,
    config: Option<Res<DashConfig>>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    if config.is_none() || !tracked.all_settled(&asset_server) {
        return;
    }
    info!("Dash config ready, transitioning to AppState::Ready");
    next_state.set(AppState::Ready);
}
