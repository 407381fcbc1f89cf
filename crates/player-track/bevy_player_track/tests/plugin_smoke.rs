use bevy::prelude::*;
use bevy_player_track::{
    PendingPoses, PlayerTargets, PlayerTrackDispatcher, PlayerTrackPlugin, PlayerTrackSettings,
    Tracks,
};
use player_track_core::{Config, DataVersion};

#[test]
fn plugin_inserts_resources() {
    let mut app = App::new();
    // it should insert the dispatcher, track store and index when the plugin is added
    app.add_plugins(MinimalPlugins)
        .add_plugins(PlayerTrackPlugin::default());

    let world = app.world();
    assert!(world.get_resource::<PlayerTrackDispatcher>().is_some());
    assert!(world.get_resource::<Tracks>().is_some());
    assert!(world.get_resource::<PlayerTargets>().is_some());
    assert!(world.get_resource::<PendingPoses>().is_some());
}

/// it should run an empty frame without any targets or events
#[test]
fn empty_update_is_a_noop() {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins(PlayerTrackPlugin::default());

    for _ in 0..3 {
        app.world_mut().run_schedule(Update);
    }
    assert!(app.world().resource::<PlayerTrackDispatcher>().0.is_empty());
    assert!(app.world().resource::<PendingPoses>().outputs.is_empty());
}

/// it should reset only an invalid grid unit and keep the other settings
#[test]
fn invalid_grid_unit_is_reset_alone() {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins).add_plugins(PlayerTrackPlugin {
        config: Config {
            left_handed: true,
            note_lines_distance: f32::NAN,
            data_version: DataVersion::Legacy,
        },
    });

    let settings = &app.world().resource::<PlayerTrackSettings>().0;
    assert_eq!(settings.note_lines_distance, Config::default().note_lines_distance);
    assert_eq!(settings.data_version, DataVersion::Legacy);
    assert!(settings.left_handed);
}
