pub mod clip;
pub mod config;
pub mod controller;
pub mod metrics;
pub mod playback;
pub mod scene;
pub mod testing;

pub use clip::{
    AssetLocation, AssetStore, ClipDescriptor, ClipError, ClipKind, ClipResolver, ClipSource,
    FsAssetStore, PlaybackMode,
};
pub use config::{
    load_config, load_config_from_str, validate_config, AssetsConfig, Config, ConfigError,
    NarrativeConfig, NarrativeSource,
};
pub use controller::{
    ControllerConfig, ControllerError, ControllerHandle, ControllerStatus, DegradeReason,
    Dispatch, IgnoreReason, NoticeEnvelope, OverlayCause, SceneController, SceneNotice,
    ScenePresenter, SceneToken,
};
pub use playback::{
    FrameCursor, FrameStep, HeadlessSurface, PlaybackConfig, PlaybackError, PlaybackUnit,
    RendererSurface, UnitId, UnitState,
};
pub use scene::{BuiltinGraph, Choice, Scene, SceneGraph, SceneGraphError, SceneId, Trigger};
