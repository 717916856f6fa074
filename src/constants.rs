// src/constants.rs

/// The name of the directory holding shogun configuration (inside the system config dir).
pub const CONFIG_DIR_NAME: &str = "shogun";

/// The name of the configuration file (inside the config directory).
pub const CONFIG_FILENAME: &str = "shogun.toml";

/// Default SDKMAN! root when neither the config nor `$SDKMAN_DIR` names one.
pub const DEFAULT_SDKMAN_DIR: &str = "~/.sdkman";

/// Environment variable that overrides `sdkman_dir`.
pub const SDKMAN_DIR_ENV: &str = "SDKMAN_DIR";

/// Where macOS keeps JDKs installed outside of SDKMAN!.
pub const MACOS_JVM_DIR: &str = "/Library/Java/JavaVirtualMachines";

/// The candidate whose versions are merged with scanned, unmanaged JDKs.
pub const JAVA_CANDIDATE: &str = "java";

pub const DEFAULT_AWAIT_IDLE_SECS: u64 = 60;

pub const DEFAULT_INDICATOR_FRAME_MILLIS: u64 = 100;

/// Busy indicator animation. The first frame doubles as the idle frame.
pub const INDICATOR_FRAMES: &[&str] = &[
    "⠿", "⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠟",
];

/// Thread name of the background action worker.
pub const ACTION_QUEUE_NAME: &str = "shogun-action";

/// Thread name of the UI-affine worker.
pub const UI_QUEUE_NAME: &str = "shogun-ui";
