#[cfg(target_os = "windows")]
mod media;
#[cfg(target_os = "windows")]
mod session;

#[cfg(target_os = "windows")]
pub use media::toggle_media_playback;
#[cfg(target_os = "windows")]
pub use session::lock_workstation;
