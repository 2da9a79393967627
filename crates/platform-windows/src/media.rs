use windows_sys::Win32::UI::Input::KeyboardAndMouse::{
    keybd_event, KEYEVENTF_EXTENDEDKEY, KEYEVENTF_KEYUP, VK_MEDIA_PLAY_PAUSE,
};

/// Press and release the media play/pause key. The shell routes it to whichever
/// session currently owns media transport, so there is no separate play and pause.
pub fn toggle_media_playback() -> Result<(), String> {
    let key = VK_MEDIA_PLAY_PAUSE as u8;
    unsafe {
        keybd_event(key, 0, KEYEVENTF_EXTENDEDKEY, 0);
        keybd_event(key, 0, KEYEVENTF_EXTENDEDKEY | KEYEVENTF_KEYUP, 0);
    }
    Ok(())
}
