use windows_sys::Win32::Foundation::GetLastError;
use windows_sys::Win32::System::Shutdown::LockWorkStation;

/// Lock the interactive session. Returns once the request is queued, not once the
/// lock screen is visible.
pub fn lock_workstation() -> Result<(), String> {
    let ok = unsafe { LockWorkStation() };
    if ok != 0 {
        Ok(())
    } else {
        let code = unsafe { GetLastError() };
        Err(format!("LockWorkStation failed with error {code}"))
    }
}
