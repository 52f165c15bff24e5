use anyhow::Result;
use tracing::debug;

/// The window hosting the prompter.
pub trait WindowHost {
    fn set_always_on_top(&mut self, on_top: bool) -> Result<()>;
    fn exclude_from_capture(&mut self) -> Result<()>;
}

/// Host window for the platform the binary runs on.
pub fn native_host() -> Box<dyn WindowHost> {
    #[cfg(windows)]
    {
        Box::new(ConsoleWindow)
    }
    #[cfg(not(windows))]
    {
        Box::new(DetachedWindow)
    }
}

/// Terminal emulators offer no portable way to pin or hide their window, so
/// requests are only logged.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedWindow;

impl WindowHost for DetachedWindow {
    fn set_always_on_top(&mut self, on_top: bool) -> Result<()> {
        debug!(on_top, "always-on-top not supported by this terminal");
        Ok(())
    }

    fn exclude_from_capture(&mut self) -> Result<()> {
        debug!("capture exclusion not supported by this terminal");
        Ok(())
    }
}

#[cfg(windows)]
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleWindow;

#[cfg(windows)]
impl ConsoleWindow {
    fn handle() -> Result<windows_sys::Win32::Foundation::HWND> {
        use windows_sys::Win32::System::Console::GetConsoleWindow;

        let hwnd = unsafe { GetConsoleWindow() };
        if hwnd.is_null() {
            anyhow::bail!("process has no console window");
        }
        Ok(hwnd)
    }
}

#[cfg(windows)]
impl WindowHost for ConsoleWindow {
    fn set_always_on_top(&mut self, on_top: bool) -> Result<()> {
        use windows_sys::Win32::UI::WindowsAndMessaging::{
            HWND_NOTOPMOST, HWND_TOPMOST, SWP_NOMOVE, SWP_NOSIZE, SetWindowPos,
        };

        let hwnd = Self::handle()?;
        let after = if on_top { HWND_TOPMOST } else { HWND_NOTOPMOST };
        let ok = unsafe { SetWindowPos(hwnd, after, 0, 0, 0, 0, SWP_NOMOVE | SWP_NOSIZE) };
        if ok == 0 {
            anyhow::bail!("SetWindowPos failed");
        }
        Ok(())
    }

    fn exclude_from_capture(&mut self) -> Result<()> {
        use windows_sys::Win32::UI::WindowsAndMessaging::{
            SetWindowDisplayAffinity, WDA_EXCLUDEFROMCAPTURE,
        };

        let hwnd = Self::handle()?;
        let ok = unsafe { SetWindowDisplayAffinity(hwnd, WDA_EXCLUDEFROMCAPTURE) };
        if ok == 0 {
            anyhow::bail!("SetWindowDisplayAffinity failed");
        }
        Ok(())
    }
}
