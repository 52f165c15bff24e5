use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const ENTRY_NAME: &str = "teleprompt";

/// OS launch-on-login service.
pub trait AutostartBridge {
    fn is_enabled(&self) -> Result<bool>;
    fn enable(&mut self) -> Result<()>;
    fn disable(&mut self) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryFormat {
    /// XDG autostart `.desktop` file.
    Desktop,
    /// launchd user agent plist.
    LaunchAgent,
    /// Script in the per-user Startup folder.
    StartupScript,
}

impl EntryFormat {
    pub fn native() -> Self {
        if cfg!(target_os = "macos") {
            Self::LaunchAgent
        } else if cfg!(windows) {
            Self::StartupScript
        } else {
            Self::Desktop
        }
    }

    fn file_name(self) -> String {
        match self {
            Self::Desktop => format!("{ENTRY_NAME}.desktop"),
            Self::LaunchAgent => format!("{ENTRY_NAME}.plist"),
            Self::StartupScript => format!("{ENTRY_NAME}.cmd"),
        }
    }

    fn default_dir(self) -> Result<PathBuf> {
        match self {
            Self::Desktop => Ok(dirs::config_dir()
                .context("no config directory for autostart entry")?
                .join("autostart")),
            Self::LaunchAgent => Ok(dirs::home_dir()
                .context("no home directory for launch agent")?
                .join("Library")
                .join("LaunchAgents")),
            Self::StartupScript => Ok(dirs::config_dir()
                .context("no roaming app data directory")?
                .join("Microsoft")
                .join("Windows")
                .join("Start Menu")
                .join("Programs")
                .join("Startup")),
        }
    }

    pub fn contents(self, executable: &Path) -> String {
        let exe = executable.display();
        match self {
            Self::Desktop => format!(
                "[Desktop Entry]\nType=Application\nName=Teleprompt\nExec=\"{exe}\"\nTerminal=true\nX-GNOME-Autostart-enabled=true\n"
            ),
            Self::LaunchAgent => format!(
                "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
<!DOCTYPE plist PUBLIC \"-//Apple//DTD PLIST 1.0//EN\" \"http://www.apple.com/DTDs/PropertyList-1.0.dtd\">\n\
<plist version=\"1.0\">\n<dict>\n  <key>Label</key>\n  <string>{ENTRY_NAME}</string>\n  \
<key>ProgramArguments</key>\n  <array>\n    <string>{exe}</string>\n  </array>\n  \
<key>RunAtLoad</key>\n  <true/>\n</dict>\n</plist>\n"
            ),
            Self::StartupScript => format!("@echo off\r\nstart \"\" \"{exe}\"\r\n"),
        }
    }
}

/// Autostart backed by a launch entry file: enabled exactly when the file exists.
#[derive(Debug, Clone)]
pub struct LaunchEntryAutostart {
    format: EntryFormat,
    entry_path: PathBuf,
    executable: PathBuf,
}

impl LaunchEntryAutostart {
    pub fn for_current_exe() -> Result<Self> {
        let format = EntryFormat::native();
        let executable = env::current_exe().context("failed to resolve current executable")?;
        let entry_path = format.default_dir()?.join(format.file_name());
        Ok(Self::new(format, entry_path, executable))
    }

    pub fn new(format: EntryFormat, entry_path: PathBuf, executable: PathBuf) -> Self {
        Self {
            format,
            entry_path,
            executable,
        }
    }

    pub fn entry_path(&self) -> &Path {
        &self.entry_path
    }
}

impl AutostartBridge for LaunchEntryAutostart {
    fn is_enabled(&self) -> Result<bool> {
        Ok(self.entry_path.is_file())
    }

    fn enable(&mut self) -> Result<()> {
        if let Some(parent) = self.entry_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&self.entry_path, self.format.contents(&self.executable))
            .with_context(|| format!("failed to write {}", self.entry_path.display()))
    }

    fn disable(&mut self) -> Result<()> {
        if !self.entry_path.exists() {
            return Ok(());
        }
        fs::remove_file(&self.entry_path)
            .with_context(|| format!("failed to remove {}", self.entry_path.display()))
    }
}

/// Used when no launch entry location can be resolved.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedAutostart;

impl AutostartBridge for UnsupportedAutostart {
    fn is_enabled(&self) -> Result<bool> {
        Ok(false)
    }

    fn enable(&mut self) -> Result<()> {
        anyhow::bail!("autostart is not available on this system")
    }

    fn disable(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn enable_then_disable_toggles_entry_file() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("autostart").join("teleprompt.desktop");
        let mut bridge = LaunchEntryAutostart::new(
            EntryFormat::Desktop,
            path.clone(),
            PathBuf::from("/usr/bin/teleprompt"),
        );

        assert!(!bridge.is_enabled().expect("query"));
        bridge.enable().expect("enable");
        assert!(bridge.is_enabled().expect("query"));
        let written = fs::read_to_string(&path).expect("read");
        assert!(written.contains("Exec=\"/usr/bin/teleprompt\""));

        bridge.disable().expect("disable");
        assert!(!bridge.is_enabled().expect("query"));
        bridge.disable().expect("disable twice");
    }

    #[test]
    fn launch_agent_runs_at_load() {
        let plist = EntryFormat::LaunchAgent.contents(Path::new("/Applications/teleprompt"));
        assert!(plist.contains("<string>/Applications/teleprompt</string>"));
        assert!(plist.contains("<key>RunAtLoad</key>"));
    }

    #[test]
    fn startup_script_quotes_executable() {
        let script = EntryFormat::StartupScript.contents(Path::new(r"C:\Tools\teleprompt.exe"));
        assert!(script.contains(r#"start "" "C:\Tools\teleprompt.exe""#));
    }

    #[test]
    fn unsupported_bridge_refuses_enable() {
        let mut bridge = UnsupportedAutostart;
        assert!(!bridge.is_enabled().expect("query"));
        assert!(bridge.enable().is_err());
        assert!(bridge.disable().is_ok());
    }
}
