use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const DESKTOP_INI: &str = "desktop.ini";

/// Renders the shell descriptor pointing a folder at `icon`.
pub fn render_desktop_ini(icon: &Path) -> String {
    let icon = icon.display();
    format!(
        "[.ShellClassInfo]\n\
         IconResource={icon},0\n\
         IconFile={icon}\n\
         IconIndex=0\n\
         ConfirmFileOp=0\n\
         [ViewState]\n\
         Mode=\n\
         Vid=\n\
         FolderType=Generic\n\
         Logo={icon}\n"
    )
}

/// Replaces `folder/desktop.ini` with one referencing `icon` and sets the
/// attributes Explorer needs to honour it.
///
/// Returns the path of the written descriptor.
pub fn apply_folder_icon(folder: &Path, icon: &Path) -> Result<PathBuf> {
    if !icon.is_file() {
        anyhow::bail!("Icon not found: {}", icon.display());
    }
    let icon = std::path::absolute(icon)
        .with_context(|| format!("Cannot resolve {}", icon.display()))?;
    let descriptor = folder.join(DESKTOP_INI);

    if descriptor.exists() {
        attributes::clear_hidden_system_readonly(&descriptor)?;
        fs::remove_file(&descriptor).with_context(|| {
            format!("Failed to remove existing {}", descriptor.display())
        })?;
    }

    fs::write(&descriptor, render_desktop_ini(&icon))
        .with_context(|| format!("Failed to write {}", descriptor.display()))?;

    attributes::mark_hidden_system(&descriptor)?;
    attributes::mark_readonly(folder)?;

    Ok(descriptor)
}

#[cfg(windows)]
mod attributes {
    use anyhow::{Context, Result};
    use std::path::Path;
    use windows::Win32::Storage::FileSystem::{
        FILE_ATTRIBUTE_HIDDEN, FILE_ATTRIBUTE_READONLY, FILE_ATTRIBUTE_SYSTEM,
        FILE_FLAGS_AND_ATTRIBUTES, GetFileAttributesW, INVALID_FILE_ATTRIBUTES,
        SetFileAttributesW,
    };
    use windows::core::HSTRING;

    fn update(path: &Path, set: u32, clear: u32) -> Result<()> {
        let wide = HSTRING::from(path.as_os_str());
        unsafe {
            let current = GetFileAttributesW(&wide);
            if current == INVALID_FILE_ATTRIBUTES {
                return Err(std::io::Error::last_os_error())
                    .with_context(|| format!("Cannot read attributes of {}", path.display()));
            }
            let updated = (current | set) & !clear;
            SetFileAttributesW(&wide, FILE_FLAGS_AND_ATTRIBUTES(updated))
                .with_context(|| format!("Cannot set attributes of {}", path.display()))?;
        }
        Ok(())
    }

    pub fn clear_hidden_system_readonly(path: &Path) -> Result<()> {
        update(
            path,
            0,
            FILE_ATTRIBUTE_HIDDEN.0 | FILE_ATTRIBUTE_SYSTEM.0 | FILE_ATTRIBUTE_READONLY.0,
        )
    }

    pub fn mark_hidden_system(path: &Path) -> Result<()> {
        update(path, FILE_ATTRIBUTE_HIDDEN.0 | FILE_ATTRIBUTE_SYSTEM.0, 0)
    }

    pub fn mark_readonly(path: &Path) -> Result<()> {
        update(path, FILE_ATTRIBUTE_READONLY.0, 0)
    }
}

// Shell attributes only mean something to Explorer
#[cfg(not(windows))]
mod attributes {
    use anyhow::Result;
    use std::path::Path;
    use tracing::debug;

    pub fn clear_hidden_system_readonly(path: &Path) -> Result<()> {
        debug!("Skipping attribute reset on {}", path.display());
        Ok(())
    }

    pub fn mark_hidden_system(path: &Path) -> Result<()> {
        debug!("Skipping hidden/system attributes on {}", path.display());
        Ok(())
    }

    pub fn mark_readonly(path: &Path) -> Result<()> {
        debug!("Skipping read-only attribute on {}", path.display());
        Ok(())
    }
}
