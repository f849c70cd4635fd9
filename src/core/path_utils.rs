/*
 * Small helpers around paths: locating the per-user configuration directory
 * and turning a folder path into the separator-terminated prefix that folder
 * bulk selection and tree node ids rely on.
 */
use directories::ProjectDirs;
use std::fs;
use std::path::{MAIN_SEPARATOR, PathBuf};

/*
 * Returns the local (non-roaming) configuration directory for `app_name`,
 * creating it on first use. `None` if the platform offers no such directory
 * or it cannot be created.
 */
pub fn get_base_app_config_local_dir(app_name: &str) -> Option<PathBuf> {
    let proj_dirs = ProjectDirs::from("", "", app_name)?;
    let config_path = proj_dirs.config_local_dir();
    if let Err(e) = fs::create_dir_all(config_path) {
        log::error!("PathUtils: Failed to create config directory {config_path:?}: {e}");
        return None;
    }
    log::trace!("PathUtils: Using config directory {config_path:?} for '{app_name}'.");
    Some(config_path.to_path_buf())
}

/*
 * Appends the platform separator unless `folder` already ends with `/` or the
 * platform separator. `"/p/src"` becomes `"/p/src/"`, so a prefix test
 * against it cannot match `"/p/src2/..."`.
 */
pub fn folder_prefix(folder: &str) -> String {
    if folder.ends_with('/') || folder.ends_with(MAIN_SEPARATOR) {
        folder.to_string()
    } else {
        format!("{folder}{MAIN_SEPARATOR}")
    }
}
