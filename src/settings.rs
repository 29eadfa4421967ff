use serde::Deserialize;
use std::{
    env, fmt, fs, io,
    path::{Path, PathBuf},
};

pub const SETTINGS_FILENAME: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    #[serde(default = "default_binding")]
    pub tcp_socket_binding: String,
    #[serde(default = "default_port")]
    pub tcp_socket_port: u16,
    /// redb file holding the collection
    #[serde(default = "default_save_file")]
    pub save_file: String,
    /// Static front end, served for any path the API doesn't claim
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

fn default_binding() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_save_file() -> String {
    "todos.redb".to_string()
}

fn default_static_dir() -> String {
    "../frontend/dist".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            tcp_socket_binding: default_binding(),
            tcp_socket_port: default_port(),
            save_file: default_save_file(),
            static_dir: default_static_dir(),
        }
    }
}

impl Settings {
    /// Reads `settings.json` from the working directory, or else from the
    /// directory the executable lives in (where the build copies it).
    pub fn load() -> Result<Settings, SettingsError> {
        let mut candidates = vec![PathBuf::from(SETTINGS_FILENAME)];
        if let Some(dir) = env::current_exe().ok().as_deref().and_then(Path::parent) {
            candidates.push(dir.join(SETTINGS_FILENAME));
        }
        Self::load_first(&candidates)
    }

    /// Loads the first candidate that exists.
    pub fn load_first<P: AsRef<Path>>(candidates: &[P]) -> Result<Settings, SettingsError> {
        match candidates.iter().map(AsRef::as_ref).find(|path| path.is_file()) {
            Some(path) => Self::load_from(path),
            None => {
                let tried: Vec<String> = candidates
                    .iter()
                    .map(|path| path.as_ref().display().to_string())
                    .collect();
                Err(SettingsError::Io(tried.join(", "), io::ErrorKind::NotFound.into()))
            }
        }
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Settings, SettingsError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| SettingsError::Io(path.display().to_string(), e))?;
        Self::parse(&content).map_err(|e| match e {
            SettingsError::Parse(_, inner) => {
                SettingsError::Parse(path.display().to_string(), inner)
            }
            other => other,
        })
    }

    pub fn parse(content: &str) -> Result<Settings, SettingsError> {
        serde_json::from_str(content)
            .map_err(|e| SettingsError::Parse(SETTINGS_FILENAME.to_string(), e))
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.tcp_socket_binding, self.tcp_socket_port)
    }
}

#[derive(Debug)]
pub enum SettingsError {
    Io(String, io::Error),
    Parse(String, serde_json::Error),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Io(path, e) => write!(f, "cannot read settings file {path}: {e}"),
            SettingsError::Parse(path, e) => {
                write!(f, "cannot parse JSON content from file {path}: {e}")
            }
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Io(_, e) => Some(e),
            SettingsError::Parse(_, e) => Some(e),
        }
    }
}
