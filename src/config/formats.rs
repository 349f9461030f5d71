use figment::providers::{Data, Format, Json, Toml, Yaml};
use figment::value::{Dict, Map};
use figment::{Error, Metadata, Profile, Provider};
use std::path::Path;

/// Extensions probed for user and repository config files, lowest priority first
pub const CONFIG_EXTENSIONS: [&str; 4] = ["toml", "json", "yaml", "yml"];

/// File provider chosen by extension. Unknown extensions are read as TOML.
///
/// Missing files contribute nothing, so optional layers can be merged blindly.
pub fn file_provider<P: AsRef<Path>>(path: P) -> FileProvider {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "json" => FileProvider::Json(Json::file(path)),
        "yaml" | "yml" => FileProvider::Yaml(Yaml::file(path)),
        _ => FileProvider::Toml(Toml::file(path)),
    }
}

/// One config file in whichever format its extension names
pub enum FileProvider {
    Toml(Data<Toml>),
    Json(Data<Json>),
    Yaml(Data<Yaml>),
}

impl Provider for FileProvider {
    fn metadata(&self) -> Metadata {
        match self {
            FileProvider::Toml(p) => p.metadata(),
            FileProvider::Json(p) => p.metadata(),
            FileProvider::Yaml(p) => p.metadata(),
        }
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        match self {
            FileProvider::Toml(p) => p.data(),
            FileProvider::Json(p) => p.data(),
            FileProvider::Yaml(p) => p.data(),
        }
    }
}
