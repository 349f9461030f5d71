use crate::config::TargetsConfig;

/// Ordered module roots plus the directory excluded from analysis.
///
/// Read from configuration once per run; never computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSet {
    paths: Vec<String>,
    exclude: Option<String>,
}

impl TargetSet {
    pub fn new<I, S>(paths: I, exclude: Option<&str>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
            exclude: exclude
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(str::to_string),
        }
    }

    pub fn from_config(config: &TargetsConfig) -> Self {
        Self::new(config.paths.iter().cloned(), Some(config.exclude.as_str()))
    }

    /// Paths in configured order
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn exclude(&self) -> Option<&str> {
        self.exclude.as_deref()
    }

    /// Paths joined with `,`, the form coverage tools take for `--source`
    pub fn comma_joined(&self) -> String {
        self.paths.join(",")
    }
}
