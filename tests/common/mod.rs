#![allow(dead_code)]

pub mod temp_files {
    use std::path::PathBuf;

    use tempfile::TempDir;

    /// A configuration file inside its own temporary directory.
    ///
    /// The directory is removed when this value is dropped.
    pub struct TempConfig {
        dir: TempDir,
        path: PathBuf,
    }

    impl TempConfig {
        pub fn path(&self) -> &std::path::Path {
            &self.path
        }

        /// Replace the file contents.
        pub fn rewrite(&self, content: &str) {
            std::fs::write(&self.path, content).unwrap();
        }

        pub fn dir(&self) -> &std::path::Path {
            self.dir.path()
        }
    }

    /// Creates a temporary configuration file with the given extension
    pub fn create_temp_config(content: &str, ext: &str) -> TempConfig {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(format!("cors.{ext}"));
        std::fs::write(&path, content).unwrap();
        TempConfig { dir, path }
    }

    pub fn create_temp_yaml(content: &str) -> TempConfig {
        create_temp_config(content, "yaml")
    }

    pub fn create_temp_toml(content: &str) -> TempConfig {
        create_temp_config(content, "toml")
    }

    pub fn create_temp_json(content: &str) -> TempConfig {
        create_temp_config(content, "json")
    }
}

pub mod requests {
    use std::sync::Arc;

    use cross_origin::headers::HeaderVec;

    /// Header lines from `(name, value)` pairs, in order.
    pub fn headers(lines: &[(&str, &str)]) -> HeaderVec {
        lines
            .iter()
            .map(|(k, v)| (Arc::<str>::from(*k), v.to_string()))
            .collect()
    }

    pub fn preflight(origin: &str, method: &str) -> HeaderVec {
        headers(&[
            ("Origin", origin),
            ("Access-Control-Request-Method", method),
        ])
    }
}
