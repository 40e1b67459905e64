use tokio::fs::File;

/// A finished backup, opened for reading.
///
/// The open file moves with the artifact; whoever consumes it closes it.
#[derive(Debug)]
pub struct BackupArtifact {
    file_name: String,
    file: File,
}

impl BackupArtifact {
    pub fn new(file_name: impl Into<String>, file: File) -> Self {
        Self {
            file_name: file_name.into(),
            file,
        }
    }

    /// The backup file name as reported by the server.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Mutable access to the open file, e.g. to read it in place.
    pub fn file_mut(&mut self) -> &mut File {
        &mut self.file
    }

    /// Splits the artifact into its name and the open file.
    pub fn into_parts(self) -> (String, File) {
        (self.file_name, self.file)
    }
}
