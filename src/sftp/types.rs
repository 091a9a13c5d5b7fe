//! SFTP transfer types

/// One entry of a remote directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    pub name: String,
    /// Full remote path of the entry
    pub path: String,
    pub is_dir: bool,
    pub size: Option<u64>,
}

impl RemoteEntry {
    /// `.` and `..`, which some servers include in listings
    pub fn is_self_or_parent(&self) -> bool {
        self.name == "." || self.name == ".."
    }
}

/// What a recursive transfer copied
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferSummary {
    pub files: usize,
    pub directories: usize,
    pub bytes: u64,
}

impl TransferSummary {
    pub(crate) fn add_file(&mut self, bytes: u64) {
        self.files += 1;
        self.bytes += bytes;
    }

    pub(crate) fn merge(&mut self, other: TransferSummary) {
        self.files += other.files;
        self.directories += other.directories;
        self.bytes += other.bytes;
    }
}

/// Join a remote directory and an entry name with `/`
pub fn join_remote(dir: &str, name: &str) -> String {
    format!("{}/{}", dir.trim_end_matches('/'), name)
}
