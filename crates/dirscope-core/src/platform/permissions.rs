/// Permission and file-type bits for display.
use std::fs::Metadata;

/// Directory type bit, as in `S_IFDIR`.
pub const MODE_DIR: u32 = 0o040_000;
/// Symbolic link type bit, as in `S_IFLNK`.
pub const MODE_SYMLINK: u32 = 0o120_000;
/// Mask selecting the file-type bits.
pub const MODE_TYPE_MASK: u32 = 0o170_000;

/// Raw mode bits as reported by `lstat`.
#[cfg(unix)]
pub fn file_mode(metadata: &Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode()
}

/// Synthesised Unix-style mode for platforms without one: type bits plus
/// `rwx` derived from the read-only flag.
#[cfg(not(unix))]
pub fn file_mode(metadata: &Metadata) -> u32 {
    let file_type = metadata.file_type();
    let readonly = metadata.permissions().readonly();
    let kind = if file_type.is_dir() {
        MODE_DIR
    } else if file_type.is_symlink() {
        MODE_SYMLINK
    } else {
        0o100_000
    };
    let perms = match (file_type.is_dir(), readonly) {
        (true, false) => 0o755,
        (true, true) => 0o555,
        (false, false) => 0o644,
        (false, true) => 0o444,
    };
    kind | perms
}
