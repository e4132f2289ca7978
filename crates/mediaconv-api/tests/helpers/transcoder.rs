//! Stub ffmpeg executables. The conversion pipeline passes the output path as the last
//! argument, which is all the stubs rely on.

use std::path::{Path, PathBuf};

/// Writes `data` to the output path and exits 0.
pub const SUCCEEDS: &str = "#!/bin/sh\nfor last; do :; done\nprintf 'data' > \"$last\"\n";

/// Leaves a partial output behind and exits 1.
pub const FAILS: &str = "#!/bin/sh\nfor last; do :; done\nprintf 'partial' > \"$last\"\necho 'Invalid data found when processing input' >&2\nexit 1\n";

/// Never finishes on its own.
pub const HANGS: &str = "#!/bin/sh\nexec sleep 30\n";

/// Write an executable stub into `dir` and return its path.
#[cfg(unix)]
pub fn write_stub(dir: &Path, name: &str, script: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, script).expect("Failed to write stub");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("Failed to chmod stub");
    path
}
