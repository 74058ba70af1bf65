//! Source content hash stored in the file header.

use sha1::{Digest, Sha1};

/// SHA-1 digest of the source text a module was compiled from.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct SourceHash(pub [u8; 20]);

impl SourceHash {
    /// Hash the given source bytes.
    pub fn of(source: impl AsRef<[u8]>) -> Self {
        let digest = Sha1::digest(source.as_ref());
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}
