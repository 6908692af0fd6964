//! Compile job definitions

use serde::{Deserialize, Serialize};

/// Job to compile one snapshot of a source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileJob {
    /// Submission order; a higher generation supersedes a lower one
    pub generation: u64,

    /// Source text
    pub source: String,

    /// SHA-256 of the source, hex-encoded
    pub hash: String,

    /// Job metadata
    pub metadata: JobMetadata,
}

/// Job metadata
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct JobMetadata {
    /// Where the source came from (a file path, an editor buffer id)
    pub origin: Option<String>,

    /// Submission time, milliseconds since the Unix epoch
    pub submitted_at: Option<i64>,
}

impl CompileJob {
    /// Create a new compile job
    pub fn new(generation: u64, source: impl Into<String>) -> Self {
        let source = source.into();
        Self {
            generation,
            hash: content_hash(&source),
            source,
            metadata: JobMetadata::default(),
        }
    }

    /// Set the origin of the source
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.metadata.origin = Some(origin.into());
        self
    }

    /// Set the submission time
    pub fn with_submitted_at(mut self, millis: i64) -> Self {
        self.metadata.submitted_at = Some(millis);
        self
    }
}

/// Hash of a source text, used to skip recompiling unchanged input
pub fn content_hash(source: &str) -> String {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_metadata_default() {
        let metadata = JobMetadata::default();
        assert!(metadata.origin.is_none());
        assert!(metadata.submitted_at.is_none());
    }

    #[test]
    fn test_compile_job_new_hashes_source() {
        let job = CompileJob::new(7, "workspace { }");
        assert_eq!(job.generation, 7);
        assert_eq!(job.source, "workspace { }");
        assert_eq!(job.hash, content_hash("workspace { }"));
        assert_eq!(job.hash.len(), 64);
    }

    #[test]
    fn test_content_hash_known_value() {
        assert_eq!(
            content_hash(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_ne!(content_hash("a"), content_hash("b"));
    }

    #[test]
    fn test_compile_job_chained_builders() {
        let job = CompileJob::new(1, "")
            .with_origin("workflows/main.alc")
            .with_submitted_at(1_700_000_000_000);

        assert_eq!(job.metadata.origin, Some("workflows/main.alc".to_string()));
        assert_eq!(job.metadata.submitted_at, Some(1_700_000_000_000));
    }

    #[test]
    fn test_compile_job_serialization() {
        let job = CompileJob::new(3, "node A { }").with_origin("buffer-1");

        let serialized = serde_json::to_string(&job).unwrap();
        let deserialized: CompileJob = serde_json::from_str(&serialized).unwrap();

        assert_eq!(deserialized.generation, job.generation);
        assert_eq!(deserialized.hash, job.hash);
        assert_eq!(deserialized.metadata.origin, job.metadata.origin);
    }
}
