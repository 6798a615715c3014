/// Bucket size used when the caller has no preference.
pub const DEFAULT_BUCKET_SIZE: usize = 1;

/// Name written at the top of every persisted tree.
pub(crate) const FORMAT_NAME: &str = "kd-index";

/// Version of the persisted layout. Bump whenever it changes.
pub(crate) const FORMAT_VERSION: u32 = 1;
