pub mod distribution_images;
pub mod file;
pub mod github_release;

pub use distribution_images::DistributionImageSource;
pub use file::FileSource;
pub use github_release::GitHubReleaseSource;
