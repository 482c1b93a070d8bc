use konteiner::error::RegistrationError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors related to discovering and registering creators from the filesystem.
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Error walking directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Invalid exclusion pattern: {0}")]
    InvalidExclusion(#[from] regex::Error),
    #[error("No creator found for \"{identifier}\" discovered at {}", .location.display())]
    MissingCreator {
        identifier: String,
        location: PathBuf,
    },
    #[error("Error registering discovered creator: {0}")]
    Registration(#[from] RegistrationError),
}

#[cfg(test)]
mod tests {
    use crate::error::LoaderError;
    use std::path::PathBuf;

    #[test]
    fn should_name_missing_creator() {
        let error = LoaderError::MissingCreator {
            identifier: "messengerService".to_string(),
            location: PathBuf::from("services/messenger-service.rs"),
        };

        assert_eq!(
            error.to_string(),
            r#"No creator found for "messengerService" discovered at services/messenger-service.rs"#
        );
    }
}
